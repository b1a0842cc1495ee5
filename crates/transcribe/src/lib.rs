//! An abstraction layer for streaming transcription transports.
//!
//! This crate establishes an unified protocol for the planner session to
//! consume speech-to-text results, so that the session can run against any
//! transport (a live websocket, a typed-input shim, a scripted test stream)
//! without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod event;
mod provider;

pub use error::*;
pub use event::*;
pub use provider::*;
