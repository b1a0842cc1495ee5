//! An out-of-the-box voice travel planner that assembles the session
//! controller, transcription providers and the itinerary backend client.
//!
//! The crate includes a CLI tool for trying the planner in the terminal
//! with typed input. And you can also use it as a library to bring trip
//! planning into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod typed;

pub use voxtrip_core::{Session, SessionBuilder};

/// Re-exports of [`voxtrip_core`] crate.
pub mod core {
    pub use voxtrip_core::*;
}
