//! The itinerary side of the planner: the data model shared with the
//! generation backend, an abstraction for generation providers, an HTTP
//! implementation, and the persisted itinerary list.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod client;
mod generator;
mod store;
mod types;

pub use client::{GeneratorConfig, GeneratorConfigBuilder, HttpGenerator};
pub use generator::*;
pub use store::{ItineraryStore, StoreError};
pub use types::*;
