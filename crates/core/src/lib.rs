//! Core logic including the session controller, trip-detail extraction,
//! utterance aggregation, configurations, etc.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod aggregator;
pub mod conversation;
pub mod dates;
pub mod extract;
mod generator_client;
pub mod respond;
mod session;
mod stream_client;

pub use generator_client::GenerationFailure;
pub use session::{Session, SessionBuilder, SessionError, SessionPhase};
pub use stream_client::TranscriptionFailure;
