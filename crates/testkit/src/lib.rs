//! Local fake providers for testing purpose.
//!
//! [`ScriptedTranscription`] replays a preset event script as if it came
//! from a live transcription transport, and [`PresetGenerator`] answers
//! generation requests from a canned itinerary. Neither is optimized for
//! production use, you should only use them for testing.

mod generator;
mod stream;

pub use generator::{PresetGenerator, PresetGeneratorError};
pub use stream::{ScriptedStream, ScriptedTranscription, ScriptedStreamError};
