use serde::{Deserialize, Serialize};

/// An incremental speech-to-text result.
///
/// Interim fragments are unstable and display-only; final fragments are
/// stable and may be buffered into the current utterance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// The transcribed text.
    pub text: String,
    /// Whether this fragment is final.
    pub is_final: bool,
}

impl TranscriptFragment {
    /// Creates a final fragment.
    #[inline]
    pub fn final_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// Creates an interim fragment.
    #[inline]
    pub fn interim<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// The event from a transcription stream.
///
/// Together with stream completion (`Ok(None)`) and stream failure
/// (`Err(_)`), these form the five signals the session consumes, no
/// matter what the underlying transport is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamEvent {
    /// The endpointer detected the start of speech.
    #[serde(rename = "speech_started")]
    SpeechStarted,
    /// Received a transcript fragment.
    #[serde(rename = "fragment")]
    Fragment(TranscriptFragment),
    /// The current utterance has ended.
    #[serde(rename = "utterance_end")]
    UtteranceEnd,
}
