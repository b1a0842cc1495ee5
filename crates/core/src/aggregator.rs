//! Buffering of streamed transcript fragments into discrete utterances.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Accumulating,
}

/// Accumulates final transcript fragments between speech-start and
/// utterance-end signals.
///
/// The aggregator is owned by the session state and only ever mutated on
/// the session task, so fragments arriving faster than they are processed
/// are still applied strictly in arrival order.
#[derive(Clone, Debug, Default)]
pub struct UtteranceAggregator {
    phase: Phase,
    buffer: Vec<String>,
}

impl UtteranceAggregator {
    /// Creates an empty aggregator.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a speech-start signal: any stale fragments are discarded
    /// and a new utterance begins.
    pub fn speech_started(&mut self) {
        self.buffer.clear();
        self.phase = Phase::Accumulating;
    }

    /// Appends a final transcript fragment to the current utterance.
    ///
    /// Interim fragments must never reach this method, they are
    /// display-only. A final fragment arriving while idle implicitly
    /// starts a new utterance, since some transports skip the
    /// speech-start signal.
    pub fn push_final(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.phase = Phase::Accumulating;
        self.buffer.push(text.to_owned());
    }

    /// Handles an utterance-end signal.
    ///
    /// Returns the buffered fragments joined with single spaces as one
    /// complete statement, or `None` when nothing was buffered.
    pub fn utterance_end(&mut self) -> Option<String> {
        self.phase = Phase::Idle;
        if self.buffer.is_empty() {
            return None;
        }
        let statement = self.buffer.join(" ").trim().to_owned();
        self.buffer.clear();
        if statement.is_empty() {
            return None;
        }
        Some(statement)
    }

    /// Discards any buffered content and returns to idle.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_fragments_in_order() {
        let mut aggregator = UtteranceAggregator::new();
        aggregator.speech_started();
        aggregator.push_final("I want");
        aggregator.push_final("to visit Paris");
        assert_eq!(
            aggregator.utterance_end().as_deref(),
            Some("I want to visit Paris")
        );
    }

    #[test]
    fn test_empty_utterance_emits_nothing() {
        let mut aggregator = UtteranceAggregator::new();
        aggregator.speech_started();
        assert_eq!(aggregator.utterance_end(), None);
        // And again without even a speech start.
        assert_eq!(aggregator.utterance_end(), None);
    }

    #[test]
    fn test_speech_start_clears_stale_fragments() {
        let mut aggregator = UtteranceAggregator::new();
        aggregator.push_final("leftover");
        aggregator.speech_started();
        aggregator.push_final("fresh");
        assert_eq!(aggregator.utterance_end().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_fragment_without_speech_start_is_buffered() {
        let mut aggregator = UtteranceAggregator::new();
        aggregator.push_final("hello");
        assert_eq!(aggregator.utterance_end().as_deref(), Some("hello"));
    }

    #[test]
    fn test_buffer_cleared_after_each_utterance() {
        let mut aggregator = UtteranceAggregator::new();
        aggregator.speech_started();
        aggregator.push_final("first");
        aggregator.utterance_end();
        aggregator.speech_started();
        aggregator.push_final("second");
        assert_eq!(aggregator.utterance_end().as_deref(), Some("second"));
    }
}
