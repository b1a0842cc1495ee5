use voxtrip_itinerary::{ItineraryGenerator, ItineraryStore};
use voxtrip_transcribe::TranscriptionProvider;

use super::state::{
    ErrorCallback, InterimCallback, MessageCallback, PhaseCallback,
};
use super::{Session, SessionError, SessionPhase};
use crate::conversation::TranscriptMessage;
use crate::generator_client::GeneratorClient;
use crate::stream_client::StreamClient;

/// The greeting played at the start of every session run.
const DEFAULT_GREETING: &str =
    "Hello! I'm your AI travel assistant. Tell me where you'd like to go \
     and when you'd like to travel. For example, 'I want to visit Paris \
     from November 1st to November 5th'.";

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(super) stream_client: StreamClient,
    pub(super) generator_client: GeneratorClient,
    pub(super) store: Option<ItineraryStore>,
    pub(super) greeting: String,
    pub(super) on_message: Option<MessageCallback>,
    pub(super) on_interim: Option<InterimCallback>,
    pub(super) on_phase_change: Option<PhaseCallback>,
    pub(super) on_error: Option<ErrorCallback>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified transcription provider
    /// and itinerary generator.
    #[inline]
    pub fn with_providers<P, G>(provider: P, generator: G) -> Self
    where
        P: TranscriptionProvider + 'static,
        G: ItineraryGenerator + 'static,
    {
        Self {
            stream_client: StreamClient::new(provider),
            generator_client: GeneratorClient::new(generator),
            store: None,
            greeting: DEFAULT_GREETING.to_owned(),
            on_message: None,
            on_interim: None,
            on_phase_change: None,
            on_error: None,
        }
    }

    /// Attaches a store that every generated itinerary is persisted to.
    #[inline]
    pub fn with_store(mut self, store: ItineraryStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the greeting emitted when the session starts.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, greeting: S) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Attaches a callback to be invoked for every finalized
    /// conversation message, agent and user alike.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&TranscriptMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(on_message));
        self
    }

    /// Attaches a callback to be invoked with interim transcript text.
    ///
    /// Interim text is display-only and never enters the conversation.
    #[inline]
    pub fn on_interim(
        mut self,
        on_interim: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_interim = Some(Box::new(on_interim));
        self
    }

    /// Attaches a callback to be invoked on every phase transition.
    #[inline]
    pub fn on_phase_change(
        mut self,
        on_phase_change: impl Fn(SessionPhase) + Send + Sync + 'static,
    ) -> Self {
        self.on_phase_change = Some(Box::new(on_phase_change));
        self
    }

    /// Attaches a callback to be invoked when a stream or generation
    /// error occurs.
    #[inline]
    pub fn on_error(
        mut self,
        on_error: impl Fn(&SessionError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> Session {
        Session::spawn_from_builder(self)
    }
}
