use chrono::Local;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use voxtrip_itinerary::{GenerationRequest, Itinerary, ItineraryStore};
use voxtrip_transcribe::StreamEvent;

use super::{SessionError, SessionHandle, SessionPhase};
use crate::aggregator::UtteranceAggregator;
use crate::conversation::{Conversation, Speaker, TranscriptMessage};
use crate::extract::{self, TripDetails};
use crate::generator_client::{GenerationFailure, GeneratorClient};
use crate::respond;
use crate::stream_client::{StreamClient, TranscriptionFailure};

pub(super) type MessageCallback =
    Box<dyn Fn(&TranscriptMessage) + Send + Sync>;
pub(super) type InterimCallback = Box<dyn Fn(&str) + Send + Sync>;
pub(super) type PhaseCallback = Box<dyn Fn(SessionPhase) + Send + Sync>;
pub(super) type ErrorCallback = Box<dyn Fn(&SessionError) + Send + Sync>;

/// Everything that can happen to a session.
///
/// Stream and generation messages are tagged with the connection epoch
/// they belong to; a message tagged with an old epoch is silently
/// discarded. Bumping the epoch is therefore how the session cancels
/// in-flight work without having to reach into the tasks doing it.
#[derive(Debug)]
pub(super) enum SessionMessage {
    Start,
    Stop,
    StreamOpened {
        epoch: u64,
    },
    StreamSignal {
        epoch: u64,
        event: StreamEvent,
    },
    StreamClosed {
        epoch: u64,
    },
    StreamFailed {
        epoch: u64,
        error: TranscriptionFailure,
    },
    GenerationFinished {
        epoch: u64,
        result: Result<Itinerary, GenerationFailure>,
    },
}

pub(super) struct SessionState {
    stream_client: StreamClient,
    generator_client: GeneratorClient,
    store: Option<ItineraryStore>,
    greeting: String,

    conversation: Conversation,
    aggregator: UtteranceAggregator,
    phase: SessionPhase,
    epoch: u64,
    generation_started: bool,
    pump_task: Option<JoinHandle<()>>,
    itinerary_tx: broadcast::Sender<Itinerary>,

    on_message: Option<MessageCallback>,
    on_interim: Option<InterimCallback>,
    on_phase_change: Option<PhaseCallback>,
    on_error: Option<ErrorCallback>,
}

impl SessionState {
    pub(super) fn from_builder(
        builder: super::SessionBuilder,
        itinerary_tx: broadcast::Sender<Itinerary>,
    ) -> Self {
        let super::SessionBuilder {
            stream_client,
            generator_client,
            store,
            greeting,
            on_message,
            on_interim,
            on_phase_change,
            on_error,
        } = builder;
        Self {
            stream_client,
            generator_client,
            store,
            greeting,
            conversation: Default::default(),
            aggregator: Default::default(),
            phase: Default::default(),
            epoch: 0,
            generation_started: false,
            pump_task: None,
            itinerary_tx,
            on_message,
            on_interim,
            on_phase_change,
            on_error,
        }
    }

    pub(super) fn handle_message(
        &mut self,
        msg: SessionMessage,
        handle: &SessionHandle,
    ) {
        match msg {
            SessionMessage::Start => self.start(handle),
            SessionMessage::Stop => self.stop(),
            SessionMessage::StreamOpened { epoch } => {
                self.stream_opened(epoch);
            }
            SessionMessage::StreamSignal { epoch, event } => {
                self.stream_signal(epoch, event, handle);
            }
            SessionMessage::StreamClosed { epoch } => {
                self.stream_closed(epoch);
            }
            SessionMessage::StreamFailed { epoch, error } => {
                self.stream_failed(epoch, error);
            }
            SessionMessage::GenerationFinished { epoch, result } => {
                self.generation_finished(epoch, result, handle);
            }
        }
    }

    pub(super) fn shutdown(&mut self) {
        self.teardown_pump();
    }

    fn start(&mut self, handle: &SessionHandle) {
        if self.phase != SessionPhase::Disconnected {
            warn!("ignoring start: the session is already running");
            return;
        }
        self.generation_started = false;
        self.push_agent_message(self.greeting.clone());
        self.connect(handle);
    }

    fn stop(&mut self) {
        // Bumping the epoch marks every in-flight stream event and
        // generation result as stale.
        self.epoch += 1;
        self.teardown_pump();
        self.aggregator.reset();
        self.generation_started = false;
        self.set_phase(SessionPhase::Disconnected);
    }

    /// Opens a fresh stream under a new epoch and spawns the pump task
    /// that forwards its events into the mailbox.
    fn connect(&mut self, handle: &SessionHandle) {
        self.epoch += 1;
        let epoch = self.epoch;
        self.teardown_pump();
        self.set_phase(SessionPhase::Connecting);

        let stream_client = self.stream_client.clone();
        let handle = handle.clone();
        let task = tokio::spawn(async move {
            let mut stream = match stream_client.open().await {
                Ok(stream) => stream,
                Err(error) => {
                    handle.send(SessionMessage::StreamFailed { epoch, error });
                    return;
                }
            };
            handle.send(SessionMessage::StreamOpened { epoch });
            loop {
                match stream.next_event().await {
                    Ok(Some(event)) => {
                        handle
                            .send(SessionMessage::StreamSignal { epoch, event });
                    }
                    Ok(None) => {
                        handle.send(SessionMessage::StreamClosed { epoch });
                        break;
                    }
                    Err(error) => {
                        handle
                            .send(SessionMessage::StreamFailed { epoch, error });
                        break;
                    }
                }
            }
        });
        self.pump_task = Some(task);
    }

    fn stream_opened(&mut self, epoch: u64) {
        if epoch != self.epoch {
            trace!("discarding a stale stream-opened message");
            return;
        }
        self.set_phase(SessionPhase::Listening);
    }

    fn stream_signal(
        &mut self,
        epoch: u64,
        event: StreamEvent,
        handle: &SessionHandle,
    ) {
        if epoch != self.epoch || self.phase != SessionPhase::Listening {
            trace!("discarding stream event: {event:?}");
            return;
        }
        match event {
            StreamEvent::SpeechStarted => {
                self.aggregator.speech_started();
            }
            StreamEvent::Fragment(fragment) => {
                if fragment.is_final {
                    // A final fragment is displayed right away; the
                    // buffer only decides when extraction runs.
                    self.aggregator.push_final(&fragment.text);
                    if !fragment.text.is_empty() {
                        self.push_user_message(fragment.text);
                    }
                } else if let Some(on_interim) = &self.on_interim {
                    on_interim(&fragment.text);
                }
            }
            StreamEvent::UtteranceEnd => {
                if let Some(statement) = self.aggregator.utterance_end() {
                    self.statement_finished(statement, handle);
                }
            }
        }
    }

    fn stream_closed(&mut self, epoch: u64) {
        if epoch != self.epoch {
            trace!("discarding a stale stream-closed message");
            return;
        }
        if matches!(
            self.phase,
            SessionPhase::Connecting | SessionPhase::Listening
        ) {
            debug!("stream closed by the remote side");
            self.teardown_pump();
            self.set_phase(SessionPhase::Disconnected);
        }
    }

    fn stream_failed(&mut self, epoch: u64, error: TranscriptionFailure) {
        if epoch != self.epoch {
            trace!("discarding a stale stream failure");
            return;
        }
        self.teardown_pump();
        let error = SessionError::Transcription(error);
        error!("{error}");
        if let Some(on_error) = &self.on_error {
            on_error(&error);
        }
        self.set_phase(SessionPhase::Disconnected);
    }

    fn statement_finished(
        &mut self,
        statement: String,
        handle: &SessionHandle,
    ) {
        // The fragments are already in the history; the joined statement
        // only marks that a full utterance is now available to extract
        // from.
        debug!("user statement: {statement}");

        let today = Local::now().date_naive();
        let text = self.conversation.user_text();
        if let Some(details) = extract::extract(&text, today) {
            self.begin_generation(details, handle);
            return;
        }

        let reply = respond::respond(&text, today);
        self.push_agent_message(reply);
    }

    fn begin_generation(
        &mut self,
        details: TripDetails,
        handle: &SessionHandle,
    ) {
        if self.generation_started {
            // At most one generation per session run, even if the
            // extractor completes again.
            trace!("generation has already been started");
            return;
        }
        self.generation_started = true;
        self.teardown_pump();
        self.set_phase(SessionPhase::Processing);
        self.push_agent_message(format!(
            "Perfect! I have everything I need. Creating your personalized \
             itinerary for {} from {} to {}. This will just take a moment...",
            details.city, details.start_date, details.end_date
        ));

        let epoch = self.epoch;
        let generator_client = self.generator_client.clone();
        let req = GenerationRequest {
            location: details.city,
            start_date: details.start_date.to_string(),
            end_date: details.end_date.to_string(),
        };
        let handle = handle.clone();
        tokio::spawn(async move {
            let result = generator_client.generate(req).await;
            handle.send(SessionMessage::GenerationFinished { epoch, result });
        });
    }

    fn generation_finished(
        &mut self,
        epoch: u64,
        result: Result<Itinerary, GenerationFailure>,
        handle: &SessionHandle,
    ) {
        if epoch != self.epoch {
            trace!("discarding a stale generation result");
            return;
        }
        match result {
            Ok(itinerary) => {
                info!("itinerary generated: {}", itinerary.id);
                if let Some(store) = &self.store {
                    if let Err(err) = store.insert(itinerary.clone()) {
                        warn!("failed to persist the itinerary: {err}");
                    }
                }
                self.itinerary_tx.send(itinerary).ok();
                self.set_phase(SessionPhase::Completed);
            }
            Err(err) => {
                let error = SessionError::Generation(err);
                error!("{error}");
                if let Some(on_error) = &self.on_error {
                    on_error(&error);
                }
                // Re-arm and reconnect so the user can try again in the
                // same session.
                self.generation_started = false;
                self.push_agent_message(
                    "Sorry, I couldn't create that itinerary. Let's try \
                     again - where and when would you like to travel?"
                        .to_owned(),
                );
                self.connect(handle);
            }
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase == phase {
            return;
        }
        debug!("phase: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        if let Some(on_phase_change) = &self.on_phase_change {
            on_phase_change(phase);
        }
    }

    fn push_agent_message(&mut self, text: String) {
        let msg = TranscriptMessage::now(Speaker::Agent, text);
        if let Some(on_message) = &self.on_message {
            on_message(&msg);
        }
        self.conversation.push(msg);
    }

    fn push_user_message(&mut self, text: String) {
        let msg = TranscriptMessage::now(Speaker::User, text);
        if let Some(on_message) = &self.on_message {
            on_message(&msg);
        }
        self.conversation.push(msg);
    }

    fn teardown_pump(&mut self) {
        if let Some(task) = self.pump_task.take() {
            task.abort();
        }
    }
}
