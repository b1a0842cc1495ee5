mod builder;
mod state;
#[cfg(test)]
mod tests;

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

use tokio::select;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::Instrument;
use voxtrip_itinerary::Itinerary;

use crate::generator_client::GenerationFailure;
use crate::stream_client::TranscriptionFailure;
pub use builder::SessionBuilder;
use state::{SessionMessage, SessionState};

/// The externally observable lifecycle phase of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No voice stream is open.
    #[default]
    Disconnected,
    /// A voice stream is being opened.
    Connecting,
    /// The voice stream is live and utterances are being consumed.
    Listening,
    /// An itinerary is being generated; voice input is ignored.
    Processing,
    /// An itinerary was produced and the session has ended.
    Completed,
}

/// An error surfaced to the session's error callback.
#[derive(Debug)]
pub enum SessionError {
    /// The voice stream failed to open or broke mid-stream.
    Transcription(TranscriptionFailure),
    /// The itinerary generation request failed.
    Generation(GenerationFailure),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcription(err) => {
                write!(f, "voice stream error: {err}")
            }
            Self::Generation(err) => {
                write!(f, "itinerary generation failed: {err}")
            }
        }
    }
}

impl StdError for SessionError {}

/// A voice planning session, which owns the conversation, the trip
/// extraction state, and the connection lifecycle.
///
/// The session runs as a task with an exclusive mailbox; every external
/// signal becomes a message and is applied to the state in arrival
/// order. Messages are handled immediately no matter what phase the
/// session is in, the phase only decides what each message does. For
/// example, a transcript fragment that arrives while an itinerary is
/// being generated is simply discarded instead of blocking anything.
pub struct Session {
    handle: SessionHandle,
    kill_tx: watch::Sender<bool>,
    itinerary_tx: broadcast::Sender<Itinerary>,
}

impl Session {
    /// Starts the session: the greeting is emitted and a voice stream is
    /// opened. Starting an already started session has no effect.
    pub fn start(&self) {
        self.handle
            .send_required(SessionMessage::Start)
            .expect("session task has been dropped too early");
    }

    /// Stops listening and discards any in-flight work. The session can
    /// be started again afterwards.
    pub fn stop(&self) {
        self.handle
            .send_required(SessionMessage::Stop)
            .expect("session task has been dropped too early");
    }

    /// Subscribes to completed itineraries.
    ///
    /// Every successfully generated itinerary is broadcast to all
    /// current subscribers right after it is persisted.
    #[inline]
    pub fn subscribe(&self) -> broadcast::Receiver<Itinerary> {
        self.itinerary_tx.subscribe()
    }

    fn spawn_from_builder(builder: SessionBuilder) -> Self {
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let (kill_tx, mut kill_rx) = watch::channel(false);
        let (itinerary_tx, _) = broadcast::channel(8);

        let handle = SessionHandle { msg_tx };
        let mut state =
            SessionState::from_builder(builder, itinerary_tx.clone());

        let task_handle = handle.clone();
        tokio::spawn(
            async move {
                debug!("started");
                loop {
                    let msg = select! {
                        biased;

                        _ = kill_rx.changed() => {
                            break;
                        }
                        msg = msg_rx.recv() => {
                            let Some(msg) = msg else {
                                break;
                            };
                            msg
                        }
                    };
                    trace!("received message: {msg:?}");

                    let proc_span = trace_span!("proc msg");
                    proc_span.in_scope(|| {
                        state.handle_message(msg, &task_handle);
                        trace!("finished");
                    });
                }
                state.shutdown();
                debug!("will terminate");
            }
            .instrument(trace_span!("session")),
        );

        Self {
            handle,
            kill_tx,
            itinerary_tx,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.kill_tx.send(true).ok();
    }
}

/// A cloneable sender half of the session mailbox, used by the tasks the
/// session spawns to report back.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    msg_tx: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    /// Sends a message, ignoring the failure when the session task has
    /// already terminated. Background tasks may legitimately outlive the
    /// session for a moment.
    #[inline]
    pub(crate) fn send(&self, msg: SessionMessage) {
        self.msg_tx.send(msg).ok();
    }

    #[inline]
    fn send_required(
        &self,
        msg: SessionMessage,
    ) -> Result<(), mpsc::error::SendError<SessionMessage>> {
        self.msg_tx.send(msg)
    }
}
