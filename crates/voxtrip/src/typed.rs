//! A transcription provider backed by typed text, each submitted line
//! becoming one complete spoken utterance.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};

use tokio::sync::mpsc;
use voxtrip_transcribe::{
    ErrorKind, StreamEvent, TranscriptFragment, TranscriptionError,
    TranscriptionProvider, TranscriptionStream,
};

/// Error type for [`TypedTranscription`].
#[derive(Debug)]
pub struct TypedStreamError {
    message: &'static str,
}

impl Display for TypedStreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for TypedStreamError {}

impl TranscriptionError for TypedStreamError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::StreamFailure
    }
}

type SharedReceiver =
    Arc<Mutex<Option<mpsc::UnboundedReceiver<StreamEvent>>>>;

/// Creates a paired input handle and transcription provider.
///
/// Whatever is submitted through the input handle comes out of the
/// provider's stream as transcription events.
pub fn typed_transcription() -> (TypedInput, TypedTranscription) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    (
        TypedInput { event_tx },
        TypedTranscription {
            event_rx: Arc::new(Mutex::new(Some(event_rx))),
        },
    )
}

/// The input half: turns typed lines into utterances.
#[derive(Clone)]
pub struct TypedInput {
    event_tx: mpsc::UnboundedSender<StreamEvent>,
}

impl TypedInput {
    /// Submits one line as a complete utterance. Blank lines are
    /// ignored.
    pub fn submit_line(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.event_tx.send(StreamEvent::SpeechStarted).ok();
        self.event_tx
            .send(StreamEvent::Fragment(TranscriptFragment::final_text(line)))
            .ok();
        self.event_tx.send(StreamEvent::UtteranceEnd).ok();
    }
}

/// A transcription provider that delivers the events submitted through
/// its paired [`TypedInput`].
///
/// Only one stream can be open at a time; dropping the stream makes the
/// provider openable again, so a session that reconnects keeps working.
pub struct TypedTranscription {
    event_rx: SharedReceiver,
}

impl TranscriptionProvider for TypedTranscription {
    type Error = TypedStreamError;
    type Stream = TypedStream;

    fn open(
        &self,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let event_rx = self
            .event_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let result = match event_rx {
            Some(event_rx) => Ok(TypedStream {
                event_rx: Some(event_rx),
                slot: Arc::clone(&self.event_rx),
            }),
            None => Err(TypedStreamError {
                message: "the typed stream is already open",
            }),
        };
        ready(result)
    }
}

/// An open stream of typed-input transcription events.
pub struct TypedStream {
    event_rx: Option<mpsc::UnboundedReceiver<StreamEvent>>,
    slot: SharedReceiver,
}

impl TranscriptionStream for TypedStream {
    type Error = TypedStreamError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>> {
        let this = Pin::get_mut(self);
        let Some(event_rx) = &mut this.event_rx else {
            return Poll::Ready(Ok(None));
        };
        Poll::Ready(Ok(ready!(event_rx.poll_recv(cx))))
    }
}

impl Drop for TypedStream {
    fn drop(&mut self) {
        // Hand the receiver back so the provider can be opened again.
        if let Some(event_rx) = self.event_rx.take() {
            *self.slot.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(event_rx);
        }
    }
}
