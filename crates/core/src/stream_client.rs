use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tracing::Instrument;
use voxtrip_transcribe::{
    StreamEvent, TranscriptionError, TranscriptionProvider, TranscriptionStream,
};

/// A type-erased transcription failure.
pub type TranscriptionFailure = Box<dyn TranscriptionError>;

type OpenResult = Result<EventStream, TranscriptionFailure>;
type BoxedOpenFuture = Pin<Box<dyn Future<Output = OpenResult> + Send>>;
type OpenFn = Arc<dyn Fn() -> BoxedOpenFuture + Send + Sync>;

/// A wrapper around a transcription provider that provides a type-erased
/// interface for the other modules.
///
/// The wrapper can open any number of streams over its lifetime, which
/// is what makes the session's reconnects possible without threading the
/// provider type through the session state.
#[derive(Clone)]
pub struct StreamClient {
    open_fn: OpenFn,
}

impl StreamClient {
    #[inline]
    pub fn new<P: TranscriptionProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `StreamClient` doesn't
        // have a generic parameter and we don't want it either.
        let open_fn: OpenFn = Arc::new(move || {
            let fut = provider.open();
            Box::pin(
                async move {
                    trace!("opening a transcription stream");
                    match fut.await {
                        Ok(stream) => Ok(EventStream {
                            inner: Box::pin(stream),
                        }),
                        Err(err) => {
                            error!("failed to open the stream: {err:?}");
                            Err(Box::new(err) as TranscriptionFailure)
                        }
                    }
                }
                .instrument(trace_span!("stream client open")),
            )
        });
        Self { open_fn }
    }

    /// Opens a fresh transcription stream.
    #[inline]
    pub async fn open(&self) -> OpenResult {
        (self.open_fn)().await
    }
}

trait ErasedStream: Send {
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, TranscriptionFailure>>;
}

impl<S: TranscriptionStream> ErasedStream for S {
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, TranscriptionFailure>> {
        TranscriptionStream::poll_next_event(self, cx)
            .map_err(|err| Box::new(err) as TranscriptionFailure)
    }
}

/// An opened transcription stream with its provider type erased.
pub struct EventStream {
    inner: Pin<Box<dyn ErasedStream>>,
}

impl EventStream {
    /// Receives the next event from the stream, or `None` once the
    /// stream has ended gracefully.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Cancelling it never loses an event,
    /// the next call resumes polling the underlying stream.
    pub async fn next_event(
        &mut self,
    ) -> Result<Option<StreamEvent>, TranscriptionFailure> {
        poll_fn(|cx| self.inner.as_mut().poll_next_event(cx)).await
    }
}
