use std::pin::Pin;
use std::task::{self, Poll};

use crate::error::TranscriptionError;
use crate::event::StreamEvent;

/// A type that represents a transcription provider, which is an entry for
/// opening live transcription streams.
///
/// A provider outlives the streams it opens: the session keeps one around
/// and calls [`open`](Self::open) again after every disconnect, so each
/// call must yield a stream that starts from a clean slate. Whether two
/// streams may be live at the same time is up to the implementation.
pub trait TranscriptionProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: TranscriptionError;

    /// The stream type for this provider.
    type Stream: TranscriptionStream<Error = Self::Error>;

    /// Opens a new transcription stream.
    fn open(
        &self,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static;
}

/// A live transcription stream.
pub trait TranscriptionStream: Sized + Send + 'static {
    /// The error type that may be returned by the stream.
    type Error: TranscriptionError;

    /// Attempts to pull out the next event from the stream.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct stream state:
    ///
    /// - `Poll::Pending` means that this stream is still waiting for the
    ///   next event. Implementations will ensure that the current task
    ///   will be notified when the next event may be ready.
    /// - `Poll::Ready(Ok(Some(event)))` means the stream has an event to
    ///   deliver, and may produce further events on subsequent
    ///   `poll_next_event` calls.
    /// - `Poll::Ready(Ok(None))` means the stream has closed.
    /// - `Poll::Ready(Err(error))` means the stream has failed.
    ///
    /// Calling this method after closure should always return `None`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>>;
}
