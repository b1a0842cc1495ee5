use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use voxtrip_transcribe::{
    ErrorKind, StreamEvent, TranscriptFragment, TranscriptionError,
    TranscriptionProvider, TranscriptionStream,
};

#[derive(Debug)]
pub struct ScriptedStreamError {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for ScriptedStreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for ScriptedStreamError {}

impl TranscriptionError for ScriptedStreamError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct ScriptedStream {
    events: Vec<StreamEvent>,
    event_idx: usize,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl TranscriptionStream for ScriptedStream {
    type Error = ScriptedStreamError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if this.event_idx < this.events.len() {
                let event = this.events[this.event_idx].clone();
                this.event_idx += 1;
                return Poll::Ready(Ok(Some(event)));
            }
            // In case this method is called after closure.
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

/// A transcription provider that replays a preset event script.
///
/// Before opening the stream, you need to setup the script, which is the
/// exact event sequence the stream should deliver. Each `open` call starts
/// a fresh replay from the beginning, so a session that reconnects will
/// see the script again.
#[derive(Clone, Default)]
pub struct ScriptedTranscription {
    events: Vec<StreamEvent>,
    delay: Option<Duration>,
    fail_open: bool,
}

impl ScriptedTranscription {
    #[inline]
    pub fn add_event(&mut self, event: StreamEvent) {
        self.events.push(event);
    }

    /// Adds a full spoken turn: speech-start, one final fragment per
    /// string, then utterance-end.
    pub fn add_utterance<'a, I>(&mut self, fragments: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.add_event(StreamEvent::SpeechStarted);
        for fragment in fragments {
            self.add_event(StreamEvent::Fragment(
                TranscriptFragment::final_text(fragment),
            ));
        }
        self.add_event(StreamEvent::UtteranceEnd);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Makes every `open` call fail, for exercising connection errors.
    #[inline]
    pub fn fail_open(&mut self) {
        self.fail_open = true;
    }
}

impl TranscriptionProvider for ScriptedTranscription {
    type Error = ScriptedStreamError;
    type Stream = ScriptedStream;

    fn open(
        &self,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let result = if self.fail_open {
            Err(ScriptedStreamError {
                message: "scripted open failure",
                kind: ErrorKind::StreamFailure,
            })
        } else {
            Ok(ScriptedStream {
                events: self.events.clone(),
                event_idx: 0,
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                sleep: None,
            })
        };
        ready(result)
    }
}
