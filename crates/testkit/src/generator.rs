use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::sleep;
use voxtrip_itinerary::{
    ErrorKind, GenerationError, GenerationRequest, Itinerary,
    ItineraryGenerator,
};

#[derive(Debug)]
pub struct PresetGeneratorError {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for PresetGeneratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for PresetGeneratorError {}

impl GenerationError for PresetGeneratorError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// An itinerary generator that echoes request fields into a canned
/// itinerary.
///
/// Set `failures` to make the first N requests fail, which is how the
/// session's failure recovery paths are exercised. The call counter is
/// shared across clones so tests can assert how many requests were made.
#[derive(Clone, Default)]
pub struct PresetGenerator {
    remaining_failures: Arc<AtomicU64>,
    calls: Arc<AtomicU64>,
    delay: Option<Duration>,
}

impl PresetGenerator {
    /// Makes the first `failures` requests fail.
    #[inline]
    pub fn with_failures(self, failures: u64) -> Self {
        self.remaining_failures.store(failures, Ordering::SeqCst);
        self
    }

    /// Makes every request take `delay` before resolving.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many generation requests have been received.
    #[inline]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ItineraryGenerator for PresetGenerator {
    type Error = PresetGeneratorError;

    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<Itinerary, Self::Error>> + Send + 'static
    {
        let req = req.clone();
        let remaining_failures = Arc::clone(&self.remaining_failures);
        let calls = Arc::clone(&self.calls);
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            let should_fail = remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    n.checked_sub(1)
                })
                .is_ok();
            if should_fail {
                return Err(PresetGeneratorError {
                    message: "preset failure",
                    kind: ErrorKind::Http,
                });
            }
            Ok(Itinerary {
                id: format!("it-{call}"),
                location: req.location,
                start_date: req.start_date,
                end_date: req.end_date,
                events: vec![],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echoes_request() {
        let generator = PresetGenerator::default();
        let req = GenerationRequest {
            location: "Tokyo".to_owned(),
            start_date: "2025-12-01".to_owned(),
            end_date: "2025-12-10".to_owned(),
        };
        let itinerary = generator.generate(&req).await.unwrap();
        assert_eq!(itinerary.location, "Tokyo");
        assert_eq!(itinerary.start_date, "2025-12-01");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_leading_failures() {
        let generator = PresetGenerator::default().with_failures(1);
        let req = GenerationRequest {
            location: "Rome".to_owned(),
            start_date: "2025-11-01".to_owned(),
            end_date: "2025-11-05".to_owned(),
        };
        assert!(generator.generate(&req).await.is_err());
        assert!(generator.generate(&req).await.is_ok());
        assert_eq!(generator.call_count(), 2);
    }
}
