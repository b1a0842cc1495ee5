use std::pin::Pin;
use std::sync::Arc;

use tracing::Instrument;
use voxtrip_itinerary::{
    GenerationError, GenerationRequest, Itinerary, ItineraryGenerator,
};

/// A type-erased itinerary generation failure.
pub type GenerationFailure = Box<dyn GenerationError>;

type GenerateResult = Result<Itinerary, GenerationFailure>;
type BoxedGenerateFuture =
    Pin<Box<dyn Future<Output = GenerateResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(GenerationRequest) -> BoxedGenerateFuture + Send + Sync>;

/// A wrapper around an itinerary generator that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct GeneratorClient {
    handler_fn: HandlerFn,
}

impl GeneratorClient {
    #[inline]
    pub fn new<G: ItineraryGenerator + 'static>(generator: G) -> Self {
        // We have to erase the type `G`, since `GeneratorClient` doesn't
        // have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = generator.generate(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    match fut.await {
                        Ok(itinerary) => Ok(itinerary),
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(Box::new(err) as GenerationFailure)
                        }
                    }
                }
                .instrument(trace_span!("generator client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a generation request and returns the itinerary.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe in the sense that dropping the future
    /// abandons the request; whether the remote side keeps working is up
    /// to the underlying generator.
    #[inline]
    pub async fn generate(&self, req: GenerationRequest) -> GenerateResult {
        (self.handler_fn)(req).await
    }
}

#[cfg(test)]
mod tests {
    use voxtrip_testkit::PresetGenerator;

    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            location: "Tokyo".to_owned(),
            start_date: "2025-12-01".to_owned(),
            end_date: "2025-12-10".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_generate() {
        let client = GeneratorClient::new(PresetGenerator::default());
        let itinerary = client.generate(request()).await.unwrap();
        assert_eq!(itinerary.location, "Tokyo");
    }

    #[tokio::test]
    async fn test_error_handling() {
        let client =
            GeneratorClient::new(PresetGenerator::default().with_failures(1));
        assert!(client.generate(request()).await.is_err());
        assert!(client.generate(request()).await.is_ok());
    }
}
