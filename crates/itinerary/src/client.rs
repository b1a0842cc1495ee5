use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, header};

use crate::generator::{ErrorKind, GenerationError, ItineraryGenerator};
use crate::types::{GenerationRequest, Itinerary};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for [`HttpGenerator`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl GenerationError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfigBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl GeneratorConfigBuilder {
    /// Creates a builder with the given backend base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Sets the request deadline.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> GeneratorConfig {
        GeneratorConfig {
            base_url: self.base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

/// Configuration for the HTTP itinerary generator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

/// HTTP-backed itinerary generator.
#[derive(Clone, Debug)]
pub struct HttpGenerator {
    client: Client,
    config: Arc<GeneratorConfig>,
}

impl HttpGenerator {
    /// Creates a new `HttpGenerator` with the given configuration.
    #[inline]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ItineraryGenerator for HttpGenerator {
    type Error = Error;

    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<Itinerary, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .client
            .post(format!(
                "{}{}",
                self.config.base_url, "/api/generate-itinerary"
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout)
            .json(req)
            .send();

        async move {
            let resp = match resp_fut.await.and_then(Response::error_for_status)
            {
                Ok(resp) => resp,
                Err(err) => {
                    let kind = if err.is_timeout() {
                        ErrorKind::Timeout
                    } else {
                        ErrorKind::Http
                    };
                    return Err(Error::new(format!("{err}"), kind));
                }
            };

            // Here we got a successful response.
            match resp.json::<Itinerary>().await {
                Ok(itinerary) => {
                    debug!("generated itinerary: {}", itinerary.id);
                    Ok(itinerary)
                }
                Err(err) => Err(Error::new(
                    format!("Malformed itinerary payload: {err}"),
                    ErrorKind::InvalidResponse,
                )),
            }
        }
    }
}
