use std::error::Error;

use crate::types::{GenerationRequest, Itinerary};

/// The kind of error that occurred while generating an itinerary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request did not complete within the configured deadline.
    Timeout,
    /// The backend returned a non-success status or was unreachable.
    Http,
    /// The backend returned a body that is not a valid itinerary.
    InvalidResponse,
    /// Any other errors.
    Other,
}

/// The error type for an itinerary generator.
pub trait GenerationError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that can turn extracted trip details into a full itinerary.
///
/// The generation endpoint is treated as an opaque black box: a request
/// goes in, an [`Itinerary`] or an error comes out. Implementations must
/// bound the operation in time; callers never retry automatically.
pub trait ItineraryGenerator: Send + Sync {
    /// The error type that may be returned by the generator.
    type Error: GenerationError;

    /// Requests a generated itinerary.
    fn generate(
        &self,
        req: &GenerationRequest,
    ) -> impl Future<Output = Result<Itinerary, Self::Error>> + Send + 'static;
}
