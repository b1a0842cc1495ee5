use std::error::Error;

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The user denied access to the audio input device.
    PermissionDenied,
    /// The underlying transport failed or dropped the connection.
    StreamFailure,
    /// Any other errors.
    Other,
}

/// The error type for a transcription provider.
pub trait TranscriptionError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}
