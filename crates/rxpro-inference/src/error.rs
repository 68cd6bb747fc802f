//! # Inference Errors

use thiserror::Error;

/// Failures while talking to the model or rendering its answer.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// No API key configured.
    #[error("No API key configured for the inference service")]
    MissingApiKey,

    /// Network failure or timeout.
    #[error("Inference request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Inference service returned {code}: {body}")]
    Status { code: u16, body: String },

    /// The response had no answer text where one was expected.
    #[error("Malformed inference response: {0}")]
    MalformedResponse(String),

    /// Image with a mime type the model is not sent.
    #[error("Unsupported image type '{0}' (expected image/jpeg, image/jpg or image/png)")]
    UnsupportedImage(String),

    /// Image payload that is not valid base64.
    #[error("Image data is not valid base64: {0}")]
    InvalidImageData(String),

    /// PDF could not be produced.
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Transport("request timed out".to_string())
        } else {
            InferenceError::Transport(err.to_string())
        }
    }
}

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;
