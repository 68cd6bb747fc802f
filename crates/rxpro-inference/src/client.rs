//! # Inference Client
//!
//! [`InferenceBackend`] is the seam between the server and the model.
//! Production uses [`GeminiClient`]; tests plug in a canned backend.
//!
//! ## Request Shape
//! ```text
//! POST {endpoint}/models/{model}:generateContent
//! x-goog-api-key: <key>
//!
//! { "contents": [
//!     { "parts": [{ "text": "RX Content:\n..." }] },
//!     { "parts": [{ "text": "Instructions:\n..." }] },
//!     { "parts": [{ "inline_data": { "mime_type": "image/png", "data": "<b64>" } }] }   ← optional
//! ] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{InferenceError, InferenceResult};

/// Mime types sent to the model as inline images.
pub const SUPPORTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

// =============================================================================
// Request
// =============================================================================

/// A prescription photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxImage {
    mime: String,
    bytes: Vec<u8>,
}

impl RxImage {
    /// Wraps raw image bytes, rejecting unsupported mime types.
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> InferenceResult<Self> {
        let mime = mime.into().trim().to_ascii_lowercase();
        if !SUPPORTED_IMAGE_TYPES.contains(&mime.as_str()) {
            return Err(InferenceError::UnsupportedImage(mime));
        }
        Ok(RxImage { mime, bytes })
    }

    /// Decodes a standard base64 payload.
    pub fn from_base64(mime: impl Into<String>, data: &str) -> InferenceResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| InferenceError::InvalidImageData(e.to_string()))?;
        RxImage::new(mime, bytes)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// What the model is asked to look at.
#[derive(Debug, Clone, Default)]
pub struct InferenceRequest {
    /// Prescription / order text. May be empty when only an image is sent.
    pub rx_text: String,
    /// Already-joined instruction block, see [`crate::instruction_text`].
    pub instructions: String,
    pub image: Option<RxImage>,
}

/// Builds the `generateContent` JSON body.
pub fn build_request_body(req: &InferenceRequest) -> Value {
    let mut contents = vec![
        json!({ "parts": [{ "text": format!("RX Content:\n{}", req.rx_text) }] }),
        json!({ "parts": [{ "text": format!("Instructions:\n{}", req.instructions) }] }),
    ];

    if let Some(image) = &req.image {
        let data = base64::engine::general_purpose::STANDARD.encode(image.bytes());
        contents.push(json!({
            "parts": [{ "inline_data": { "mime_type": image.mime(), "data": data } }]
        }));
    }

    json!({ "contents": contents })
}

/// Pulls `candidates[0].content.parts[0].text` out of a response.
pub fn extract_answer(body: &Value) -> InferenceResult<String> {
    body["candidates"]
        .get(0)
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| InferenceError::MalformedResponse("no candidate text".to_string()))
}

// =============================================================================
// Backend seam
// =============================================================================

/// Anything that can answer an [`InferenceRequest`].
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn analyze(&self, req: &InferenceRequest) -> InferenceResult<String>;
}

/// Runs the backend and folds any failure into the answer text, so a
/// report can always be produced.
pub async fn analyze_or_fallback(backend: &dyn InferenceBackend, req: &InferenceRequest) -> String {
    match backend.analyze(req).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "Inference failed, returning fallback text");
            format!("AI Inference failed: {}", e)
        }
    }
}

// =============================================================================
// Gemini
// =============================================================================

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub endpoint: String,
    pub model: String,
    /// `None` makes every call fail with [`InferenceError::MissingApiKey`].
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> InferenceResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(GeminiClient { client, config })
    }

    /// Full `generateContent` URL for the configured model.
    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl InferenceBackend for GeminiClient {
    async fn analyze(&self, req: &InferenceRequest) -> InferenceResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(InferenceError::MissingApiKey)?;

        info!(
            model = %self.config.model,
            with_image = req.image.is_some(),
            "Calling inference service"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&build_request_body(req))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

        let answer = extract_answer(&body)?;
        debug!(chars = answer.len(), "Inference answer received");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<&'static str, &'static str>);

    #[async_trait]
    impl InferenceBackend for Canned {
        async fn analyze(&self, _req: &InferenceRequest) -> InferenceResult<String> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(body) => Err(InferenceError::Status {
                    code: 503,
                    body: body.to_string(),
                }),
            }
        }
    }

    fn gemini(api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            model: "gemini-2.5-pro".to_string(),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_text_only() {
        let req = InferenceRequest {
            rx_text: "Amoxicillin 500mg".to_string(),
            instructions: "Check dosage".to_string(),
            image: None,
        };
        let body = build_request_body(&req);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0]["parts"][0]["text"], "RX Content:\nAmoxicillin 500mg");
        assert_eq!(contents[1]["parts"][0]["text"], "Instructions:\nCheck dosage");
    }

    #[test]
    fn test_request_body_with_image() {
        let req = InferenceRequest {
            image: Some(RxImage::new("image/png", vec![1, 2, 3]).unwrap()),
            ..Default::default()
        };
        let body = build_request_body(&req);

        let inline = &body["contents"][2]["parts"][0]["inline_data"];
        assert_eq!(inline["mime_type"], "image/png");
        assert_eq!(inline["data"], "AQID");
    }

    #[test]
    fn test_image_types() {
        assert!(RxImage::new("image/JPG", vec![]).is_ok());
        assert!(matches!(
            RxImage::new("image/gif", vec![]),
            Err(InferenceError::UnsupportedImage(_))
        ));
        assert!(matches!(
            RxImage::from_base64("image/png", "not base64!"),
            Err(InferenceError::InvalidImageData(_))
        ));
        assert_eq!(RxImage::from_base64("image/jpeg", "AQID").unwrap().bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_extract_answer() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Dose is appropriate." }] } }]
        });
        assert_eq!(extract_answer(&body).unwrap(), "Dose is appropriate.");

        let empty = json!({ "candidates": [] });
        assert!(matches!(
            extract_answer(&empty),
            Err(InferenceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        assert_eq!(
            gemini(None).url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let err = gemini(None).analyze(&InferenceRequest::default()).await.unwrap_err();
        assert!(matches!(err, InferenceError::MissingApiKey));

        let err = gemini(Some("  ")).analyze(&InferenceRequest::default()).await.unwrap_err();
        assert!(matches!(err, InferenceError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_fallback_text() {
        let req = InferenceRequest::default();

        let ok = analyze_or_fallback(&Canned(Ok("All clear.")), &req).await;
        assert_eq!(ok, "All clear.");

        let failed = analyze_or_fallback(&Canned(Err("overloaded")), &req).await;
        assert_eq!(failed, "AI Inference failed: Inference service returned 503: overloaded");

        let no_key = analyze_or_fallback(&gemini(None), &req).await;
        assert!(no_key.starts_with("AI Inference failed: No API key"));
    }
}
