//! Gemini image generation backend.

use std::time::Duration;

use base64::Engine;
use batchgen_core::{ArtifactRequest, GenerationError, OutputNaming, Variant};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::http::{build_client, parse_response, transport_error};
use super::{BackendOutput, GenerationBackend, Payload};

const SERVICE: &str = "Gemini";

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, e.g. `https://generativelanguage.googleapis.com`.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash-exp-image-generation".to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

/// Text-to-image generation through `generateContent`.
///
/// Produces baseline images only; an enriched request is served as baseline.
pub struct GeminiBackend {
    client: reqwest::blocking::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Creates the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn output_naming(&self, _variant: Variant) -> OutputNaming {
        OutputNaming::flat(".png")
    }

    fn submit(&self, request: &ArtifactRequest) -> Result<BackendOutput, GenerationError> {
        let prompt = request.prompt.as_deref().ok_or_else(|| {
            GenerationError::Generation(format!(
                "{SERVICE} needs a text prompt; {} has none",
                request.item_id
            ))
        })?;
        if request.variant == Variant::Enriched {
            debug!("{SERVICE} has no enriched variant, generating baseline");
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
        });

        let mut call = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.config.api_key {
            call = call.header("x-goog-api-key", key);
        }
        let response = call.send().map_err(|e| transport_error(SERVICE, &e))?;
        let parsed: GenerateContentResponse = parse_response(SERVICE, response)?;

        Ok(BackendOutput {
            kind: Variant::Baseline,
            payload: Payload::Inline(extract_image(parsed)?),
        })
    }
}

/// Returns the decoded first inline image of the first candidate.
fn extract_image(response: GenerateContentResponse) -> Result<Vec<u8>, GenerationError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut image = None;
    for part in parts {
        if let Some(text) = part.text {
            info!("{SERVICE} description: {}", text.trim());
        }
        if image.is_none() {
            image = part.inline_data;
        }
    }

    let data = image.ok_or_else(|| {
        GenerationError::Generation(format!("{SERVICE} response contained no image"))
    })?;
    debug!("{SERVICE} returned {}", data.mime_type);

    base64::engine::general_purpose::STANDARD
        .decode(data.data.as_bytes())
        .map_err(|e| GenerationError::Generation(format!("{SERVICE} image data is not base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_image() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "A red potion."},
                {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
            ]}}]}"#,
        );
        assert_eq!(extract_image(response).unwrap(), b"hello");
    }

    #[test]
    fn test_extract_image_text_only() {
        let response = parse(r#"{"candidates": [{"content": {"parts": [{"text": "sorry"}]}}]}"#);
        assert!(matches!(
            extract_image(response),
            Err(GenerationError::Generation(_))
        ));
    }

    #[test]
    fn test_extract_image_no_candidates() {
        assert!(extract_image(parse("{}")).is_err());
    }

    #[test]
    fn test_extract_image_bad_base64() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"inlineData": {"data": "!!!"}}]}}]}"#,
        );
        assert!(extract_image(response).is_err());
    }

    #[test]
    fn test_url() {
        let backend = GeminiBackend::new(GeminiConfig {
            endpoint: "http://localhost:9000/".to_string(),
            ..GeminiConfig::default()
        })
        .unwrap();
        assert_eq!(
            backend.url(),
            "http://localhost:9000/v1beta/models/gemini-2.0-flash-exp-image-generation:generateContent"
        );
    }

    #[test]
    fn test_flat_png_naming() {
        let backend = GeminiBackend::new(GeminiConfig::default()).unwrap();
        assert_eq!(
            backend.output_naming(Variant::Enriched),
            OutputNaming::flat(".png")
        );
    }
}
