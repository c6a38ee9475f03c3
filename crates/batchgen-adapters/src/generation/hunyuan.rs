//! Hunyuan3D backend over the Gradio HTTP API.
//!
//! A call is two requests: `POST /gradio_api/call/{api}` queues the job and
//! returns an event id, then `GET /gradio_api/call/{api}/{event_id}` streams
//! server-sent events until a `complete` (or `error`) event arrives. Input
//! images are uploaded first and passed by their server-side path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use batchgen_core::{ArtifactRequest, GenerationError, OutputNaming, Variant};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::http::{build_client, ensure_success, parse_response, transport_error};
use super::{BackendOutput, GenerationBackend, Payload};

const SERVICE: &str = "Hunyuan3D";

/// Connection settings for a Hunyuan3D Gradio server.
#[derive(Debug, Clone)]
pub struct Hunyuan3dConfig {
    pub server_url: String,
    pub timeout: Duration,
}

impl Default for Hunyuan3dConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:42003/".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueuedCall {
    event_id: String,
}

/// Image-or-text to 3D mesh generation.
pub struct Hunyuan3dBackend {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Hunyuan3dBackend {
    /// Creates the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Hunyuan3dConfig) -> Result<Self, GenerationError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Uploads a local file, returning Gradio `FileData` for it.
    fn upload(&self, path: &Path) -> Result<Value, GenerationError> {
        let form = reqwest::blocking::multipart::Form::new()
            .file("files", path)
            .map_err(|e| {
                GenerationError::Generation(format!("Failed to read {}: {e}", path.display()))
            })?;

        let response = self
            .client
            .post(format!("{}/gradio_api/upload", self.base_url))
            .multipart(form)
            .send()
            .map_err(|e| transport_error(SERVICE, &e))?;
        let uploaded: Vec<String> = parse_response(SERVICE, response)?;

        let server_path = uploaded.into_iter().next().ok_or_else(|| {
            GenerationError::Generation(format!("{SERVICE} accepted no file for {}", path.display()))
        })?;
        debug!("Uploaded {} as {server_path}", path.display());
        Ok(file_data(&server_path, path))
    }

    fn upload_optional(&self, path: Option<&PathBuf>) -> Result<Value, GenerationError> {
        path.map_or(Ok(Value::Null), |p| self.upload(p))
    }

    fn call(&self, api: &str, data: Value) -> Result<Value, GenerationError> {
        let response = self
            .client
            .post(format!("{}/gradio_api/call/{api}", self.base_url))
            .json(&json!({ "data": data }))
            .send()
            .map_err(|e| transport_error(SERVICE, &e))?;
        let queued: QueuedCall = parse_response(SERVICE, response)?;
        debug!("{SERVICE} queued {api} as {}", queued.event_id);

        let response = self
            .client
            .get(format!(
                "{}/gradio_api/call/{api}/{}",
                self.base_url, queued.event_id
            ))
            .send()
            .map_err(|e| transport_error(SERVICE, &e))?;
        let stream = ensure_success(SERVICE, response)?
            .text()
            .map_err(|e| transport_error(SERVICE, &e))?;

        parse_event_stream(&stream)
    }
}

impl GenerationBackend for Hunyuan3dBackend {
    fn name(&self) -> &'static str {
        "hunyuan3d"
    }

    fn output_naming(&self, variant: Variant) -> OutputNaming {
        match variant {
            Variant::Enriched => OutputNaming::per_item("textured_mesh", ".glb"),
            Variant::Baseline => OutputNaming::per_item("white_mesh", ".glb"),
        }
    }

    fn submit(&self, request: &ArtifactRequest) -> Result<BackendOutput, GenerationError> {
        let image = request.image.as_ref();
        if request.prompt.is_none() && image.is_none() {
            return Err(GenerationError::Generation(
                "Either a caption or an image must be provided".to_string(),
            ));
        }

        let views = image.map(|i| &i.views);
        let params = &request.params;
        let data = json!([
            request.prompt,
            self.upload_optional(image.map(|i| &i.image))?,
            self.upload_optional(views.and_then(|v| v.front.as_ref()))?,
            self.upload_optional(views.and_then(|v| v.back.as_ref()))?,
            self.upload_optional(views.and_then(|v| v.left.as_ref()))?,
            self.upload_optional(views.and_then(|v| v.right.as_ref()))?,
            params.steps,
            params.guidance_scale,
            params.seed,
            params.octree_resolution,
            params.remove_background,
            params.num_chunks,
            params.randomize_seed,
        ]);

        let result = self.call(api_name(request.variant), data)?;
        let reported = select_output(&result, request.variant)?;

        Ok(BackendOutput {
            kind: request.variant,
            payload: Payload::Reported(reported),
        })
    }
}

const fn api_name(variant: Variant) -> &'static str {
    match variant {
        Variant::Enriched => "generation_all",
        Variant::Baseline => "shape_generation",
    }
}

fn file_data(server_path: &str, local: &Path) -> Value {
    let orig_name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    json!({
        "path": server_path,
        "orig_name": orig_name,
        "meta": { "_type": "gradio.FileData" },
    })
}

/// Reads the payload of the `complete` event from a Gradio event stream.
fn parse_event_stream(stream: &str) -> Result<Value, GenerationError> {
    let mut event = "";

    for line in stream.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
        } else if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            match event {
                "complete" => {
                    return serde_json::from_str(data).map_err(|e| {
                        GenerationError::Generation(format!("{SERVICE} sent malformed result: {e}"))
                    })
                }
                "error" => {
                    return Err(GenerationError::Generation(format!(
                        "{SERVICE} reported an error: {data}"
                    )))
                }
                _ => {}
            }
        }
    }

    Err(GenerationError::Generation(format!(
        "{SERVICE} event stream ended without a result"
    )))
}

/// Picks the reported file for `variant`: element 1 of the result for the
/// textured mesh, element 0 for the white mesh.
fn select_output(result: &Value, variant: Variant) -> Result<PathBuf, GenerationError> {
    let index = match variant {
        Variant::Enriched => 1,
        Variant::Baseline => 0,
    };

    result
        .get(index)
        .and_then(reported_path)
        .map(PathBuf::from)
        .ok_or_else(|| {
            GenerationError::Generation(format!(
                "{SERVICE} result has no file at position {index}: {result}"
            ))
        })
}

/// Accepts `"path"`, `{"path": ...}` and `{"value": ...}` wrappings.
fn reported_path(value: &Value) -> Option<&str> {
    match value {
        Value::String(path) => Some(path.as_str()),
        Value::Object(map) => map
            .get("value")
            .and_then(reported_path)
            .or_else(|| map.get("path").and_then(Value::as_str)),
        _ => None,
    }
}
