use crate::config::WatermarkerConfig;
use crate::error::{Result, WatermarkerError};
use crate::options::ConvertOptions;
use crate::stream::{open_file_stream, write_stream_to_file, ByteStream, FileMode};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::Path;

const APPLY_ENDPOINT: &str = "/apply";
const HEALTH_ENDPOINT: &str = "/health";

/// Joins a base URL and an endpoint path with exactly one `/`.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    format!("{}/{}", base, endpoint)
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: Option<String>,
}

/// HTTP client for the watermarker service.
///
/// The client is immutable and cheap to clone; clones share the underlying
/// connection pool of the injected [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct WatermarkerClient {
    client: Client,
    base_url: String,
}

impl WatermarkerClient {
    /// Creates a client with a default HTTP transport.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&WatermarkerConfig::new(base_url))
    }

    /// Creates a client on top of an existing transport. Timeouts, proxies and
    /// TLS settings are whatever `client` was built with.
    pub fn with_http_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &WatermarkerConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        Ok(Self::with_http_client(config.base_url.clone(), client))
    }

    /// Create client from environment: WATERMARKER_BASE_URL (or WATERMARKER_URL).
    pub fn from_env() -> anyhow::Result<Self> {
        let config = WatermarkerConfig::from_env()?;
        Ok(Self::from_config(&config)?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        endpoint_url(&self.base_url, endpoint)
    }

    /// Raw transport for custom requests.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Applies a watermark to an image and returns the resulting image as an
    /// unbuffered stream.
    #[tracing::instrument(skip(self, image, watermark), fields(base_url = %self.base_url))]
    pub async fn apply(
        &self,
        image: impl Into<ByteStream>,
        watermark: impl Into<ByteStream>,
        options: &ConvertOptions,
    ) -> Result<ByteStream> {
        let form = build_form(image.into(), watermark.into(), options);
        let url = self.endpoint_url(APPLY_ENDPOINT);

        tracing::debug!(url = %url, "Sending watermark request");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(WatermarkerError::Request)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable response body: {}>", e));
            tracing::warn!(status = %status, body = %body, "Watermarker API returned an error");
            return Err(WatermarkerError::Response { status, body });
        }

        tracing::debug!(
            content_length = ?response.content_length(),
            "Watermark applied"
        );
        Ok(ByteStream::from_response(response))
    }

    /// Same as [`apply`](Self::apply) with default options.
    pub async fn apply_default(
        &self,
        image: impl Into<ByteStream>,
        watermark: impl Into<ByteStream>,
    ) -> Result<ByteStream> {
        self.apply(image, watermark, &ConvertOptions::default()).await
    }

    /// Watermarks `image_path` with `watermark_path` and writes the result to
    /// `output_path`. Returns the number of bytes written.
    pub async fn apply_files(
        &self,
        image_path: impl AsRef<Path>,
        watermark_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
        options: &ConvertOptions,
    ) -> Result<u64> {
        let image = self.create_stream_from_file(image_path).await?;
        let watermark = self.create_stream_from_file(watermark_path).await?;
        let result = self.apply(image, watermark, options).await?;
        self.save_stream_to_file(result, output_path).await
    }

    /// Opens a local file for reading and returns a stream over it.
    pub async fn create_stream_from_file(&self, path: impl AsRef<Path>) -> Result<ByteStream> {
        open_file_stream(path, FileMode::Read).await
    }

    pub async fn create_stream_from_file_with_mode(
        &self,
        path: impl AsRef<Path>,
        mode: FileMode,
    ) -> Result<ByteStream> {
        open_file_stream(path, mode).await
    }

    /// Writes a stream to a local file, creating or truncating it.
    pub async fn save_stream_to_file(
        &self,
        stream: ByteStream,
        path: impl AsRef<Path>,
    ) -> Result<u64> {
        write_stream_to_file(stream, path, FileMode::Write).await
    }

    pub async fn save_stream_to_file_with_mode(
        &self,
        stream: ByteStream,
        path: impl AsRef<Path>,
        mode: FileMode,
    ) -> Result<u64> {
        write_stream_to_file(stream, path, mode).await
    }

    /// Returns true when the service answers 200 with `"status": "up"`.
    /// Never fails: any error is reported as unhealthy.
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn check_service_health(&self) -> bool {
        let url = self.endpoint_url(HEALTH_ENDPOINT);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Watermarker health check request failed");
                return false;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = %status, "Watermarker health check returned non-200 status");
            return false;
        }

        match response.json::<HealthResponse>().await {
            Ok(HealthResponse { status: Some(s) }) if s == "up" => true,
            Ok(body) => {
                tracing::debug!(status = ?body.status, "Watermarker service is not up");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "Malformed health check response");
                false
            }
        }
    }
}

fn file_part(stream: ByteStream, field: &'static str) -> Part {
    let file_name = stream
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| field.to_string());
    Part::stream(stream.into_body()).file_name(file_name)
}

fn build_form(image: ByteStream, watermark: ByteStream, options: &ConvertOptions) -> Form {
    let form = Form::new()
        .part("image", file_part(image, "image"))
        .part("watermark", file_part(watermark, "watermark"));

    options
        .form_fields()
        .into_iter()
        .fold(form, |form, (name, value)| form.text(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_slash_placement() {
        assert_eq!(endpoint_url("http://h/", "/apply"), "http://h/apply");
        assert_eq!(endpoint_url("http://h", "apply"), "http://h/apply");
        assert_eq!(endpoint_url("http://h/", "apply"), "http://h/apply");
        assert_eq!(endpoint_url("http://h", "/apply"), "http://h/apply");
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        assert_eq!(
            endpoint_url("https://api.example.com/watermarker/", "/health"),
            "https://api.example.com/watermarker/health"
        );
    }

    #[test]
    fn test_client_endpoint_url() {
        let client = WatermarkerClient::with_http_client("http://localhost:3000/", Client::new());
        assert_eq!(client.base_url(), "http://localhost:3000/");
        assert_eq!(client.endpoint_url("apply"), "http://localhost:3000/apply");
    }

    #[test]
    fn test_form_has_boundary() {
        let form = build_form(
            ByteStream::from(b"img".to_vec()),
            ByteStream::from(b"wm".to_vec()),
            &ConvertOptions::default(),
        );
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<WatermarkerClient>();
    }
}
