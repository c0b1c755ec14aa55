//! HTTP client for the watermarker image service.
//!
//! Uploads an image and a watermark as one multipart request, forwards the
//! conversion options and hands back the watermarked image as a stream.
//! Also provides helpers to stream local files in and out, and a health probe.
//!
//! ```no_run
//! use watermarker_client::{ConvertOptions, Position, WatermarkerClient};
//!
//! # async fn run() -> watermarker_client::Result<()> {
//! let client = WatermarkerClient::new("http://localhost:3000")?;
//! let image = client.create_stream_from_file("doc.png").await?;
//! let watermark = client.create_stream_from_file("watermark.png").await?;
//! let options = ConvertOptions::default().with_position(Position::TopLeft);
//! let result = client.apply(image, watermark, &options).await?;
//! client.save_stream_to_file(result, "watermarked.png").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod options;
pub mod stream;

pub use client::{endpoint_url, WatermarkerClient};
pub use config::WatermarkerConfig;
pub use error::{ParseOptionError, Result, WatermarkerError};
pub use options::{ConvertOptions, Format, Position};
pub use stream::{ByteStream, FileMode};
