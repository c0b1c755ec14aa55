//! Byte streams exchanged with the watermarker service and local files.

use crate::error::{ParseOptionError, Result, WatermarkerError};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_util::io::{ReaderStream, StreamReader};

/// A lazily consumed stream of bytes, optionally carrying the file name it
/// was read from.
pub struct ByteStream {
    inner: BoxStream<'static, io::Result<Bytes>>,
    file_name: Option<String>,
}

impl ByteStream {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            file_name: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::from_stream(stream::once(async move { Ok(bytes) }))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_stream(ReaderStream::new(reader))
    }

    /// Wraps an HTTP response body without buffering it.
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::from_stream(response.bytes_stream().map_err(io::Error::other))
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Adapts the stream into an `AsyncRead`.
    pub fn into_async_read(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.inner)
    }

    pub(crate) fn into_body(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(self.inner)
    }

    /// Reads the whole stream into memory.
    pub async fn into_bytes(mut self) -> io::Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.inner.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for ByteStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

impl From<Bytes> for ByteStream {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static [u8]> for ByteStream {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for ByteStream {
    fn from(text: String) -> Self {
        Self::from_bytes(text)
    }
}

impl From<File> for ByteStream {
    fn from(file: File) -> Self {
        Self::from_reader(file)
    }
}

/// How a local file is opened, following the fopen mode letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// `r`
    Read,
    /// `r+`
    ReadWrite,
    /// `w`: create or truncate
    Write,
    /// `w+`
    ReadWriteTruncate,
    /// `a`
    Append,
    /// `x`: fail if the file exists
    CreateNew,
}

impl FileMode {
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            FileMode::Read => options.read(true),
            FileMode::ReadWrite => options.read(true).write(true),
            FileMode::Write => options.write(true).create(true).truncate(true),
            FileMode::ReadWriteTruncate => options.read(true).write(true).create(true).truncate(true),
            FileMode::Append => options.append(true).create(true),
            FileMode::CreateNew => options.write(true).create_new(true),
        };
        options
    }
}

impl FromStr for FileMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Binary/text flags do not change behavior on any platform we target.
        let mode: String = s.chars().filter(|c| *c != 'b' && *c != 't').collect();
        match mode.as_str() {
            "r" => Ok(FileMode::Read),
            "r+" => Ok(FileMode::ReadWrite),
            "w" => Ok(FileMode::Write),
            "w+" => Ok(FileMode::ReadWriteTruncate),
            "a" => Ok(FileMode::Append),
            "x" => Ok(FileMode::CreateNew),
            _ => Err(ParseOptionError {
                kind: "file mode",
                value: s.to_string(),
                expected: "r, r+, w, w+, a, x".to_string(),
            }),
        }
    }
}

/// Opens a local file and returns a stream over its contents.
pub async fn open_file_stream(path: impl AsRef<Path>, mode: FileMode) -> Result<ByteStream> {
    let path = path.as_ref();
    let file = mode
        .open_options()
        .open(path)
        .await
        .map_err(|source| WatermarkerError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let stream = ByteStream::from(file);
    Ok(match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => stream.with_file_name(name),
        None => stream,
    })
}

/// Copies a stream into a local file and returns the number of bytes written.
///
/// A failed copy may leave a partial file behind.
pub async fn write_stream_to_file(
    stream: ByteStream,
    path: impl AsRef<Path>,
    mode: FileMode,
) -> Result<u64> {
    let path = path.as_ref();
    let mut file = mode
        .open_options()
        .open(path)
        .await
        .map_err(|source| WatermarkerError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let write_error = |source| WatermarkerError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = stream.into_async_read();
    let written = tokio::io::copy(&mut reader, &mut file)
        .await
        .map_err(write_error)?;
    file.flush().await.map_err(write_error)?;

    tracing::debug!(path = %path.display(), bytes = written, "Stream saved to file");
    Ok(written)
}
