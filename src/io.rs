use crate::codec::CharsetTranscoder;
use crate::CatalogResult;
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use crc32fast::Hasher as Crc32;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// "gzip", "zstd", or empty
    pub content_encoding: String,
    /// just the file name (used for extension fallback)
    pub name_hint: String,
    /// Which character encoding to expect (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Encoding label (as set by [`reader_from_path`]) first, then file extension.
    pub fn detect(meta: &SourceMeta) -> Self {
        let ce = meta.content_encoding.as_str();

        if ce == "gzip" || meta.name_hint.ends_with(".gz") {
            Compression::Gzip
        } else if ce == "zstd" || meta.name_hint.ends_with(".zst") {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Wraps a raw byte source with optional decompression and transcoding to UTF-8.
pub fn build_source_reader<R>(raw: R, meta: &SourceMeta) -> Box<dyn AsyncRead + Unpin + Send>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = BufReader::with_capacity(1 << 16, raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = match Compression::detect(meta) {
        Compression::Gzip => Box::new(GzipDecoder::new(buf)),
        Compression::Zstd => Box::new(ZstdDecoder::new(buf)),
        Compression::None => Box::new(buf),
    };

    if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, CharsetTranscoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    }
}

/// Opens a local file, deriving compression from its extension.
pub async fn reader_from_path(
    path: &Path,
    charset: &'static encoding_rs::Encoding,
) -> CatalogResult<(Box<dyn AsyncRead + Unpin + Send>, SourceMeta)> {
    let file = File::open(path).await?;
    let name_hint = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let content_encoding = match path.extension().and_then(|s| s.to_str()) {
        Some("gz") => "gzip",
        Some("zst") => "zstd",
        _ => "",
    }
    .to_string();

    let meta = SourceMeta {
        content_encoding,
        name_hint,
        charset,
    };
    Ok((build_source_reader(file, &meta), meta))
}

/// Reads a whole source file as UTF-8 text, dropping a leading byte-order mark.
/// Invalid UTF-8 is replaced rather than rejected.
pub async fn read_source(
    path: &Path,
    charset: &'static encoding_rs::Encoding,
) -> CatalogResult<String> {
    let (mut reader, meta) = reader_from_path(path, charset).await?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;

    // Transcoded input is already UTF-8; invalid sequences become U+FFFD.
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        warn!(path = %path.display(), "source is not valid UTF-8, bad bytes replaced");
    }
    debug!(
        path = %path.display(),
        encoding = %meta.content_encoding,
        charset = meta.charset.name(),
        bytes = text.len(),
        "source read"
    );

    Ok(text.into_owned())
}

/// Overwrites `path` with `contents`, creating parent directories.
/// Returns the CRC32 of the bytes written.
pub async fn write_artifact(path: &Path, contents: &str) -> CatalogResult<u32> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents.as_bytes()).await?;

    let mut crc = Crc32::new();
    crc.update(contents.as_bytes());
    Ok(crc.finalize())
}
