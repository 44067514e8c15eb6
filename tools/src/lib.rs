//! Introspection and persistence tools for srcz compressed sources.
//!
//! The codec itself defines only an in-memory byte array; this crate
//! owns the *persisted* container around it: an explicit little-endian
//! header carrying the character length and the code-table digest, so a
//! reader with a different dictionary fails loudly instead of decoding
//! garbage.
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not
//!   afterthoughts.
//! - **Human-readable output** - Make it easy to see what the codec is
//!   doing to a given source.

use std::fmt;

use codec::{index_size, CompressedSource};
use serde::Serialize;

/// Magic number identifying srcz containers ("SRCZ" in ASCII).
pub const MAGIC: u32 = 0x5352_435A;

/// Current container format version.
pub const VERSION: u16 = 1;

/// Container header size in bytes (magic, version, char length, payload
/// length, digest).
pub const HEADER_SIZE: usize = 4 + 2 + 4 + 4 + 8;

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Errors reading a persisted container.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContainerError {
    /// File is too small to contain the header.
    TooSmall { actual: usize, required: usize },

    /// Invalid magic number.
    InvalidMagic { found: u32 },

    /// Unsupported container version.
    UnsupportedVersion { found: u16 },

    /// The container was written against a different code table.
    TableDigestMismatch { found: u64, expected: u64 },

    /// Body length disagrees with the header's payload and index sizes.
    PayloadLengthMismatch { required: usize, actual: usize },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { actual, required } => {
                write!(f, "container too small: {actual} bytes, need at least {required}")
            }
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic number: 0x{found:08X}")
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported container version: {found}")
            }
            Self::TableDigestMismatch { found, expected } => {
                write!(
                    f,
                    "code table mismatch: container has 0x{found:016X}, this build has 0x{expected:016X}"
                )
            }
            Self::PayloadLengthMismatch { required, actual } => {
                write!(f, "container body length mismatch: header implies {required} bytes, found {actual}")
            }
        }
    }
}

impl std::error::Error for ContainerError {}

/// Serialises a compressed source into the container format.
#[must_use]
pub fn write_container(source: &CompressedSource) -> Vec<u8> {
    let body = source.as_bytes();
    let mut out = Vec::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(source.char_length() as u32).to_le_bytes());
    out.extend_from_slice(&(source.payload_len() as u32).to_le_bytes());
    out.extend_from_slice(&codetable::table_digest().to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Parses a container, validating magic, version, and table digest.
///
/// # Errors
///
/// Returns a [`ContainerError`] describing the first validation failure.
pub fn read_container(bytes: &[u8]) -> ContainerResult<CompressedSource> {
    if bytes.len() < HEADER_SIZE {
        return Err(ContainerError::TooSmall {
            actual: bytes.len(),
            required: HEADER_SIZE,
        });
    }

    let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    if magic != MAGIC {
        return Err(ContainerError::InvalidMagic { found: magic });
    }

    let version = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
    if version != VERSION {
        return Err(ContainerError::UnsupportedVersion { found: version });
    }

    let char_length = u32::from_le_bytes(bytes[6..10].try_into().unwrap()) as usize;
    let payload_len = u32::from_le_bytes(bytes[10..14].try_into().unwrap()) as usize;

    let digest = u64::from_le_bytes(bytes[14..22].try_into().unwrap());
    let expected = codetable::table_digest();
    if digest != expected {
        return Err(ContainerError::TableDigestMismatch {
            found: digest,
            expected,
        });
    }

    let body = &bytes[HEADER_SIZE..];
    let required = payload_len + index_size(char_length);
    if body.len() != required {
        return Err(ContainerError::PayloadLengthMismatch {
            required,
            actual: body.len(),
        });
    }

    Ok(CompressedSource::from_parts(body.to_vec(), char_length))
}

/// Compresses source text into container bytes.
#[must_use]
pub fn compress_text(text: &str) -> Vec<u8> {
    write_container(&CompressedSource::from_str(text))
}

/// What `inspect` reports about one compressed source.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Source length in UTF-16 code units.
    pub char_length: usize,
    /// Token payload size in bytes.
    pub payload_bytes: usize,
    /// Positional index size in bytes.
    pub index_bytes: usize,
    /// Number of positional index entries.
    pub index_entries: usize,
    /// Total container size including the header.
    pub container_bytes: usize,
    /// Payload bytes per source character.
    pub bytes_per_char: f64,
    /// Whether the whole source is ASCII.
    pub ascii: bool,
    /// Number of newlines in the source.
    pub lines: u32,
    /// Code-table digest, as hex.
    pub table_digest: String,
}

/// Builds a report for an in-memory compressed source.
#[must_use]
pub fn inspect_source(source: &CompressedSource) -> InspectReport {
    let char_length = source.char_length();
    let payload_bytes = source.payload_len();
    let index_bytes = source.as_bytes().len() - payload_bytes;
    InspectReport {
        char_length,
        payload_bytes,
        index_bytes,
        index_entries: index_bytes / 4,
        container_bytes: HEADER_SIZE + source.as_bytes().len(),
        bytes_per_char: if char_length == 0 {
            0.0
        } else {
            payload_bytes as f64 / char_length as f64
        },
        ascii: source.is_ascii_range(0, char_length),
        lines: source.line_number_slow(char_length),
        table_digest: format!("{:016X}", codetable::table_digest()),
    }
}

/// Parses container bytes and builds a report.
///
/// # Errors
///
/// Returns a [`ContainerError`] if the container fails validation.
pub fn inspect_container(bytes: &[u8]) -> ContainerResult<InspectReport> {
    let source = read_container(bytes)?;
    Ok(inspect_source(&source))
}

/// Renders a report for terminal output.
#[must_use]
pub fn format_report_pretty(report: &InspectReport) -> String {
    format!(
        "chars:          {}\n\
         payload bytes:  {}\n\
         index bytes:    {} ({} entries)\n\
         container:      {} bytes\n\
         bytes/char:     {:.3}\n\
         ascii:          {}\n\
         lines:          {}\n\
         table digest:   {}\n",
        report.char_length,
        report.payload_bytes,
        report.index_bytes,
        report.index_entries,
        report.container_bytes,
        report.bytes_per_char,
        report.ascii,
        report.lines,
        report.table_digest,
    )
}
