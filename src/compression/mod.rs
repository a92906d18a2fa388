// src/compression/mod.rs
//! DEFLATE inflation for entitlement payloads
//!
//! Entitlement servers compress the content document with zlib, but raw
//! DEFLATE streams (no zlib header) have been seen in older certificates.
//! Both are accepted: the format is detected from the stream header.

use std::io::{self, Read};
use thiserror::Error;

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to inflate {format} data: {source}")]
    Inflation {
        format: &'static str,
        source: io::Error,
    },

    #[error("{bytes} bytes of trailing data after the {format} stream")]
    TrailingData { format: &'static str, bytes: usize },

    #[error("Compressed stream is empty")]
    Empty,
}

/// Supported DEFLATE framings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// DEFLATE wrapped in a zlib header and Adler-32 trailer
    Zlib,
    /// Bare DEFLATE stream
    Deflate,
}

impl CompressionFormat {
    /// Detect the framing from the first two bytes
    ///
    /// A zlib header has compression method 8 in the low nibble of the first
    /// byte, and the first two bytes read as a big-endian u16 are a multiple
    /// of 31.
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() >= 2 {
            let cmf = data[0];
            let flg = data[1];
            if cmf & 0x0f == 8 && cmf >> 4 <= 7 && (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0
            {
                return Self::Zlib;
            }
        }
        Self::Deflate
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Zlib => "zlib",
            Self::Deflate => "deflate",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Inflate a byte slice, detecting the framing from its header
///
/// The stream must account for every input byte. A raw DEFLATE decoder stops
/// at the first final block, so leftover bytes mean the input was not a
/// single compressed stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if data.is_empty() {
        return Err(CompressionError::Empty);
    }

    let format = CompressionFormat::from_magic_bytes(data);
    let mut output = Vec::new();
    let remaining = match format {
        CompressionFormat::Zlib => {
            let mut decoder = flate2::bufread::ZlibDecoder::new(data);
            read_stream(&mut decoder, &mut output, format)?;
            decoder.into_inner()
        }
        CompressionFormat::Deflate => {
            let mut decoder = flate2::bufread::DeflateDecoder::new(data);
            read_stream(&mut decoder, &mut output, format)?;
            decoder.into_inner()
        }
    };

    if !remaining.is_empty() {
        return Err(CompressionError::TrailingData {
            format: format.name(),
            bytes: remaining.len(),
        });
    }
    Ok(output)
}

fn read_stream(
    decoder: &mut impl Read,
    output: &mut Vec<u8>,
    format: CompressionFormat,
) -> Result<(), CompressionError> {
    decoder
        .read_to_end(output)
        .map(|_| ())
        .map_err(|e| CompressionError::Inflation {
            format: format.name(),
            source: e,
        })
}
