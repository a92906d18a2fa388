// src/certificate/payload.rs

//! Extraction of the compressed content payload from entitlement certificates
//!
//! An entitlement certificate document is a run of concatenated PEM blocks:
//! the X.509 certificate itself, an `ENTITLEMENT DATA` block holding the
//! DEFLATE-compressed content document, and a signature block. Only the
//! entitlement data blocks are of interest here.

use crate::compression;
use crate::error::{Error, Result};
use tracing::debug;

/// PEM label of the block carrying the compressed content document
pub const ENTITLEMENT_DATA_TAG: &str = "ENTITLEMENT DATA";

/// Decode the entitlement payload of a certificate document
///
/// Every `ENTITLEMENT DATA` block is inflated in document order and the
/// results are appended to a single buffer.
pub fn decode_entitlement_payload(document: &[u8]) -> Result<Vec<u8>> {
    let blocks = pem::parse_many(document)
        .map_err(|e| Error::DecodeError(format!("Failed to parse PEM blocks: {e}")))?;

    if blocks.is_empty() {
        return Err(Error::DecodeError(
            "Document contains no PEM blocks".to_string(),
        ));
    }

    let mut payload = Vec::new();
    let mut found = 0usize;

    for block in blocks.iter().filter(|b| b.tag() == ENTITLEMENT_DATA_TAG) {
        found += 1;
        let inflated = compression::inflate(block.contents()).map_err(|e| {
            Error::DecodeError(format!("Failed to inflate entitlement data: {e}"))
        })?;
        debug!(
            "Inflated entitlement data block: {} bytes -> {} bytes",
            block.contents().len(),
            inflated.len()
        );
        payload.extend_from_slice(&inflated);
    }

    if found == 0 {
        return Err(Error::DecodeError(format!(
            "No {ENTITLEMENT_DATA_TAG} block among {} PEM blocks",
            blocks.len()
        )));
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn block(tag: &str, contents: Vec<u8>) -> String {
        pem::encode(&pem::Pem::new(tag, contents))
    }

    fn compressed(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_picks_entitlement_block() {
        let document = format!(
            "{}{}{}",
            block("CERTIFICATE", vec![0x30, 0x03, 0x02, 0x01, 0x01]),
            block(ENTITLEMENT_DATA_TAG, compressed(b"{\"products\":[]}")),
            block("RSA SIGNATURE", vec![1, 2, 3, 4]),
        );

        let payload = decode_entitlement_payload(document.as_bytes()).unwrap();
        assert_eq!(payload, b"{\"products\":[]}");
    }

    #[test]
    fn test_decode_without_entitlement_block() {
        let document = format!(
            "{}{}",
            block("CERTIFICATE", vec![0x30, 0x00]),
            block("RSA SIGNATURE", vec![9, 9, 9]),
        );

        let result = decode_entitlement_payload(document.as_bytes());
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_decode_without_any_pem_block() {
        let result = decode_entitlement_payload(b"not a certificate at all");
        assert!(matches!(result, Err(Error::DecodeError(_))));

        let result = decode_entitlement_payload(b"");
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_decode_corrupt_stream() {
        let document = block(ENTITLEMENT_DATA_TAG, vec![0x78, 0x9c, 0xff, 0xff, 0xff]);
        let result = decode_entitlement_payload(document.as_bytes());
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_decode_headerless_garbage() {
        let document = block(ENTITLEMENT_DATA_TAG, vec![0x03, 0x00, 0xde, 0xad]);
        let result = decode_entitlement_payload(document.as_bytes());
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_decode_concatenates_blocks() {
        let document = format!(
            "{}{}",
            block(ENTITLEMENT_DATA_TAG, compressed(b"first")),
            block(ENTITLEMENT_DATA_TAG, compressed(b"second")),
        );

        let payload = decode_entitlement_payload(document.as_bytes()).unwrap();
        assert_eq!(payload, b"firstsecond");
    }
}
