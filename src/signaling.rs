//! Manual signaling payloads: session descriptions turned into text a user
//! can paste into a chat window or an email, and back.
//!
//! Plain blobs are `base64(json)`, which is what a browser produces with
//! `btoa(JSON.stringify(pc.localDescription))`. Compressed blobs are
//! `base64(gzip(json))`; `decode` tells them apart by the gzip magic bytes,
//! which can never start a JSON document.

use crate::error::{ChatError, Result};
use crate::peer::types::SessionDescription;
use base64::{engine::general_purpose, Engine as _};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{self, Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Cap on the decompressed size of a pasted blob (zip-bomb guard).
const MAX_DECOMPRESSED_SIZE: u64 = 256 * 1024;

pub fn encode(desc: &SessionDescription) -> Result<String> {
    let json = serde_json::to_vec(desc)?;
    Ok(general_purpose::STANDARD.encode(json))
}

pub fn encode_compressed(desc: &SessionDescription) -> Result<String> {
    let json = serde_json::to_vec(desc)?;

    let mut gz = GzEncoder::new(Vec::new(), Compression::best());
    gz.write_all(&json).map_err(ChatError::Gzip)?;
    let compressed = gz.finish().map_err(ChatError::Gzip)?;

    Ok(general_purpose::STANDARD.encode(compressed))
}

pub fn decode(text: &str) -> Result<SessionDescription> {
    // pasted blobs often pick up line wraps from terminals and mail clients
    let compact: String = text.split_whitespace().collect();
    let raw = general_purpose::STANDARD.decode(compact.as_bytes())?;

    let json = if raw.starts_with(&GZIP_MAGIC) {
        gunzip(&raw)?
    } else {
        raw
    };

    Ok(serde_json::from_slice(&json)?)
}

fn gunzip(compressed: &[u8]) -> Result<Vec<u8>> {
    let gz = GzDecoder::new(compressed);
    let mut json = Vec::new();
    // one byte past the cap tells a full-size blob from an oversized one
    gz.take(MAX_DECOMPRESSED_SIZE + 1)
        .read_to_end(&mut json)
        .map_err(ChatError::Gzip)?;
    if json.len() as u64 > MAX_DECOMPRESSED_SIZE {
        return Err(ChatError::Gzip(io::Error::new(
            io::ErrorKind::InvalidData,
            "decompressed description exceeds 256 KiB",
        )));
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::types::SdpKind;

    fn sample() -> SessionDescription {
        SessionDescription {
            kind: SdpKind::Offer,
            sdp: "v=0\r\no=- 4215 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n\
                  a=ice-ufrag:abcd\r\na=ice-pwd:efghijklmnopqrstuvwxyz12\r\n"
                .into(),
        }
    }

    #[test]
    fn decode_reverses_encode() {
        let desc = sample();
        assert_eq!(decode(&encode(&desc).unwrap()).unwrap(), desc);
    }

    #[test]
    fn encode_is_deterministic() {
        assert_eq!(encode(&sample()).unwrap(), encode(&sample()).unwrap());
    }

    #[test]
    fn compressed_blob_decodes_to_same_description() {
        let desc = sample();
        let blob = encode_compressed(&desc).unwrap();
        assert_eq!(decode(&blob).unwrap(), desc);
    }

    #[test]
    fn accepts_browser_blob() {
        // btoa(JSON.stringify({type: "answer", sdp: "v=0\r\n"}))
        let blob = general_purpose::STANDARD.encode(r#"{"type":"answer","sdp":"v=0\r\n"}"#);
        let desc = decode(&blob).unwrap();
        assert_eq!(desc.kind, SdpKind::Answer);
        assert_eq!(desc.sdp, "v=0\r\n");
    }

    #[test]
    fn wrapped_paste_decodes() {
        let desc = sample();
        let blob = encode(&desc).unwrap();
        let (head, tail) = blob.split_at(blob.len() / 2);
        let wrapped = format!("  {head}\n{tail}\r\n");
        assert_eq!(decode(&wrapped).unwrap(), desc);
    }

    #[test]
    fn bad_base64_is_a_decoding_error() {
        assert!(matches!(decode("not-base64!!"), Err(ChatError::Decode(_))));
    }

    #[test]
    fn non_json_is_a_parse_error() {
        let blob = general_purpose::STANDARD.encode("hello there");
        assert!(matches!(decode(&blob), Err(ChatError::Parse(_))));
    }

    #[test]
    fn json_without_type_is_a_parse_error() {
        let blob = general_purpose::STANDARD.encode(r#"{"sdp":"v=0"}"#);
        assert!(matches!(decode(&blob), Err(ChatError::Parse(_))));
    }

    #[test]
    fn truncated_gzip_is_a_gzip_error() {
        let blob = encode_compressed(&sample()).unwrap();
        let raw = general_purpose::STANDARD.decode(&blob).unwrap();
        let cut = general_purpose::STANDARD.encode(&raw[..raw.len() / 2]);
        assert!(matches!(decode(&cut), Err(ChatError::Gzip(_))));
    }

    #[test]
    fn oversized_gzip_blob_is_rejected() {
        let huge = SessionDescription {
            kind: SdpKind::Offer,
            sdp: "a".repeat(MAX_DECOMPRESSED_SIZE as usize + 1024),
        };
        let blob = encode_compressed(&huge).unwrap();
        match decode(&blob) {
            Err(ChatError::Gzip(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("expected gzip error, got {other:?}"),
        }
    }

    #[test]
    fn gzip_blob_just_under_the_cap_decodes() {
        // JSON wrapper is `{"type":"offer","sdp":"..."}`: 25 bytes around the body
        let desc = SessionDescription {
            kind: SdpKind::Offer,
            sdp: "a".repeat(MAX_DECOMPRESSED_SIZE as usize - 25),
        };
        let blob = encode_compressed(&desc).unwrap();
        assert_eq!(decode(&blob).unwrap(), desc);
    }
}
