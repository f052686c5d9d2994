// src/icon.rs
//
// Icon cache. Servers hot-link icons through redirect chains that sometimes
// hand back empty or truncated bodies, so everything is validated before it
// is treated as an image: data-URI strip, strict base64 round-trip, byte-size
// band, then magic-byte signature. Only payloads passing all four checks are
// hashed and upserted, keyed by server id.
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::models::server::ServerIcon;
use crate::storage::{Storage, StorageError};

pub const ICON_MIN_BYTES: usize = 64;
pub const ICON_MAX_BYTES: usize = 262_144;

#[derive(Debug, PartialEq, Eq)]
pub enum IconRejection {
    NotBase64,
    SizeOutOfRange(usize),
    UnknownFormat,
}

impl fmt::Display for IconRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBase64 => write!(f, "payload is not well-formed base64"),
            Self::SizeOutOfRange(len) => write!(
                f,
                "decoded size {} outside {}..={} bytes",
                len, ICON_MIN_BYTES, ICON_MAX_BYTES
            ),
            Self::UnknownFormat => write!(f, "payload does not start with a known image signature"),
        }
    }
}

#[derive(Debug)]
pub enum IconStoreError {
    Rejected(IconRejection),
    Storage(StorageError),
}

impl fmt::Display for IconStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(r) => write!(f, "icon rejected: {}", r),
            Self::Storage(e) => write!(f, "icon write failed: {}", e),
        }
    }
}

impl std::error::Error for IconStoreError {}

#[derive(Debug, PartialEq, Eq)]
pub enum IconOutcome {
    Stored { hash: String },
    /// Content hash matches the cached row; the write was skipped.
    Unchanged,
}

struct ValidIcon {
    encoded: String,
    hash: String,
}

fn strip_data_uri(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some(idx) = payload.find(";base64,") {
            return &payload[idx + ";base64,".len()..];
        }
    }
    payload
}

fn has_image_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(b"GIF8")
        || (bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP")
        || bytes.starts_with(b"BM")
}

fn validate(payload: &str) -> Result<ValidIcon, IconRejection> {
    let encoded = strip_data_uri(payload);

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| IconRejection::NotBase64)?;
    // Strict round-trip: re-encoding must reproduce the input exactly, which
    // rejects stray whitespace and non-canonical padding.
    if STANDARD.encode(&bytes) != encoded {
        return Err(IconRejection::NotBase64);
    }

    if bytes.len() < ICON_MIN_BYTES || bytes.len() > ICON_MAX_BYTES {
        return Err(IconRejection::SizeOutOfRange(bytes.len()));
    }

    if !has_image_signature(&bytes) {
        return Err(IconRejection::UnknownFormat);
    }

    Ok(ValidIcon {
        encoded: encoded.to_string(),
        hash: hex::encode(Sha256::digest(&bytes)),
    })
}

/// Validate and upsert a server's icon. A rejection never touches an existing
/// cached row; an unchanged content hash skips the write entirely.
pub fn store(
    storage: &dyn Storage,
    server_id: &str,
    payload: &str,
    now: u64,
) -> Result<IconOutcome, IconStoreError> {
    let valid = validate(payload).map_err(IconStoreError::Rejected)?;

    if let Some(existing) = storage.get_icon(server_id) {
        if existing.content_hash == valid.hash {
            debug!("icon unchanged for {}", server_id);
            return Ok(IconOutcome::Unchanged);
        }
    }

    storage
        .put_icon(ServerIcon {
            server_id: server_id.to_string(),
            payload: valid.encoded,
            content_hash: valid.hash.clone(),
            updated_at: now,
        })
        .map_err(IconStoreError::Storage)?;

    debug!("icon stored for {} ({})", server_id, valid.hash);
    Ok(IconOutcome::Stored { hash: valid.hash })
}
