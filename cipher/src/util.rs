use base64::{Engine as _, engine::general_purpose::STANDARD};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use uuid::Uuid;

/// SHA-256 of `msg`, hex-encoded.
pub fn secure_hash(msg: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(msg.as_bytes());
    hex::encode(hasher.finalize())
}

/// Gzip-compress a payload, eg/ orderbook snapshots before persisting.
pub fn gzip_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inverse of [`gzip_compress`].
pub fn gzip_decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Standard base64 encoding.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Standard base64 decoding.
pub fn base64_decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}

/// Fresh UUIDv4 in its canonical 36-char form.
pub fn generate_unique_id() -> String {
    Uuid::new_v4().to_string()
}

/// First 22 characters of a fresh UUIDv4.
pub fn generate_short_unique_id() -> String {
    generate_unique_id()[..22].to_string()
}

/// Whether `candidate` parses as a UUID of `version`.
pub fn is_valid_uuid(candidate: &str, version: usize) -> bool {
    Uuid::parse_str(candidate)
        .map(|id| id.get_version_num() == version)
        .unwrap_or(false)
}

/// Random alphanumeric string.
pub fn random_str(num_characters: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..num_characters)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
