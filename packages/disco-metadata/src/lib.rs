pub mod xml;

mod error;

pub use error::{Error, Result};
pub use xml::MetadataXml;

use std::io::Read;

use flate2::read::DeflateDecoder;
use sha1::{Digest, Sha1};

/// Lookup key of an entity in the metadata store: lowercase hex SHA-1 of its entityID.
pub fn entity_key(entity_id: &str) -> String {
	hex::encode(Sha1::digest(entity_id.as_bytes()))
}

/// Inflates a raw DEFLATE stream, refusing output larger than `limit` bytes.
pub fn inflate(compressed: &[u8], limit: u64) -> Result<Vec<u8>> {
	let mut out = Vec::new();

	DeflateDecoder::new(compressed).take(limit.saturating_add(1)).read_to_end(&mut out)?;

	if out.len() as u64 > limit {
		return Err(Error::TooLarge { limit });
	}

	Ok(out)
}

/// Inflates and parses a stored metadata blob.
pub fn decode(compressed: &[u8], limit: u64) -> Result<MetadataXml> {
	let raw = String::from_utf8(inflate(compressed, limit)?)?;

	MetadataXml::parse(&raw)
}
