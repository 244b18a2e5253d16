//! Byte encoding of entity collections for the persistence gateway.
//!
//! Everything is stored as compact JSON. Timestamps use chrono's RFC 3339
//! serde form and round-trip exactly; UUIDs are hyphenated lowercase.

use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
  Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
  Ok(serde_json::from_slice(bytes)?)
}
