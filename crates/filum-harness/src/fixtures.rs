//! Fixture loading and management.
//!
//! A fixture case captures one element-granular round trip: a payload,
//! the element size it is written and read back in, and the access
//! modes for each leg. Payloads are hex-encoded so fixture files stay
//! printable JSON.

use serde::{Deserialize, Serialize};

use crate::HarnessError;

/// A single round-trip case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTripCase {
    /// Case identifier.
    pub name: String,
    /// Hex-encoded payload bytes.
    pub payload_hex: String,
    /// Element size for both legs; must divide the payload length.
    pub element_size: usize,
    /// Access mode for the write leg.
    pub write_mode: String,
    /// Access mode for the read leg.
    pub read_mode: String,
    /// What the case demonstrates.
    pub notes: String,
}

impl RoundTripCase {
    /// Decode the payload, validating shape as we go.
    pub fn payload(&self) -> Result<Vec<u8>, HarnessError> {
        let bytes = hex_decode(&self.payload_hex).ok_or_else(|| HarnessError::BadFixture {
            name: self.name.clone(),
            reason: "payload_hex is not valid hex".into(),
        })?;
        if self.element_size == 0 {
            return Err(HarnessError::BadFixture {
                name: self.name.clone(),
                reason: "element_size must be nonzero".into(),
            });
        }
        if bytes.len() % self.element_size != 0 {
            return Err(HarnessError::BadFixture {
                name: self.name.clone(),
                reason: format!(
                    "element_size {} does not divide payload length {}",
                    self.element_size,
                    bytes.len()
                ),
            });
        }
        Ok(bytes)
    }
}

/// A collection of round-trip cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Suite name.
    pub suite: String,
    /// Individual cases.
    pub cases: Vec<RoundTripCase>,
}

impl FixtureSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// The built-in suite: the round-trip properties the stream
    /// contract promises, as concrete cases.
    pub fn builtin() -> Self {
        let ladder: Vec<u8> = (0u8..=255).collect();
        FixtureSet {
            version: "1".into(),
            suite: "round_trip".into(),
            cases: vec![
                RoundTripCase {
                    name: "int42_single_element".into(),
                    payload_hex: hex_encode(&42i32.to_le_bytes()),
                    element_size: 4,
                    write_mode: "wb".into(),
                    read_mode: "rb".into(),
                    notes: "one 4-byte element holding little-endian 42".into(),
                },
                RoundTripCase {
                    name: "byte_ladder_one_byte_elements".into(),
                    payload_hex: hex_encode(&ladder),
                    element_size: 1,
                    write_mode: "wb".into(),
                    read_mode: "rb".into(),
                    notes: "all byte values, written one byte at a time".into(),
                },
                RoundTripCase {
                    name: "byte_ladder_wide_elements".into(),
                    payload_hex: hex_encode(&ladder),
                    element_size: 32,
                    write_mode: "wb".into(),
                    read_mode: "rb".into(),
                    notes: "same payload, 32-byte elements".into(),
                },
                RoundTripCase {
                    name: "text_through_update_mode".into(),
                    payload_hex: hex_encode(b"the quick brown fox\n"),
                    element_size: 4,
                    write_mode: "w+b".into(),
                    read_mode: "rb".into(),
                    notes: "update-mode write leg".into(),
                },
                RoundTripCase {
                    name: "empty_payload".into(),
                    payload_hex: String::new(),
                    element_size: 8,
                    write_mode: "wb".into(),
                    read_mode: "rb".into(),
                    notes: "zero elements; the read leg sees immediate EOF".into(),
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

pub fn hex_decode(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16)?;
            let lo = (pair[1] as char).to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}
