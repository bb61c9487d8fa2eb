//! Custom character tables (TBL)
//!
//! A TBL file maps byte sequences to text, one `HEX=text` entry per line:
//!
//! ```text
//! 00=A
//! 1A=.
//! 8081=the
//! ```

use std::collections::HashMap;

use bw_core::error::TblError;

/// Decoder built from TBL lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TblConverter {
    mappings: HashMap<Vec<u8>, String>,
    max_key_len: usize,
}

impl TblConverter {
    /// Parse TBL lines; blank lines and `#`/`;` comments are skipped
    pub fn load<S: AsRef<str>>(lines: &[S]) -> Result<Self, TblError> {
        let mut converter = Self::default();
        for (index, raw) in lines.iter().enumerate() {
            let line = raw.as_ref().trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let line_no = index + 1;
            let (key, value) = line
                .split_once('=')
                .ok_or(TblError::MissingSeparator { line: line_no })?;
            let bytes = parse_hex(key.trim()).ok_or_else(|| TblError::InvalidKey {
                line: line_no,
                key: key.to_string(),
            })?;

            converter.max_key_len = converter.max_key_len.max(bytes.len());
            converter.mappings.insert(bytes, value.to_string());
        }
        tracing::debug!("Loaded TBL with {} entries", converter.mappings.len());
        Ok(converter)
    }

    /// Decode bytes, longest matching sequence first
    ///
    /// Bytes with no mapping fall back to [`default_text`].
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut text = String::with_capacity(bytes.len());
        let mut pos = 0;
        'outer: while pos < bytes.len() {
            let longest = self.max_key_len.min(bytes.len() - pos);
            for len in (1..=longest).rev() {
                if let Some(value) = self.mappings.get(&bytes[pos..pos + len]) {
                    text.push_str(value);
                    pos += len;
                    continue 'outer;
                }
            }
            text.push(default_char(bytes[pos]));
            pos += 1;
        }
        text
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Parse an even-length hex string such as `8081` into bytes
pub fn parse_hex(key: &str) -> Option<Vec<u8>> {
    if key.is_empty() || key.len() % 2 != 0 || !key.is_ascii() {
        return None;
    }
    (0..key.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&key[i..i + 2], 16).ok())
        .collect()
}

fn default_char(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}

/// Default display text: printable ASCII as-is, everything else as `.`
pub fn default_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| default_char(b)).collect()
}
