//! Prize codes: the real ones revealed by winning tickets, and the decorative
//! filler printed on losing tickets.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use serde_json::Value;

use crate::config::PrizeConfig;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_GROUPS: usize = 3;
const CODE_GROUP_LEN: usize = 5;

/// Random `XXXXX-XXXXX-XXXXX` code.
pub fn decorative_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_GROUPS * (CODE_GROUP_LEN + 1));
    for i in 0..CODE_GROUPS * CODE_GROUP_LEN {
        if i > 0 && i % CODE_GROUP_LEN == 0 {
            code.push('-');
        }
        code.push(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char);
    }
    code
}

/// Non-empty rotation of prize codes handed out to winning tickets in order.
#[derive(Clone, Debug)]
pub struct PrizeBook {
    codes: Vec<String>,
    cursor: usize,
}

impl PrizeBook {
    fn sentinel(text: &str) -> Self {
        Self {
            codes: vec![text.to_string()],
            cursor: 0,
        }
    }

    /// The prize source could not be reached.
    pub fn offline(config: &PrizeConfig) -> Self {
        tracing::warn!(sentinel = %config.offline_sentinel, "prize source unavailable");
        Self::sentinel(&config.offline_sentinel)
    }

    /// Parse the prize document. The value under `config.key` holds base64 encoded
    /// codes, either an array or a single string. A body that is not JSON counts as
    /// an unreachable source; valid JSON without usable codes degrades to the
    /// missing-data sentinel.
    pub fn from_json(text: &str, config: &PrizeConfig) -> Self {
        let doc: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "prize document is not valid JSON");
                return Self::offline(config);
            }
        };
        let encoded: Vec<&str> = match doc.get(&config.key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        };
        let codes: Vec<String> = encoded.into_iter().filter_map(decode_code).collect();
        if codes.is_empty() {
            tracing::warn!(key = %config.key, "prize document has no usable codes");
            return Self::sentinel(&config.missing_sentinel);
        }
        tracing::info!(count = codes.len(), "prize codes loaded");
        Self { codes, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Next code in rotation, wrapping around.
    pub fn next_prize(&mut self) -> String {
        let code = self.codes[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.codes.len();
        code
    }
}

fn decode_code(encoded: &str) -> Option<String> {
    let bytes = match STANDARD.decode(encoded.trim()) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "skipping undecodable prize code");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(s) => Some(s),
        Err(_) => {
            tracing::warn!("skipping prize code that is not UTF-8");
            None
        }
    }
}
