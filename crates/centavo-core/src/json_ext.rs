//! JSON value extraction helpers.
//!
//! The settings overlay does not retro-merge defaults into files written by
//! older versions, so every read of a setting supplies its own fallback.
//! This trait keeps those call sites to one line instead of repetitive
//! `.get().and_then().unwrap_or()` chains.

use serde_json::{Map, Value};

/// Extension trait for keyed JSON value extraction.
pub trait JsonExt {
    /// Get a string value, returning None if key missing or not a string
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Get a string value with a default
    fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_str(key).unwrap_or(default)
    }

    /// Get an integer value, returning None if key missing or not a number
    fn get_i64(&self, key: &str) -> Option<i64>;

    /// Get an integer value with a default
    fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }
}

impl JsonExt for Map<String, Value> {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }
}

impl JsonExt for Value {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }
}
