use crate::types::MAX_BUFFER_SIZE;
use serde::{Deserialize, Serialize};

/// Configuration for [`FlatBuilder::with_options`](crate::builder::FlatBuilder::with_options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Bytes allocated up front. The buffer doubles when it runs out.
    ///
    /// Default: 1024.
    pub initial_capacity: usize,
    /// Hard upper bound for the buffer size. Growth beyond it fails with
    /// `FlatError::Capacity`. Clamped to what signed 32-bit offsets can address.
    pub max_buffer_size: usize,
    /// Write scalar fields even when they equal their default.
    pub force_defaults: bool,
    /// Share identical vtables between objects of the same shape.
    pub dedup_vtables: bool,
    /// Maximum number of simultaneously open objects.
    pub max_depth: usize,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_buffer_size: MAX_BUFFER_SIZE,
            force_defaults: false,
            dedup_vtables: true,
            max_depth: 64,
        }
    }
}

impl BuilderOptions {
    /// Parse options from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Effective buffer limit.
    #[inline]
    pub fn buffer_limit(&self) -> usize {
        self.max_buffer_size.min(MAX_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts = BuilderOptions::from_json(r#"{ "force_defaults": true }"#).unwrap();
        assert!(opts.force_defaults);
        assert!(opts.dedup_vtables);
        assert_eq!(opts.initial_capacity, 1024);
        assert_eq!(opts.max_depth, 64);
    }

    #[test]
    fn test_buffer_limit_is_clamped() {
        let opts = BuilderOptions {
            max_buffer_size: usize::MAX,
            ..Default::default()
        };
        assert_eq!(opts.buffer_limit(), MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let opts = BuilderOptions::from_json(r#"{ "initial_capacity": 16, "other": 1 }"#).unwrap();
        assert_eq!(opts.initial_capacity, 16);
    }
}
