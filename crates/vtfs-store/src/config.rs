use serde::{Deserialize, Serialize};

/// Limits for a [`LocalTreeStore`](crate::LocalTreeStore).
///
/// Exceeding a limit fails with `ResourceExhausted` before any mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalStoreConfig {
    /// Maximum number of live objects, root included. `None` is unbounded.
    pub max_objects: Option<usize>,
    /// Maximum logical size of a single file, in bytes.
    pub max_file_size: u64,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            max_objects: None,
            max_file_size: 1024 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LocalStoreConfig::default();
        assert_eq!(c.max_objects, None);
        assert_eq!(c.max_file_size, 1 << 30);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: LocalStoreConfig = toml::from_str("max_objects = 16").unwrap();
        assert_eq!(c.max_objects, Some(16));
        assert_eq!(c.max_file_size, 1 << 30);
    }
}
