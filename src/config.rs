//! Tree configuration.

/// Default bound on a name payload, in bytes.
pub const DEFAULT_MAX_NAME_LEN: usize = 49;

/// Configuration for an [`AvlTree`](crate::AvlTree).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Longest accepted name payload, in bytes.
    pub max_name_len: usize,
    /// Number of node slots reserved up front.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            initial_capacity: 0,
        }
    }
}
