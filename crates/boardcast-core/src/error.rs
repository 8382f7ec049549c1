//! Error types for boardcast-core
//!
//! Failures are scoped to a single request or notification; nothing in this
//! crate terminates the process.

use thiserror::Error;

/// Core error type for boardcast operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Upstream answered with a non-2xx status
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Network-level failure reaching the upstream API
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Convenience Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// True for any upstream-side failure (status or transport). The caller
    /// treats both uniformly as "mutation failed".
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CoreError::UpstreamStatus { .. } | CoreError::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_display() {
        let err = CoreError::UpstreamStatus {
            status: 401,
            body: "invalid key".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned 401: invalid key");
        assert!(err.is_upstream());
    }
}
