// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

/// Error taxonomy of the AMR core.
///
/// There is no recoverable path: every variant signals an invariant
/// violation that must abort the run on all participating ranks, since
/// any rank continuing alone would hang in the next collective call.
#[derive(Error, Debug)]
pub enum GranuleError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Numeric range error: {0}")]
    NumericRange(String),

    #[error("Collective communication error: {0}")]
    Collective(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GranuleResult<T> = Result<T, GranuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_names_invariant() {
        let err = GranuleError::ConfigError("dr_min (-1.0) <= 0".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("dr_min"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GranuleError = io_err.into();
        assert!(matches!(err, GranuleError::Io(_)));
    }
}
