//! Typed error variants for the par-annotate-config crate.
//!
//! `Config::load` and `Config::save` return `anyhow::Result`; the
//! `ConfigError` values they produce can be recovered with
//! `downcast_ref::<ConfigError>()`.
//!
//! # Example
//!
//! ```rust,no_run
//! use par_annotate_config::ConfigError;
//!
//! fn check_load_err(e: &anyhow::Error) {
//!     if let Some(cfg_err) = e.downcast_ref::<ConfigError>() {
//!         match cfg_err {
//!             ConfigError::Io(io) => eprintln!("I/O error: {io}"),
//!             ConfigError::Parse(p) => eprintln!("YAML parse error: {p}"),
//!             ConfigError::Validation(msg) => eprintln!("Validation: {msg}"),
//!         }
//!     }
//! }
//! ```

/// Errors that can occur when loading, saving, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML that could not be parsed.
    #[error("YAML parse error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = ConfigError::Validation("limits.menu_max_entries must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Config validation error: limits.menu_max_entries must be > 0"
        );
    }

    #[test]
    fn test_io_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ConfigError::from(io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("I/O error reading config"));
    }
}
