//! Errors raised while reading or persisting `config.ron`.

/// Failure while loading or saving the orrery's RON configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read `config.ron` from the config directory.
    #[error("failed to read config.ron: {0}")]
    ReadError(#[source] std::io::Error),

    /// Could not create the config directory or write `config.ron` into it.
    #[error("failed to write config.ron: {0}")]
    WriteError(#[source] std::io::Error),

    /// `config.ron` exists but is not valid RON for the config schema.
    #[error("malformed config.ron: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// The in-memory config could not be rendered as RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn test_parse_error_names_config_file() {
        let bad = ron::from_str::<Config>("(window: (width: \"no\"))").unwrap_err();
        let err = ConfigError::ParseError(bad);
        assert!(err.to_string().contains("config.ron"));
    }
}
