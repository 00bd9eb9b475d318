use std::fmt;

/// Errors raised at the input boundary. Reconciliation itself never fails;
/// every degraded input is represented in-band on the comparison records.
#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad prefix, unknown impact colour, etc.).
    ConfigValidation(String),
    /// An input document (templates, snapshots, catalog) is not valid JSON
    /// or does not have the expected top-level shape.
    InputParse { input: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InputParse { input, message } => {
                write!(f, "cannot parse {input}: {message}")
            }
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_parse_names_the_document() {
        let err = ReconError::InputParse {
            input: "templates".into(),
            message: "expected an array".into(),
        };
        assert_eq!(err.to_string(), "cannot parse templates: expected an array");
    }
}
