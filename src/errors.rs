// Typed errors for library callers
//
// Application plumbing (config files, audit log, CLI) stays on anyhow;
// these are the failures a caller may want to match on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlesError {
    /// Configuration is well-formed TOML but semantically unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// A custom rule can never be evaluated
    #[error("Invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    /// Inference server answered with a non-success status
    #[error("Backend request failed\n\nStatus: {status}\nBody: {body}")]
    Backend { status: u16, body: String },
}

impl AtlesError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AtlesError::Config(msg.into())
    }

    pub fn invalid_rule<S: Into<String>>(name: &str, reason: S) -> Self {
        AtlesError::InvalidRule {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn backend<S: Into<String>>(status: u16, body: S) -> Self {
        AtlesError::Backend {
            status,
            body: body.into(),
        }
    }
}

/// Error headline followed by an indented suggestion block
pub fn wrap_error_with_suggestion(error: String, suggestion: &str) -> String {
    format!("{}\n\n{}", error, suggestion)
}

/// Friendly message for a missing config file given explicitly
pub fn file_not_found_error(path: &str, what: &str) -> String {
    format!(
        "{} not found: {}\n\nCreate it or drop the --config flag to use defaults.",
        what, path
    )
}

/// Friendly message for a TOML parse failure
pub fn config_parse_error(details: &str) -> String {
    format!(
        "Failed to parse configuration file.\n\n{}\n\nKnown sections: [backend], [truth_seeking], [logging].",
        details
    )
}
