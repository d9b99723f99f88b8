use thiserror::Error;

use crate::request::Profile;

/// Convenient result alias for the Range-Raptor library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Only configuration and input problems are errors. A search that finds no
/// journey returns an empty response instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the transit-group rules need more distinct groups than fit in the bitset.
    #[error("too many transit priority groups; at most {limit} groups are supported")]
    TooManyTransitGroups { limit: u32 },

    /// Raised when the requested profile cannot be combined with the requested features.
    #[error("profile {profile} is not compatible with this request: {reason}")]
    IncompatibleProfile { profile: Profile, reason: String },

    /// Raised when request parameters are malformed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Raised when a stop index referenced by a request does not exist in the network.
    #[error("stop index {index} is out of range; network has {num_stops} stops")]
    StopIndexOutOfRange { index: usize, num_stops: usize },

    /// Raised when a stop id could not be found in the network.
    #[error("unknown stop id: {name}{}", format_suggestions(.suggestions))]
    UnknownStop {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when schedule data violates the model invariants.
    #[error("invalid transit network: {message}")]
    InvalidNetwork { message: String },

    /// Raised when a clock time string cannot be parsed.
    #[error("invalid time '{value}'; expected HH:MM or HH:MM:SS")]
    InvalidTime { value: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_network(message: impl Into<String>) -> Self {
        Error::InvalidNetwork {
            message: message.into(),
        }
    }

    pub(crate) fn incompatible(profile: Profile, reason: impl Into<String>) -> Self {
        Error::IncompatibleProfile {
            profile,
            reason: reason.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
