//! Error types and handling for the `TripScout` planner

use thiserror::Error;

/// Main error type for the `TripScout` planner
#[derive(Error, Debug)]
pub enum TripScoutError {
    /// Destination lookup or scoring oracle failed; recovered with fallbacks
    #[error("Data source unavailable: {message}")]
    DataSourceUnavailable { message: String },

    /// Budget tier outside of low/mid/luxury
    #[error("Invalid budget tier: {tier}")]
    InvalidBudgetTier { tier: String },

    /// Malformed dates, or a range that is reversed or too long
    #[error("Invalid date range: {message}")]
    InvalidDateRange { message: String },

    /// Other caller input violations (party size, destination)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Email or push delivery failed; the plan itself is still valid
    #[error("Notification delivery failed ({channel}): {message}")]
    NotificationDeliveryFailed { channel: String, message: String },

    /// A candidate pool came back empty
    #[error("Empty candidate pool: {pool}")]
    EmptyCandidatePool { pool: String },

    /// The caller cancelled the planning run
    #[error("Planning cancelled during {stage}")]
    Cancelled { stage: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripScoutError {
    /// Create a new data source error
    pub fn data_source<S: Into<String>>(message: S) -> Self {
        Self::DataSourceUnavailable {
            message: message.into(),
        }
    }

    /// Create a new budget tier error
    pub fn budget_tier<S: Into<String>>(tier: S) -> Self {
        Self::InvalidBudgetTier { tier: tier.into() }
    }

    /// Create a new date range error
    pub fn date_range<S: Into<String>>(message: S) -> Self {
        Self::InvalidDateRange {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new notification error
    pub fn notification<C: Into<String>, S: Into<String>>(channel: C, message: S) -> Self {
        Self::NotificationDeliveryFailed {
            channel: channel.into(),
            message: message.into(),
        }
    }

    pub fn empty_pool<S: Into<String>>(pool: S) -> Self {
        Self::EmptyCandidatePool { pool: pool.into() }
    }

    pub fn cancelled<S: Into<String>>(stage: S) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error aborts a planning run.
    ///
    /// Data source, notification and empty-pool errors are recovered locally
    /// and only surface as warnings.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TripScoutError::DataSourceUnavailable { .. }
                | TripScoutError::NotificationDeliveryFailed { .. }
                | TripScoutError::EmptyCandidatePool { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripScoutError::DataSourceUnavailable { .. } => {
                "Live destination data was unavailable, used fallback data.".to_string()
            }
            TripScoutError::InvalidBudgetTier { tier } => {
                format!("Unknown budget tier '{tier}'. Choose one of: low, mid, luxury.")
            }
            TripScoutError::InvalidDateRange { message } => {
                format!("Invalid travel dates: {message}")
            }
            TripScoutError::Validation { message } => format!("Invalid input: {message}"),
            TripScoutError::NotificationDeliveryFailed { channel, .. } => {
                format!("Failed to send {channel} notification. Please check your settings.")
            }
            TripScoutError::EmptyCandidatePool { pool } => {
                format!("No {pool} found for this destination, some slots are left open.")
            }
            TripScoutError::Cancelled { .. } => "Trip planning was cancelled.".to_string(),
            TripScoutError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripScoutError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TripScoutError::budget_tier("premium");
        assert!(matches!(err, TripScoutError::InvalidBudgetTier { .. }));

        let err = TripScoutError::date_range("end before start");
        assert!(matches!(err, TripScoutError::InvalidDateRange { .. }));

        let err = TripScoutError::notification("email", "smtp refused");
        assert!(matches!(err, TripScoutError::NotificationDeliveryFailed { .. }));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TripScoutError::budget_tier("x").is_fatal());
        assert!(TripScoutError::date_range("x").is_fatal());
        assert!(TripScoutError::cancelled("BuildItinerary").is_fatal());
        assert!(!TripScoutError::data_source("timeout").is_fatal());
        assert!(!TripScoutError::notification("push", "403").is_fatal());
        assert!(!TripScoutError::empty_pool("restaurants").is_fatal());
    }

    #[test]
    fn test_user_messages() {
        let err = TripScoutError::budget_tier("premium");
        assert!(err.user_message().contains("premium"));

        let err = TripScoutError::data_source("connect timeout");
        assert!(err.user_message().contains("fallback data"));

        let err = TripScoutError::validation("party size must be at least 1");
        assert!(err.user_message().contains("party size"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TripScoutError = io_err.into();
        assert!(matches!(err, TripScoutError::Io { .. }));
    }
}
