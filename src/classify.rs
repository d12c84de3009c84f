//! Failure classification.
//!
//! Maps whatever a failed attempt produced onto exactly one [`FailureLabel`].
//! Total and side-effect free: every input yields a label, nothing is raised.

use crate::error::TransportError;
use crate::types::FailureLabel;

/// What a failed attempt left behind, fed to [`classify`].
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    /// The transport itself failed before a status was available.
    Transport(TransportError),
    /// A non-success HTTP status was returned.
    Status(u16),
    /// A success status arrived but the body carried no usable content.
    MissingContent,
}

/// Classify a failed attempt.
///
/// - Deadline expiry maps to `Timeout`; other transport failures (refused,
///   reset) map to `ServerError` and stay retryable.
/// - 429 maps to `RateLimited`, 5xx to `ServerError`, remaining 4xx to
///   `ClientError`. A status outside 4xx/5xx still yields `ServerError` so
///   the function stays total; the adapter only routes non-2xx here.
/// - A well-formed status with a missing or empty content field maps to
///   `Malformed`.
pub fn classify(failure: &AttemptFailure) -> FailureLabel {
    match failure {
        AttemptFailure::Transport(TransportError::Timeout) => FailureLabel::Timeout,
        AttemptFailure::Transport(TransportError::Network(_)) => FailureLabel::ServerError,
        AttemptFailure::Status(429) => FailureLabel::RateLimited,
        AttemptFailure::Status(status) if (500..=599).contains(status) => {
            FailureLabel::ServerError
        }
        AttemptFailure::Status(status) if (400..=499).contains(status) => {
            FailureLabel::ClientError
        }
        AttemptFailure::Status(_) => FailureLabel::ServerError,
        AttemptFailure::MissingContent => FailureLabel::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_timeout() {
        let label = classify(&AttemptFailure::Transport(TransportError::Timeout));
        assert_eq!(label, FailureLabel::Timeout);
    }

    #[test]
    fn network_failure_is_retryable_server_error() {
        let failure =
            AttemptFailure::Transport(TransportError::Network("connection refused".into()));
        assert_eq!(classify(&failure), FailureLabel::ServerError);
        assert!(classify(&failure).is_retryable());
    }

    #[test]
    fn status_mapping_table() {
        assert_eq!(classify(&AttemptFailure::Status(429)), FailureLabel::RateLimited);
        for status in [500, 502, 503, 599] {
            assert_eq!(classify(&AttemptFailure::Status(status)), FailureLabel::ServerError);
        }
        for status in [400, 401, 403, 404, 422, 499] {
            assert_eq!(classify(&AttemptFailure::Status(status)), FailureLabel::ClientError);
        }
    }

    #[test]
    fn missing_content_is_malformed() {
        assert_eq!(classify(&AttemptFailure::MissingContent), FailureLabel::Malformed);
    }

    #[test]
    fn stays_total_on_unexpected_status() {
        // 2xx/3xx never reach the classifier from the adapter, but the
        // mapping must still produce a label for them.
        assert_eq!(classify(&AttemptFailure::Status(200)), FailureLabel::ServerError);
        assert_eq!(classify(&AttemptFailure::Status(302)), FailureLabel::ServerError);
    }
}
