//! Classification of HTTP status codes into API outcomes.

/// The semantic outcome of a GitHub API response.
///
/// Every response collapses to exactly one variant; all control decisions
/// in the operation modules switch on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Unauthorized,
    Forbidden,
    Conflict,
    NotFound,
    UnprocessableEntity,
    UnexpectedStatus(u16),
}

impl Outcome {
    /// Whether this outcome is [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Map a raw HTTP status code to an [`Outcome`].
pub fn classify(status: u16) -> Outcome {
    match status {
        401 => Outcome::Unauthorized,
        403 => Outcome::Forbidden,
        404 => Outcome::NotFound,
        409 => Outcome::Conflict,
        422 => Outcome::UnprocessableEntity,
        200..=299 => Outcome::Success,
        other => Outcome::UnexpectedStatus(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_codes() {
        for status in [200, 201, 204, 202] {
            assert_eq!(classify(status), Outcome::Success, "status {}", status);
        }
    }

    #[test]
    fn test_classify_known_failures() {
        assert_eq!(classify(401), Outcome::Unauthorized);
        assert_eq!(classify(403), Outcome::Forbidden);
        assert_eq!(classify(404), Outcome::NotFound);
        assert_eq!(classify(409), Outcome::Conflict);
        assert_eq!(classify(422), Outcome::UnprocessableEntity);
    }

    #[test]
    fn test_classify_unexpected_carries_code() {
        for status in [100, 301, 400, 418, 429, 500, 502, 503] {
            assert_eq!(classify(status), Outcome::UnexpectedStatus(status));
        }
    }

    #[test]
    fn test_classify_is_total() {
        for status in 0..=999u16 {
            let outcome = classify(status);
            assert_eq!(outcome.is_success(), (200..=299).contains(&status));
        }
    }
}
