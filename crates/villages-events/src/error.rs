//! Failure vocabulary shared by every pipeline stage.

/// Errors that can occur while fetching and processing events.
///
/// Each variant names the stage that failed. Anything that is not a
/// `VillagesError` is treated by the binary as an unexpected failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VillagesError {
    #[error("Token fetch error: {0}")]
    TokenFetch(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

impl VillagesError {
    /// Stable name of the stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            VillagesError::TokenFetch(_) => "token",
            VillagesError::Session(_) => "session",
            VillagesError::Api(_) => "api",
            VillagesError::Processing(_) => "processing",
        }
    }
}

/// Convenience result type.
pub type VillagesResult<T> = Result<T, VillagesError>;

/// Render `err` followed by every `source()` in its chain, joined by `": "`.
///
/// Transport errors keep the underlying cause (refused connection, DNS,
/// TLS) in their sources rather than in their own message.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_stage_prefix() {
        let err = VillagesError::Api("API request failed with status code 503: down".into());
        assert_eq!(
            err.to_string(),
            "API error: API request failed with status code 503: down"
        );
        assert_eq!(err.stage(), "api");
    }

    #[derive(thiserror::Error, Debug)]
    #[error("error sending request")]
    struct Outer(#[source] Middle);

    #[derive(thiserror::Error, Debug)]
    #[error("tcp connect error")]
    struct Middle(#[source] std::io::Error);

    #[test]
    fn test_error_chain_appends_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let err = Outer(Middle(io));
        assert_eq!(
            error_chain(&err),
            "error sending request: tcp connect error: Connection refused"
        );
    }

    #[test]
    fn test_error_chain_without_source() {
        let err = VillagesError::Session("x".into());
        assert_eq!(error_chain(&err), "Session error: x");
    }

    #[test]
    fn test_stages_are_distinct() {
        let stages = [
            VillagesError::TokenFetch(String::new()).stage(),
            VillagesError::Session(String::new()).stage(),
            VillagesError::Api(String::new()).stage(),
            VillagesError::Processing(String::new()).stage(),
        ];
        for (i, a) in stages.iter().enumerate() {
            for b in &stages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
