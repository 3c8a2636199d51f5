use thiserror::Error;

/// Failure kinds a weather lookup can end with.
///
/// The variants never overlap: a geocoder miss is `NotFound`, a failed or
/// non-2xx HTTP call is `Upstream`, and a 2xx response whose body breaks the
/// expected schema is `MalformedUpstreamData`.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("City '{0}' not found.")]
    NotFound(String),

    #[error("Upstream request failed: {0:#}")]
    Upstream(anyhow::Error),

    #[error("Malformed upstream data: {0}")]
    MalformedUpstreamData(String),
}

/// Coarse classification for whatever sits in front of the core
/// (CLI exit codes, HTTP status codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Internal,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            WeatherError::NotFound(_) => ErrorKind::NotFound,
            WeatherError::Upstream(_) | WeatherError::MalformedUpstreamData(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message that is safe to show a caller. Internal failures are reduced
    /// to a generic sentence so upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::InvalidRequest | ErrorKind::NotFound => self.to_string(),
            ErrorKind::Internal => {
                "An internal error occurred while fetching weather data.".to_string()
            }
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        WeatherError::MalformedUpstreamData(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_boundary_classes() {
        assert_eq!(WeatherError::InvalidRequest("x".into()).kind(), ErrorKind::InvalidRequest);
        assert_eq!(WeatherError::NotFound("Atlantis".into()).kind(), ErrorKind::NotFound);
        assert_eq!(WeatherError::Upstream(anyhow::anyhow!("boom")).kind(), ErrorKind::Internal);
        assert_eq!(WeatherError::malformed("no daily").kind(), ErrorKind::Internal);
    }

    #[test]
    fn public_message_hides_upstream_details() {
        let err = WeatherError::Upstream(anyhow::anyhow!("status 401: invalid appid SECRET"));
        let msg = err.public_message();
        assert!(!msg.contains("SECRET"));
        assert!(msg.contains("internal error"));
    }

    #[test]
    fn public_message_keeps_not_found_text() {
        let err = WeatherError::NotFound("Atlantis".into());
        assert_eq!(err.public_message(), "City 'Atlantis' not found.");
    }
}
