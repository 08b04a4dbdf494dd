use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http {
        status: reqwest::StatusCode,
        retriable: bool,
    },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::InvalidUrl(_) => false,
            Self::BodyTooLarge(_) => false,
            Self::UnsupportedContentType(_) => false,
            Self::Charset(_) => false,
            Self::RetriesExhausted { .. } => false,
            Self::Http { retriable, .. } => *retriable,

            Self::Dns(_) => true,
            Self::ConnectTimeout => true,
            Self::RequestTimeout => true,
            Self::RedirectLoop => true,
            Self::Io(_) => true,
            Self::Unknown(_) => true,
        }
    }

    /// Transient statuses worth another attempt: rate limiting (429),
    /// bot-wall 403s that often clear on the next request, and any 5xx.
    pub fn status_is_retriable(status: reqwest::StatusCode) -> bool {
        status.is_server_error()
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http {
                status,
                retriable: Self::status_is_retriable(status),
            }
        } else if err.is_request() {
            // DNS, connection errors
            Self::Dns(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn retry_classification() {
        assert!(!FetchError::InvalidUrl(url::ParseError::EmptyHost).should_retry());
        assert!(!FetchError::BodyTooLarge(1000).should_retry());
        assert!(FetchError::ConnectTimeout.should_retry());
        assert!(FetchError::Dns("no such host".into()).should_retry());
    }

    #[test]
    fn status_classification() {
        assert!(FetchError::status_is_retriable(StatusCode::FORBIDDEN));
        assert!(FetchError::status_is_retriable(StatusCode::TOO_MANY_REQUESTS));
        assert!(FetchError::status_is_retriable(StatusCode::BAD_GATEWAY));
        assert!(!FetchError::status_is_retriable(StatusCode::NOT_FOUND));
        assert!(!FetchError::status_is_retriable(StatusCode::UNAUTHORIZED));
    }
}
