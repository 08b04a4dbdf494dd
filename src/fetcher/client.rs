use crate::fetcher::{
    decode::decode_body,
    errors::FetchError,
    session::SessionState,
    types::{Document, DocumentKind, FetchRequest},
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::ClientBuilder;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "earnwire/0.1 (+https://earnwire.example.com)";

/// The seam between the pipeline and document retrieval. The aggregator only
/// depends on this trait, so tests (and a future browser-rendering
/// collaborator) can substitute their own source of documents.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Document, FetchError>;
}

/// Retry policy for one logical fetch. Bounds and jitter are policy knobs,
/// not part of the contract; tests shrink them to keep runs fast.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub request_timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Plain HTTP client with retry/backoff and optional session cookies.
pub struct Client {
    http: reqwest::Client,
    policy: FetchPolicy,
    session: Option<SessionState>,
}

impl Client {
    pub fn new(policy: FetchPolicy, session: Option<SessionState>) -> Result<Self, FetchError> {
        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(policy.request_timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"
                        .parse()
                        .map_err(|_| FetchError::Unknown("invalid accept header".into()))?,
                );
                headers
            })
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self {
            http,
            policy,
            session,
        })
    }

    #[instrument(skip_all, fields(url = %request.url))]
    async fn fetch_once(&self, request: &FetchRequest) -> Result<Document, FetchError> {
        let parsed_url = url::Url::parse(&request.url)?;

        if request.render {
            // No browser in this client; the rendered path is a collaborator
            // concern behind the Fetch trait.
            debug!("render hint set, falling back to plain GET");
        }

        let host = parsed_url.host_str().map(str::to_string);
        let mut req = self.http.get(parsed_url);

        if let Some(session) = &self.session
            && let Some(host) = &host
            && let Some(cookie) = session.cookie_header_for(host)
        {
            req = req.header(reqwest::header::COOKIE, cookie);
        }

        let response = req.send().await.map_err(FetchError::from_reqwest_error)?;

        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let url_final = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Http {
                status,
                retriable: FetchError::status_is_retriable(status),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let kind = DocumentKind::from_content_type(&content_type)
            .ok_or(FetchError::UnsupportedContentType(content_type.clone()))?;

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Content-Length may have been missing
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        let body = decode_body(&content_type, &body_bytes)?;

        Ok(Document {
            url_final,
            status,
            kind,
            body,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Fetch for Client {
    async fn fetch(&self, request: &FetchRequest) -> Result<Document, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..self.policy.max_attempts {
            match self.fetch_once(request).await {
                Ok(document) => return Ok(document),
                Err(e) if e.should_retry() => {
                    if attempt + 1 < self.policy.max_attempts {
                        let delay =
                            super::backoff::backoff_delay(attempt, self.policy.base_backoff_ms);
                        warn!(
                            "fetch of {} failed ({}), retrying in {:?} (attempt {}/{})",
                            request.url,
                            e,
                            delay,
                            attempt + 1,
                            self.policy.max_attempts
                        );
                        last_error = Some(e);
                        sleep(delay).await;
                    } else {
                        last_error = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::RetriesExhausted {
            attempts: self.policy.max_attempts,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts made".to_string()),
        })
    }
}
