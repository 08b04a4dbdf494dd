use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::MultiPart,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("mail transport not configured (set SMTP_USER and SMTP_PASSWORD)")]
    NotConfigured,

    #[error("no recipient configured")]
    NoRecipient,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("could not compose message: {0}")]
    Compose(String),

    #[error("smtp transport error: {0}")]
    Transport(String),
}

/// Outbound mail relay. Built once per run; the connection is not pooled or
/// reused across runs.
#[derive(Debug, Clone)]
pub struct Mailer {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    from: Option<String>,
    default_to: Option<String>,
}

impl Mailer {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        credentials: Option<(String, String)>,
        from: Option<String>,
        default_to: Option<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            credentials,
            from,
            default_to,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Compose and hand one multipart message to the relay. Credentials are
    /// checked before any network I/O; the message is either fully composed
    /// and sent, or not sent at all. Failures are reported, never retried.
    pub async fn send(
        &self,
        subject: &str,
        plain: &str,
        html: &str,
        to: Option<&str>,
    ) -> Result<(), SendError> {
        let Some((user, password)) = &self.credentials else {
            return Err(SendError::NotConfigured);
        };

        let recipient = to
            .map(str::to_string)
            .or_else(|| self.default_to.clone())
            .ok_or(SendError::NoRecipient)?;
        let from = self.from.clone().unwrap_or_else(|| user.clone());

        let message = Message::builder()
            .from(from
                .parse()
                .map_err(|_| SendError::InvalidAddress(from.clone()))?)
            .to(recipient
                .parse()
                .map_err(|_| SendError::InvalidAddress(recipient.clone()))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                plain.to_string(),
                html.to_string(),
            ))
            .map_err(|e| SendError::Compose(e.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| SendError::Transport(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(user.clone(), password.clone()))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        info!("email sent to {}", recipient);
        Ok(())
    }
}
