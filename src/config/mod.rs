//! Configuration handling for the application.
//!
//! All environment variables are read once at process start into an explicit
//! `Config` that gets passed by reference into each component. Nothing else
//! in the crate touches the environment.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use url::Url;

use crate::aggregator::Source;
use crate::extractor::SourceKind;
use crate::reporter::Mailer;

/// Environment variable names. Public so tests and deployment scripts can
/// refer to them.
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USER: &str = "SMTP_USER";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const ENV_EMAIL_TO: &str = "EMAIL_TO";
pub const ENV_EMAIL_FROM: &str = "EMAIL_FROM";
pub const ENV_TICKERS: &str = "TICKERS";
pub const ENV_PAGES: &str = "PAGES";
pub const ENV_LOOKBACK_DAYS: &str = "LOOKBACK_DAYS";
pub const ENV_SESSION_DIR: &str = "SESSION_DIR";
pub const ENV_PRIMARY_URL: &str = "PRIMARY_URL";
pub const ENV_MIRROR_A_URL: &str = "MIRROR_A_URL";
pub const ENV_MIRROR_B_URL: &str = "MIRROR_B_URL";
pub const ENV_VENDOR_API_URL: &str = "VENDOR_API_URL";

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_PAGES: usize = 3;
const DEFAULT_SESSION_DIR: &str = ".earnwire_session";
const DEFAULT_PRIMARY_URL: &str = "https://seekingalpha.com/";
const DEFAULT_MIRROR_A_URL: &str = "https://www.fool.com/";
const DEFAULT_MIRROR_B_URL: &str = "https://www.insidermonkey.com/";

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    smtp_host: String,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    email_to: Option<String>,
    email_from: Option<String>,
    tickers: Option<Vec<String>>,
    pages: usize,
    lookback_days: Option<u32>,
    session_dir: PathBuf,
    primary_url: Url,
    mirror_a_url: Url,
    mirror_b_url: Url,
    vendor_api_url: Option<Url>,
}

impl Config {
    /// Load from environment variables, falling back to defaults. Fails only
    /// on values that are present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let smtp_host = env::var(ENV_SMTP_HOST).unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = parse_optional(ENV_SMTP_PORT)?.unwrap_or(DEFAULT_SMTP_PORT);
        let smtp_user = env::var(ENV_SMTP_USER).ok().filter(|v| !v.is_empty());
        let smtp_password = env::var(ENV_SMTP_PASSWORD).ok().filter(|v| !v.is_empty());
        let email_to = env::var(ENV_EMAIL_TO).ok().filter(|v| !v.is_empty());
        let email_from = env::var(ENV_EMAIL_FROM).ok().filter(|v| !v.is_empty());

        let tickers = env::var(ENV_TICKERS).ok().filter(|v| !v.is_empty()).map(|v| {
            v.split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect()
        });

        let pages = parse_optional(ENV_PAGES)?.unwrap_or(DEFAULT_PAGES);
        let lookback_days = parse_optional(ENV_LOOKBACK_DAYS)?;

        let session_dir = env::var(ENV_SESSION_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_DIR));

        let primary_url = parse_url(ENV_PRIMARY_URL, DEFAULT_PRIMARY_URL)?;
        let mirror_a_url = parse_url(ENV_MIRROR_A_URL, DEFAULT_MIRROR_A_URL)?;
        let mirror_b_url = parse_url(ENV_MIRROR_B_URL, DEFAULT_MIRROR_B_URL)?;
        let vendor_api_url = match env::var(ENV_VENDOR_API_URL) {
            Ok(raw) if !raw.is_empty() => {
                Some(Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    field: ENV_VENDOR_API_URL,
                    reason: e.to_string(),
                })?)
            }
            _ => None,
        };

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            email_to,
            email_from,
            tickers,
            pages,
            lookback_days,
            session_dir,
            primary_url,
            mirror_a_url,
            mirror_b_url,
            vendor_api_url,
        })
    }

    pub fn tickers(&self) -> Option<&[String]> {
        self.tickers.as_deref()
    }
    pub fn pages(&self) -> usize {
        self.pages
    }
    pub fn lookback_days(&self) -> Option<u32> {
        self.lookback_days
    }
    pub fn session_dir(&self) -> &PathBuf {
        &self.session_dir
    }
    pub fn email_to(&self) -> Option<&str> {
        self.email_to.as_deref()
    }

    /// Host of the primary (paywalled) site; session cookies are scoped to
    /// it during `--login`.
    pub fn primary_host(&self) -> &str {
        self.primary_url.host_str().unwrap_or("")
    }

    /// Sources in fixed priority order. The vendor API participates only
    /// when its endpoint is configured.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources = vec![
            Source::new(SourceKind::PrimarySite, self.primary_url.clone()),
            Source::new(SourceKind::MirrorA, self.mirror_a_url.clone()),
            Source::new(SourceKind::MirrorB, self.mirror_b_url.clone()),
        ];
        if let Some(vendor) = &self.vendor_api_url {
            sources.push(Source::new(SourceKind::VendorApi, vendor.clone()));
        }
        sources
    }

    /// Mail relay built from the SMTP settings. May be unconfigured; the
    /// mailer reports that as a `SendError` when a send is attempted.
    pub fn mailer(&self) -> Mailer {
        let credentials = match (&self.smtp_user, &self.smtp_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        };
        Mailer::new(
            self.smtp_host.clone(),
            self.smtp_port,
            credentials,
            self.email_from.clone().or_else(|| self.smtp_user.clone()),
            self.email_to.clone(),
        )
    }
}

fn parse_optional<T: std::str::FromStr>(field: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: Display,
{
    match env::var(field) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                field,
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

fn parse_url(field: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = env::var(field).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
