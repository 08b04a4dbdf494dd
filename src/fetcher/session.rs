//! Opaque session persistence.
//!
//! Authentication against the paywalled site happens out of band (a real
//! browser login). What we keep is the resulting cookie set, written as a
//! JSON blob under a configured directory. The fetch pipeline only asks the
//! store for a `Cookie` header matching a host; it never cares how the
//! session was obtained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

const STATE_FILE: &str = "auth_state.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub cookies: Vec<SessionCookie>,
    pub saved_at: DateTime<Utc>,
}

impl SessionState {
    /// Parse a raw `Cookie` header ("name=value; name2=value2") captured
    /// from an interactive login, scoped to one domain.
    pub fn from_cookie_header(domain: &str, header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(SessionCookie {
                    name: name.to_string(),
                    value: value.trim().to_string(),
                    domain: domain.to_string(),
                })
            })
            .collect();

        Self {
            cookies,
            saved_at: Utc::now(),
        }
    }

    /// Cookie header value for a host, or `None` when no cookie applies.
    pub fn cookie_header_for(&self, host: &str) -> Option<String> {
        let matching: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| domain_matches(host, &c.domain))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();

        if matching.is_empty() {
            None
        } else {
            Some(matching.join("; "))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

fn domain_matches(host: &str, cookie_domain: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.');
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// File-backed store for the session blob.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Load the saved session, if any. A missing or corrupt blob is not an
    /// error: the pipeline just runs unauthenticated.
    pub fn load(&self) -> Option<SessionState> {
        let path = self.state_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("could not read session state {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<SessionState>(&raw) {
            Ok(state) => {
                debug!(
                    "restored session with {} cookie(s), saved {}",
                    state.cookies.len(),
                    state.saved_at
                );
                Some(state)
            }
            Err(e) => {
                warn!("ignoring corrupt session state {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, state: &SessionState) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(self.state_path(), json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn temp_store() -> SessionStore {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "earnwire-session-test-{}-{}",
            std::process::id(),
            n
        ));
        SessionStore::new(dir)
    }

    #[test]
    fn parse_cookie_header() {
        let state = SessionState::from_cookie_header("news.example.com", "sid=abc123; tier=pro");
        assert_eq!(state.cookies.len(), 2);
        assert_eq!(state.cookies[0].name, "sid");
        assert_eq!(state.cookies[1].value, "pro");
    }

    #[test]
    fn cookie_header_matches_subdomains() {
        let state = SessionState::from_cookie_header("example.com", "sid=abc");
        assert_eq!(
            state.cookie_header_for("www.example.com"),
            Some("sid=abc".to_string())
        );
        assert_eq!(state.cookie_header_for("other.org"), None);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let store = temp_store();
        let state = SessionState::from_cookie_header("example.com", "sid=abc; tier=pro");

        store.save(&state).unwrap();
        let restored = store.load().expect("state should reload");
        assert_eq!(restored.cookies.len(), 2);
        assert_eq!(restored.cookie_header_for("example.com").unwrap(), "sid=abc; tier=pro");
    }

    #[test]
    fn missing_state_is_none() {
        let store = temp_store();
        assert!(store.load().is_none());
    }
}
