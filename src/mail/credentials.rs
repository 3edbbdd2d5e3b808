// src/mail/credentials.rs
//
// Process-wide bearer-token cache for the delivery API. The token is
// acquired through a pluggable source (silent refresh for scheduled
// runs, two-phase interactive consent for manual ones), cached in
// memory with a safety margin, and never persisted.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::sync::mpsc;
use std::sync::Mutex;
use url::Url;

const DEFAULT_TTL_SECS: i64 = 3600;
const SAFETY_MARGIN_SECS: i64 = 120;
const SEND_SCOPES: &str = "mail.send mail.compose";

#[derive(Debug)]
pub enum AuthError {
    /// The user dismissed the interactive consent flow.
    Cancelled,
    Failed(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Cancelled => write!(f, "Authorization cancelled by user"),
            AuthError::Failed(msg) => write!(f, "Authorization failed: {msg}"),
        }
    }
}

impl Error for AuthError {}

/// A freshly exchanged token plus its server-reported lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// Anything that can produce a fresh token.
pub trait TokenSource {
    fn exchange(&self) -> Result<TokenGrant, AuthError>;
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// The cache itself. The mutex guards the slot *and* serializes
/// acquisitions: a second caller during an exchange blocks on the lock
/// and then observes the fresh token, so at most one consent flow is
/// ever in flight.
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    clock: fn() -> DateTime<Utc>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Test seam: substitute a fake clock.
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            slot: Mutex::new(None),
            clock,
        }
    }

    /// Return the cached token if it is still comfortably valid,
    /// otherwise run one exchange through `source` and cache the result.
    pub fn acquire(&self, source: &dyn TokenSource) -> Result<String, AuthError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AuthError::Failed("token cache poisoned".into()))?;

        let now = (self.clock)();
        if let Some(cached) = slot.as_ref() {
            if now < cached.expires_at - Duration::seconds(SAFETY_MARGIN_SECS) {
                return Ok(cached.token.clone());
            }
        }

        let grant = source.exchange()?;
        let ttl = grant.expires_in.unwrap_or(DEFAULT_TTL_SECS);
        let cached = CachedToken {
            token: grant.access_token,
            expires_at: now + Duration::seconds(ttl),
        };
        let token = cached.token.clone();
        *slot = Some(cached);
        Ok(token)
    }

    /// Drop the cached token unconditionally. Must be called after any
    /// 401 from the delivery API.
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Silent refresh against the token endpoint, used by scheduled runs.
pub struct RefreshTokenSource {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl RefreshTokenSource {
    pub fn from_env(token_url: impl Into<String>) -> Result<Self, AuthError> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| AuthError::Failed(format!("{name} is not set")))
        };
        Ok(Self {
            token_url: token_url.into(),
            client_id: var("MAIL_CLIENT_ID")?,
            client_secret: var("MAIL_CLIENT_SECRET")?,
            refresh_token: var("MAIL_REFRESH_TOKEN")?,
        })
    }
}

impl TokenSource for RefreshTokenSource {
    fn exchange(&self) -> Result<TokenGrant, AuthError> {
        let client = reqwest::blocking::Client::new();

        let resp = client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|e| AuthError::Failed(format!("token request failed: {e}")))?;

        if !resp.status().is_success() {
            let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(AuthError::Failed(format!("token endpoint rejected: {body}")));
        }

        resp.json::<TokenGrant>()
            .map_err(|e| AuthError::Failed(format!("bad token response: {e}")))
    }
}

/// Two-phase interactive consent for the manual path. `begin` must run
/// inside the user-initiated handler; the host UI later resolves or
/// cancels through the [`GrantCompleter`]. The grant's `exchange` blocks
/// until then.
pub struct InteractiveGrant {
    rx: mpsc::Receiver<Result<TokenGrant, AuthError>>,
}

pub struct GrantCompleter {
    tx: mpsc::Sender<Result<TokenGrant, AuthError>>,
}

impl InteractiveGrant {
    pub fn begin() -> (Self, GrantCompleter) {
        let (tx, rx) = mpsc::channel();
        (Self { rx }, GrantCompleter { tx })
    }

    /// Consent URL the host UI opens, scopes limited to sending and
    /// composing mail.
    pub fn consent_url(auth_base: &str, client_id: &str, redirect_uri: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(auth_base)
            .map_err(|e| AuthError::Failed(format!("bad auth base url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "token")
            .append_pair("scope", SEND_SCOPES);
        Ok(url)
    }
}

impl GrantCompleter {
    pub fn resolve(self, grant: TokenGrant) {
        let _ = self.tx.send(Ok(grant));
    }

    pub fn cancel(self) {
        let _ = self.tx.send(Err(AuthError::Cancelled));
    }
}

impl TokenSource for InteractiveGrant {
    fn exchange(&self) -> Result<TokenGrant, AuthError> {
        match self.rx.recv() {
            Ok(result) => result,
            // Completer dropped without resolving: treat as cancellation.
            Err(_) => Err(AuthError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<u32>,
        ttl: Option<i64>,
    }

    impl CountingSource {
        fn new(ttl: Option<i64>) -> Self {
            Self {
                calls: Cell::new(0),
                ttl,
            }
        }
    }

    impl TokenSource for CountingSource {
        fn exchange(&self) -> Result<TokenGrant, AuthError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            Ok(TokenGrant {
                access_token: format!("token-{n}"),
                expires_in: self.ttl,
            })
        }
    }

    struct FailingSource;

    impl TokenSource for FailingSource {
        fn exchange(&self) -> Result<TokenGrant, AuthError> {
            Err(AuthError::Failed("boom".into()))
        }
    }

    fn fixed_clock() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-03T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn second_acquire_within_window_reuses_cache() {
        let cache = TokenCache::with_clock(fixed_clock);
        let source = CountingSource::new(Some(3600));

        let a = cache.acquire(&source).unwrap();
        let b = cache.acquire(&source).unwrap();

        assert_eq!(a, "token-1");
        assert_eq!(b, "token-1");
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn token_inside_safety_margin_is_re_exchanged() {
        let cache = TokenCache::with_clock(fixed_clock);
        // Expires 60s from "now": inside the 2-minute margin.
        let source = CountingSource::new(Some(60));

        cache.acquire(&source).unwrap();
        let b = cache.acquire(&source).unwrap();

        assert_eq!(b, "token-2");
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn missing_ttl_defaults_to_an_hour() {
        let cache = TokenCache::with_clock(fixed_clock);
        let source = CountingSource::new(None);

        cache.acquire(&source).unwrap();
        // Default 3600s TTL keeps the first token valid.
        assert_eq!(cache.acquire(&source).unwrap(), "token-1");
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn invalidate_forces_a_fresh_exchange() {
        let cache = TokenCache::with_clock(fixed_clock);
        let source = CountingSource::new(Some(3600));

        cache.acquire(&source).unwrap();
        cache.invalidate();
        let b = cache.acquire(&source).unwrap();

        assert_eq!(b, "token-2");
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn failed_exchange_leaves_cache_empty() {
        let cache = TokenCache::with_clock(fixed_clock);
        assert!(cache.acquire(&FailingSource).is_err());

        // A later working source succeeds from scratch.
        let source = CountingSource::new(Some(3600));
        assert_eq!(cache.acquire(&source).unwrap(), "token-1");
    }

    #[test]
    fn interactive_grant_resolves_through_completer() {
        let (grant, completer) = InteractiveGrant::begin();
        completer.resolve(TokenGrant {
            access_token: "popup-token".into(),
            expires_in: Some(100),
        });
        assert_eq!(grant.exchange().unwrap().access_token, "popup-token");
    }

    #[test]
    fn cancelled_grant_reports_cancellation() {
        let (grant, completer) = InteractiveGrant::begin();
        completer.cancel();
        assert!(matches!(grant.exchange(), Err(AuthError::Cancelled)));
    }

    #[test]
    fn dropped_completer_counts_as_cancelled() {
        let (grant, completer) = InteractiveGrant::begin();
        drop(completer);
        assert!(matches!(grant.exchange(), Err(AuthError::Cancelled)));
    }

    #[test]
    fn consent_url_carries_send_scopes_only() {
        let url = InteractiveGrant::consent_url(
            "https://auth.example/consent",
            "client-1",
            "https://app.example/cb",
        )
        .unwrap();
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("scope".into(), SEND_SCOPES.into())));
        assert!(query.contains(&("client_id".into(), "client-1".into())));
    }
}
