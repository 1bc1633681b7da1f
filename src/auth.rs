//! Identity provider token handling
//!
//! The identity provider issues the bearer token out of band; this client
//! only needs to find it. A token given on the command line (or through
//! `QUERYGPT_TOKEN`) wins over one saved in the OS keyring with
//! `querygpt auth login`. Refresh and expiry are the provider's business.

use crate::error::{QueryGptError, Result};

const KEYRING_SERVICE: &str = "querygpt";
const KEYRING_ACCOUNT: &str = "identity-token";

/// Something that can hand out the current bearer token
pub trait TokenSource {
    /// Returns `Ok(None)` when no token is available.
    fn token(&self) -> Result<Option<String>>;
}

/// A token fixed at construction time
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn token(&self) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}

/// Stateless accessor for the token saved in the OS keyring
///
/// # Examples
///
/// ```no_run
/// use querygpt::auth::{KeyringTokenStore, TokenSource};
///
/// let store = KeyringTokenStore;
/// store.save("token-from-identity-provider").unwrap();
/// assert!(store.token().unwrap().is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringTokenStore;

impl KeyringTokenStore {
    fn entry() -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
            .map_err(|e| QueryGptError::Keyring(e).into())
    }

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`QueryGptError::MissingCredentials`] for a blank token and
    /// [`QueryGptError::Keyring`] if the credential store rejects the write.
    pub fn save(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(QueryGptError::MissingCredentials("token is empty".to_string()).into());
        }
        Self::entry()?
            .set_password(token)
            .map_err(QueryGptError::Keyring)?;
        tracing::info!("Stored identity token in keyring");
        Ok(())
    }

    /// Remove the stored token; a no-op when none exists.
    pub fn delete(&self) -> Result<()> {
        match Self::entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(QueryGptError::Keyring(e).into()),
        }
    }
}

impl TokenSource for KeyringTokenStore {
    fn token(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(QueryGptError::Keyring(e).into()),
        }
    }
}

/// Where the active token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    /// `--token` flag or `QUERYGPT_TOKEN`
    Explicit,
    /// Saved with `querygpt auth login`
    Stored,
    /// No token available
    Missing,
}

impl std::fmt::Display for TokenOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "command line / QUERYGPT_TOKEN"),
            Self::Stored => write!(f, "OS keyring"),
            Self::Missing => write!(f, "none"),
        }
    }
}

/// Pick the token to use for this run.
///
/// Blank tokens count as absent. A keyring failure is logged and treated as
/// "no stored token" so that the client still starts; authenticated actions
/// then no-op as they would for a signed-out user.
///
/// # Examples
///
/// ```
/// use querygpt::auth::{resolve_token, StaticToken, TokenOrigin};
///
/// let (token, origin) = resolve_token(Some("abc".to_string()), &StaticToken(None));
/// assert_eq!(token.as_deref(), Some("abc"));
/// assert_eq!(origin, TokenOrigin::Explicit);
/// ```
pub fn resolve_token(
    explicit: Option<String>,
    stored: &dyn TokenSource,
) -> (Option<String>, TokenOrigin) {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return (Some(token), TokenOrigin::Explicit);
    }

    match stored.token() {
        Ok(Some(token)) if !token.trim().is_empty() => (Some(token), TokenOrigin::Stored),
        Ok(_) => (None, TokenOrigin::Missing),
        Err(e) => {
            tracing::warn!("Could not read stored token: {}", e);
            (None, TokenOrigin::Missing)
        }
    }
}
