use serde::{Deserialize, Serialize};

/// Authenticated context passed explicitly to every operation that needs it.
///
/// The session is produced at login, which happens outside this crate; here it
/// is only ever read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Storage abstraction over wherever the front-end keeps the login session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please log in to submit application")]
    NotLoggedIn,
    #[error("failed to read the stored session: {0}")]
    Unreadable(String),
}

/// Load the session, treating its absence as "not logged in".
pub fn require_session(store: &dyn SessionStore) -> Result<Session, SessionError> {
    store.load()?.ok_or(SessionError::NotLoggedIn)
}
