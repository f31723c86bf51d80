//! The authenticated identity of the console user.
//!
//! [`SessionState`] is the only writer of the current session. Everything else
//! reads it through [`SessionState::current`] or a [`SessionState::subscribe`]d
//! receiver, and always sees a whole value: sessions are replaced, never edited.

use super::auth::{AuthTokenValue, AuthenticationError, Authenticator};
use super::permissions::{is_allowed, parse_role, Action, Role};
use crate::local_storage::{LocalStorage, Saved, StorageError, ACCESS_TOKEN_KEY, SESSION_USER_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub token: AuthTokenValue,
}

impl Session {
    pub fn is_allowed(&self, action: Action) -> bool {
        is_allowed(self.role, action)
    }
}

/// Persisted form of a session, stored under [`SESSION_USER_KEY`].
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    username: String,
    role: String,
}

pub struct SessionState {
    storage: Arc<dyn LocalStorage>,
    authenticator: Arc<dyn Authenticator>,
    current: watch::Sender<Option<Session>>,
}

impl SessionState {
    /// Starts logged out. Call [`SessionState::rehydrate`] to pick up a persisted session.
    pub fn new(storage: Arc<dyn LocalStorage>, authenticator: Arc<dyn Authenticator>) -> Self {
        let (current, _) = watch::channel(None);
        SessionState {
            storage,
            authenticator,
            current,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    /// Checks the credentials with the backend, then persists and publishes the new session.
    /// On failure the current session is left untouched.
    ///
    /// A session that could not be saved is still logged in, the returned [`Saved`]
    /// carries the storage error.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Saved<Session>, AuthenticationError> {
        let response = self
            .authenticator
            .authenticate(username, password)
            .await
            .inspect_err(|err| warn!("Login failed for {}: {}", username, err))?;

        let role = match response.role.as_deref() {
            Some(raw) => {
                let role = parse_role(raw);
                if Role::from_str(raw).is_none() {
                    warn!(
                        "Backend returned unrecognized role {:?} for {}, using {}",
                        raw, username, role
                    );
                }
                role
            }
            None => {
                warn!(
                    "Backend returned no role for {}, using {}",
                    username,
                    Role::LEAST_PRIVILEGED
                );
                Role::LEAST_PRIVILEGED
            }
        };

        let username = if response.username.trim().is_empty() {
            username.to_string()
        } else {
            response.username
        };

        let session = Session {
            username,
            role,
            token: response.token,
        };
        let persisted = self.persist(&session);
        info!("Logged in as {} ({})", session.username, session.role);
        self.current.send_replace(Some(session.clone()));
        Ok(Saved::new(session, persisted))
    }

    /// Clears the persisted session and publishes the logged out state.
    pub fn logout(&self) {
        self.clear_persisted();
        if self.current.send_replace(None).is_some() {
            info!("Logged out");
        }
    }

    /// Restores the persisted session, if any. A corrupt or incomplete record is
    /// deleted and treated as logged out.
    pub fn rehydrate(&self) -> Option<Session> {
        let session = self.read_persisted();
        match &session {
            Some(session) => debug!("Restored session of {} ({})", session.username, session.role),
            None => debug!("No session to restore"),
        }
        self.current.send_replace(session.clone());
        session
    }

    fn read_persisted(&self) -> Option<Session> {
        let token = self.storage.read_text(ACCESS_TOKEN_KEY);
        let record = self.storage.read_text(SESSION_USER_KEY);

        let (token, record) = match (token, record) {
            (Ok(Some(token)), Ok(Some(record))) => (token, record),
            (Ok(None), Ok(None)) => return None,
            (Err(err), _) | (_, Err(err)) => {
                warn!("Could not read persisted session, discarding it: {}", err);
                self.clear_persisted();
                return None;
            }
            _ => {
                warn!("Persisted session is incomplete, discarding it");
                self.clear_persisted();
                return None;
            }
        };

        let record = match serde_json::from_str::<SessionRecord>(&record) {
            Ok(record) => record,
            Err(err) => {
                warn!("Persisted session is malformed, discarding it: {}", err);
                self.clear_persisted();
                return None;
            }
        };

        if token.trim().is_empty()
            || record.username.trim().is_empty()
            || record.role.trim().is_empty()
        {
            warn!("Persisted session has blank fields, discarding it");
            self.clear_persisted();
            return None;
        }

        Some(Session {
            username: record.username,
            role: parse_role(&record.role),
            token: AuthTokenValue(token),
        })
    }

    /// Writes the token and the user record. Both keys are kept or neither is.
    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let record = SessionRecord {
            username: session.username.clone(),
            role: session.role.as_str().to_string(),
        };
        let result = serde_json::to_string(&record)
            .map_err(|err| StorageError::Write {
                key: SESSION_USER_KEY.to_string(),
                reason: err.to_string(),
            })
            .and_then(|record| {
                self.storage
                    .write_text(ACCESS_TOKEN_KEY, session.token.as_str())?;
                self.storage.write_text(SESSION_USER_KEY, &record)
            });
        if let Err(err) = &result {
            warn!("Session will not survive a restart: {}", err);
            self.clear_persisted();
        }
        result
    }

    fn clear_persisted(&self) {
        for key in [ACCESS_TOKEN_KEY, SESSION_USER_KEY] {
            if let Err(err) = self.storage.remove_key(key) {
                warn!("Failed to delete persisted {}: {}", key, err);
            }
        }
    }
}
