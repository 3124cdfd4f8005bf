//! Client-held session: an opaque token plus a snapshot of the user record,
//! kept under namespaced keys in the key-value store.
use std::sync::Arc;

use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{error::AuthError, records::UserRecord, storage::KeyValueStore};

const TOKEN_KEY: &str = "auth_token";
const USER_KEY: &str = "user_data";
const REMEMBER_KEY: &str = "remember_me";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_RANDOM_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
    pub remember_me: bool,
}

#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    pub fn token_key(&self) -> String {
        format!("{}{}", self.namespace, TOKEN_KEY)
    }

    pub fn user_key(&self) -> String {
        format!("{}{}", self.namespace, USER_KEY)
    }

    pub fn remember_key(&self) -> String {
        format!("{}{}", self.namespace, REMEMBER_KEY)
    }

    /// `<namespace><9 random base-36 chars><now in millis, base 36>`.
    /// Not verifiable by anyone; it only marks the session as present.
    pub fn generate_token(&self) -> String {
        let mut rng = rand::thread_rng();
        let random: String = (0..TOKEN_RANDOM_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u128;
        format!("{}{}{}", self.namespace, random, to_base36(millis))
    }

    /// Writes the token, then the user data, then the remember-me flag.
    /// The flag is only ever set here, never cleared.
    pub fn persist(&self, session: &Session) -> Result<(), AuthError> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.kv.set(&self.token_key(), &session.token)?;
        self.kv.set(&self.user_key(), &user)?;
        if session.remember_me {
            self.kv.set(&self.remember_key(), "true")?;
        }
        debug!(email = %session.user.email, remember_me = session.remember_me, "session persisted");
        Ok(())
    }

    /// `Ok(None)` unless both token and user data are present and non-empty.
    pub fn load(&self) -> Result<Option<Session>, AuthError> {
        let token = self.kv.get(&self.token_key())?.filter(|v| !v.is_empty());
        let user = self.kv.get(&self.user_key())?.filter(|v| !v.is_empty());
        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };
        let user: UserRecord = serde_json::from_str(&user).map_err(|e| {
            warn!(error = %e, "stored user data is unreadable");
            AuthError::CorruptSession(e.to_string())
        })?;
        let remember_me = self.kv.get(&self.remember_key())?.as_deref() == Some("true");
        Ok(Some(Session {
            token,
            user,
            remember_me,
        }))
    }

    /// Drops token and user data, leaving the remember-me flag.
    pub fn clear_credentials(&self) -> Result<(), AuthError> {
        self.kv.remove(&self.token_key())?;
        self.kv.remove(&self.user_key())?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        self.clear_credentials()?;
        self.kv.remove(&self.remember_key())?;
        Ok(())
    }
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
