//! Signed-cookie session store.
//!
//! Session state lives entirely in the client's cookie:
//! `base64url(json) "." hex(hmac_sha256(secret, base64url(json)))`.
//! A cookie that is missing, malformed, unsigned or too old loads as a new,
//! empty session.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::config::SessionConfig;
use crate::database::models::SessionUser;

type HmacSha256 = Hmac<Sha256>;

/// Session key holding the logged-in user
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Session cookie is not a valid header value")]
    InvalidHeader,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionPayload {
    values: BTreeMap<String, Value>,
    issued_at: i64,
}

/// Values carried between requests for one browser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    values: BTreeMap<String, Value>,
    is_new: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            is_new: true,
        }
    }

    /// True when no valid cookie came with the request
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.values
            .get(USER_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn set_user(&mut self, user: &SessionUser) -> Result<(), SessionError> {
        self.values.insert(USER_KEY.to_string(), serde_json::to_value(user)?);
        Ok(())
    }
}

/// Encodes and verifies session cookies. Cheap to clone; shared by every request.
#[derive(Clone)]
pub struct SessionStore {
    secret: Arc<Vec<u8>>,
    cookie_name: String,
    max_age_secs: i64,
    secure: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("cookie_name", &self.cookie_name)
            .field("max_age_secs", &self.max_age_secs)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secret: Arc::new(config.cookie_secret.as_bytes().to_vec()),
            cookie_name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs,
            secure: config.secure_cookie,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Read the session from the request's Cookie headers
    pub fn load(&self, headers: &HeaderMap) -> Session {
        match self.cookie_value(headers) {
            Some(value) => self.decode(&value).unwrap_or_else(|| {
                tracing::debug!("Ignoring invalid or expired session cookie");
                Session::new()
            }),
            None => Session::new(),
        }
    }

    /// Build the Set-Cookie header that stores `session`
    pub fn save(&self, session: &Session) -> Result<HeaderValue, SessionError> {
        let value = self.encode(session)?;
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, value, self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(|_| SessionError::InvalidHeader)
    }

    /// Build the Set-Cookie header that deletes the session cookie
    pub fn expire(&self) -> HeaderValue {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("session=; Max-Age=0"))
    }

    fn cookie_value(&self, headers: &HeaderMap) -> Option<String> {
        let prefix = format!("{}=", self.cookie_name);
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .map(str::trim)
            .find_map(|cookie| cookie.strip_prefix(prefix.as_str()).map(str::to_string))
    }

    fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let payload = SessionPayload {
            values: session.values.clone(),
            issued_at: Utc::now().timestamp(),
        };
        let body = BASE64.encode(serde_json::to_vec(&payload)?);
        let signature = hex::encode(self.mac(body.as_bytes()).finalize().into_bytes());
        Ok(format!("{}.{}", body, signature))
    }

    fn decode(&self, value: &str) -> Option<Session> {
        let (body, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        // verify_slice compares in constant time
        self.mac(body.as_bytes()).verify_slice(&signature).ok()?;

        let payload: SessionPayload = serde_json::from_slice(&BASE64.decode(body).ok()?).ok()?;
        let age = Utc::now().timestamp() - payload.issued_at;
        if age < 0 || age > self.max_age_secs {
            return None;
        }

        Some(Session {
            values: payload.values,
            is_new: false,
        })
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(data);
        mac
    }
}
