use base64_light::{base64_decode, base64_encode};
use cookie::{Cookie, CookieJar, Key, SameSite};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use time::Duration;

pub const SESSION_COOKIE: &str = "session";

/// Environment variable holding the session-signing key material,
/// at least 32 bytes of it.
pub const KEY_ENV_VAR: &str = "DADPORTAL_SESSION_KEY";

const MIN_KEY_LEN: usize = 32;

/// Per-client state carried across requests. A request is logged in
/// iff a record for it decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub username: String,
}

#[derive(Debug)]
pub enum KeyError {
    TooShort,
}

/// The signing key comes from the environment so deployments share
/// sessions across restarts. Without one we make do with a process-local
/// key and say so.
pub fn load_key() -> Result<Key, KeyError> {
    match std::env::var(KEY_ENV_VAR) {
        Ok(material) => {
            if material.len() < MIN_KEY_LEN {
                error!("{KEY_ENV_VAR} must be at least {MIN_KEY_LEN} bytes");
                return Err(KeyError::TooShort);
            }
            Ok(Key::derive_from(material.as_bytes()))
        }
        Err(_) => {
            warn!("{KEY_ENV_VAR} not set, generating a key; sessions won't survive a restart");
            Ok(Key::generate())
        }
    }
}

/// Issues and verifies the signed session cookie.
pub struct Sessions {
    key: Key,
    secure: bool,
}

impl Sessions {
    pub fn new(key: Key, secure: bool) -> Self {
        Self { key, secure }
    }

    /// `Set-Cookie` value establishing `record` for this client.
    pub fn issue(&self, record: &SessionRecord) -> Result<String, serde_json::Error> {
        let body = base64_encode(&serde_json::to_string(record)?);

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.key).add(self.base_cookie(body));

        // the signed jar writes the signed form back into the parent jar
        let signed = jar.get(SESSION_COOKIE).expect("cookie was just added");
        Ok(signed.to_string())
    }

    /// Verifies a raw cookie value and recovers the record it carries.
    pub fn decode(&self, raw: Option<String>) -> Option<SessionRecord> {
        let raw = raw?;

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(SESSION_COOKIE, raw));

        let cookie = match jar.signed(&self.key).get(SESSION_COOKIE) {
            Some(cookie) => cookie,
            None => {
                debug!("session cookie failed verification");
                return None;
            }
        };

        match serde_json::from_slice(&base64_decode(cookie.value())) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("session cookie didn't parse: {e:?}");
                None
            }
        }
    }

    /// `Set-Cookie` value removing the session. Safe to send to clients
    /// that never had one.
    pub fn clear(&self) -> String {
        let mut cookie = self.base_cookie(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie.to_string()
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(self.secure);
        cookie
    }
}
