use std::result;

use log::{debug, error, info};
use warp::http;

use crate::auth::{self, CredentialChecker, Decision, LoginAttempt};
use crate::joke::{FetchError, JokeClient, JokeResult};
use crate::session::{SessionRecord, Sessions};

/// The application core: owns the credential checker, the outbound joke
/// client and the session layer. Handlers reach it through an `Arc`.
pub struct Portal {
    checker: Box<dyn CredentialChecker>,
    jokes: JokeClient,
    sessions: Sessions,
}

#[derive(Copy, Clone, Debug)]
pub enum Error {
    Internal,
}

pub type Result<T> = result::Result<T, Error>;

impl Into<http::StatusCode> for Error {
    fn into(self) -> http::StatusCode {
        match self {
            Self::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl warp::reject::Reject for Error {}

pub enum LoginOutcome {
    /// A session may be opened for this username.
    Granted { session: SessionRecord },
    /// Shown inline on the re-rendered form.
    Denied { message: String },
}

impl Portal {
    pub fn new(checker: Box<dyn CredentialChecker>, jokes: JokeClient, sessions: Sessions) -> Self {
        Self {
            checker,
            jokes,
            sessions,
        }
    }

    /// The gate in front of every protected page.
    pub fn authenticate(&self, cookie: Option<String>) -> Option<SessionRecord> {
        self.sessions.decode(cookie)
    }

    pub fn login(&self, attempt: &LoginAttempt) -> LoginOutcome {
        let Some((username, password)) = attempt.fields() else {
            debug!("login submission with missing fields");
            return LoginOutcome::Denied {
                message: auth::ERR_MISSING_FIELDS.into(),
            };
        };

        match self.checker.check(username, password) {
            Decision::Granted => {
                info!("{username} logged in");
                LoginOutcome::Granted {
                    session: SessionRecord {
                        username: username.into(),
                    },
                }
            }
            Decision::Denied { message } => {
                info!("{username} login rejected: {message}");
                LoginOutcome::Denied { message }
            }
        }
    }

    /// `Set-Cookie` value for a freshly granted session.
    pub fn open_session(&self, record: &SessionRecord) -> Result<String> {
        self.sessions.issue(record).map_err(|e| {
            error!("couldn't serialize session record: {e:?}");
            Error::Internal
        })
    }

    /// `Set-Cookie` value dropping whatever session the client had.
    pub fn close_session(&self, record: Option<&SessionRecord>) -> String {
        match record {
            Some(SessionRecord { username }) => info!("{username} logged out"),
            None => debug!("logout without a session"),
        }

        self.sessions.clear()
    }

    pub async fn fetch_joke(&self) -> result::Result<JokeResult, FetchError> {
        let result = self.jokes.fetch().await?;
        info!("fetched a joke at {}", result.fetched_at);
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use cookie::Key;

    use crate::auth::PrefixChecker;
    use crate::joke;

    fn portal() -> Portal {
        Portal::new(
            Box::new(PrefixChecker),
            JokeClient::new(joke::DEFAULT_URL.into()).unwrap(),
            Sessions::new(Key::generate(), false),
        )
    }

    #[test]
    fn granted_login_round_trips_through_the_gate() {
        let portal = portal();
        let attempt = LoginAttempt::new(Some("nicky"), Some("pw"));

        let LoginOutcome::Granted { session } = portal.login(&attempt) else {
            panic!("expected a granted login");
        };
        assert_eq!(session.username, "nicky");

        let set_cookie = portal.open_session(&session).unwrap();
        let value = cookie::Cookie::parse(set_cookie).unwrap().value().to_string();

        assert_eq!(portal.authenticate(Some(value)), Some(session));
    }

    #[test]
    fn missing_fields_are_denied_inline() {
        let attempt = LoginAttempt::new(Some("nick"), None);

        let LoginOutcome::Denied { message } = portal().login(&attempt) else {
            panic!("expected a denied login");
        };
        assert_eq!(message, auth::ERR_MISSING_FIELDS);
    }

    #[test]
    fn close_session_works_without_one() {
        let clear = portal().close_session(None);
        assert!(clear.contains("Max-Age=0"));
    }
}
