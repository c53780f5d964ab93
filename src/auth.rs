use serde::Deserialize;

pub const ERR_CHANGE_PASSWORD: &str = "Please change your password before logging in.";
pub const ERR_UNKNOWN_USER: &str = r#"Invalid username. Must start with "nick" or "Tristan"."#;
pub const ERR_MISSING_FIELDS: &str = "Both username and password are required.";

/// One submitted login form. Either field may be absent if the client
/// bypasses the page.
#[derive(Debug, Deserialize)]
pub struct LoginAttempt {
    username: Option<String>,
    password: Option<String>,
}

impl LoginAttempt {
    pub fn fields(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn new(username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            username: username.map(Into::into),
            password: password.map(Into::into),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied { message: String },
}

/// Decides whether a login attempt may open a session.
pub trait CredentialChecker: Send + Sync {
    fn check(&self, username: &str, password: &str) -> Decision;
}

/// The rule carried over from the first deployment: usernames are
/// classified by prefix and the password is read but never verified.
///
/// The second branch matches lowercase "tristan" while the
/// unknown-user message advertises "Tristan" - kept as found, pending
/// clarification with the owners.
pub struct PrefixChecker;

impl CredentialChecker for PrefixChecker {
    fn check(&self, username: &str, _password: &str) -> Decision {
        if username.starts_with("nick") {
            Decision::Granted
        } else if username.starts_with("tristan") {
            Decision::Denied {
                message: ERR_CHANGE_PASSWORD.into(),
            }
        } else {
            Decision::Denied {
                message: ERR_UNKNOWN_USER.into(),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check(username: &str) -> Decision {
        PrefixChecker.check(username, "hunter2")
    }

    #[test]
    fn nick_prefix_is_granted() {
        assert_eq!(check("nick"), Decision::Granted);
        assert_eq!(check("nicholas"), Decision::Granted);
    }

    #[test]
    fn tristan_prefix_must_change_password() {
        assert_eq!(
            check("tristan"),
            Decision::Denied {
                message: ERR_CHANGE_PASSWORD.into()
            }
        );
        assert_eq!(
            check("tristanh"),
            Decision::Denied {
                message: ERR_CHANGE_PASSWORD.into()
            }
        );
    }

    #[test]
    fn prefixes_are_case_sensitive() {
        // capitalised "Tristan" falls through to the unknown-user branch,
        // despite what the message suggests
        assert_eq!(
            check("Tristan"),
            Decision::Denied {
                message: ERR_UNKNOWN_USER.into()
            }
        );
        assert_eq!(
            check("Nick"),
            Decision::Denied {
                message: ERR_UNKNOWN_USER.into()
            }
        );
    }

    #[test]
    fn anything_else_is_unknown() {
        for username in ["", "alice", "nic", "trista"] {
            assert_eq!(
                check(username),
                Decision::Denied {
                    message: ERR_UNKNOWN_USER.into()
                }
            );
        }
    }

    #[test]
    fn missing_fields_never_reach_the_checker() {
        assert!(LoginAttempt::new(Some("nick"), None).fields().is_none());
        assert!(LoginAttempt::new(None, Some("pw")).fields().is_none());
        assert!(LoginAttempt::new(None, None).fields().is_none());

        let attempt = LoginAttempt::new(Some("nick"), Some("pw"));
        assert_eq!(attempt.fields(), Some(("nick", "pw")));
    }
}
