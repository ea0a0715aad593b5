use std::fmt;

const ACCEPTED_MARKER: &str = "Accepted";
const SSH2_MARKER: &str = "ssh2";
const SESSION_CLOSED_MARKER: &str = "session closed for user";

/// Index of the username token in an accepted-authentication line.
const LOGIN_USER_INDEX: usize = 8;
const LOGOUT_MIN_TOKENS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Login,
    Logout,
}

impl SessionKind {
    /// Verb used in notification bodies ("just logged in").
    pub fn verb(&self) -> &'static str {
        match self {
            SessionKind::Login => "in",
            SessionKind::Logout => "out",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Login => write!(f, "Login"),
            SessionKind::Logout => write!(f, "Logout"),
        }
    }
}

/// A login or logout attributed to a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    username: String,
    kind: SessionKind,
}

impl SessionEvent {
    pub fn new(username: impl Into<String>, kind: SessionKind) -> Self {
        Self {
            username: username.into(),
            kind,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Notification title, e.g. `SSH Login Detected`.
    pub fn title(&self) -> String {
        format!("SSH {} Detected", self.kind)
    }

    /// Notification body, e.g. `alice just logged in`.
    pub fn message(&self) -> String {
        format!("{} just logged {}", self.username, self.kind.verb())
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SSH {} Detected: {}", self.kind, self.username)
    }
}

/// Extract a session event from a single auth log line.
///
/// Only two shapes are recognised: sshd's `Accepted ... ssh2` line, where the
/// username is the ninth whitespace token, and pam's `session closed for user
/// <name>` line, where it is the last token. Anything else yields `None`.
pub fn parse_line(line: &str) -> Option<SessionEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.contains(ACCEPTED_MARKER) && line.contains(SSH2_MARKER) {
        let username = line.split_whitespace().nth(LOGIN_USER_INDEX)?;
        return Some(SessionEvent::new(username, SessionKind::Login));
    }

    if line.contains(SESSION_CLOSED_MARKER) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < LOGOUT_MIN_TOKENS {
            return None;
        }
        let username = tokens.last()?;
        return Some(SessionEvent::new(*username, SessionKind::Logout));
    }

    None
}
