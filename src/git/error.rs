//! Git error interpretation
//!
//! libgit2 messages are long and transport specific. Sync results are read
//! by operators, so failures are reduced to a short cause where one can be
//! recognised.

use std::fmt;

use git2::{Error, ErrorClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cause {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    Network,
    Certificate,
    Ssl,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Cause::RepositoryNotFound => "Repository not found",
            Cause::AuthenticationFailed => "Authentication failed",
            Cause::PermissionDenied => "Permission denied",
            Cause::Network => "Network error",
            Cause::Certificate => "Certificate error",
            Cause::Ssl => "SSL error",
        };
        f.write_str(text)
    }
}

// Order matters: "authentication replays" is what a missing repository
// looks like behind a credential prompt.
fn classify(message: &str, class: ErrorClass) -> Option<Cause> {
    let has = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    if has(&["not found", "404", "too many redirects", "authentication replays", "does not exist"]) {
        Some(Cause::RepositoryNotFound)
    } else if has(&["authentication", "credentials"]) {
        Some(Cause::AuthenticationFailed)
    } else if has(&["permission denied", "access denied"]) {
        Some(Cause::PermissionDenied)
    } else if has(&["connection", "network", "timeout", "timed out", "resolve host"]) {
        Some(Cause::Network)
    } else if class == ErrorClass::Http && message.contains("certificate") {
        Some(Cause::Certificate)
    } else if class == ErrorClass::Http && message.contains("ssl") {
        Some(Cause::Ssl)
    } else {
        None
    }
}

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();

    match classify(&message, err.class()) {
        Some(cause) => cause.to_string(),
        None => match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        },
    }
}
