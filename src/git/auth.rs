//! Git authentication for catalog repositories
//!
//! Public catalogs need no credentials. Private ones authenticate through
//! git's native credential system:
//! - SSH agent, then SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (`GIT_SSH_COMMAND`, etc.)

use git2::{Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};
use tracing::trace;

const SSH_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_error(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn ssh_credentials(username: &str) -> Result<Cred, Error> {
    if let Ok(cred) = Cred::ssh_key_from_agent(username) {
        return Ok(cred);
    }

    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");
    for key_name in SSH_KEY_NAMES {
        let private_key = ssh_dir.join(key_name);
        if !private_key.exists() {
            continue;
        }
        let public_key = ssh_dir.join(format!("{key_name}.pub"));
        let public_key = public_key.exists().then_some(public_key.as_path());

        if let Ok(cred) = Cred::ssh_key(username, public_key, &private_key, None) {
            return Ok(cred);
        }
    }

    Err(auth_error("SSH key not found"))
}

fn user_pass_credentials(url: &str, username_from_url: Option<&str>) -> Result<Cred, Error> {
    if let Ok(config) = git2::Config::open_default() {
        if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
            return Ok(cred);
        }
    }

    // Anonymous access lets the server answer with its real error
    Cred::userpass_plaintext(username_from_url.unwrap_or(""), "")
}

/// Set up authentication callbacks for git operations
pub fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks) {
    callbacks.credentials(|url, username_from_url, allowed_types| {
        trace!(url, ?allowed_types, "Git credentials requested");

        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }
        if allowed_types.contains(CredentialType::SSH_KEY) {
            return ssh_credentials(username_from_url.unwrap_or("git"));
        }
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return user_pass_credentials(url, username_from_url);
        }

        Err(auth_error("authentication failed"))
    });
}
