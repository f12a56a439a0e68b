//! The authentication collaborator this crate consumes but does not
//! implement. Token acquisition, refresh, and keyring/disk persistence are
//! deliberately out of scope (§1); only the `join`/`refresh` calls and the
//! `username`/`uuid` fields matter to the login handshake.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct AuthError(pub String);

/// Mirrors `Authentication.refresh`/`.join`/`.user` from the Mojang auth
/// collaborator: the core calls `refresh` before logging in, `join` during
/// the encryption handshake, and reads `username`/`uuid` to build
/// `LoginStart`.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Refreshes the session token prior to login. A no-op for offline-mode
    /// authenticators.
    async fn refresh(&mut self) -> Result<(), AuthError>;

    /// Requests the Mojang session server record this client as having
    /// joined a server identified by `server_hash`. Returns `true` on
    /// success (HTTP 204).
    async fn join(&self, server_hash: &str) -> Result<bool, AuthError>;

    fn username(&self) -> &str;

    fn uuid(&self) -> Uuid;
}

/// An authenticator for unauthenticated ("cracked"/offline-mode) play: no
/// network calls, a deterministic offline UUID derived the way vanilla
/// servers derive one for non-premium accounts
/// (`UUID v3` of `"OfflinePlayer:<username>"`).
#[derive(Clone, Debug)]
pub struct OfflineAuthenticator {
    username: String,
    uuid: Uuid,
}

impl OfflineAuthenticator {
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        let uuid = Uuid::new_v3(
            &Uuid::NAMESPACE_DNS,
            format!("OfflinePlayer:{username}").as_bytes(),
        );
        Self { username, uuid }
    }
}

#[async_trait]
impl Authenticator for OfflineAuthenticator {
    async fn refresh(&mut self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn join(&self, _server_hash: &str) -> Result<bool, AuthError> {
        Ok(true)
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_uuid_is_deterministic() {
        let a = OfflineAuthenticator::new("Notch");
        let b = OfflineAuthenticator::new("Notch");
        assert_eq!(a.uuid, b.uuid);
        let c = OfflineAuthenticator::new("jeb_");
        assert_ne!(a.uuid, c.uuid);
    }
}
