//! On-disk storage of SSO tokens.
//!
//! Tokens live in `auth.json` beside the config file. Writes replace the
//! file atomically; on Unix it has mode `0600`.

use super::AuthServerInformation;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_SKEW_SECONDS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// SSO server the tokens were issued by
    pub server: AuthServerInformation,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Access token is expired (or about to be) at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECONDS) >= self.expires_at
    }

    /// A refresh token exists and has not expired at `now`.
    pub fn can_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.refresh_expires_at) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(expiry)) => now + Duration::seconds(EXPIRY_SKEW_SECONDS) < expiry,
        }
    }

    /// Display name of the signed-in user, read from the access token.
    pub fn username(&self) -> Option<String> {
        super::jwt::preferred_username(&self.access_token)
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, next to `config.toml`.
    pub fn default_location() -> Option<Self> {
        crate::config::Config::config_dir().map(|dir| Self::new(dir.join("auth.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read stored credentials. A missing or unreadable file means signed out.
    pub fn load(&self) -> Option<Credentials> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable credentials: {e}");
                None
            }
        }
    }

    /// Write credentials atomically. The temp file is created with mode
    /// `0600` on Unix and keeps it through the rename.
    pub fn save(&self, credentials: &Credentials) -> io::Result<()> {
        let parent = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;
        let json = serde_json::to_string_pretty(credentials).map_err(io::Error::other)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove stored credentials. Returns whether anything was removed.
    pub fn clear(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(expires_in: i64) -> Credentials {
        Credentials {
            server: AuthServerInformation {
                provider: "keycloak".into(),
                server: "https://sso.example.com".into(),
                realm: "netgpt".into(),
                client_id: "netgpt-tui".into(),
            },
            access_token: "token".into(),
            refresh_token: Some("refresh".into()),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            refresh_expires_at: None,
        }
    }

    #[test]
    fn test_expiry_includes_skew() {
        let now = Utc::now();
        assert!(!credentials(300).is_expired(now));
        assert!(credentials(10).is_expired(now));
        assert!(credentials(-5).is_expired(now));
    }

    #[test]
    fn test_can_refresh() {
        let now = Utc::now();
        let mut creds = credentials(0);
        assert!(creds.can_refresh(now));

        creds.refresh_expires_at = Some(now - Duration::seconds(1));
        assert!(!creds.can_refresh(now));

        creds.refresh_token = None;
        assert!(!creds.can_refresh(now));
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("sub").join("auth.json"));
        assert!(store.load().is_none());

        let creds = credentials(300);
        store.save(&creds).unwrap();
        assert_eq!(store.load(), Some(creds));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("auth.json"));

        let mut long = credentials(300);
        long.access_token = "a".repeat(4096);
        store.save(&long).unwrap();
        let short = credentials(300);
        store.save(&short).unwrap();

        assert_eq!(store.load(), Some(short));
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("auth.json"));
        store.save(&credentials(300)).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
