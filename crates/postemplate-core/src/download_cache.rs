//! Short-lived storage bridging template generation and the later download request.
//!
//! Entries are keyed by a random token, removed on first read, and expire after a fixed TTL.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadToken(Uuid);

impl DownloadToken {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for DownloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub contents: Vec<u8>,
}

#[derive(Debug)]
struct CachedDownload {
    artifact: DownloadArtifact,
    expires_at: DateTime<Utc>,
}

impl CachedDownload {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
pub struct DownloadCache {
    ttl: Duration,
    entries: Mutex<HashMap<DownloadToken, CachedDownload>>,
}

impl DownloadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<DownloadToken, CachedDownload>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, artifact: DownloadArtifact, now: DateTime<Utc>) -> DownloadToken {
        let mut entries = self.entries();
        let mut token = DownloadToken::generate();
        while entries.contains_key(&token) {
            token = DownloadToken::generate();
        }
        entries.insert(
            token,
            CachedDownload {
                artifact,
                expires_at: now
                    .checked_add_signed(self.ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
        token
    }

    /// Removes and returns the artifact. Unknown, consumed and expired tokens yield `None`.
    pub fn take(&self, token: &DownloadToken, now: DateTime<Utc>) -> Option<DownloadArtifact> {
        let cached = self.entries().remove(token)?;
        cached.is_live(now).then_some(cached.artifact)
    }

    pub fn peek_filename(&self, token: &DownloadToken, now: DateTime<Utc>) -> Option<String> {
        self.entries()
            .get(token)
            .filter(|cached| cached.is_live(now))
            .map(|cached| cached.artifact.filename.clone())
    }

    /// Drops every expired entry and reports how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, cached| cached.is_live(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
