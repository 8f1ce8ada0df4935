//! Session-scoped identifier persistence
//!
//! Models the browser session storage of the original client as an
//! explicit context object: a sled store holding the current event
//! identifier and the last attempted one. Reads validate against the
//! identifier format predicate, so a malformed or in-flight marker
//! value is treated as absent rather than surfaced. The store persists
//! across restarts by design; there is no teardown.

use thiserror::Error;
use tracing::warn;

use crate::types::EventId;

const CURRENT_KEY: &str = "current_event_id";
const LAST_ATTEMPTED_KEY: &str = "last_attempted_event_id";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] sled::Error),
}

/// Sled-backed session context passed into workflow constructors.
pub struct SessionStore {
    db: sled::Db,
}

impl SessionStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &str) -> Result<Self, SessionError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// An in-memory store for simulation and tests.
    pub fn temporary() -> Result<Self, SessionError> {
        Ok(Self {
            db: sled::Config::new().temporary(true).open()?,
        })
    }

    /// Identifier the session currently tracks, if a valid one is stored.
    pub fn current(&self) -> Option<EventId> {
        self.get_validated(CURRENT_KEY)
    }

    /// Last attempted identifier, if a valid one is stored. The
    /// pre-submission marker never validates, so this only ever yields
    /// an identifier from a previously confirmed attempt.
    pub fn last_attempted(&self) -> Option<EventId> {
        self.get_validated(LAST_ATTEMPTED_KEY)
    }

    /// Record that a submission is about to happen.
    ///
    /// Written *before* dispatch so an abandoned workflow still leaves a
    /// trace; the marker is deliberately not a valid identifier.
    pub fn record_attempt_marker(&self) -> Result<(), SessionError> {
        let marker = format!("attempting-{}", chrono::Utc::now().timestamp_millis());
        self.db.insert(LAST_ATTEMPTED_KEY, marker.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    /// Record a successfully decoded identifier as both last attempted
    /// and current.
    pub fn record_confirmed(&self, id: &EventId) -> Result<(), SessionError> {
        self.db.insert(LAST_ATTEMPTED_KEY, id.as_str().as_bytes())?;
        self.db.insert(CURRENT_KEY, id.as_str().as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    /// Track an identifier obtained elsewhere (e.g. from a shared link).
    pub fn set_current(&self, id: &EventId) -> Result<(), SessionError> {
        self.db.insert(CURRENT_KEY, id.as_str().as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    /// Raw last-attempted value, bypassing validation. Diagnostic only.
    pub fn raw_last_attempted(&self) -> Option<String> {
        self.get_raw(LAST_ATTEMPTED_KEY)
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        match self.db.get(key) {
            Ok(Some(bytes)) => String::from_utf8(bytes.to_vec()).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "session store read failed");
                None
            }
        }
    }

    fn get_validated(&self, key: &str) -> Option<EventId> {
        let raw = self.get_raw(key)?;
        match EventId::parse(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(key, value = %raw, "ignoring stored value with invalid identifier format");
                None
            }
        }
    }
}
