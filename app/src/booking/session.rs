//! Read-only view of the persisted login flag.
//!
//! The flag lives under [`SESSION_STORAGE_KEY`] as `{ "isLoggedIn": bool }`.
//! It is read once the store signals [`PageEvent::SessionReady`] and then kept
//! in sync through storage events coming from other tabs.

use serde_json::Value;
use tracing::debug;

use super::events::PageEvent;

pub const SESSION_STORAGE_KEY: &str = "user";

/// Source of the persisted session blob.
pub trait SessionStore {
    fn read_raw(&self) -> Option<String>;
}

/// Interpret a session blob. Anything other than a JSON object with
/// `isLoggedIn: true` counts as logged out.
pub fn parse_session_flag(raw: Option<&str>) -> bool {
    raw.and_then(|s| serde_json::from_str::<Value>(s).ok())
        .and_then(|v| v.get("isLoggedIn").and_then(Value::as_bool))
        .unwrap_or(false)
}

pub struct SessionObserver<S> {
    store: S,
    logged_in: Option<bool>,
}

impl<S: SessionStore> SessionObserver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            logged_in: None,
        }
    }

    /// Apply a page event. Returns the new flag when it changed.
    pub fn handle_event(&mut self, event: &PageEvent) -> Option<bool> {
        let next = match event {
            PageEvent::SessionReady => parse_session_flag(self.store.read_raw().as_deref()),
            PageEvent::StorageChanged { key: None, .. } => false,
            PageEvent::StorageChanged {
                key: Some(key),
                new_value,
            } if key == SESSION_STORAGE_KEY => parse_session_flag(new_value.as_deref()),
            _ => return None,
        };

        if self.logged_in == Some(next) {
            return None;
        }
        debug!("Session flag is now logged_in={next}");
        self.logged_in = Some(next);
        Some(next)
    }
}
