use crate::booking::session::{SESSION_STORAGE_KEY, SessionStore};

/// Local storage key that overrides the configured places API key.
pub const API_KEY_OVERRIDE_KEY: &str = "placesApiKey";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn read_local(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub struct LocalSessionStore;

impl SessionStore for LocalSessionStore {
    fn read_raw(&self) -> Option<String> {
        read_local(SESSION_STORAGE_KEY)
    }
}
