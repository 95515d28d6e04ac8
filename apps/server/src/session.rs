use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::http::{HeaderMap, header};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "wfm_session";

struct SessionEntry {
    email: String,
    created_at: Instant,
}

/// Server-side session store.
///
/// Browsers carry only a random session id in an HttpOnly cookie; the
/// authenticated email lives here. Expired entries are purged on access.
pub struct SessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session for an authenticated email and return its id.
    pub fn create(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            id,
            SessionEntry {
                email: email.to_string(),
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Resolve a session id to its email, dropping the session if expired.
    pub fn email_for(&self, id: Uuid) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&id) {
            Some(entry) if entry.created_at.elapsed() <= self.ttl => Some(entry.email.clone()),
            Some(_) => {
                entries.remove(&id);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, id: Uuid) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

/// Extract the session id from the request's Cookie headers, if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if name == SESSION_COOKIE {
                if let Ok(id) = Uuid::parse_str(value.trim()) {
                    return Some(id);
                }
            }
        }
    }
    None
}
