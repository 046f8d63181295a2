use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue};
use dashmap::DashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "reelsmith_session";

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub openai_api_key: Option<String>,
    pub replicate_api_key: Option<String>,
    pub last_video: Option<String>,
}

struct StoredSession {
    data: SessionData,
    touched_at: Instant,
}

/// Server-side session map keyed by an opaque cookie value.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, StoredSession>>,
    ttl: Duration,
}

/// The caller's session id, and whether the response must set the cookie.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: String,
    pub is_new: bool,
}

impl SessionHandle {
    pub fn set_cookie(&self, ttl: Duration) -> Option<(header::HeaderName, HeaderValue)> {
        if !self.is_new {
            return None;
        }
        let value = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            self.id,
            ttl.as_secs()
        );
        HeaderValue::from_str(&value)
            .ok()
            .map(|value| (header::SET_COOKIE, value))
    }

    pub fn response_headers(&self, ttl: Duration) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some((name, value)) = self.set_cookie(ttl) {
            headers.insert(name, value);
        }
        headers
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Reuses the live session named by the request cookie or opens a new one.
    pub fn resolve(&self, headers: &HeaderMap) -> SessionHandle {
        if let Some(id) = session_id_from_headers(headers) {
            if self.get(&id).is_some() {
                return SessionHandle { id, is_new: false };
            }
        }
        let id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            id.clone(),
            StoredSession {
                data: SessionData::default(),
                touched_at: Instant::now(),
            },
        );
        SessionHandle { id, is_new: true }
    }

    pub fn get(&self, id: &str) -> Option<SessionData> {
        let entry = self.sessions.get(id)?;
        if entry.touched_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.data.clone())
    }

    /// Looks up the session for a request without creating one.
    pub fn for_request(&self, headers: &HeaderMap) -> SessionData {
        session_id_from_headers(headers)
            .and_then(|id| self.get(&id))
            .unwrap_or_default()
    }

    pub fn update<F>(&self, id: &str, apply: F)
    where
        F: FnOnce(&mut SessionData),
    {
        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| StoredSession {
                data: SessionData::default(),
                touched_at: Instant::now(),
            });
        apply(&mut entry.data);
        entry.touched_at = Instant::now();
    }

    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.sessions
            .retain(|_, session| session.touched_at.elapsed() < ttl);
        tracing::info!("Session eviction complete. Current size: {}", self.sessions.len());
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
