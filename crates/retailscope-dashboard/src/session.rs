//! In-memory login sessions and the per-retailer panel state they own.
//!
//! Nothing here survives a restart. The lock is only held for map access;
//! callers must release it before awaiting network I/O.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};
use retailscope_core::PanelState;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "retailscope_session";

#[derive(Debug)]
pub struct Session {
    pub username: String,
    pub created_at: DateTime<Utc>,
    panels: HashMap<String, PanelState>,
}

/// The authenticated session for the current request, set by
/// [`crate::middleware::require_session`].
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub username: String,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Creates a session for `username` and returns its id.
    pub async fn create(&self, username: String) -> String {
        let id = Uuid::new_v4().to_string();
        let session = Session {
            username,
            created_at: Utc::now(),
            panels: HashMap::new(),
        };
        self.inner.lock().await.insert(id.clone(), session);
        id
    }

    pub async fn lookup(&self, id: &str) -> Option<CurrentSession> {
        self.inner.lock().await.get(id).map(|s| CurrentSession {
            id: id.to_owned(),
            username: s.username.clone(),
            signed_in_at: s.created_at,
        })
    }

    /// Removes the session and every panel it owns.
    pub async fn remove(&self, id: &str) -> bool {
        self.inner.lock().await.remove(id).is_some()
    }

    /// Runs `f` against the session's panel for `slug`, creating it on first
    /// use. Returns `None` when the session no longer exists.
    pub async fn with_panel<R>(
        &self,
        id: &str,
        slug: &str,
        f: impl FnOnce(&mut PanelState) -> R,
    ) -> Option<R> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(id)?;
        let panel = session.panels.entry(slug.to_owned()).or_default();
        Some(f(panel))
    }

    /// Copy of a panel for rendering; a fresh panel when none exists yet.
    pub async fn panel_snapshot(&self, id: &str, slug: &str) -> Option<PanelState> {
        let sessions = self.inner.lock().await;
        let session = sessions.get(id)?;
        Some(session.panels.get(slug).cloned().unwrap_or_default())
    }

    /// Slugs of panels that hold a result or history, for the dashboard.
    pub async fn active_panels(&self, id: &str) -> Vec<String> {
        let sessions = self.inner.lock().await;
        let Some(session) = sessions.get(id) else {
            return Vec::new();
        };
        let mut slugs: Vec<String> = session
            .panels
            .iter()
            .filter(|(_, p)| p.product.is_some() || p.category.is_some() || !p.history.is_empty())
            .map(|(slug, _)| slug.clone())
            .collect();
        slugs.sort();
        slugs
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Reads the session id from the `Cookie` header.
#[must_use]
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for a new session.
#[must_use]
pub fn session_cookie(id: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; retailscope_session=abc-123; lang=en"),
        );
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn missing_or_blank_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert!(session_id_from_headers(&headers).is_none());
        headers.insert(COOKIE, HeaderValue::from_static("retailscope_session="));
        assert!(session_id_from_headers(&headers).is_none());
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("abc", false);
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
        assert!(session_cookie("abc", true).ends_with("; Secure"));
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn remove_discards_panels() {
        let store = SessionStore::default();
        let id = store.create("admin".to_string()).await;
        store
            .with_panel(&id, "amazon", |p| p.url = "x".to_string())
            .await
            .expect("session exists");
        assert_eq!(
            store.panel_snapshot(&id, "amazon").await.map(|p| p.url),
            Some("x".to_string())
        );

        assert!(store.remove(&id).await);
        assert!(store.lookup(&id).await.is_none());
        assert!(store.with_panel(&id, "amazon", |_| ()).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::default();
        let a = store.create("admin".to_string()).await;
        let b = store.create("admin".to_string()).await;
        assert_ne!(a, b);
        store
            .with_panel(&a, "amazon", |p| p.url = "only-a".to_string())
            .await;
        assert_eq!(
            store.panel_snapshot(&b, "amazon").await.map(|p| p.url),
            Some(String::new())
        );
    }
}
