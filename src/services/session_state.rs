use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sessionid";

/// Reefs remembered per session on the recently-viewed list.
const MAX_VIEWED_REEFS: usize = 10;

/// Sessions kept in memory at once. Session ids come from an unauthenticated
/// cookie, so the map must stay bounded: once full, writing to an unseen
/// session id evicts the least-recently-written session.
const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReefFilters {
    pub search: String,
    pub region: String,
    pub health: String,
}

#[derive(Debug, Default)]
struct SessionData {
    last_reef_filters: Option<ReefFilters>,
    viewed_reefs: Vec<Uuid>,
    last_written: u64,
}

#[derive(Debug, Default)]
struct StoreInner {
    sessions: HashMap<String, SessionData>,
    // Logical clock stamped onto every write; drives eviction order.
    clock: u64,
}

impl StoreInner {
    /// Fetch the session for a write, evicting the least-recently-written
    /// session first when an unseen id would push the map past `MAX_SESSIONS`.
    fn entry_for_write(&mut self, session_id: &str) -> &mut SessionData {
        if !self.sessions.contains_key(session_id) && self.sessions.len() >= MAX_SESSIONS {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, data)| data.last_written)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                self.sessions.remove(&id);
            }
        }

        self.clock += 1;
        let clock = self.clock;
        let data = self.sessions.entry(session_id.to_string()).or_default();
        data.last_written = clock;
        data
    }
}

/// In-process session-state store keyed by the `sessionid` cookie. Holds only
/// the browsing helpers (last reef filter set, recently viewed reefs), not
/// authentication state. Bounded at `MAX_SESSIONS` entries.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reef detail view: the id moves to the front of the list,
    /// de-duplicated, capped at `MAX_VIEWED_REEFS`.
    pub fn record_reef_view(&self, session_id: &str, reef_id: Uuid) {
        let mut inner = self.inner.write().expect("session store poisoned");
        let data = inner.entry_for_write(session_id);

        data.viewed_reefs.retain(|id| *id != reef_id);
        data.viewed_reefs.insert(0, reef_id);
        data.viewed_reefs.truncate(MAX_VIEWED_REEFS);
    }

    /// Most-recent-first list of reef ids viewed in this session.
    pub fn viewed_reefs(&self, session_id: &str) -> Vec<Uuid> {
        let inner = self.inner.read().expect("session store poisoned");
        inner
            .sessions
            .get(session_id)
            .map(|data| data.viewed_reefs.clone())
            .unwrap_or_default()
    }

    pub fn remember_reef_filters(&self, session_id: &str, filters: ReefFilters) {
        let mut inner = self.inner.write().expect("session store poisoned");
        let data = inner.entry_for_write(session_id);
        data.last_reef_filters = Some(filters);
    }

    pub fn last_reef_filters(&self, session_id: &str) -> Option<ReefFilters> {
        let inner = self.inner.read().expect("session store poisoned");
        inner
            .sessions
            .get(session_id)
            .and_then(|data| data.last_reef_filters.clone())
    }
}

/// Resolve the caller's session id from the `sessionid` cookie, minting a
/// fresh one when absent. The bool is true when a new id was minted and the
/// cookie still has to be set on the response.
pub fn resolve_session_id(req: &HttpRequest) -> (String, bool) {
    match req.cookie(SESSION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), false),
        None => (Uuid::new_v4().to_string(), true),
    }
}

pub fn session_cookie(session_id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recently_viewed_order_and_dedup() {
        let store = SessionStore::new();
        let (r1, r2, r3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        store.record_reef_view("s1", r1);
        store.record_reef_view("s1", r2);
        store.record_reef_view("s1", r1);
        store.record_reef_view("s1", r3);

        assert_eq!(store.viewed_reefs("s1"), vec![r3, r1, r2]);
    }

    #[test]
    fn test_recently_viewed_cap() {
        let store = SessionStore::new();
        let ids: Vec<Uuid> = (0..12).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            store.record_reef_view("s1", *id);
        }

        let viewed = store.viewed_reefs("s1");
        assert_eq!(viewed.len(), 10);
        assert_eq!(viewed[0], ids[11]);
        // The two oldest views fell off the end.
        assert!(!viewed.contains(&ids[0]));
        assert!(!viewed.contains(&ids[1]));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let reef = Uuid::new_v4();
        store.record_reef_view("s1", reef);

        assert!(store.viewed_reefs("s2").is_empty());
        assert_eq!(store.viewed_reefs("s1"), vec![reef]);
    }

    #[test]
    fn test_session_cap_evicts_least_recently_written() {
        let store = SessionStore::new();
        let reef = Uuid::new_v4();

        store.record_reef_view("s-first", reef);
        for i in 1..MAX_SESSIONS {
            store.record_reef_view(&format!("s{}", i), reef);
        }
        // Map is full. Touch the first session again so "s1" is now the
        // least-recently-written entry.
        store.record_reef_view("s-first", reef);

        store.record_reef_view("s-new", reef);

        assert!(store.viewed_reefs("s1").is_empty());
        assert_eq!(store.viewed_reefs("s-first"), vec![reef]);
        assert_eq!(store.viewed_reefs("s-new"), vec![reef]);
        assert_eq!(store.viewed_reefs("s2"), vec![reef]);

        let inner = store.inner.read().expect("session store poisoned");
        assert_eq!(inner.sessions.len(), MAX_SESSIONS);
    }

    #[test]
    fn test_last_filters_round_trip() {
        let store = SessionStore::new();
        assert_eq!(store.last_reef_filters("s1"), None);

        let filters = ReefFilters {
            search: "staghorn".to_string(),
            region: "pacific".to_string(),
            health: "poor".to_string(),
        };
        store.remember_reef_filters("s1", filters.clone());
        assert_eq!(store.last_reef_filters("s1"), Some(filters));
    }
}
