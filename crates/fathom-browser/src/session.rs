//! Per-adapter session table: session id -> (page, last-used).
//!
//! A session id maps to at most one (adapter, page) tuple globally —
//! enforced here by this adapter never handing the same session id's
//! page to more than one concurrent task, since the session table is
//! single-writer per the orchestrator's task-serialization contract.

use spider_chrome::Page;
use std::time::Instant;

pub struct SessionEntry {
    pub page: Page,
    pub last_used: Instant,
}

#[derive(Default)]
pub struct SessionTable {
    sessions: dashmap::DashMap<String, SessionEntry>,
}

impl SessionTable {
    pub fn new() -> Self {
        SessionTable::default()
    }

    pub fn touch(&self, session_id: &str) {
        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            entry.last_used = Instant::now();
        }
    }

    pub fn insert(&self, session_id: String, page: Page) {
        self.sessions.insert(
            session_id,
            SessionEntry {
                page,
                last_used: Instant::now(),
            },
        );
    }

    pub fn get_page(&self, session_id: &str) -> Option<Page> {
        self.sessions.get(session_id).map(|e| e.page.clone())
    }

    /// Evict every session idle beyond `ttl`, returning the count removed.
    pub fn evict_idle(&self, ttl: std::time::Duration) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.last_used.elapsed() > ttl)
            .map(|entry| entry.key().clone())
            .collect();
        let count = expired.len();
        for key in expired {
            self.sessions.remove(&key);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
