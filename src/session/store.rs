//! In-memory session map keyed by the opaque id carried in the session cookie.
//!
//! Entries idle for longer than the configured TTL are treated as absent and
//! evicted. Transitions run under the write lock so concurrent requests for
//! the same browser never overwrite each other's changes.

use super::{Event, Session, Transition};
use std::{collections::HashMap, time::Duration};
use tokio::{sync::RwLock, time::Instant};
use ulid::Ulid;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > ttl
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Ulid, Entry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start tracking `session` under a fresh id. Expired entries are swept
    /// on the way.
    pub async fn create(&self, session: Session) -> Ulid {
        let id = Ulid::new();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| !entry.is_expired(now, self.ttl));
        sessions.insert(
            id,
            Entry {
                session,
                last_seen: now,
            },
        );
        id
    }

    /// Snapshot of the session for `id`, if it is still live. Refreshes its
    /// idle timer.
    pub async fn get(&self, id: &Ulid) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = self.live_entry(&mut sessions, id, now)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Apply `event` to the live session for `id` and store the result.
    ///
    /// Returns `None` without touching anything when the session is gone.
    pub async fn update(&self, id: &Ulid, event: Event) -> Option<Transition> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = self.live_entry(&mut sessions, id, now)?;
        let transition = std::mem::take(&mut entry.session).apply(event);
        entry.session = transition.session.clone();
        entry.last_seen = now;
        Some(transition)
    }

    pub async fn remove(&self, id: &Ulid) -> Option<Session> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|entry| entry.session)
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<Ulid, Entry>,
        id: &Ulid,
        now: Instant,
    ) -> Option<&'a mut Entry> {
        if sessions.get(id)?.is_expired(now, self.ttl) {
            sessions.remove(id);
            return None;
        }
        sessions.get_mut(id)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Notice, Page, API_KEY_SAVED};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn logged_in() -> Session {
        Session::default()
            .apply(Event::Login {
                email: "ada@example.com".to_string(),
                password: SecretString::from("pw".to_string()),
            })
            .session
    }

    #[tokio::test]
    async fn create_then_get_returns_snapshot() {
        let store = SessionStore::default();
        let id = store.create(logged_in()).await;

        let session = store.get(&id).await;
        assert_eq!(
            session.as_ref().and_then(Session::user_email),
            Some("ada@example.com")
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_applies_event_in_place() {
        let store = SessionStore::default();
        let id = store.create(logged_in()).await;

        let transition = store
            .update(&id, Event::SaveApiKey(SecretString::from("key".to_string())))
            .await;
        assert_eq!(
            transition.and_then(|t| t.notice),
            Some(Notice::success(API_KEY_SAVED))
        );
        assert!(store.get(&id).await.is_some_and(|s| s.has_api_key()));
    }

    #[tokio::test]
    async fn updates_from_concurrent_requests_are_all_kept() {
        let store = Arc::new(SessionStore::default());
        let id = store.create(logged_in()).await;

        let navigate = {
            let store = store.clone();
            tokio::spawn(async move { store.update(&id, Event::Navigate(Page::Summarize)).await })
        };
        let save = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(&id, Event::SaveApiKey(SecretString::from("key".to_string())))
                    .await
            })
        };
        assert!(matches!(navigate.await, Ok(Some(_))));
        assert!(matches!(save.await, Ok(Some(_))));

        let session = store.get(&id).await;
        assert!(session.as_ref().is_some_and(Session::has_api_key));
        assert_eq!(session.map(|s| s.page()), Some(Page::Summarize));
    }

    #[tokio::test]
    async fn update_does_not_resurrect_removed_session() {
        let store = SessionStore::default();
        let id = store.create(logged_in()).await;
        assert!(store.remove(&id).await.is_some());

        assert!(store
            .update(&id, Event::Navigate(Page::Summarize))
            .await
            .is_none());
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(20));
        let id = store.create(logged_in()).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(store.get(&id).await.is_none());
        assert!(store
            .update(&id, Event::Navigate(Page::Summarize))
            .await
            .is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_sweeps_expired_sessions() {
        let store = SessionStore::new(Duration::from_millis(20));
        for _ in 0..10 {
            store.create(logged_in()).await;
        }
        assert_eq!(store.len().await, 10);

        tokio::time::sleep(Duration::from_millis(60)).await;

        store.create(logged_in()).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_id_is_anonymous() {
        let store = SessionStore::default();
        assert!(store.get(&Ulid::new()).await.is_none());
        assert!(store.remove(&Ulid::new()).await.is_none());
    }
}
