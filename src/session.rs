//! In-memory per-session results.
//!
//! Every upload submission creates one [`Session`] holding the jobs it
//! produced, keyed by [`JobId`]. Download links address a job through the
//! session id. Sessions are kept in a bounded LRU: once evicted, their
//! downloads are simply gone.

use crate::job::{ConversionJob, JobId};
use lru::LruCache;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// The jobs from one upload submission.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub jobs: BTreeMap<JobId, ConversionJob>,
}

impl Session {
    pub fn new(jobs: Vec<ConversionJob>) -> Self {
        Self {
            id: Uuid::new_v4(),
            jobs: jobs.into_iter().map(|j| (j.id, j)).collect(),
        }
    }

    pub fn job(&self, id: JobId) -> Option<&ConversionJob> {
        self.jobs.get(&id)
    }

    /// Jobs in upload order.
    pub fn jobs(&self) -> impl Iterator<Item = &ConversionJob> {
        self.jobs.values()
    }
}

/// Bounded, thread-safe map of recent sessions.
pub struct SessionStore {
    inner: Mutex<LruCache<Uuid, Arc<Session>>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn insert(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut cache = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((evicted, _)) = cache.push(session.id, Arc::clone(&session)) {
            if evicted != session.id {
                debug!("Evicted session {}", evicted);
            }
        }
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        let mut cache = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::upload::FileName;

    fn job(i: usize, name: &str) -> ConversionJob {
        ConversionJob::new(JobId(i), &FileName::parse(name))
    }

    #[test]
    fn session_keeps_upload_order() {
        let s = Session::new(vec![job(0, "b.pdf"), job(1, "a.docx")]);
        let names: Vec<_> = s.jobs().map(|j| j.original_name.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.docx"]);
        assert_eq!(s.job(JobId(1)).unwrap().base_name, "a");
        assert!(s.job(JobId(2)).is_none());
    }

    #[test]
    fn insert_and_get() {
        let store = SessionStore::new(4);
        assert!(store.is_empty());
        let s = store.insert(Session::new(vec![job(0, "x.html")]));
        let got = store.get(&s.id).unwrap();
        assert_eq!(got.id, s.id);
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let store = SessionStore::new(2);
        let a = store.insert(Session::new(vec![]));
        let b = store.insert(Session::new(vec![]));
        // Touch `a` so `b` becomes the eviction candidate.
        assert!(store.get(&a.id).is_some());
        let c = store.insert(Session::new(vec![]));

        assert_eq!(store.len(), 2);
        assert!(store.get(&a.id).is_some());
        assert!(store.get(&b.id).is_none());
        assert!(store.get(&c.id).is_some());
    }

    #[test]
    fn zero_capacity_holds_one() {
        let store = SessionStore::new(0);
        let a = store.insert(Session::new(vec![]));
        assert!(store.get(&a.id).is_some());
    }
}
