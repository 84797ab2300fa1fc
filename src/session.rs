//! Lock-guarded store of per-job progress records
//!
//! The map is only reachable through [`SessionStore`]'s create/update/get contract.
//! A single `std::sync::Mutex` guards it: every access is a short copy or merge and
//! never spans an `.await`, which lets the engine's synchronous progress hook write
//! to the store directly.
//!
//! Progress streams register a [`StreamWatch`] for the id they follow; eviction
//! leaves watched records alone so an open stream always sees the terminal status.

use crate::error::SessionError;
use crate::types::{JobRecord, JobUpdate, ProgressSnapshot, SessionId, Status};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Sessions {
    records: HashMap<SessionId, JobRecord>,
    /// Open progress streams per id
    watchers: HashMap<SessionId, usize>,
}

/// Process-wide mapping from job id to its progress record (cheap to clone)
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Sessions>>,
}

/// Registration of one open progress stream; released on drop
#[derive(Debug)]
pub struct StreamWatch {
    id: SessionId,
    store: SessionStore,
}

impl Drop for StreamWatch {
    fn drop(&mut self) {
        let mut sessions = self.store.lock();
        if let Some(count) = sessions.watchers.get_mut(&self.id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                sessions.watchers.remove(&self.id);
            }
        }
    }
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        // A panic while holding the lock cannot leave a half-merged record behind,
        // since merges only assign plain fields.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a `queued` record for a newly issued id
    pub fn create(&self, id: SessionId) -> Result<JobRecord, SessionError> {
        let mut sessions = self.lock();
        if sessions.records.contains_key(&id) {
            return Err(SessionError::AlreadyExists { id });
        }
        let record = JobRecord::queued(id);
        sessions.records.insert(id, record.clone());
        debug!(session_id = %id, "session created");
        Ok(record)
    }

    /// Merge `update` into the record for `id`
    ///
    /// Only the fields set on `update` are overwritten. The whole merge happens under
    /// the lock, so concurrent updates to one id never interleave. Returns the record
    /// as it stands after the merge.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] when no record exists
    /// - [`SessionError::Terminal`] when the record is already finished or failed
    /// - [`SessionError::Regression`] when the status would move backwards
    /// - [`SessionError::FieldNotAllowed`] for `filename` outside `finished` or
    ///   `error` outside `error`
    pub fn update(&self, id: SessionId, update: JobUpdate) -> Result<JobRecord, SessionError> {
        let mut sessions = self.lock();
        let record = sessions
            .records
            .get_mut(&id)
            .ok_or(SessionError::NotFound { id })?;

        if record.status.is_terminal() {
            return Err(SessionError::Terminal {
                id,
                status: record.status,
            });
        }

        let next = update.status.unwrap_or(record.status);
        let moves_forward = match (record.status.rank(), next.rank()) {
            (Some(current), Some(requested)) => requested >= current,
            _ => false,
        };
        if !moves_forward {
            return Err(SessionError::Regression {
                id,
                from: record.status,
                to: next,
            });
        }

        if update.filename.is_some() && next != Status::Finished {
            return Err(SessionError::FieldNotAllowed {
                id,
                field: "filename",
                status: next,
            });
        }
        if update.error.is_some() && next != Status::Error {
            return Err(SessionError::FieldNotAllowed {
                id,
                field: "error",
                status: next,
            });
        }

        record.status = next;
        if let Some(downloaded) = update.downloaded_bytes {
            record.downloaded_bytes = downloaded;
        }
        if let Some(total) = update.total_bytes {
            record.total_bytes = total;
        }
        if let Some(speed) = update.speed {
            record.speed = speed.max(0.0);
        }
        if let Some(filename) = update.filename {
            record.filename = Some(filename);
        }
        if let Some(error) = update.error {
            record.error = Some(error);
        }
        record.updated_at = Utc::now();

        trace!(
            session_id = %id,
            status = %record.status,
            downloaded = record.downloaded_bytes,
            total = record.total_bytes,
            "session updated"
        );
        Ok(record.clone())
    }

    /// Copy of the record for `id`, if any
    pub fn get(&self, id: SessionId) -> Option<JobRecord> {
        self.lock().records.get(&id).cloned()
    }

    /// Snapshot for the progress stream (`unknown` when absent)
    pub fn snapshot(&self, id: SessionId) -> ProgressSnapshot {
        ProgressSnapshot::from_record(self.get(id))
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Register an open progress stream for `id`
    ///
    /// The record is kept out of eviction until every returned guard is dropped. The
    /// id does not need a record yet.
    #[must_use = "the watch is released as soon as it is dropped"]
    pub fn watch(&self, id: SessionId) -> StreamWatch {
        *self.lock().watchers.entry(id).or_insert(0) += 1;
        StreamWatch {
            id,
            store: self.clone(),
        }
    }

    /// Number of open progress streams for `id`
    pub fn watchers(&self, id: SessionId) -> usize {
        self.lock().watchers.get(&id).copied().unwrap_or(0)
    }

    /// Drop terminal records that have not changed for at least `grace`
    ///
    /// Returns how many records were evicted. Active records and records followed
    /// by an open progress stream are never evicted.
    pub fn evict_terminal(&self, grace: Duration) -> usize {
        let Ok(grace) = chrono::Duration::from_std(grace) else {
            return 0;
        };
        let now = Utc::now();

        let mut sessions = self.lock();
        let Sessions { records, watchers } = &mut *sessions;
        let before = records.len();
        records.retain(|id, record| {
            watchers.contains_key(id)
                || !(record.status.is_terminal() && now - record.updated_at >= grace)
        });
        let evicted = before - records.len();

        if evicted > 0 {
            debug!(evicted, remaining = records.len(), "evicted terminal sessions");
        }
        evicted
    }
}
