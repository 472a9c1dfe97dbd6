//! In-memory notification store with read-state reconciliation.

use carlink_protocol::{NotificationId, NotificationRecord, NotificationSink};
use log::{debug, info};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

/// Client-local authoritative view of notification state.
///
/// One store exists per logged-in session and all mutations originate
/// from the owning task, so every operation takes a single lock
/// acquisition and is atomic per call. Live inserts prepend; records are
/// unique by id; `read` only ever transitions false to true.
#[derive(Clone)]
pub struct NotificationStore {
    records: Arc<RwLock<Vec<NotificationRecord>>>,
    unread_tx: Arc<watch::Sender<usize>>,
    unread_rx: watch::Receiver<usize>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    /// Create an empty store with a zeroed badge.
    pub fn new() -> Self {
        let (unread_tx, unread_rx) = watch::channel(0);
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            unread_tx: Arc::new(unread_tx),
            unread_rx,
        }
    }

    /// Insert a record at the front of the display order.
    ///
    /// Duplicate delivery is a no-op: an id already present leaves the
    /// store untouched so repeated events cannot inflate the badge.
    /// Returns whether the record was inserted.
    pub fn insert(&self, record: NotificationRecord) -> bool {
        let mut records = self.records.write();
        if records.iter().any(|existing| existing.id == record.id) {
            debug!("dropping duplicate notification (id={})", record.id);
            return false;
        }
        debug!(
            "inserting notification (id={}, category={})",
            record.id,
            record.category.as_str()
        );
        records.insert(0, record);
        self.publish(&records);
        true
    }

    /// Mark one record read. No-op if the id is absent or already read.
    ///
    /// Returns whether the record transitioned.
    pub fn mark_read(&self, id: &NotificationId) -> bool {
        let mut records = self.records.write();
        let Some(record) = records
            .iter_mut()
            .find(|record| record.id == *id && !record.read)
        else {
            return false;
        };
        record.read = true;
        debug!("marked notification read (id={})", id);
        self.publish(&records);
        true
    }

    /// Mark every record read. Returns how many records transitioned.
    pub fn mark_all_read(&self) -> usize {
        let mut records = self.records.write();
        let mut changed = 0;
        for record in records.iter_mut().filter(|record| !record.read) {
            record.read = true;
            changed += 1;
        }
        if changed > 0 {
            info!("marked all notifications read (changed={})", changed);
            self.publish(&records);
        }
        changed
    }

    /// Remove a record entirely. A later insert with the same id is a
    /// brand-new record. Returns whether anything was removed.
    pub fn remove(&self, id: &NotificationId) -> bool {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| record.id != *id);
        let removed = records.len() != before;
        if removed {
            debug!("removed notification (id={})", id);
            self.publish(&records);
        }
        removed
    }

    /// Replace the full contents from a bulk fetch.
    ///
    /// Bulk responses carry no arrival-order guarantee, so the store
    /// re-sorts newest first here; only live channel inserts follow the
    /// prepend rule. Duplicate ids keep the first occurrence.
    pub fn replace_all(&self, mut incoming: Vec<NotificationRecord>) {
        incoming.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut deduped: Vec<NotificationRecord> = Vec::with_capacity(incoming.len());
        for record in incoming {
            if deduped.iter().any(|existing| existing.id == record.id) {
                debug!("dropping duplicate in bulk load (id={})", record.id);
                continue;
            }
            deduped.push(record);
        }
        info!("replacing store contents (records={})", deduped.len());
        let mut records = self.records.write();
        *records = deduped;
        self.publish(&records);
    }

    /// Count of unread records. Pure and side-effect free.
    pub fn unread_count(&self) -> usize {
        self.records
            .read()
            .iter()
            .filter(|record| !record.read)
            .count()
    }

    /// Ordered clone of the store contents for rendering.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.records.read().clone()
    }

    /// Observe the unread count; a new value is published on every mutation.
    pub fn watch_unread(&self) -> watch::Receiver<usize> {
        self.unread_rx.clone()
    }

    /// Publish a provisional badge value before the store is populated.
    ///
    /// Used when the unread-count endpoint answers but the bulk fetch has
    /// not completed (or failed); the next mutation overwrites it with
    /// the derived count.
    pub fn seed_unread(&self, count: usize) {
        debug!("seeding provisional unread count (count={})", count);
        self.unread_tx.send_replace(count);
    }

    /// Recompute and publish the derived unread count.
    fn publish(&self, records: &[NotificationRecord]) {
        let count = records.iter().filter(|record| !record.read).count();
        self.unread_tx.send_replace(count);
    }
}

impl NotificationSink for NotificationStore {
    /// Deliver one push-channel record into the store.
    fn deliver(&self, record: NotificationRecord) {
        self.insert(record);
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationStore;
    use carlink_protocol::{NotificationCategory, NotificationRecord};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn record(id: &str, minutes_ago: i64) -> NotificationRecord {
        NotificationRecord {
            id: id.to_string(),
            category: NotificationCategory::Estimate,
            title: format!("notification {id}"),
            body: "body".to_string(),
            read: false,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            owner_id: "owner-1".to_string(),
        }
    }

    #[test]
    fn unread_count_tracks_inserts_and_reads() {
        let store = NotificationStore::new();
        assert!(store.insert(record("a", 3)));
        assert!(store.insert(record("b", 2)));
        assert!(store.insert(record("c", 1)));
        assert_eq!(store.unread_count(), 3);

        assert!(store.mark_read(&"b".to_string()));
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let store = NotificationStore::new();
        assert!(store.insert(record("a", 1)));
        assert!(!store.insert(record("a", 1)));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn mark_read_is_idempotent_and_ignores_missing_ids() {
        let store = NotificationStore::new();
        store.insert(record("a", 1));
        assert!(store.mark_read(&"a".to_string()));
        assert!(!store.mark_read(&"a".to_string()));
        assert!(!store.mark_read(&"missing".to_string()));
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn mark_all_read_zeroes_the_count() {
        let store = NotificationStore::new();
        assert_eq!(store.mark_all_read(), 0);

        store.insert(record("a", 2));
        store.insert(record("b", 1));
        store.mark_read(&"a".to_string());
        assert_eq!(store.mark_all_read(), 1);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn remove_then_reinsert_restores_the_record_as_unread() {
        let store = NotificationStore::new();
        store.insert(record("a", 1));
        store.mark_read(&"a".to_string());
        assert!(store.remove(&"a".to_string()));
        assert_eq!(store.snapshot().len(), 0);

        assert!(store.insert(record("a", 1)));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn live_inserts_follow_insertion_order_not_timestamps() {
        // Out-of-order arrival keeps arrival order: the prepend rule wins
        // over timestamps for channel-delivered records.
        let store = NotificationStore::new();
        let newer = record("b", 1);
        let older = record("a", 10);
        store.insert(newer.clone());
        store.insert(older.clone());
        let ids: Vec<_> = store
            .snapshot()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn replace_all_sorts_newest_first_and_dedupes() {
        let store = NotificationStore::new();
        store.insert(record("stale", 60));
        store.replace_all(vec![record("a", 30), record("b", 5), record("a", 30)]);
        let ids: Vec<_> = store
            .snapshot()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn badge_watch_follows_every_mutation() {
        let store = NotificationStore::new();
        let watch = store.watch_unread();
        assert_eq!(*watch.borrow(), 0);

        store.insert(record("a", 2));
        store.insert(record("b", 1));
        assert_eq!(*watch.borrow(), 2);

        store.mark_all_read();
        assert_eq!(*watch.borrow(), 0);
    }

    #[test]
    fn seeded_badge_is_overwritten_by_derived_count() {
        let store = NotificationStore::new();
        let watch = store.watch_unread();
        store.seed_unread(7);
        assert_eq!(*watch.borrow(), 7);

        store.replace_all(vec![record("a", 1)]);
        assert_eq!(*watch.borrow(), 1);
    }
}
