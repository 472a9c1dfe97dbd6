//! Journal of optimistic mutations awaiting backend confirmation.
//!
//! Local state always mutates first; the backend write is dispatched
//! fire-and-forget. The journal records each mutation as a tagged command
//! so that a later full fetch can be reconciled against writes the
//! backend has not confirmed, instead of rolling local state back.

use carlink_protocol::{NotificationId, NotificationRecord};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// A store mutation that also has a backend-persistence side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// One notification was marked read.
    MarkRead(NotificationId),
    /// Every notification present at the time was marked read.
    MarkAllRead,
    /// One notification was dismissed.
    Remove(NotificationId),
}

/// Backend confirmation state of a journaled command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Dispatched, not yet answered.
    Pending,
    /// The backend acknowledged the write.
    Confirmed,
    /// The backend rejected or never received the write. Local state is
    /// kept; the command is re-applied on the next reconcile.
    Failed,
}

/// One optimistic mutation with its confirmation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    /// Client-generated command id.
    pub id: Uuid,
    /// The mutation that was applied locally.
    pub action: SyncAction,
    /// Backend confirmation state.
    pub status: SyncStatus,
    /// When the mutation was applied locally.
    pub created_at: DateTime<Utc>,
}

/// Shared journal of in-flight and failed commands.
#[derive(Clone, Default)]
pub struct SyncJournal {
    commands: Arc<Mutex<Vec<SyncCommand>>>,
}

impl SyncJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly applied mutation as pending and return its id.
    pub fn begin(&self, action: SyncAction) -> Uuid {
        let command = SyncCommand {
            id: Uuid::new_v4(),
            action,
            status: SyncStatus::Pending,
            created_at: Utc::now(),
        };
        let id = command.id;
        debug!("journaling command (command_id={}, action={:?})", id, command.action);
        self.commands.lock().push(command);
        id
    }

    /// Resolve a pending command after the backend answered.
    pub fn resolve(&self, id: Uuid, success: bool) {
        let mut commands = self.commands.lock();
        let Some(command) = commands.iter_mut().find(|command| command.id == id) else {
            warn!("resolving unknown command (command_id={})", id);
            return;
        };
        command.status = if success {
            SyncStatus::Confirmed
        } else {
            SyncStatus::Failed
        };
        debug!(
            "resolved command (command_id={}, status={:?})",
            id, command.status
        );
    }

    /// Reconcile a bulk-fetched record set against unconfirmed commands.
    ///
    /// Confirmed commands are pruned; pending and failed commands are
    /// re-applied so a stale fetch cannot resurrect locally read or
    /// dismissed notifications. A mark-all only covers records that
    /// existed when it was issued.
    pub fn reconcile(&self, records: &mut Vec<NotificationRecord>) {
        let mut commands = self.commands.lock();
        commands.retain(|command| command.status != SyncStatus::Confirmed);
        for command in commands.iter() {
            match &command.action {
                SyncAction::MarkRead(id) => {
                    if let Some(record) = records.iter_mut().find(|record| record.id == *id) {
                        record.read = true;
                    }
                }
                SyncAction::MarkAllRead => {
                    for record in records
                        .iter_mut()
                        .filter(|record| record.created_at <= command.created_at)
                    {
                        record.read = true;
                    }
                }
                SyncAction::Remove(id) => {
                    records.retain(|record| record.id != *id);
                }
            }
        }
        if !commands.is_empty() {
            debug!("reconciled fetch against journal (commands={})", commands.len());
        }
    }

    /// Clone the journal contents for inspection.
    pub fn snapshot(&self) -> Vec<SyncCommand> {
        self.commands.lock().clone()
    }

    /// Whether any command is still unconfirmed.
    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }
}
