//! Notification center: the session-scoped facade over channel, store,
//! and backend sync.
//!
//! Control flow: the push channel inserts into the store; UI-triggered
//! actions mutate store entries first and notify the backend
//! fire-and-forget; the badge recomputes from the store on every
//! mutation. Backend failures never roll local state back.

use crate::channel::{PushChannel, PushSubscription};
use crate::error::ClientError;
use crate::session::SessionState;
use crate::store::NotificationStore;
use crate::sync::{SyncAction, SyncJournal};
use carlink_config::ClientConfig;
use carlink_protocol::{ApiError, NotificationApi, NotificationId, NotificationRecord};
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

/// Client-side notification service for one logged-in session.
pub struct NotificationCenter {
    api: Arc<dyn NotificationApi>,
    session: SessionState,
    channel_buffer: usize,
    store: NotificationStore,
    journal: SyncJournal,
}

impl NotificationCenter {
    /// Create a center for the given session.
    pub fn new(
        api: Arc<dyn NotificationApi>,
        config: &ClientConfig,
        session: SessionState,
    ) -> Self {
        info!(
            "notification center created (owner_id={})",
            session.owner_id
        );
        Self {
            api,
            session,
            channel_buffer: config.channel.buffer,
            store: NotificationStore::new(),
            journal: SyncJournal::new(),
        }
    }

    /// Populate initial state at session start.
    ///
    /// Seeds the badge from the unread-count endpoint first so chrome has
    /// a value before the bulk fetch lands, then loads the full list. A
    /// failed bulk fetch falls back to an empty store; nothing here is
    /// fatal to the application.
    pub async fn start(&self) {
        match self.api.fetch_unread_count(&self.session.owner_id).await {
            Ok(count) => self.store.seed_unread(count),
            Err(err) => warn!(
                "unread count unavailable (owner_id={}, error={})",
                self.session.owner_id, err
            ),
        }
        if let Err(err) = self.refresh().await {
            warn!("initial fetch failed; starting empty (error={})", err);
        }
    }

    /// Reload the store from a full fetch, reconciled against the journal.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let mut records = self.api.fetch_all(&self.session.owner_id).await?;
        self.journal.reconcile(&mut records);
        self.store.replace_all(records);
        Ok(())
    }

    /// Open the push channel and pump delivered records into the store.
    ///
    /// Returns the subscription handle; closing it is the only
    /// cancellation primitive. There is no automatic resubscription —
    /// when the handle reports closed, call `connect` again if desired.
    pub async fn connect(&self) -> Result<PushSubscription, ClientError> {
        let channel = PushChannel::subscribe(
            self.api.clone(),
            &self.session.credential,
            self.channel_buffer,
        )
        .await?;
        Ok(channel.forward(Arc::new(self.store.clone())))
    }

    /// Mark one notification read when the user opens it.
    ///
    /// Local state updates immediately; the backend write is dispatched
    /// without being awaited. No-op if the id is absent or already read.
    pub fn open_notification(&self, id: &NotificationId) {
        if !self.store.mark_read(id) {
            return;
        }
        let command_id = self.journal.begin(SyncAction::MarkRead(id.clone()));
        let api = self.api.clone();
        let owner = self.session.owner_id.clone();
        let id = id.clone();
        self.dispatch(command_id, async move { api.mark_read(&owner, &id).await });
    }

    /// Mark every notification read. No-op when nothing is unread.
    pub fn mark_all_read(&self) {
        if self.store.mark_all_read() == 0 {
            return;
        }
        let command_id = self.journal.begin(SyncAction::MarkAllRead);
        let api = self.api.clone();
        let owner = self.session.owner_id.clone();
        self.dispatch(command_id, async move { api.mark_all_read(&owner).await });
    }

    /// Remove a notification after the user dismisses it.
    pub fn dismiss(&self, id: &NotificationId) {
        if !self.store.remove(id) {
            return;
        }
        let command_id = self.journal.begin(SyncAction::Remove(id.clone()));
        let api = self.api.clone();
        let owner = self.session.owner_id.clone();
        let id = id.clone();
        self.dispatch(command_id, async move { api.delete(&owner, &id).await });
    }

    /// Current unread count.
    pub fn unread_count(&self) -> usize {
        self.store.unread_count()
    }

    /// Ordered snapshot of the store for rendering.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.store.snapshot()
    }

    /// Observe the badge value; updated on every store mutation.
    pub fn badge(&self) -> watch::Receiver<usize> {
        self.store.watch_unread()
    }

    /// The badge as an async stream of values.
    pub fn badge_stream(&self) -> WatchStream<usize> {
        WatchStream::new(self.store.watch_unread())
    }

    /// The session this center is scoped to.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Dispatch a fire-and-forget backend write and record its outcome.
    ///
    /// The spawned write is not cancelable; it completes or fails after
    /// the UI has already moved on.
    fn dispatch(
        &self,
        command_id: Uuid,
        write: impl Future<Output = Result<(), ApiError>> + Send + 'static,
    ) {
        let journal = self.journal.clone();
        tokio::spawn(async move {
            match write.await {
                Ok(()) => journal.resolve(command_id, true),
                Err(err) => {
                    warn!(
                        "backend write failed; keeping local state (command_id={}, error={})",
                        command_id, err
                    );
                    journal.resolve(command_id, false);
                }
            }
        });
    }
}
