//! Server-to-client push channel for notification events.
//!
//! The channel is strictly one-directional: the backend streams SSE
//! frames and the client decodes them into notification records. There
//! is no automatic reconnection and no backoff; connection loss surfaces
//! to the caller, who decides whether to subscribe again.

use crate::error::ClientError;
use carlink_protocol::{
    Credential, EventByteStream, NotificationApi, NotificationRecord, NotificationSink, PushFrame,
    SseDecoder,
};
use futures_util::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// An open subscription delivering notification records as they arrive.
#[derive(Debug)]
pub struct PushChannel {
    receiver: mpsc::Receiver<NotificationRecord>,
    pump: JoinHandle<()>,
    closed: bool,
}

impl PushChannel {
    /// Open the push stream scoped to the given session credential.
    ///
    /// Fails with a connection error when the credential is rejected or
    /// the backend is unreachable.
    pub async fn subscribe(
        api: Arc<dyn NotificationApi>,
        credential: &Credential,
        buffer: usize,
    ) -> Result<Self, ClientError> {
        let stream = api.open_stream(credential).await?;
        info!("push channel subscribed (buffer={})", buffer);
        let (sender, receiver) = mpsc::channel(buffer);
        let pump = tokio::spawn(pump_frames(stream, sender));
        Ok(Self {
            receiver,
            pump,
            closed: false,
        })
    }

    /// Receive the next record, or `None` once the channel has ended.
    pub async fn recv(&mut self) -> Option<NotificationRecord> {
        if self.closed {
            return None;
        }
        self.receiver.recv().await
    }

    /// Close the channel. Idempotent; no events are delivered afterwards.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!("push channel closed");
        self.pump.abort();
        self.receiver.close();
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Pump every delivered record into a sink and return a handle that
    /// only controls the subscription lifecycle.
    pub fn forward(self, sink: Arc<dyn NotificationSink>) -> PushSubscription {
        let mut receiver = self.receiver;
        let forwarder = tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                sink.deliver(record);
            }
            debug!("push forwarder drained");
        });
        PushSubscription {
            pump: self.pump,
            forwarder,
            closed: false,
        }
    }
}

/// Lifecycle handle for a forwarded subscription.
pub struct PushSubscription {
    pump: JoinHandle<()>,
    forwarder: JoinHandle<()>,
    closed: bool,
}

impl PushSubscription {
    /// Stop pumping events. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!("push subscription closed");
        self.pump.abort();
        self.forwarder.abort();
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Decode SSE chunks and forward notification records until the
/// transport ends or the consumer goes away.
async fn pump_frames(mut stream: EventByteStream, sender: mpsc::Sender<NotificationRecord>) {
    let mut decoder = SseDecoder::new();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!("push stream transport error: {err}");
                break;
            }
        };
        for payload in decoder.feed(&chunk) {
            match PushFrame::decode(&payload) {
                Ok(PushFrame::Notification { mut record }) => {
                    // Events arrive unread by contract regardless of what
                    // the backend serialized.
                    record.read = false;
                    if sender.send(record).await.is_err() {
                        debug!("push consumer dropped; stopping pump");
                        return;
                    }
                }
                Ok(PushFrame::Ping) => debug!("push keep-alive"),
                Err(err) => {
                    // A bad frame must not sever the stream.
                    warn!("skipping undecodable push frame: {err}");
                }
            }
        }
    }
    debug!("push stream ended");
}
