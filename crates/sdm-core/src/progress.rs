//! Progress-reporting future: one terminal result plus multicast notifications.
//!
//! Two decoupled primitives composed in a small wrapper: a kind-keyed
//! multicast channel (`ProgressChannel`) and the operation future itself.
//! The wrapped operation does not run until `join` is polled, so a
//! subscriber registered right after construction cannot miss an emission.
//! The terminal value is the future's output and is produced exactly once.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Notification category. Emissions of different kinds are independent and
/// carry no cross-kind ordering guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressKind {
    /// Human-readable stage message.
    Message,
    /// Raw-data chunk received; payload is the chunk length in bytes.
    Data,
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Message(String),
    Data(usize),
}

impl Progress {
    pub fn kind(&self) -> ProgressKind {
        match self {
            Progress::Message(_) => ProgressKind::Message,
            Progress::Data(_) => ProgressKind::Data,
        }
    }
}

/// Kind-keyed multicast channel. `emit` fans a notification out to every
/// current subscriber of its kind, in registration order; subscribers
/// registered later do not see earlier notifications.
#[derive(Default)]
pub struct ProgressChannel {
    subscribers: Mutex<HashMap<ProgressKind, Vec<mpsc::UnboundedSender<Progress>>>>,
}

impl ProgressChannel {
    pub fn subscribe(&self, kind: ProgressKind) -> mpsc::UnboundedReceiver<Progress> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("progress subscriber lock poisoned")
            .entry(kind)
            .or_default()
            .push(tx);
        rx
    }

    pub fn emit(&self, notification: Progress) {
        let mut subscribers = self
            .subscribers
            .lock()
            .expect("progress subscriber lock poisoned");
        if let Some(senders) = subscribers.get_mut(&notification.kind()) {
            senders.retain(|tx| tx.send(notification.clone()).is_ok());
        }
    }
}

/// Emit-only handle given to the running operation.
#[derive(Clone)]
pub struct ProgressHandle {
    channel: Arc<ProgressChannel>,
}

impl ProgressHandle {
    pub fn message(&self, text: impl Into<String>) {
        self.channel.emit(Progress::Message(text.into()));
    }

    pub fn data(&self, len: usize) {
        self.channel.emit(Progress::Data(len));
    }
}

/// An in-flight operation that multicasts progress while producing one
/// terminal `Result`.
pub struct ProgressFuture<T, E> {
    channel: Arc<ProgressChannel>,
    task: Pin<Box<dyn Future<Output = Result<T, E>> + Send>>,
}

impl<T, E> ProgressFuture<T, E> {
    /// Wraps `f` into a progress-reporting operation. `f` receives the emit
    /// handle and runs only once `join` is awaited.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(ProgressHandle) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let channel = Arc::new(ProgressChannel::default());
        let handle = ProgressHandle {
            channel: Arc::clone(&channel),
        };
        Self {
            channel,
            task: Box::pin(f(handle)),
        }
    }

    /// Registers an observer for notifications of `kind`. May be called any
    /// number of times; notifications emitted before the subscription are
    /// not replayed.
    pub fn subscribe(&self, kind: ProgressKind) -> mpsc::UnboundedReceiver<Progress> {
        self.channel.subscribe(kind)
    }

    /// Drives the operation to completion and returns its terminal value.
    pub async fn join(self) -> Result<T, E> {
        self.task.await
    }
}
