//! Scoped publish/subscribe for UI notifications.
//!
//! Scopes form a tree mirroring the component tree. A notification emitted on a scope
//! is delivered to that scope's subscribers and then bubbles to every ancestor, so a
//! listener on the page scope sees events from any descendant without either side
//! holding a reference to the other. Siblings never see each other's events.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{trace, warn};

use crate::model::ClientAugmentedResult;

const SCOPE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A prediction finished and the preview of the submitted file is ready
    FileUploaded(Box<ClientAugmentedResult>),
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::FileUploaded(_) => "file-uploaded",
        }
    }
}

/// An event together with the path of the scope that emitted it.
#[derive(Debug, Clone)]
pub struct Notification {
    pub origin: String,
    pub event: UiEvent,
}

struct ScopeInner {
    name: String,
    parent: Option<EventScope>,
    tx: broadcast::Sender<Notification>,
}

#[derive(Clone)]
pub struct EventScope {
    inner: Arc<ScopeInner>,
}

impl std::fmt::Debug for EventScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventScope").field("path", &self.path()).finish()
    }
}

impl EventScope {
    pub fn root(name: impl Into<String>) -> Self {
        Self::with_parent(name.into(), None)
    }

    /// Creates a nested scope whose events bubble up into `self`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::with_parent(name.into(), Some(self.clone()))
    }

    fn with_parent(name: String, parent: Option<EventScope>) -> Self {
        let (tx, _) = broadcast::channel(SCOPE_CAPACITY);
        Self {
            inner: Arc::new(ScopeInner { name, parent, tx }),
        }
    }

    /// Slash separated names from the root down to this scope.
    pub fn path(&self) -> String {
        match &self.inner.parent {
            Some(parent) => format!("{}/{}", parent.path(), self.inner.name),
            None => self.inner.name.clone(),
        }
    }

    /// Emits `event` here and on every ancestor. Returns how many subscribers got it.
    pub fn emit(&self, event: UiEvent) -> usize {
        let notification = Notification {
            origin: self.path(),
            event,
        };
        trace!(origin = %notification.origin, event = notification.event.name(), "emit");

        let mut delivered = 0;
        let mut scope = Some(self);
        while let Some(current) = scope {
            // no receivers is not an error, nobody is listening at this level
            delivered += current.inner.tx.send(notification.clone()).unwrap_or(0);
            scope = current.inner.parent.as_ref();
        }
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.tx.subscribe()
    }

    /// Stream of notifications emitted on this scope or below it.
    ///
    /// Notifications dropped because the subscriber fell behind are logged and skipped.
    pub fn listen(&self) -> impl Stream<Item = Notification> + Send + 'static {
        let path = self.path();
        BroadcastStream::new(self.subscribe()).filter_map(move |item| {
            let item = match item {
                Ok(notification) => Some(notification),
                Err(e) => {
                    warn!(scope = %path, %e, "listener lagged behind");
                    None
                }
            };
            futures::future::ready(item)
        })
    }
}
