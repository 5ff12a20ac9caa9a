//! Side effects the client asks its embedder to perform.
//!
//! [`ClientEvents`] wraps a `tokio::sync::broadcast` channel: any number of
//! subscribers (a UI toast layer, a router, a test) each see every event.

use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Why the user was sent to the login surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    /// Forced logout: stale tokens must be wiped before showing the form.
    Unauthorized,
}

impl LoginReason {
    pub fn as_str(self) -> &'static str {
        match self {
            LoginReason::Unauthorized => "unauthorized",
        }
    }

    /// Parse the `reason` query value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unauthorized" => Some(LoginReason::Unauthorized),
            _ => None,
        }
    }
}

/// Navigation targets the client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login(Option<LoginReason>),
    Dashboard,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login(None) => "/login".to_string(),
            Route::Login(Some(reason)) => format!("/login?reason={}", reason.as_str()),
            Route::Dashboard => "/dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Show a dismissible message.
    Notify { level: NotifyLevel, message: String },
    /// Navigate to another surface.
    Redirect(Route),
}

impl ClientEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ClientEvent::Notify {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }
}

/// Fan-out channel for [`ClientEvent`]s.
#[derive(Debug, Clone)]
pub struct ClientEvents {
    sender: broadcast::Sender<ClientEvent>,
}

impl ClientEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. With none, the event is dropped.
    pub fn publish(&self, event: ClientEvent) {
        tracing::debug!(?event, "Client event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }
}

impl Default for ClientEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_route_carries_reason_marker() {
        assert_eq!(
            Route::Login(Some(LoginReason::Unauthorized)).path(),
            "/login?reason=unauthorized"
        );
        assert_eq!(Route::Login(None).path(), "/login");
        assert_eq!(LoginReason::parse("unauthorized"), Some(LoginReason::Unauthorized));
        assert_eq!(LoginReason::parse("other"), None);
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let events = ClientEvents::default();
        let mut a = events.subscribe();
        let mut b = events.subscribe();

        events.publish(ClientEvent::error("boom"));

        assert_eq!(a.recv().await.unwrap(), ClientEvent::error("boom"));
        assert_eq!(b.recv().await.unwrap(), ClientEvent::error("boom"));
    }
}
