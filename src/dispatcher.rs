//! Routing of bus messages to integrations

use crate::error::{BridgeError, Result};
use crate::protocol::{ControlMessage, InboundMessage, SetupMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Something that owns one bus target (e.g. `music`)
#[async_trait]
pub trait Integration: Send + Sync {
    /// Target name this integration answers to
    fn target(&self) -> &str;

    /// Act on a room-level control message
    async fn handle_control(&self, msg: &ControlMessage) -> Result<()>;

    /// Apply a setup command
    async fn handle_setup(&self, msg: &SetupMessage) -> Result<()>;
}

/// Decodes inbound payloads and hands them to the integration named by `target`
#[derive(Default, Clone)]
pub struct Dispatcher {
    integrations: HashMap<String, Arc<dyn Integration>>,
}

impl Dispatcher {
    /// Create a dispatcher with no integrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an integration under its target, replacing any previous one
    pub fn register(&mut self, integration: Arc<dyn Integration>) {
        let target = integration.target().to_string();
        tracing::info!("Registered integration for target {}", target);
        self.integrations.insert(target, integration);
    }

    /// Targets that have an integration registered
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.integrations.keys().map(String::as_str)
    }

    /// Route an already decoded message
    pub async fn dispatch(&self, msg: &InboundMessage) -> Result<()> {
        let integration = self
            .integrations
            .get(msg.target())
            .ok_or_else(|| BridgeError::UnknownTarget(msg.target().to_string()))?;

        match msg {
            InboundMessage::Control(control) => {
                tracing::debug!("{} {} in {}", control.target, control.action, control.room);
                integration.handle_control(control).await
            }
            InboundMessage::Setup(setup) => {
                tracing::debug!("{} setup {}", setup.target, setup.command);
                integration.handle_setup(setup).await
            }
        }
    }

    /// Decode and route a raw payload
    pub async fn dispatch_payload(&self, payload: &[u8]) -> Result<()> {
        let msg = InboundMessage::from_slice(payload)?;
        self.dispatch(&msg).await
    }

    /// Route a raw payload, logging and dropping any failure
    pub async fn handle(&self, payload: &[u8]) {
        match self.dispatch_payload(payload).await {
            Ok(()) => {}
            Err(e) if e.is_validation() => tracing::warn!("Rejected message: {}", e),
            Err(e) => tracing::error!("Failed to handle message: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Integration for Recorder {
        fn target(&self) -> &str {
            "music"
        }

        async fn handle_control(&self, msg: &ControlMessage) -> Result<()> {
            self.seen.lock().push(format!("{}:{}", msg.room, msg.action));
            Ok(())
        }

        async fn handle_setup(&self, msg: &SetupMessage) -> Result<()> {
            self.seen.lock().push(format!("setup:{}", msg.command));
            Ok(())
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(recorder.clone());
        (dispatcher, recorder)
    }

    #[tokio::test]
    async fn test_routes_control_and_setup() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher
            .dispatch_payload(br#"{"target":"music","room":"Kitchen","action":"play"}"#)
            .await
            .unwrap();
        dispatcher
            .dispatch_payload(br#"{"target":"music","command":"discover-households"}"#)
            .await
            .unwrap();

        assert_eq!(*recorder.seen.lock(), vec!["Kitchen:play", "setup:discover-households"]);
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let (dispatcher, recorder) = dispatcher();

        let err = dispatcher
            .dispatch_payload(br#"{"target":"light","room":"Kitchen","action":"on"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::UnknownTarget(target) if target == "light"));
        assert!(recorder.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let (dispatcher, recorder) = dispatcher();

        let err = dispatcher.dispatch_payload(b"not json").await.unwrap_err();
        assert!(matches!(err, BridgeError::Decode(_)));

        dispatcher.handle(b"{\"target\":\"music\"}").await;
        assert!(recorder.seen.lock().is_empty());
        assert_eq!(dispatcher.targets().collect::<Vec<_>>(), vec!["music"]);
    }
}
