use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

/// What the relay hands to the client side of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Cleaned assistant text, sent as an SSE `message` event.
    Message(String),
    /// Terminal failure, sent as an SSE `error` event.
    Error(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload<'a> {
    pub error: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientGone;

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Hands one event to the transport, waiting for queue space.
    async fn emit(&self, event: ChatEvent) -> Result<(), ClientGone>;

    /// Non-blocking check whether the client has disconnected.
    fn is_closed(&self) -> bool;
}

#[async_trait]
impl EventSink for mpsc::Sender<ChatEvent> {
    async fn emit(&self, event: ChatEvent) -> Result<(), ClientGone> {
        self.send(event).await.map_err(|_| ClientGone)
    }

    fn is_closed(&self) -> bool {
        mpsc::Sender::is_closed(self)
    }
}
