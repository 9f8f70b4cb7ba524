use super::{
    fsm::RelayState,
    prompt::{assemble_prompt, policy_preamble},
    relay::ChatRelay,
    sink::{ChatEvent, EventSink},
};
use crate::{
    Result,
    catalog::{CatalogQuery, CatalogSnapshot},
    config::{ChatConfig, LlmConfig},
    llm::{GenerateOptions, GenerateRequest, GenerationBackend},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Wires the catalog, the prompt and the generation backend into one
/// streamed answer per request.
pub struct ChatService {
    catalog: Arc<dyn CatalogQuery>,
    backend: Arc<dyn GenerationBackend>,
    model: String,
    options: GenerateOptions,
    chat: ChatConfig,
    policy: String,
}

impl ChatService {
    pub fn new(
        catalog: Arc<dyn CatalogQuery>,
        backend: Arc<dyn GenerationBackend>,
        llm: &LlmConfig,
        chat: ChatConfig,
    ) -> Self {
        let policy = policy_preamble(&chat.shop_name);
        Self {
            catalog,
            backend,
            model: llm.model.clone(),
            options: GenerateOptions {
                temperature: llm.temperature,
                top_p: llm.top_p,
            },
            chat,
            policy,
        }
    }

    pub async fn build_prompt(&self, message: &str) -> Result<String> {
        let snapshot =
            CatalogSnapshot::build(self.catalog.as_ref(), self.chat.snapshot_page_size).await?;
        Ok(assemble_prompt(&self.policy, &snapshot, &self.chat, message))
    }

    /// Answers `message` through `sink`. Every failure ends up as a single
    /// `Error` event; the backend is called at most once.
    pub async fn stream(&self, message: &str, sink: &dyn EventSink) -> RelayState {
        let prompt = match self.build_prompt(message).await {
            Ok(prompt) => prompt,
            Err(e) => return Self::abort(sink, e).await,
        };
        debug!("Assembled prompt of {} bytes", prompt.len());

        let request = GenerateRequest::streaming(&self.model, prompt, self.options);
        let body = match self.backend.open_stream(&request).await {
            Ok(body) => body,
            Err(e) => return Self::abort(sink, e).await,
        };

        let outcome = ChatRelay::new(sink).run(body).await;
        info!("Chat stream ended: {:?}", outcome);
        outcome
    }

    async fn abort(sink: &dyn EventSink, err: crate::Error) -> RelayState {
        warn!("Chat stream failed before streaming: {}", err);
        let _ = sink.emit(ChatEvent::Error(err.to_string())).await;
        RelayState::Error
    }
}
