use serde::{Deserialize, Serialize};

/// Body of a streaming `/api/generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_p: f32,
}

impl GenerateRequest {
    pub fn streaming(model: impl Into<String>, prompt: impl Into<String>, options: GenerateOptions) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            options,
        }
    }
}

/// One NDJSON line of the backend's streamed output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreamFragment {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

impl StreamFragment {
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str(line).ok()
    }
}
