use super::types::{ChatRequest, ErrorResponse, HealthResponse};
use crate::{
    auth::{Claims, JwtVerifier},
    chat::{ChatEvent, ChatService, ErrorPayload},
};
use axum::{
    Extension,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{
        IntoResponse, Json, Response,
        sse::{Event, Sse},
    },
};
use futures::StreamExt;
use std::{convert::Infallible, sync::Arc};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Events buffered between the relay task and the SSE body.
const EVENT_QUEUE_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub verifier: Arc<JwtVerifier>,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn stream_chat(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected chat request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: rejection.body_text(),
                }),
            )
                .into_response();
        }
    };

    let request_id = Uuid::new_v4();
    info!(
        "Received chat request {} from {} ({} chars)",
        request_id,
        claims.username,
        request.message.chars().count()
    );

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let chat = state.chat.clone();
    let span = info_span!("chat_stream", %request_id, user = %claims.username);

    tokio::spawn(
        async move {
            chat.stream(&request.message, &tx).await;
        }
        .instrument(span),
    );

    let events = ReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(to_sse_event(event)));

    let mut response = Sse::new(events).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    response
}

fn to_sse_event(event: ChatEvent) -> Event {
    match event {
        ChatEvent::Message(text) => Event::default().event("message").data(text),
        ChatEvent::Error(error) => {
            let payload = ErrorPayload { error: &error };
            match Event::default().event("error").json_data(payload) {
                Ok(event) => event,
                Err(_) => Event::default().event("error").data("stream failed"),
            }
        }
    }
}
