pub mod cleanup;
pub mod fragment;
pub mod fsm;
pub mod prompt;
mod relay;
mod service;
mod sink;

pub use cleanup::cleanup;
pub use fragment::{is_flush_point, repair_word_boundaries, split_word_chunks};
pub use fsm::{RelaySignal, RelayState, RelayStateMachine};
pub use relay::{ChatRelay, LineReader};
pub use service::ChatService;
pub use sink::{ChatEvent, ClientGone, ErrorPayload, EventSink};
