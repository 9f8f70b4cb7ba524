use super::{
    cleanup::cleanup,
    fragment::{is_flush_point, repair_word_boundaries},
    fsm::{RelaySignal, RelayState, RelayStateMachine},
    sink::{ChatEvent, EventSink},
};
use crate::{Error, Result, llm::StreamFragment};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, error, warn};

/// Longest backend line accepted before the stream is treated as broken.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Splits a byte stream into `\n`-terminated lines. A trailing `\r` is
/// dropped and a final unterminated line is still returned before EOF.
pub struct LineReader<S> {
    stream: S,
    buf: Vec<u8>,
    // Bytes of `buf` already known to hold no newline.
    scanned: usize,
    max_line_len: usize,
    eof: bool,
}

impl<S> LineReader<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self::with_max_line_len(stream, MAX_LINE_BYTES)
    }

    pub fn with_max_line_len(stream: S, max_line_len: usize) -> Self {
        Self {
            stream,
            buf: Vec::new(),
            scanned: 0,
            max_line_len,
            eof: false,
        }
    }

    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + offset;
                let line: Vec<u8> = self.buf.drain(..=end).collect();
                self.scanned = 0;
                return Ok(Some(decode_line(&line)));
            }
            self.scanned = self.buf.len();

            if self.buf.len() > self.max_line_len {
                return Err(Error::backend_stream(format!(
                    "stream line exceeds {} bytes",
                    self.max_line_len
                )));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let line = std::mem::take(&mut self.buf);
                self.scanned = 0;
                return Ok(Some(decode_line(&line)));
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e),
                None => self.eof = true,
            }
        }
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

/// Consumes one backend stream and forwards cleaned sentence-sized chunks
/// to the client, one relay per request.
pub struct ChatRelay<'a> {
    sink: &'a dyn EventSink,
    buffer: String,
    fsm: RelayStateMachine,
    messages_sent: usize,
}

impl<'a> ChatRelay<'a> {
    pub fn new(sink: &'a dyn EventSink) -> Self {
        Self {
            sink,
            buffer: String::new(),
            fsm: RelayStateMachine::new(),
            messages_sent: 0,
        }
    }

    /// Drives the relay to a terminal state. The backend stream is dropped
    /// before returning, whatever the outcome.
    pub async fn run<S>(mut self, body: S) -> RelayState
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        let mut lines = LineReader::new(body);

        while !self.fsm.is_terminal() {
            let signal = match self.fsm.current_state() {
                RelayState::FlushPending => self.flush().await,
                _ => self.step(&mut lines).await,
            };

            if let Err(e) = self.fsm.transition(signal) {
                error!("Relay aborted: {}", e);
                let _ = self.sink.emit(ChatEvent::Error(e.to_string())).await;
                return RelayState::Error;
            }
        }

        drop(lines);

        let outcome = self.fsm.current_state();
        debug!(
            "Relay finished in {:?} after {} messages",
            outcome, self.messages_sent
        );
        outcome
    }

    async fn step<S>(&mut self, lines: &mut LineReader<S>) -> RelaySignal
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        if self.sink.is_closed() {
            debug!("Client disconnected, abandoning generation stream");
            return RelaySignal::ClientGone;
        }

        match lines.next_line().await {
            Ok(None) => RelaySignal::StreamCompleted,
            Ok(Some(line)) => match StreamFragment::parse(&line) {
                Some(fragment) => self.accept(fragment),
                None => {
                    if !line.trim().is_empty() {
                        debug!("Skipping malformed stream line: {}", line);
                    }
                    RelaySignal::LineConsumed
                }
            },
            Err(e) => self.fail(e).await,
        }
    }

    fn accept(&mut self, fragment: StreamFragment) -> RelaySignal {
        let mut flush_point = false;
        if !fragment.response.is_empty() {
            self.buffer
                .push_str(&repair_word_boundaries(&fragment.response));
            flush_point = is_flush_point(&fragment.response);
        }

        if fragment.done {
            RelaySignal::StreamCompleted
        } else if flush_point {
            RelaySignal::FlushPointReached
        } else {
            RelaySignal::LineConsumed
        }
    }

    /// Cleans and emits the buffer, leaving it empty. Text that cleans up to
    /// nothing is dropped without an event.
    async fn flush(&mut self) -> RelaySignal {
        let text = cleanup(&self.buffer);
        self.buffer.clear();

        if text.is_empty() {
            return RelaySignal::Flushed;
        }

        match self.sink.emit(ChatEvent::Message(text)).await {
            Ok(()) => {
                self.messages_sent += 1;
                RelaySignal::Flushed
            }
            Err(_) => RelaySignal::ClientGone,
        }
    }

    async fn fail(&mut self, err: Error) -> RelaySignal {
        warn!("Generation stream failed: {}", err);

        if let RelaySignal::ClientGone = self.flush().await {
            return RelaySignal::ClientGone;
        }

        match self.sink.emit(ChatEvent::Error(err.to_string())).await {
            Ok(()) => RelaySignal::ReadFailed,
            Err(_) => RelaySignal::ClientGone,
        }
    }
}
