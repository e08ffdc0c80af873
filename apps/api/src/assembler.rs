//! Response assembler — folds a chunk sequence into one growing document
//! buffer and tracks display state.
//!
//! Each new request gets a generation number; events carrying a stale
//! generation are ignored, so an in-flight stream can never write into a
//! buffer that was reset for a newer request.

use futures_util::{Stream, StreamExt};

use crate::client::ClientError;

/// Display state of one assembly. `Error` keeps whatever text had already
/// streamed in — partial content is never rolled back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    #[default]
    Idle,
    Loading,
    Streaming,
    Done,
    Error,
}

#[derive(Debug, Default)]
pub struct ResponseAssembler {
    state: AssemblyState,
    buffer: String,
    error: Option<String>,
    generation: u64,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new assembly: clears the buffer, enters `Loading`, and
    /// returns the generation token that subsequent events must carry.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.buffer.clear();
        self.error = None;
        self.state = AssemblyState::Loading;
        self.generation
    }

    /// Appends one chunk. Returns false (and does nothing) for a stale
    /// generation or a state that no longer accepts text.
    pub fn append(&mut self, generation: u64, chunk: &str) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.state {
            AssemblyState::Loading | AssemblyState::Streaming => {
                self.state = AssemblyState::Streaming;
                self.buffer.push_str(chunk);
                true
            }
            _ => false,
        }
    }

    /// Marks the sequence complete.
    pub fn complete(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if matches!(
            self.state,
            AssemblyState::Loading | AssemblyState::Streaming
        ) {
            self.state = AssemblyState::Done;
        }
    }

    /// Records a failure. Already-assembled text is retained for display
    /// alongside the error.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) {
        if generation != self.generation {
            return;
        }
        if matches!(
            self.state,
            AssemblyState::Loading | AssemblyState::Streaming
        ) {
            self.state = AssemblyState::Error;
            self.error = Some(message.into());
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    /// Current buffer contents, for incremental render.
    pub fn content(&self) -> &str {
        &self.buffer
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Drives one chunk stream to completion into the assembler. The generation
/// token must come from the `begin()` call that opened this assembly; if a
/// newer request has since reset the assembler, every event is discarded.
pub async fn assemble<S>(assembler: &mut ResponseAssembler, generation: u64, stream: S)
where
    S: Stream<Item = Result<String, ClientError>>,
{
    futures_util::pin_mut!(stream);
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(text) => {
                assembler.append(generation, &text);
            }
            Err(e) => {
                assembler.fail(generation, e.to_string());
                return;
            }
        }
    }
    assembler.complete(generation);
}
