//! Transcript store
//!
//! Ordered, append-only log of turns for one conversation. Knows nothing
//! about the network or the lifecycle; the session controller appends to
//! it and renderers read snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    #[serde(alias = "assistant")]
    Bot,
    System,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Bot => "bot",
            Speaker::System => "system",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    /// Assigned by the store at append time, strictly increasing within a generation
    pub sequence: u64,
}

/// An append tagged with a generation the store has already moved past
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stale append for generation {attempted} (transcript is at generation {current})")]
pub struct StaleAppend {
    pub attempted: u64,
    pub current: u64,
}

#[derive(Debug)]
struct Log {
    generation: u64,
    next_sequence: u64,
    turns: Vec<Turn>,
}

impl Log {
    fn fresh(generation: u64) -> Self {
        Self {
            generation,
            next_sequence: 1,
            turns: Vec::new(),
        }
    }

    fn push(&mut self, speaker: Speaker, text: String) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.turns.push(Turn {
            speaker,
            text,
            sequence,
        });
        sequence
    }
}

/// Append-only turn log with copy-on-read snapshots.
///
/// Reset swaps the whole log under the write lock, so a reader sees either
/// the old transcript or the new empty one, never a mix.
#[derive(Debug)]
pub struct Transcript {
    log: RwLock<Log>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            log: RwLock::new(Log::fresh(0)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Log> {
        self.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Log> {
        self.log.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a turn and return its sequence number. Never fails.
    pub fn append(&self, speaker: Speaker, text: impl Into<String>) -> u64 {
        self.write().push(speaker, text.into())
    }

    /// Append a turn on behalf of a specific generation.
    ///
    /// # Errors
    ///
    /// Returns [`StaleAppend`] if the transcript has been reset since
    /// `generation` was current; nothing is stored in that case.
    pub fn append_for(
        &self,
        generation: u64,
        speaker: Speaker,
        text: impl Into<String>,
    ) -> Result<u64, StaleAppend> {
        let mut log = self.write();
        if log.generation != generation {
            return Err(StaleAppend {
                attempted: generation,
                current: log.generation,
            });
        }
        Ok(log.push(speaker, text.into()))
    }

    /// Copy of every turn, oldest first
    pub fn snapshot(&self) -> Vec<Turn> {
        self.read().turns.clone()
    }

    /// Copy of the turns appended after `sequence`, for incremental redraws
    pub fn snapshot_after(&self, sequence: u64) -> Vec<Turn> {
        self.read()
            .turns
            .iter()
            .filter(|turn| turn.sequence > sequence)
            .cloned()
            .collect()
    }

    /// Discard everything and start the next generation. Returns the new generation.
    pub fn reset(&self) -> u64 {
        let mut log = self.write();
        let generation = log.generation + 1;
        *log = Log::fresh(generation);
        generation
    }

    /// Discard everything and start over at `generation`
    pub fn reset_to(&self, generation: u64) {
        *self.write() = Log::fresh(generation);
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn len(&self) -> usize {
        self.read().turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().turns.is_empty()
    }

    /// Sequence of the newest turn, 0 when empty
    pub fn last_sequence(&self) -> u64 {
        self.read().turns.last().map_or(0, |turn| turn.sequence)
    }
}
