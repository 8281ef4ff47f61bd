//! MoveLedger: the record of moves played in the current game.
//!
//! The ledger is mutated only together with the rules collaborator, so its
//! length always equals the length of the collaborator's history.

use crate::error::{self, ErrorKind};
use crate::rules::PlayedMove;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MoveLedger {
    entries: Vec<PlayedMove>,
}

impl MoveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a move at the end. Returns its display move number.
    pub fn append(&mut self, move_: PlayedMove) -> usize {
        self.entries.push(move_);
        move_number(self.entries.len())
    }

    /// Remove the last `n` moves. Leaves the ledger untouched if it holds fewer.
    pub fn truncate_last(&mut self, n: usize) -> error::Result<()> {
        let len = self.entries.len();
        if n > len {
            return Err((
                ErrorKind::LedgerInsufficientHistory,
                format!("cannot remove {n} of {len} moves"),
            )
                .into());
        }
        self.entries.truncate(len - n);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlayedMove] {
        &self.entries
    }

    /// Numbered display rows, one per full move: `1. e4 e5`, `2. Nf3`.
    /// Computed from the entries on every call.
    pub fn rows(&self) -> Vec<String> {
        self.entries
            .chunks(2)
            .enumerate()
            .map(|(index, pair)| {
                let mut row = format!("{}. {}", index + 1, pair[0].san);
                if let Some(reply) = pair.get(1) {
                    row.push(' ');
                    row.push_str(&reply.san);
                }
                row
            })
            .collect()
    }
}

/// Display move number of the ply that brings the ledger to `length` entries.
pub fn move_number(length: usize) -> usize {
    (length + 1) / 2
}
