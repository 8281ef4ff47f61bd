//! Captured pieces, derived from the move ledger.

use arrayvec::ArrayVec;
use log::error;
use shakmaty::{Color, Role};

use crate::rules::PlayedMove;

/// Most pieces one side can capture: all of the opponent's except the king.
pub const MAX_CAPTURES: usize = 15;

/// Pieces captured by one side, in the order they were taken.
pub type Captures = ArrayVec<Role, MAX_CAPTURES>;

/// Captured pieces for both sides, keyed by the capturing side.
///
/// The tracker is a fold over the ledger. Forward moves may use the
/// incremental path; anything that removes moves must recompute.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CapturedPieceTracker {
    white: Captures,
    black: Captures,
}

impl CapturedPieceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tracker from scratch out of a sequence of moves.
    pub fn from_moves(moves: &[PlayedMove]) -> Self {
        let mut tracker = Self::new();
        tracker.recompute_from(moves);
        tracker
    }

    /// Rebuild both sides by scanning `moves` once.
    pub fn recompute_from(&mut self, moves: &[PlayedMove]) {
        self.clear();
        for move_ in moves {
            self.apply_incremental(move_);
        }
    }

    /// Account for a move just appended to the ledger.
    pub fn apply_incremental(&mut self, move_: &PlayedMove) {
        if let Some(role) = move_.captured {
            let captures = match move_.side {
                Color::White => &mut self.white,
                Color::Black => &mut self.black,
            };
            if captures.try_push(role).is_err() {
                error!("{:?} captured more than {MAX_CAPTURES} pieces", move_.side);
            }
        }
    }

    pub fn clear(&mut self) {
        self.white.clear();
        self.black.clear();
    }

    /// Pieces captured by `side`.
    pub fn captured_by(&self, side: Color) -> &[Role] {
        match side {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// One line per side: a side marker followed by glyphs of the pieces it took.
    pub fn display(&self, side: Color) -> String {
        let marker = match side {
            Color::White => '⚪',
            Color::Black => '⚫',
        };
        let glyphs: Vec<String> = self
            .captured_by(side)
            .iter()
            .map(|role| glyph(*role, side.other()).to_string())
            .collect();

        if glyphs.is_empty() {
            marker.to_string()
        } else {
            format!("{marker} {}", glyphs.join(" "))
        }
    }
}

/// Unicode chess glyph for a piece of `color`.
pub fn glyph(role: Role, color: Color) -> char {
    match (color, role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}
