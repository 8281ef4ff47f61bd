//! Board view capability driven by the controller.

use shakmaty::Square;

use crate::captured::CapturedPieceTracker;

/// Everything shown next to the board.
#[derive(Debug, Clone, Copy)]
pub struct Panel<'a> {
    pub status: &'a str,
    pub fen: &'a str,
    pub moves: &'a [String],
    pub captured: &'a CapturedPieceTracker,
}

/// A board widget. The controller tells it what to show and never reads from it.
pub trait BoardView {
    /// Show the given position.
    fn set_position(&mut self, fen: &str);

    /// Show the standard starting position.
    fn start(&mut self);

    /// Swap the board orientation.
    fn flip(&mut self);

    /// A dropped piece was refused and returns to its square.
    fn snapback(&mut self, _from: Square, _to: Square) {}

    /// Mark squares a hovered piece could move to. Empty clears marks.
    fn highlight(&mut self, _squares: &[Square]) {}

    /// Show or hide the engine thinking indicator.
    fn set_thinking(&mut self, _thinking: bool) {}

    fn show_panel(&mut self, panel: &Panel<'_>);
}
