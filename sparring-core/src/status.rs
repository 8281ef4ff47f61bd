//! Human readable game status.

use shakmaty::Color;

use crate::rules::Rules;

/// Display name of a side.
pub fn side_name(side: Color) -> &'static str {
    match side {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// Describe the current state of the game.
///
/// Checkmate wins over draw, draw wins over the normal turn text.
/// The side named on checkmate is the side to move, which has lost.
pub fn status<R: Rules + ?Sized>(rules: &R) -> String {
    let to_move = side_name(rules.turn());

    if rules.is_checkmate() {
        format!("Game over, {to_move} is in checkmate.")
    } else if rules.is_draw() {
        String::from("Game over, drawn position")
    } else if rules.is_check() {
        format!("{to_move} to move, {to_move} is in check")
    } else {
        format!("{to_move} to move")
    }
}
