//! Commands typed by the player.

use sparring_core::rules::parse_square;
use sparring_core::{Event, Proposal, Square};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputKind {
    Exit,
    Newgame,
    Help,
    Undo,
    Flip,
    /// Show where the piece on a square can go.
    Moves(Square),
    GameMove(Proposal),
    Error,
}

impl From<&str> for InputKind {
    fn from(s: &str) -> Self {
        let tokens: Vec<&str> = s.split_whitespace().collect();

        match tokens.as_slice() {
            [] => Self::Error,
            ["moves", square] => match parse_square(square.as_bytes()) {
                Ok(square) => Self::Moves(square),
                Err(_) => Self::Error,
            },
            [single] => {
                if let Ok(proposal) = single.parse() {
                    return Self::GameMove(proposal);
                }
                match single.to_ascii_lowercase().as_str() {
                    "exit" | "quit" => Self::Exit,
                    "newgame" | "ng" | "reset" => Self::Newgame,
                    "help" => Self::Help,
                    "undo" => Self::Undo,
                    "flip" => Self::Flip,
                    _ => Self::Error,
                }
            }
            // "e2 e4"
            [from, to] => match (parse_square(from.as_bytes()), parse_square(to.as_bytes())) {
                (Ok(from), Ok(to)) => Self::GameMove(Proposal::new(from, to, None)),
                _ => Self::Error,
            },
            _ => Self::Error,
        }
    }
}

impl InputKind {
    /// The controller event for this command. Help and errors stay in the terminal.
    pub fn event(&self) -> Option<Event> {
        match self {
            Self::Exit => Some(Event::Quit),
            Self::Newgame => Some(Event::Reset),
            Self::Undo => Some(Event::Undo),
            Self::Flip => Some(Event::Flip),
            Self::Moves(square) => Some(Event::Hover(*square)),
            Self::GameMove(proposal) => Some(Event::Drop(*proposal)),
            Self::Help | Self::Error => None,
        }
    }
}

pub const HELP: &str = "\
Commands:
e2e4 | e2 e4 => Move the piece on e2 to e4. Add q, r, b or n to pick a promotion.
moves e2 => Show where the piece on e2 can go.
undo => Take back the engine's last move and yours.
newgame | ng | reset => Begin a new game.
flip => Turn the board around.
help => Print this help text.
exit | quit => End the session.";

#[cfg(test)]
mod tests {
    use super::*;
    use sparring_core::Role;

    #[test]
    fn parse_moves() {
        assert_eq!(
            InputKind::from("e2e4"),
            InputKind::GameMove(Proposal::new(Square::E2, Square::E4, None))
        );
        assert_eq!(
            InputKind::from("  e2 e4 \n"),
            InputKind::GameMove(Proposal::new(Square::E2, Square::E4, None))
        );
        assert_eq!(
            InputKind::from("a7a8n"),
            InputKind::GameMove(Proposal::new(Square::A7, Square::A8, Some(Role::Knight)))
        );
        assert_eq!(InputKind::from("e2 e9"), InputKind::Error);
        assert_eq!(InputKind::from("e2e4 now"), InputKind::Error);
    }

    #[test]
    fn parse_commands() {
        assert_eq!(InputKind::from("exit"), InputKind::Exit);
        assert_eq!(InputKind::from("QUIT"), InputKind::Exit);
        assert_eq!(InputKind::from("ng"), InputKind::Newgame);
        assert_eq!(InputKind::from("reset"), InputKind::Newgame);
        assert_eq!(InputKind::from("undo"), InputKind::Undo);
        assert_eq!(InputKind::from("flip"), InputKind::Flip);
        assert_eq!(InputKind::from("help"), InputKind::Help);
        assert_eq!(InputKind::from("moves g1"), InputKind::Moves(Square::G1));
        assert_eq!(InputKind::from("moves"), InputKind::Error);
        assert_eq!(InputKind::from(""), InputKind::Error);
        assert_eq!(InputKind::from("castle"), InputKind::Error);
    }

    #[test]
    fn events() {
        assert_eq!(InputKind::Exit.event(), Some(Event::Quit));
        assert_eq!(InputKind::Newgame.event(), Some(Event::Reset));
        assert_eq!(
            InputKind::from("moves b1").event(),
            Some(Event::Hover(Square::B1))
        );
        assert_eq!(InputKind::Help.event(), None);
        assert_eq!(InputKind::Error.event(), None);
    }
}
