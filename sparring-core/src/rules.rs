//! Rules collaborator.
//!
//! The controller never reads or changes board state directly. It goes through
//! the [`Rules`] capability, which owns the position, judges legality and keeps
//! the authoritative history of played moves.

use std::fmt::{self, Display};
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Piece, Position, Role, Square};

use crate::error::{self, ErrorKind};

/// A move someone would like to play, in coordinate form.
/// Nothing about it is known to be legal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Proposal {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl Proposal {
    pub fn new(from: Square, to: Square, promotion: Option<Role>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    /// Returns a copy with `role` as promotion piece if none was given.
    pub fn or_promotion(self, role: Role) -> Self {
        Self {
            promotion: self.promotion.or(Some(role)),
            ..self
        }
    }
}

/// Parse coordinate notation: from square, to square, optional promotion letter.
/// Examples: `e2e4`, `e7e8q`.
impl FromStr for Proposal {
    type Err = error::Error;

    fn from_str(s: &str) -> error::Result<Self> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err((ErrorKind::ParseMoveMalformed, s).into());
        }

        let from = parse_square(&bytes[0..2])?;
        let to = parse_square(&bytes[2..4])?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(letter) => match letter.to_ascii_lowercase() {
                b'n' => Some(Role::Knight),
                b'b' => Some(Role::Bishop),
                b'r' => Some(Role::Rook),
                b'q' => Some(Role::Queen),
                _ => return Err((ErrorKind::ParseMoveMalformed, s).into()),
            },
        };

        Ok(Self::new(from, to, promotion))
    }
}

impl Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

/// Parse a two character square such as `e4`.
pub fn parse_square(bytes: &[u8]) -> error::Result<Square> {
    Square::from_ascii(bytes).map_err(|err| (ErrorKind::ParseSquareMalformed, err).into())
}

/// A move accepted and applied by the rules collaborator. Immutable once made.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlayedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    pub side: Color,
    pub captured: Option<Role>,
    pub san: String,
}

/// Capability interface over a chess rules engine.
pub trait Rules {
    /// Apply a proposal if legal. Returns None and leaves state untouched if not.
    fn apply_move(&mut self, proposal: Proposal) -> Option<PlayedMove>;

    /// Take back the most recent move.
    fn undo(&mut self) -> Option<PlayedMove>;

    /// Return to the standard starting position with empty history.
    fn reset(&mut self);

    /// Squares the piece on `from` can legally move to.
    fn legal_targets(&self, from: Square) -> Vec<Square>;

    fn piece_at(&self, square: Square) -> Option<Piece>;
    fn turn(&self) -> Color;
    fn is_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_draw(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Current position as a FEN string.
    fn fen(&self) -> String;

    /// Every move played since the last reset, oldest first.
    fn history(&self) -> &[PlayedMove];
}

/// Standard chess rules backed by shakmaty.
///
/// shakmaty positions are immutable snapshots, so undo is a stack of the
/// positions that preceded each move. A parallel stack of Zobrist keys
/// serves repetition detection.
#[derive(Debug, Clone, Default)]
pub struct StandardRules {
    position: Chess,
    previous: Vec<Chess>,
    previous_hashes: Vec<Zobrist64>,
    history: Vec<PlayedMove>,
}

impl StandardRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary legal position with no history.
    pub fn from_fen(fen: &str) -> error::Result<Self> {
        let parsed: Fen = fen
            .parse()
            .map_err(|err| (ErrorKind::ParseFenMalformed, format!("{fen}: {err}")))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| (ErrorKind::ParseFenMalformed, format!("{fen}: {err}")))?;

        Ok(Self {
            position,
            ..Self::default()
        })
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Key for repetition: placement, turn, castling rights, legal en passant.
    fn hash(position: &Chess) -> Zobrist64 {
        position.zobrist_hash(EnPassantMode::Legal)
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = Self::hash(&self.position);
        let occurrences = self
            .previous_hashes
            .iter()
            .filter(|&&hash| hash == current)
            .count();
        occurrences + 1 >= 3
    }
}

impl Rules for StandardRules {
    fn apply_move(&mut self, proposal: Proposal) -> Option<PlayedMove> {
        let exact = UciMove::Normal {
            from: proposal.from,
            to: proposal.to,
            promotion: proposal.promotion,
        };
        // A promotion letter on a non-promoting move is ignored.
        let plain = UciMove::Normal {
            from: proposal.from,
            to: proposal.to,
            promotion: None,
        };
        let move_ = exact
            .to_move(&self.position)
            .or_else(|_| plain.to_move(&self.position))
            .ok()?;

        let before = self.position.clone();
        let side = before.turn();
        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, &move_);

        let played = PlayedMove {
            from: proposal.from,
            to: proposal.to,
            promotion: move_.promotion(),
            side,
            captured: move_.capture(),
            san: san.to_string(),
        };
        self.previous_hashes.push(Self::hash(&before));
        self.previous.push(before);
        self.history.push(played.clone());
        Some(played)
    }

    fn undo(&mut self) -> Option<PlayedMove> {
        let position = self.previous.pop()?;
        self.previous_hashes.pop();
        self.position = position;
        self.history.pop()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn legal_targets(&self, from: Square) -> Vec<Square> {
        let mut targets = Vec::new();
        for move_ in self.position.legal_moves() {
            if let UciMove::Normal { from: origin, to, .. } = move_.to_uci(CastlingMode::Standard)
            {
                if origin == from && !targets.contains(&to) {
                    targets.push(to);
                }
            }
        }
        targets
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    fn turn(&self) -> Color {
        self.position.turn()
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_stalemate()
            || self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || self.is_threefold_repetition()
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn history(&self) -> &[PlayedMove] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn play(rules: &mut StandardRules, moves: &[&str]) {
        for move_str in moves {
            let proposal: Proposal = move_str.parse().unwrap();
            rules.apply_move(proposal).unwrap();
        }
    }

    #[test]
    fn parse_proposal() {
        let plain: Proposal = "e2e4".parse().unwrap();
        assert_eq!(plain, Proposal::new(Square::E2, Square::E4, None));

        let promo: Proposal = "a7a8N".parse().unwrap();
        assert_eq!(
            promo,
            Proposal::new(Square::A7, Square::A8, Some(Role::Knight))
        );
        assert_eq!(promo.to_string(), "a7a8n");

        for bad in ["", "e2", "e2e", "e2e9", "i2e4", "e7e8k", "e2e4qq"] {
            assert!(bad.parse::<Proposal>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn apply_and_undo_restores_position() {
        let mut rules = StandardRules::new();
        assert_eq!(rules.fen(), START_FEN);

        let played = rules
            .apply_move(Proposal::new(Square::E2, Square::E4, None))
            .unwrap();
        assert_eq!(played.san, "e4");
        assert_eq!(played.side, Color::White);
        assert_eq!(played.captured, None);
        assert_eq!(rules.history().len(), 1);
        assert_eq!(rules.turn(), Color::Black);

        assert_eq!(rules.undo(), Some(played));
        assert_eq!(rules.fen(), START_FEN);
        assert!(rules.history().is_empty());
        assert_eq!(rules.undo(), None);
    }

    #[test]
    fn illegal_move_leaves_state() {
        let mut rules = StandardRules::new();
        assert_eq!(
            rules.apply_move(Proposal::new(Square::E2, Square::E5, None)),
            None
        );
        assert_eq!(
            rules.apply_move(Proposal::new(Square::E7, Square::E5, None)),
            None
        );
        assert_eq!(rules.fen(), START_FEN);
        assert!(rules.history().is_empty());
    }

    #[test]
    fn promotion_letter_ignored_on_normal_move() {
        let mut rules = StandardRules::new();
        let played = rules
            .apply_move(Proposal::new(Square::G1, Square::F3, Some(Role::Queen)))
            .unwrap();
        assert_eq!(played.promotion, None);
        assert_eq!(played.san, "Nf3");
    }

    #[test]
    fn captures_are_recorded() {
        let mut rules = StandardRules::new();
        play(&mut rules, &["e2e4", "d7d5"]);
        let played = rules
            .apply_move(Proposal::new(Square::E4, Square::D5, None))
            .unwrap();
        assert_eq!(played.captured, Some(Role::Pawn));
        assert_eq!(played.side, Color::White);
        assert_eq!(played.san, "exd5");
    }

    #[test]
    fn en_passant_captures_a_pawn() {
        let mut rules = StandardRules::new();
        play(&mut rules, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        let played = rules
            .apply_move(Proposal::new(Square::E5, Square::D6, None))
            .unwrap();
        assert_eq!(played.captured, Some(Role::Pawn));
    }

    #[test]
    fn castling_uses_king_target() {
        let mut rules = StandardRules::new();
        play(&mut rules, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]);
        assert!(rules.legal_targets(Square::E1).contains(&Square::G1));

        let played = rules
            .apply_move(Proposal::new(Square::E1, Square::G1, None))
            .unwrap();
        assert_eq!(played.san, "O-O");
        assert_eq!(played.to, Square::G1);
    }

    #[test]
    fn legal_targets_from_start() {
        let rules = StandardRules::new();
        let mut knight = rules.legal_targets(Square::G1);
        knight.sort();
        assert_eq!(knight, vec![Square::F3, Square::H3]);
        assert!(rules.legal_targets(Square::E4).is_empty());
        assert!(rules.legal_targets(Square::E7).is_empty());
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut rules = StandardRules::new();
        play(&mut rules, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(rules.is_check());
        assert!(rules.is_checkmate());
        assert!(!rules.is_draw());
        assert!(rules.is_game_over());
        assert_eq!(rules.history().last().unwrap().san, "Qh4#");
    }

    #[test]
    fn threefold_repetition_is_draw() {
        let mut rules = StandardRules::new();
        play(
            &mut rules,
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"],
        );
        assert!(!rules.is_draw());
        play(&mut rules, &["f6g8"]);
        assert!(rules.is_draw());
    }

    #[test]
    fn threefold_repetition_survives_undo() {
        let mut rules = StandardRules::new();
        play(
            &mut rules,
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"],
        );
        assert!(rules.is_draw());
        rules.undo();
        assert!(!rules.is_draw());
        play(&mut rules, &["f6g8"]);
        assert!(rules.is_draw());
    }

    #[test]
    fn fifty_move_rule_is_draw() {
        let mut rules = StandardRules::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        assert!(!rules.is_draw());
        assert!(rules.history().is_empty());

        play(&mut rules, &["a1a2"]);
        assert!(rules.is_draw());
        assert!(rules.is_game_over());
        assert!(!rules.is_checkmate());

        rules.undo();
        assert!(!rules.is_draw());
    }

    #[test]
    fn pawn_move_resets_fifty_move_count() {
        let mut rules = StandardRules::from_fen("4k3/8/8/8/8/8/P7/R3K3 w - - 99 80").unwrap();
        play(&mut rules, &["a2a3"]);
        assert!(!rules.is_draw());
    }

    #[test]
    fn insufficient_material_is_draw() {
        let knight = StandardRules::from_fen("4k3/8/8/8/8/8/8/1N2K3 w - - 0 1").unwrap();
        assert!(knight.is_draw());
        assert!(!knight.is_checkmate());

        let bare = StandardRules::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(bare.is_draw());

        let rook = StandardRules::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(!rook.is_draw());
    }

    #[test]
    fn capture_into_insufficient_material() {
        // Taking the last rook leaves king and knight against king.
        let mut rules = StandardRules::from_fen("4k3/8/8/8/1N6/8/r7/4K3 w - - 0 1").unwrap();
        assert!(!rules.is_draw());
        play(&mut rules, &["b4a2"]);
        assert_eq!(rules.history()[0].captured, Some(Role::Rook));
        assert!(rules.is_draw());
    }

    #[test]
    fn from_fen_rejects_malformed() {
        let err = StandardRules::from_fen("not a fen").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFenMalformed);

        // Two white kings.
        let err = StandardRules::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFenMalformed);
    }

    #[test]
    fn reset_clears_history() {
        let mut rules = StandardRules::new();
        play(&mut rules, &["d2d4", "d7d5"]);
        rules.reset();
        assert_eq!(rules.fen(), START_FEN);
        assert!(rules.history().is_empty());
    }
}
