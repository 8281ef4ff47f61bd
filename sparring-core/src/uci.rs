//! Universal Chess Interface, client side.
//!
//! Only the subset needed to ask an engine for a move and read its answer.

use std::fmt::{self, Display};
use std::io::{self, Write};
use std::str::SplitWhitespace;

use crate::rules::Proposal;

/// UciCommand is sent from this program to an external chess engine.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(String),
    Go { depth: u32 },
    Stop,
    Quit,
}

impl UciCommand {
    /// Write this command as a single line and flush.
    pub fn send<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_string().as_bytes())?;
        writer.flush()
    }
}

impl Display for UciCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Uci => f.write_str("uci\n"),
            Self::IsReady => f.write_str("isready\n"),
            Self::UciNewGame => f.write_str("ucinewgame\n"),
            Self::Position(fen) => writeln!(f, "position fen {fen}"),
            Self::Go { depth } => writeln!(f, "go depth {depth}"),
            Self::Stop => f.write_str("stop\n"),
            Self::Quit => f.write_str("quit\n"),
        }
    }
}

/// Outcome of a search as reported on a `bestmove` line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EngineReply {
    /// A coordinate move. Promotion is only present if the engine wrote one.
    Move(Proposal),
    /// Engine has no legal move to offer.
    NoMove,
    /// Payload could not be decoded.
    Malformed(String),
}

impl EngineReply {
    /// Decode the token following `bestmove`.
    fn parse_payload(token: Option<&str>) -> Self {
        match token {
            None | Some("(none)") | Some("0000") => Self::NoMove,
            Some(coordinates) => match coordinates.parse::<Proposal>() {
                Ok(proposal) => Self::Move(proposal),
                Err(_) => Self::Malformed(coordinates.to_string()),
            },
        }
    }
}

/// EngineMessage is a single line received from an external chess engine.
/// Lines are told apart by their first token only.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EngineMessage {
    UciOk,
    ReadyOk,
    Id(String),
    Info(String),
    BestMove(EngineReply),
    /// Anything else an engine may print. Ignored by the bridge.
    Unknown(String),
}

impl EngineMessage {
    /// Classify one line of engine output. This never fails.
    pub fn parse(line: &str) -> Self {
        let mut input = line.split_whitespace();

        match input.next() {
            Some("uciok") => Self::UciOk,
            Some("readyok") => Self::ReadyOk,
            Some("id") => Self::Id(rest(input)),
            Some("info") => Self::Info(rest(input)),
            Some("bestmove") => Self::BestMove(EngineReply::parse_payload(input.next())),
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

/// Join the remaining tokens of a line with single spaces.
fn rest(input: SplitWhitespace) -> String {
    input.collect::<Vec<_>>().join(" ")
}
