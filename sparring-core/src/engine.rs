//! EngineBridge owns the conversation with an external UCI engine.
//!
//! The bridge writes commands into the engine's input and is handed the
//! engine's output one line at a time. Replies never come back as return
//! values of a request; they arrive later as lines on the same channel.

use std::io::Write;

use log::{debug, info};

use crate::error::{self, ErrorKind};
use crate::uci::{EngineMessage, EngineReply, UciCommand};

/// Readiness of the engine. Becomes `Ready` once and stays so for the session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Readiness {
    NotReady,
    Ready,
}

pub struct EngineBridge<W: Write> {
    writer: W,
    readiness: Readiness,
    closed: bool,
}

impl<W: Write> EngineBridge<W> {
    /// Create a bridge writing commands into `writer`, usually the engine's stdin.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            readiness: Readiness::NotReady,
            closed: false,
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Returns mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Send the protocol handshake followed by a readiness probe.
    /// The engine is ready only once it has answered the probe.
    pub fn initialize(&mut self) -> error::Result<()> {
        self.send(UciCommand::Uci)?;
        self.send(UciCommand::IsReady)
    }

    /// Ask the engine to search `fen` to a fixed depth.
    ///
    /// Fails with `EngineNotReady` before the handshake completes; the caller
    /// retries later. The bridge does not track requests in flight, so callers
    /// must not issue another request before the reply to this one arrives.
    pub fn request_move(&mut self, fen: &str, depth: u32) -> error::Result<()> {
        if !self.is_ready() {
            return Err(ErrorKind::EngineNotReady.into());
        }
        self.send(UciCommand::Position(fen.to_string()))?;
        self.send(UciCommand::Go { depth })
    }

    /// Ask a running search to finish now. The engine still answers with `bestmove`.
    pub fn stop(&mut self) -> error::Result<()> {
        self.send(UciCommand::Stop)
    }

    /// Tell the engine the next search belongs to a different game.
    pub fn new_game(&mut self) -> error::Result<()> {
        self.send(UciCommand::UciNewGame)
    }

    /// Ask the engine to exit. Errors are ignored since the engine may be gone.
    pub fn quit(&mut self) {
        if !self.closed {
            let _ = self.send(UciCommand::Quit);
            self.closed = true;
        }
    }

    /// Record that the engine's output has ended.
    pub fn mark_closed(&mut self) {
        self.closed = true;
    }

    /// Process one line of engine output.
    /// Returns a reply if the line was a search result, None for all other shapes.
    pub fn handle_line(&mut self, line: &str) -> Option<EngineReply> {
        debug!("engine >> {}", line.trim_end());

        match EngineMessage::parse(line) {
            EngineMessage::ReadyOk => {
                if self.readiness == Readiness::NotReady {
                    info!("engine ready");
                }
                self.readiness = Readiness::Ready;
                None
            }
            EngineMessage::Id(id) => {
                info!("engine id {id}");
                None
            }
            EngineMessage::BestMove(reply) => Some(reply),
            EngineMessage::UciOk | EngineMessage::Info(_) | EngineMessage::Unknown(_) => None,
        }
    }

    fn send(&mut self, command: UciCommand) -> error::Result<()> {
        if self.closed {
            return Err((ErrorKind::EngineClosed, command.to_string().trim_end()).into());
        }
        debug!("engine << {}", command.to_string().trim_end());
        command.send(&mut self.writer)?;
        Ok(())
    }
}
