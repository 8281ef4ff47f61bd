//! GameController orchestrates a game between a human and an engine.
//!
//! The controller is the only component that mutates the rules collaborator,
//! the move ledger and the captured piece tracker. All input reaches it as
//! [`Event`]s taken one at a time from a single queue, so handlers never
//! overlap and no state needs locking.

use std::io::Write;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};
use shakmaty::{Color, Role, Square};

use crate::captured::CapturedPieceTracker;
use crate::engine::EngineBridge;
use crate::error::{self, Error, ErrorKind};
use crate::ledger::MoveLedger;
use crate::rules::{PlayedMove, Proposal, Rules};
use crate::status::{side_name, status};
use crate::uci::EngineReply;
use crate::view::{BoardView, Panel};

/// Inputs to the controller, from the board, the buttons, the engine and timers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Event {
    /// Human dropped a piece.
    Drop(Proposal),
    /// Human is pointing at a square.
    Hover(Square),
    Reset,
    Undo,
    Flip,
    /// One line of engine output.
    EngineLine(String),
    /// Engine output has ended.
    EngineExited,
    /// Time to try an owed engine request again, for this polling chain.
    RetryEngine(u64),
    /// Watchdog for the request with this generation.
    EngineTimeout(u64),
    Quit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// Waiting for human input.
    Idle,
    /// A move request is in flight.
    AwaitingEngine,
    /// Terminal position reached. Only reset is accepted.
    GameOver,
}

/// Whether the session should keep running after an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DropOutcome {
    Accepted,
    Snapback,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UndoOutcome {
    Undone,
    /// Fewer than two moves played. Nothing changed.
    InsufficientHistory,
    /// Undo is not offered while the engine thinks or after the game ended.
    Rejected,
}

/// ControllerBuilder sets the parameters of a GameController.
///
/// Default values:
///
/// * `depth`: 10
/// * `human`: White
/// * `ready_poll_interval`: 100 milliseconds
/// * `ready_poll_attempts`: 50
/// * `engine_timeout`: 60 seconds
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ControllerBuilder {
    depth: u32,
    human: Color,
    ready_poll_interval: Duration,
    ready_poll_attempts: u32,
    engine_timeout: Option<Duration>,
}

impl ControllerBuilder {
    /// Create a new default ControllerBuilder.
    pub fn new() -> Self {
        Self {
            depth: 10,
            human: Color::White,
            ready_poll_interval: Duration::from_millis(100),
            ready_poll_attempts: 50,
            engine_timeout: Some(Duration::from_secs(60)),
        }
    }

    /// Set the fixed search depth requested from the engine.
    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Set the side the human plays.
    pub fn human(mut self, human: Color) -> Self {
        self.human = human;
        self
    }

    /// Set how often and how many times a request is retried before the engine is ready.
    pub fn ready_poll(mut self, interval: Duration, attempts: u32) -> Self {
        self.ready_poll_interval = interval;
        self.ready_poll_attempts = attempts;
        self
    }

    /// Set how long a search may run before the engine is told to stop. None waits forever.
    pub fn engine_timeout(mut self, engine_timeout: Option<Duration>) -> Self {
        self.engine_timeout = engine_timeout;
        self
    }

    /// Create and return a new GameController. Call `start` before feeding events.
    pub fn build<R, W, V>(
        &self,
        rules: R,
        bridge: EngineBridge<W>,
        view: V,
        events: Sender<Event>,
    ) -> GameController<R, W, V>
    where
        R: Rules,
        W: Write,
        V: BoardView,
    {
        GameController {
            rules,
            bridge,
            view,
            events,
            ledger: MoveLedger::new(),
            captured: CapturedPieceTracker::new(),
            phase: Phase::Idle,
            depth: self.depth,
            human: self.human,
            ready_poll_interval: self.ready_poll_interval,
            ready_poll_attempts: self.ready_poll_attempts,
            engine_timeout: self.engine_timeout,
            owed: None,
            poll_chain: 0,
            generation: 0,
            stale_replies: 0,
        }
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct GameController<R, W: Write, V> {
    rules: R,
    bridge: EngineBridge<W>,
    view: V,
    events: Sender<Event>,
    ledger: MoveLedger,
    captured: CapturedPieceTracker,
    phase: Phase,

    // Parameters
    depth: u32,
    human: Color,
    ready_poll_interval: Duration,
    ready_poll_attempts: u32,
    engine_timeout: Option<Duration>,

    // Engine request bookkeeping.
    // `owed` counts failed attempts for an engine move not yet requested.
    owed: Option<u32>,
    // Each owed move polls on its own chain; older chains are ignored.
    poll_chain: u64,
    generation: u64,
    stale_replies: u32,
}

impl<R, W, V> GameController<R, W, V>
where
    R: Rules,
    W: Write,
    V: BoardView,
{
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn human(&self) -> Color {
        self.human
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn ledger(&self) -> &MoveLedger {
        &self.ledger
    }

    pub fn captured(&self) -> &CapturedPieceTracker {
        &self.captured
    }

    pub fn bridge(&self) -> &EngineBridge<W> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut EngineBridge<W> {
        &mut self.bridge
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Current status text.
    pub fn status(&self) -> String {
        status(&self.rules)
    }

    /// True while an engine move is due but could not be requested yet.
    pub fn is_engine_owed(&self) -> bool {
        self.owed.is_some()
    }

    /// Begin the session: handshake with the engine and show the board.
    /// If the engine plays White it is asked for the first move.
    pub fn start(&mut self) -> error::Result<()> {
        self.bridge.initialize()?;
        self.view.start();
        self.settle();
        self.hand_to_engine()
    }

    /// Process one event.
    pub fn handle(&mut self, event: Event) -> error::Result<Flow> {
        match event {
            Event::Drop(proposal) => {
                self.drop_piece(proposal)?;
            }
            Event::Hover(square) => {
                self.hover(square);
            }
            Event::Reset => self.reset()?,
            Event::Undo => {
                self.undo()?;
            }
            Event::Flip => self.view.flip(),
            Event::EngineLine(line) => self.engine_line(&line)?,
            Event::EngineExited => {
                self.engine_exited();
                return Ok(Flow::Quit);
            }
            Event::RetryEngine(chain) => self.retry_engine(chain)?,
            Event::EngineTimeout(generation) => self.engine_timeout(generation)?,
            Event::Quit => {
                self.bridge.quit();
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Human drops a piece. A promotion without a piece letter becomes a queen.
    pub fn drop_piece(&mut self, proposal: Proposal) -> error::Result<DropOutcome> {
        if !self.accepts_drop(proposal.from) {
            debug!("drop {proposal} refused in phase {:?}", self.phase);
            self.view.snapback(proposal.from, proposal.to);
            return Ok(DropOutcome::Snapback);
        }

        let played = match self.rules.apply_move(proposal.or_promotion(Role::Queen)) {
            Some(played) => played,
            None => {
                debug!("illegal drop {proposal}");
                self.view.snapback(proposal.from, proposal.to);
                return Ok(DropOutcome::Snapback);
            }
        };

        self.commit(played);
        self.settle();
        self.hand_to_engine()?;
        Ok(DropOutcome::Accepted)
    }

    /// Human points at a square. Returns and highlights where its piece may go.
    pub fn hover(&mut self, square: Square) -> Vec<Square> {
        let targets = if self.accepts_drop(square) {
            self.rules.legal_targets(square)
        } else {
            Vec::new()
        };
        self.view.highlight(&targets);
        targets
    }

    /// Start a new game from the standard position. Accepted in every phase.
    pub fn reset(&mut self) -> error::Result<()> {
        if self.phase == Phase::AwaitingEngine {
            // The reply to the running search belongs to the old game.
            self.stale_replies += 1;
            self.bridge.stop()?;
            self.view.set_thinking(false);
        }
        self.owed = None;

        self.rules.reset();
        self.ledger.clear();
        self.captured.clear();
        self.bridge.new_game()?;
        info!("new game");

        self.view.start();
        self.settle();
        self.hand_to_engine()
    }

    /// Take back the last two moves, the engine's and the human's.
    pub fn undo(&mut self) -> error::Result<UndoOutcome> {
        if self.phase != Phase::Idle {
            debug!("undo refused in phase {:?}", self.phase);
            return Ok(UndoOutcome::Rejected);
        }
        if self.ledger.len() < 2 {
            return Ok(UndoOutcome::InsufficientHistory);
        }
        self.owed = None;

        for _ in 0..2 {
            self.rules.undo();
        }
        self.ledger.truncate_last(2)?;
        self.captured.recompute_from(self.ledger.entries());
        info!("undo, {} moves left", self.ledger.len());

        self.settle();
        self.hand_to_engine()?;
        Ok(UndoOutcome::Undone)
    }

    /// A drop is only considered in Idle, on the human's turn, for the human's pieces.
    fn accepts_drop(&self, from: Square) -> bool {
        self.phase == Phase::Idle
            && self.owed.is_none()
            && self.rules.turn() == self.human
            && self.rules.piece_at(from).map(|piece| piece.color) == Some(self.human)
    }

    /// Record a move the rules collaborator has just applied.
    fn commit(&mut self, played: PlayedMove) {
        self.captured.apply_incremental(&played);
        info!("{} plays {}", side_name(played.side), played.san);
        self.ledger.append(played);
    }

    /// Recompute derived state and pick Idle or GameOver from the position.
    fn settle(&mut self) {
        debug_assert_eq!(self.ledger.len(), self.rules.history().len());

        let status = status(&self.rules);
        let fen = self.rules.fen();
        let rows = self.ledger.rows();

        self.view.set_position(&fen);
        self.view.show_panel(&Panel {
            status: &status,
            fen: &fen,
            moves: &rows,
            captured: &self.captured,
        });

        self.phase = if self.rules.is_game_over() {
            info!("{status}");
            Phase::GameOver
        } else {
            Phase::Idle
        };
    }

    /// If it is the engine's turn, owe it a move and try to request one.
    fn hand_to_engine(&mut self) -> error::Result<()> {
        if self.phase == Phase::Idle && self.rules.turn() != self.human {
            self.poll_chain += 1;
            self.owed = Some(0);
            self.request_engine_move()?;
        }
        Ok(())
    }

    fn request_engine_move(&mut self) -> error::Result<()> {
        let attempts = match self.owed {
            Some(attempts) => attempts,
            None => return Ok(()),
        };

        match self.bridge.request_move(&self.rules.fen(), self.depth) {
            Ok(()) => {
                self.owed = None;
                self.generation += 1;
                self.phase = Phase::AwaitingEngine;
                self.view.set_thinking(true);
                if let Some(timeout) = self.engine_timeout {
                    self.schedule(timeout, Event::EngineTimeout(self.generation))?;
                }
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::EngineNotReady => {
                if attempts >= self.ready_poll_attempts {
                    error!("engine still not ready after {attempts} attempts, move not requested");
                    self.owed = None;
                    Ok(())
                } else {
                    debug!("engine not ready, retry {}", attempts + 1);
                    self.owed = Some(attempts + 1);
                    self.schedule(self.ready_poll_interval, Event::RetryEngine(self.poll_chain))
                }
            }
            Err(err) => {
                self.owed = None;
                Err(err)
            }
        }
    }

    fn retry_engine(&mut self, chain: u64) -> error::Result<()> {
        if chain != self.poll_chain {
            debug!("dropping retry from polling chain {chain}");
            return Ok(());
        }
        if self.phase == Phase::Idle && self.owed.is_some() {
            self.request_engine_move()
        } else {
            Ok(())
        }
    }

    fn engine_line(&mut self, line: &str) -> error::Result<()> {
        let reply = match self.bridge.handle_line(line) {
            Some(reply) => reply,
            None => return Ok(()),
        };

        if self.stale_replies > 0 {
            self.stale_replies -= 1;
            debug!("discarding reply from a previous game: {reply:?}");
            return Ok(());
        }
        if self.phase != Phase::AwaitingEngine {
            warn!("engine reply without a request: {reply:?}");
            return Ok(());
        }

        self.view.set_thinking(false);
        self.engine_reply(reply);
        Ok(())
    }

    fn engine_reply(&mut self, reply: EngineReply) {
        let applied = match reply {
            EngineReply::Move(proposal) => {
                match self.rules.apply_move(proposal.or_promotion(Role::Queen)) {
                    Some(played) => {
                        self.commit(played);
                        true
                    }
                    None => {
                        error!(
                            "engine move {proposal} is illegal in {}",
                            self.rules.fen()
                        );
                        false
                    }
                }
            }
            EngineReply::NoMove => false,
            EngineReply::Malformed(payload) => {
                warn!("malformed engine reply {payload:?}");
                false
            }
        };

        self.settle();
        if !applied && self.phase == Phase::Idle {
            warn!(
                "engine gave no move but the game is not over: {}",
                self.rules.fen()
            );
        }
    }

    fn engine_timeout(&mut self, generation: u64) -> error::Result<()> {
        if self.phase == Phase::AwaitingEngine && generation == self.generation {
            warn!("engine search {generation} timed out, asking it to stop");
            self.bridge.stop()?;
        }
        Ok(())
    }

    fn engine_exited(&mut self) {
        error!("engine process exited");
        self.bridge.mark_closed();
        self.view.set_thinking(false);
        if self.phase == Phase::AwaitingEngine {
            self.phase = Phase::Idle;
        }
    }

    /// Deliver `event` to the queue after `delay`.
    fn schedule(&self, delay: Duration, event: Event) -> error::Result<()> {
        let events = self.events.clone();
        thread::Builder::new()
            .name(String::from("sparring-timer"))
            .spawn(move || {
                thread::sleep(delay);
                // The session may have ended; nobody is left to notify.
                let _ = events.send(event);
            })
            .map(|_| ())
            .map_err(|err| Error::new(ErrorKind::ThreadSpawn, err))
    }
}
