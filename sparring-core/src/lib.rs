//! Engine communication and game-state synchronization for playing chess
//! against an external UCI engine.
//!
//! The [`controller::GameController`] ties together the rules collaborator,
//! the [`engine::EngineBridge`], the move ledger, the captured piece tracker
//! and a board view, and processes one [`controller::Event`] at a time.

pub mod captured;
pub mod controller;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod process;
pub mod rules;
pub mod status;
pub mod uci;
pub mod view;

pub use captured::CapturedPieceTracker;
pub use controller::{
    ControllerBuilder, DropOutcome, Event, Flow, GameController, Phase, UndoOutcome,
};
pub use engine::{EngineBridge, Readiness};
pub use ledger::MoveLedger;
pub use process::EngineProcess;
pub use rules::{PlayedMove, Proposal, Rules, StandardRules};
pub use status::status;
pub use view::{BoardView, Panel};

pub use shakmaty::{Color, Role, Square};
