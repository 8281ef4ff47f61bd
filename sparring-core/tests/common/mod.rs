//! Shared fixtures: a board view that records what it was told to show,
//! and a controller wired to a scripted engine.

#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use sparring_core::*;

#[derive(Debug, Default)]
pub struct RecordingView {
    pub fen: String,
    pub status: String,
    pub moves: Vec<String>,
    pub captured_white: String,
    pub captured_black: String,
    pub flipped: bool,
    pub thinking: bool,
    pub starts: usize,
    pub snapbacks: usize,
    pub highlighted: Vec<Square>,
}

impl BoardView for RecordingView {
    fn set_position(&mut self, fen: &str) {
        self.fen = fen.to_string();
    }

    fn start(&mut self) {
        self.starts += 1;
    }

    fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    fn snapback(&mut self, _from: Square, _to: Square) {
        self.snapbacks += 1;
    }

    fn highlight(&mut self, squares: &[Square]) {
        self.highlighted = squares.to_vec();
    }

    fn set_thinking(&mut self, thinking: bool) {
        self.thinking = thinking;
    }

    fn show_panel(&mut self, panel: &Panel<'_>) {
        self.status = panel.status.to_string();
        self.moves = panel.moves.to_vec();
        self.captured_white = panel.captured.display(Color::White);
        self.captured_black = panel.captured.display(Color::Black);
    }
}

pub type TestController = GameController<StandardRules, Vec<u8>, RecordingView>;

/// A controller whose engine is played by the test.
pub struct Harness {
    pub controller: TestController,
    pub events: Receiver<Event>,
}

/// Builder without a watchdog so no timer events appear unless asked for.
pub fn builder() -> ControllerBuilder {
    ControllerBuilder::new().engine_timeout(None)
}

impl Harness {
    /// Build and start a controller. The engine has not answered `isready` yet.
    pub fn new(builder: ControllerBuilder) -> Self {
        let mut harness = Self::unstarted(builder);
        harness.controller.start().unwrap();
        harness
    }

    /// Build, mark the engine ready, then start.
    pub fn ready(builder: ControllerBuilder) -> Self {
        let mut harness = Self::unstarted(builder);
        harness.line("readyok");
        harness.controller.start().unwrap();
        harness
    }

    fn unstarted(builder: ControllerBuilder) -> Self {
        let (sender, events) = mpsc::channel();
        let controller = builder.build(
            StandardRules::new(),
            EngineBridge::new(Vec::new()),
            RecordingView::default(),
            sender,
        );
        Self { controller, events }
    }

    /// Feed one line of engine output.
    pub fn line(&mut self, line: &str) -> Flow {
        self.controller
            .handle(Event::EngineLine(line.to_string()))
            .unwrap()
    }

    /// Human drops a piece given in coordinate notation.
    pub fn drop(&mut self, move_str: &str) -> DropOutcome {
        self.controller
            .drop_piece(move_str.parse().unwrap())
            .unwrap()
    }

    /// Everything written to the engine so far.
    pub fn sent(&self) -> String {
        String::from_utf8_lossy(self.controller.bridge().get_ref()).into_owned()
    }

    /// Everything written to the engine since the last call.
    pub fn take_sent(&mut self) -> String {
        let sent = self.sent();
        self.controller.bridge_mut().get_mut().clear();
        sent
    }

    /// Wait for the next timer event.
    pub fn next_event(&self) -> Event {
        self.events
            .recv_timeout(Duration::from_secs(5))
            .expect("timer event")
    }

    pub fn view(&self) -> &RecordingView {
        self.controller.view()
    }
}
