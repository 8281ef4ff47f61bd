//! Text board printed to the terminal after every update.

use std::io::Write;

use colored::Colorize;
use log::warn;
use shakmaty::fen::Fen;
use shakmaty::{Board, File, Piece, Rank};
use sparring_core::captured::glyph;
use sparring_core::{BoardView, Color, Panel, Square};

use crate::theme::{Rgb, Theme};

const RANK_SEP: &str = "  +---+---+---+---+---+---+---+---+\n";

fn square_at(file: u32, rank: u32) -> Square {
    Square::from_coords(File::new(file), Rank::new(rank))
}

fn piece_glyph(piece: Piece) -> char {
    glyph(piece.role, piece.color)
}

/// Board widget for a terminal. Colour mode paints squares in the theme's
/// truecolor shades, plain mode draws a bordered grid with piece letters.
pub struct TerminalBoard<W: Write> {
    out: W,
    theme: Option<Theme>,
    board: Board,
    flipped: bool,
    highlighted: Vec<Square>,
    status: String,
    fen: String,
    moves: Vec<String>,
    captured: [String; 2],
}

impl<W: Write> TerminalBoard<W> {
    /// `theme` of None prints without colour.
    pub fn new(out: W, theme: Option<Theme>) -> Self {
        Self {
            out,
            theme,
            board: Board::new(),
            flipped: false,
            highlighted: Vec::new(),
            status: String::new(),
            fen: String::new(),
            moves: Vec::new(),
            captured: [String::new(), String::new()],
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Board with borders and file/rank indicators.
    pub fn pretty(&self) -> String {
        let ranks: Vec<u32> = if self.flipped {
            (0..8).collect()
        } else {
            (0..8).rev().collect()
        };
        let files: Vec<u32> = if self.flipped {
            (0..8).rev().collect()
        } else {
            (0..8).collect()
        };

        let mut pretty = String::new();
        if self.theme.is_none() {
            pretty.push_str(RANK_SEP);
        }
        for &rank in &ranks {
            pretty.push_str(&format!("{} ", rank + 1));
            match self.theme {
                Some(theme) => {
                    for &file in &files {
                        let square = square_at(file, rank);
                        let Rgb(r, g, b) = if self.highlighted.contains(&square) {
                            theme.highlight
                        } else if (rank + file) % 2 == 0 {
                            theme.dark
                        } else {
                            theme.light
                        };
                        let piece = self.board.piece_at(square).map_or(' ', piece_glyph);
                        let cell = format!(" {piece} ");
                        pretty.push_str(&cell.as_str().on_truecolor(r, g, b).to_string());
                    }
                    pretty.push('\n');
                }
                None => {
                    pretty.push_str("| ");
                    for &file in &files {
                        let square = square_at(file, rank);
                        pretty.push(match self.board.piece_at(square) {
                            Some(piece) => piece.char(),
                            None if self.highlighted.contains(&square) => '*',
                            None => ' ',
                        });
                        pretty.push_str(" | ");
                    }
                    pretty.push('\n');
                    pretty.push_str(RANK_SEP);
                }
            }
        }

        let (indent, spacing) = match self.theme {
            Some(_) => ("   ", "  "),
            None => ("    ", "   "),
        };
        pretty.push_str(indent);
        for &file in &files {
            pretty.push(File::new(file).char());
            pretty.push_str(spacing);
        }
        pretty.push('\n');
        pretty
    }

    fn render(&mut self) {
        let mut screen = self.pretty();
        screen.push_str(&format!(" Fen: {}\n", self.fen));
        screen.push_str(&format!(" {}\n", self.captured[0]));
        screen.push_str(&format!(" {}\n", self.captured[1]));
        for row in &self.moves {
            screen.push_str(&format!(" {row}\n"));
        }
        screen.push_str(&format!("{}\n", self.status));
        self.print(&screen);
    }

    fn print(&mut self, text: &str) {
        let written = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!("terminal write failed: {err}");
        }
    }
}

impl<W: Write> BoardView for TerminalBoard<W> {
    fn set_position(&mut self, fen: &str) {
        match fen.parse::<Fen>() {
            Ok(parsed) => self.board = parsed.into_setup().board,
            Err(err) => warn!("cannot show position {fen}: {err}"),
        }
    }

    fn start(&mut self) {
        self.board = Board::new();
        self.highlighted.clear();
    }

    fn flip(&mut self) {
        self.flipped = !self.flipped;
        self.render();
    }

    fn snapback(&mut self, from: Square, to: Square) {
        self.print(&format!("{from}{to} is not playable now.\n"));
    }

    /// Marks are shown once and gone on the next render.
    fn highlight(&mut self, squares: &[Square]) {
        if squares.is_empty() {
            self.print("No moves from there.\n");
        } else {
            self.highlighted = squares.to_vec();
            self.render();
        }
        self.highlighted.clear();
    }

    fn set_thinking(&mut self, thinking: bool) {
        if thinking {
            self.print("thinking...\n");
        }
    }

    fn show_panel(&mut self, panel: &Panel<'_>) {
        self.status = panel.status.to_string();
        self.fen = panel.fen.to_string();
        self.moves = panel.moves.to_vec();
        self.captured = [
            panel.captured.display(Color::White),
            panel.captured.display(Color::Black),
        ];
        self.render();
    }
}
