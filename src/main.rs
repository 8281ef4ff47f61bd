//! Play chess against a UCI engine from the terminal.

mod input;
mod terminal;
mod theme;

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sparring_core::error::{self, Error, ErrorKind};
use sparring_core::{Color, ControllerBuilder, EngineBridge, EngineProcess, Event, Flow};

use input::{InputKind, HELP};
use terminal::TerminalBoard;
use theme::Theme;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sparring", about = "Play chess against a UCI engine")]
struct Args {
    /// Engine executable
    #[arg(long, default_value = "stockfish")]
    engine: String,

    /// Argument passed to the engine, may be repeated
    #[arg(long = "engine-arg")]
    engine_args: Vec<String>,

    /// Search depth requested for every engine move
    #[arg(long, default_value_t = 10)]
    depth: u32,

    /// Side played by the human
    #[arg(long, value_enum, default_value_t = Side::White)]
    play_as: Side,

    /// Seconds before a running search is told to stop, 0 waits forever
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Print the board without colours
    #[arg(long)]
    no_color: bool,

    /// Seed for the board colours
    #[arg(long)]
    seed: Option<u64>,
}

/// Forward player commands to the event queue. End of input quits.
fn spawn_input_reader(events: Sender<Event>) -> error::Result<()> {
    let runner = move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            let input_kind = InputKind::from(line.as_str());
            match input_kind.event() {
                Some(event) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                None if input_kind == InputKind::Help => println!("{HELP}"),
                None => println!("Invalid command: {}, try help", line.trim()),
            }
        }
        let _ = events.send(Event::Quit);
    };

    thread::Builder::new()
        .name(String::from("sparring-input"))
        .spawn(runner)
        .map(|_| ())
        .map_err(|err| Error::new(ErrorKind::ThreadSpawn, err))
}

fn main() -> error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
    let args = Args::parse();

    let theme = if args.no_color {
        None
    } else {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Some(Theme::random(&mut rng))
    };

    let (sender, events) = mpsc::channel();
    let (process, stdin) = EngineProcess::spawn(&args.engine, &args.engine_args, sender.clone())?;
    info!("engine {} running as pid {}", args.engine, process.id());

    let timeout = match args.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let mut controller = ControllerBuilder::new()
        .depth(args.depth)
        .human(args.play_as.into())
        .engine_timeout(timeout)
        .build(
            sparring_core::StandardRules::new(),
            EngineBridge::new(stdin),
            TerminalBoard::new(io::stdout(), theme),
            sender.clone(),
        );

    println!("Sparring 0.1.0, type help for commands.\n");
    controller.start()?;
    spawn_input_reader(sender)?;

    for event in events.iter() {
        match controller.handle(event) {
            Ok(Flow::Continue) => (),
            Ok(Flow::Quit) => break,
            Err(err) if err.kind() == ErrorKind::EngineClosed || err.kind() == ErrorKind::EngineIo => {
                error!("{err}");
                break;
            }
            Err(err) => error!("{err}"),
        }
    }

    controller.bridge_mut().quit();
    // Closes the engine's stdin before the process is reaped.
    drop(controller);
    drop(process);
    Ok(())
}
