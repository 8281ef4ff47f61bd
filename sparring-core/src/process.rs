//! Engine child process and the thread that reads its output.

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::controller::Event;
use crate::error::{self, Error, ErrorKind};

/// How long to wait for an engine to exit by itself before killing it.
const EXIT_GRACE: Duration = Duration::from_millis(200);

/// A running engine process.
///
/// Every line the engine prints is delivered as [`Event::EngineLine`] on the
/// event queue, followed by [`Event::EngineExited`] when its output ends.
#[derive(Debug)]
pub struct EngineProcess {
    child: Child,
    reader: Option<JoinHandle<()>>,
}

impl EngineProcess {
    /// Start `program` with `args`. Returns the process and the engine's stdin,
    /// which is meant to be handed to an `EngineBridge`.
    pub fn spawn<P, I, A>(
        program: P,
        args: I,
        events: Sender<Event>,
    ) -> error::Result<(Self, ChildStdin)>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                Error::new(
                    ErrorKind::EngineSpawn,
                    format!("{}: {err}", program.to_string_lossy()),
                )
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or((ErrorKind::EngineSpawn, "engine stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or((ErrorKind::EngineSpawn, "engine stdout not captured"))?;

        let runner = move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        // Receiver gone means the session is over.
                        if events.send(Event::EngineLine(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!("engine output unreadable: {err}");
                        break;
                    }
                }
            }
            let _ = events.send(Event::EngineExited);
        };

        let reader = thread::Builder::new()
            .name(String::from("sparring-engine-reader"))
            .spawn(runner)
            .map_err(|err| Error::new(ErrorKind::EngineSpawn, err))?;

        debug!("engine {} started, pid {}", program.to_string_lossy(), child.id());

        Ok((
            Self {
                child,
                reader: Some(reader),
            },
            stdin,
        ))
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Returns true once the engine process has exited.
    pub fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let step = Duration::from_millis(20);
        let mut waited = Duration::ZERO;
        while !self.has_exited() && waited < EXIT_GRACE {
            thread::sleep(step);
            waited += step;
        }
        if !self.has_exited() {
            debug!("killing engine pid {}", self.child.id());
            let _ = self.child.kill();
        }
        let _ = self.child.wait();

        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}
