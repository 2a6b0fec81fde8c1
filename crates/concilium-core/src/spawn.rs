//! Agent process spawning and output streaming.
//!
//! This module runs a [`CommandSpec`] and turns its output into events:
//! - stdout is normalized line by line through a dedicated [`StreamNormalizer`]
//! - stderr lines are forwarded untouched
//! - the exit status is reported last, after both pipes have drained
//!
//! Output is delivered over a channel so any front end (desktop shell, CLI)
//! can consume it.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::agents::{AgentKind, ParsedEvent, StreamNormalizer};
use crate::command::CommandSpec;

/// Exit status emitted when an agent process terminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentExit {
    pub code: i32,
    pub signal: Option<i32>,
}

impl AgentExit {
    fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code().unwrap_or_default(),
            signal,
        }
    }
}

/// Events emitted by an agent process.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Normalized events for one chunk of stdout
    Events(Vec<ParsedEvent>),
    /// A line was read from stderr
    Stderr(String),
    /// The process exited
    Exit(AgentExit),
}

#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Failed to capture {0}")]
    MissingPipe(&'static str),
}

/// A running agent process.
pub struct AgentProcess {
    kind: AgentKind,
    child: Arc<Mutex<Option<Child>>>,
    event_receiver: Receiver<ProcessEvent>,
}

impl AgentProcess {
    /// Spawn an agent and start streaming its output.
    ///
    /// The child inherits this process's environment with `spec.env` applied
    /// on top, and gets no stdin. Inherited variables are passed through as
    /// raw OS strings, so values that aren't UTF-8 survive.
    pub fn spawn(
        kind: AgentKind,
        spec: &CommandSpec,
        working_dir: Option<&Path>,
    ) -> Result<Self, SpawnError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| SpawnError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        log::info!("spawned {} agent: {} (pid {})", kind, spec.program, child.id());

        let stdout = child
            .stdout
            .take()
            .ok_or(SpawnError::MissingPipe("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(SpawnError::MissingPipe("stderr"))?;

        let (tx, rx) = mpsc::channel();
        let readers = vec![
            spawn_stdout_reader(kind.clone(), stdout, tx.clone()),
            spawn_stderr_reader(kind.clone(), stderr, tx.clone()),
        ];

        let child_arc = Arc::new(Mutex::new(Some(child)));
        spawn_exit_watcher(Arc::clone(&child_arc), readers, tx);

        Ok(Self {
            kind,
            child: child_arc,
            event_receiver: rx,
        })
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    /// Try to receive the next event without blocking.
    pub fn try_recv(&self) -> Option<ProcessEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive the next event, blocking until one is available.
    ///
    /// Returns `None` once the process has exited and every event has been
    /// received.
    pub fn recv(&self) -> Option<ProcessEvent> {
        self.event_receiver.recv().ok()
    }

    /// Check if the process is still running.
    pub fn is_running(&self) -> bool {
        self.child.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Stop the process gracefully (SIGINT on Unix, then force kill).
    pub fn stop(&self) {
        let Ok(mut guard) = self.child.lock() else {
            return;
        };
        let Some(child) = guard.as_mut() else {
            return;
        };

        #[cfg(unix)]
        {
            let pid = child.id();
            unsafe {
                libc::kill(pid as i32, libc::SIGINT);
            }
            // Give the process up to 3 seconds to exit gracefully
            for _ in 0..30 {
                thread::sleep(Duration::from_millis(100));
                match child.try_wait() {
                    Ok(Some(_)) => return,
                    Ok(None) => continue,
                    Err(_) => break,
                }
            }
        }

        if let Err(err) = child.kill() {
            log::warn!("failed to kill {} agent: {}", self.kind, err);
        }
    }

    /// Force kill the process immediately.
    pub fn kill(&self) {
        if let Ok(mut guard) = self.child.lock() {
            if let Some(child) = guard.as_mut() {
                let _ = child.kill();
            }
        }
    }
}

/// Read stdout as bytes so invalid UTF-8 degrades instead of stopping the stream.
fn spawn_stdout_reader(
    kind: AgentKind,
    stdout: impl Read + Send + 'static,
    tx: Sender<ProcessEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut normalizer = StreamNormalizer::new(kind);
        let mut reader = BufReader::new(stdout);
        let mut chunk = Vec::new();

        loop {
            chunk.clear();
            match reader.read_until(b'\n', &mut chunk) {
                Ok(0) => break,
                Ok(_) => {
                    let events = normalizer.feed(&String::from_utf8_lossy(&chunk));
                    if !events.is_empty() && tx.send(ProcessEvent::Events(events)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    log::warn!("{} stdout read failed: {}", normalizer.kind(), err);
                    break;
                }
            }
        }

        let events = normalizer.flush();
        if !events.is_empty() {
            let _ = tx.send(ProcessEvent::Events(events));
        }
    })
}

fn spawn_stderr_reader(
    kind: AgentKind,
    stderr: impl Read + Send + 'static,
    tx: Sender<ProcessEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stderr);
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    let text = text.trim_end_matches(['\n', '\r']);
                    log::debug!("{} stderr: {}", kind, text);
                    if tx.send(ProcessEvent::Stderr(text.to_string())).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    log::warn!("{} stderr read failed: {}", kind, err);
                    break;
                }
            }
        }
    })
}

/// Poll for exit, wait for the readers to drain, then report the exit.
fn spawn_exit_watcher(
    child: Arc<Mutex<Option<Child>>>,
    readers: Vec<JoinHandle<()>>,
    tx: Sender<ProcessEvent>,
) {
    thread::spawn(move || {
        let exit = loop {
            let Ok(mut guard) = child.lock() else {
                break None;
            };
            let Some(running) = guard.as_mut() else {
                break None;
            };
            match running.try_wait() {
                Ok(Some(status)) => {
                    guard.take();
                    break Some(AgentExit::from_status(status));
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("failed to wait on agent process: {}", err);
                    guard.take();
                    break None;
                }
            }
            drop(guard);
            thread::sleep(Duration::from_millis(100));
        };

        for reader in readers {
            let _ = reader.join();
        }

        if let Some(exit) = exit {
            log::info!("agent exited with code {} (signal {:?})", exit.code, exit.signal);
            let _ = tx.send(ProcessEvent::Exit(exit));
        }
    });
}

// ============================================================================
// TESTS
// ============================================================================
