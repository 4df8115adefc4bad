//! Frame command queue
//!
//! FIFO queue between the owning thread and the engine's worker. `Recycle`
//! atomically clears all pending commands and flips the monotonic recycled
//! flag; every enqueue after that is silently dropped, which makes
//! recycling safe against races with late UI calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Instant;

/// Frame instruction for the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandKind {
    /// Rewind to frame 0 and re-render; do not reschedule
    Reset,
    /// Rewind to frame 0, re-render, then request a future callback
    ResetAnimate,
    /// Advance one frame and re-render; do not reschedule
    Advance,
    /// Advance one frame, re-render, then request a future callback
    AdvanceAnimate,
    /// Terminate the worker loop; teardown follows on the worker
    Recycle,
}

/// A command paired with its enqueue timestamp
#[derive(Debug, Clone, Copy)]
pub(crate) struct Command {
    pub kind: CommandKind,
    /// Monotonic instant the command was enqueued; reschedule targets are
    /// computed from this, not from render completion time
    pub queued_at: Instant,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self { kind, queued_at: Instant::now() }
    }
}

/// Synchronized FIFO with a monotonic recycled flag
pub(crate) struct CommandQueue {
    commands: Mutex<VecDeque<Command>>,
    condvar: Condvar,
    recycled: AtomicBool,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            recycled: AtomicBool::new(false),
        }
    }

    /// Enqueue a command, or drop it silently once recycled
    pub fn push(&self, command: Command) {
        // Unsynchronized fast path; the flag only ever goes false -> true.
        if self.recycled.load(Ordering::Relaxed) {
            return;
        }
        let mut commands = self.commands.lock().unwrap();
        if self.recycled.load(Ordering::Relaxed) {
            return;
        }
        if command.kind == CommandKind::Recycle {
            commands.clear();
            self.recycled.store(true, Ordering::SeqCst);
        }
        commands.push_back(command);
        self.condvar.notify_one();
    }

    /// Block until a command is available and dequeue exactly one
    pub fn wait_pop(&self) -> Command {
        let mut commands = self.commands.lock().unwrap();
        loop {
            if let Some(command) = commands.pop_front() {
                return command;
            }
            commands = self.condvar.wait(commands).unwrap();
        }
    }

    pub fn is_recycled(&self) -> bool {
        self.recycled.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}
