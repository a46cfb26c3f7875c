//! Running a search on a worker thread.
//!
//! A [`SearchTask`] owns an [`AStar2D`] for the duration of one search and
//! hands it back from [`join`](SearchTask::join). The worker checks a shared
//! run state before every expansion, so pausing and cancelling take effect
//! within one step.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use ridge_core::{Point, ScalarField};

use crate::astar::{AStar2D, Control, Progress, SearchOutcome};
use crate::error::Result;

const PROGRESS_CAPACITY: usize = 64;
const PAUSE_POLL: Duration = Duration::from_millis(20);

/// Run state shared between a [`SearchTask`] and its worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Running = 0,
    Paused = 1,
    Stopping = 2,
}

impl RunState {
    #[inline]
    fn from_u8(v: u8) -> Self {
        match v {
            0 => RunState::Running,
            1 => RunState::Paused,
            _ => RunState::Stopping,
        }
    }
}

/// Options for [`SearchTask::spawn_with`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TaskOptions {
    /// Send a [`Progress`] message every this many expansions. Zero turns
    /// progress reporting off.
    pub report_every: usize,
    /// Start the worker in [`RunState::Paused`].
    pub paused: bool,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            report_every: 256,
            paused: false,
        }
    }
}

/// Cloneable control for a running [`SearchTask`].
#[derive(Clone, Debug)]
pub struct TaskControl {
    state: Arc<AtomicU8>,
    worker: thread::Thread,
}

impl TaskControl {
    #[inline]
    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Suspend the search before its next expansion. No effect unless
    /// running.
    pub fn pause(&self) {
        let _ = self.state.compare_exchange(
            RunState::Running as u8,
            RunState::Paused as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Continue a paused search.
    pub fn resume(&self) {
        let resumed = self.state.compare_exchange(
            RunState::Paused as u8,
            RunState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if resumed.is_ok() {
            self.worker.unpark();
        }
    }

    /// Stop the search. The worker returns
    /// [`SearchError::Cancelled`](crate::SearchError::Cancelled) and leaves
    /// the instance clean.
    pub fn cancel(&self) {
        self.state.store(RunState::Stopping as u8, Ordering::Release);
        self.worker.unpark();
    }
}

/// A search running on its own thread.
pub struct SearchTask<F> {
    control: TaskControl,
    progress: Receiver<Progress>,
    worker: JoinHandle<(AStar2D<F>, Result<SearchOutcome>)>,
}

impl<F: ScalarField + Send + 'static> SearchTask<F> {
    /// Move `astar` onto a worker thread and trace from `start` to `target`.
    pub fn spawn(astar: AStar2D<F>, start: Point, target: Point, smooth: bool) -> Self {
        Self::spawn_with(astar, start, target, smooth, TaskOptions::default())
    }

    pub fn spawn_with(
        mut astar: AStar2D<F>,
        start: Point,
        target: Point,
        smooth: bool,
        options: TaskOptions,
    ) -> Self {
        let initial = if options.paused {
            RunState::Paused
        } else {
            RunState::Running
        };
        let state = Arc::new(AtomicU8::new(initial as u8));
        let (tx, rx) = bounded(PROGRESS_CAPACITY);

        let shared = Arc::clone(&state);
        let worker = thread::spawn(move || {
            let mut control = |p: Progress| checkpoint(&shared, &tx, options.report_every, p);
            let result = astar.trace_with(start, target, smooth, &mut control);
            (astar, result)
        });

        Self {
            control: TaskControl {
                state,
                worker: worker.thread().clone(),
            },
            progress: rx,
            worker,
        }
    }
}

impl<F> SearchTask<F> {
    /// A handle that can pause, resume or cancel from elsewhere.
    pub fn control(&self) -> TaskControl {
        self.control.clone()
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.control.state()
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Progress messages. The channel disconnects when the worker is done.
    ///
    /// Messages are dropped rather than stalling the search if nobody reads
    /// them.
    #[inline]
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and take back the instance with the outcome.
    ///
    /// A panic on the worker is resumed on the calling thread.
    pub fn join(self) -> (AStar2D<F>, Result<SearchOutcome>) {
        match self.worker.join() {
            Ok(done) => done,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Called before every expansion on the worker thread.
fn checkpoint(state: &AtomicU8, tx: &Sender<Progress>, every: usize, p: Progress) -> Control {
    loop {
        match RunState::from_u8(state.load(Ordering::Acquire)) {
            RunState::Running => break,
            RunState::Paused => thread::park_timeout(PAUSE_POLL),
            RunState::Stopping => return Control::Stop,
        }
    }
    if every > 0 && p.expanded > 0 && p.expanded % every == 0 {
        // Full or disconnected: drop the message.
        let _ = tx.try_send(p);
    }
    Control::Continue
}
