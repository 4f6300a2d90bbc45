//! Task dispatch: run blocking work on a worker pool, deliver its outcome on the
//! control thread.
//!
//! A submitted task is split in two. The worker half (inputs + work closure)
//! moves to a blocking-pool thread and produces exactly one [`Outcome`]. The
//! completion half stays in the dispatcher's pending table and never leaves the
//! control thread; only the task id and the outcome cross back, over a channel.
//! Completions run when the control thread calls [`Dispatcher::poll`] or
//! [`Dispatcher::run_until_idle`].

use crate::config::BridgeConfig;
use crate::errors::{Result, TaskError};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type TaskId = u64;

/// Result slot of a task, written once by its worker.
pub type Outcome<T> = std::result::Result<T, TaskError>;

struct Finished {
    id: TaskId,
    outcome: Box<dyn Any + Send>,
}

type Completer = Box<dyn FnOnce(&Dispatcher, Box<dyn Any + Send>)>;

/// Worker half of a task. Consumed by `run`, so it executes at most once.
struct Task<I> {
    id: TaskId,
    inputs: I,
}

impl<I> Task<I> {
    fn run<T, W>(self, work: W) -> Finished
    where
        T: Send + 'static,
        W: FnOnce(I) -> Outcome<T>,
    {
        let Task { id, inputs } = self;
        let outcome: Outcome<T> = match panic::catch_unwind(AssertUnwindSafe(move || work(inputs))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
        };
        Finished { id, outcome: Box::new(outcome) }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

struct Inner {
    // dropped first: waits for running workers, whose sends still find `rx` alive
    runtime: Runtime,
    tx: UnboundedSender<Finished>,
    rx: RefCell<UnboundedReceiver<Finished>>,
    pending: RefCell<HashMap<TaskId, Completer>>,
    next_id: Cell<TaskId>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let discarded = self.pending.get_mut().len();
        if discarded > 0 {
            tracing::warn!(discarded, "dispatcher released with completions that never ran");
        }
    }
}

/// Handle to the worker pool and the control thread's completion queue.
///
/// Cheap to clone. Not `Send`: the dispatcher, its documents and every
/// completion stay on the thread that created it.
///
/// Dropping the last handle runs the completions still owed, waiting for their
/// workers. A pending completion that captures a [`Document`] (or any other
/// handle) keeps the dispatcher alive until it runs, so hosts must keep
/// driving `poll` or `run_until_idle` until `pending()` is zero.
///
/// [`Document`]: crate::Document
#[derive(Clone)]
pub struct Dispatcher {
    inner: Rc<Inner>,
}

impl Dispatcher {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        // only the blocking pool is used; no async worker is needed
        let runtime = tokio::runtime::Builder::new_current_thread()
            .max_blocking_threads(config.worker_threads.max(1))
            .thread_name(config.thread_name.clone())
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        tracing::debug!(workers = config.worker_threads, "dispatcher started");
        Ok(Self {
            inner: Rc::new(Inner {
                runtime,
                tx,
                rx: RefCell::new(rx),
                pending: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
            }),
        })
    }

    /// Queue `work(inputs)` on a worker; `complete` later receives its outcome
    /// on the control thread.
    ///
    /// `work` runs exactly once. A panic inside it becomes
    /// `TaskError::Panicked`. `complete` runs exactly once, after `work`
    /// returned, from `poll` or `run_until_idle`. Completion order across
    /// tasks is unspecified.
    pub fn submit<I, T, W, C>(&self, inputs: I, work: W, complete: C) -> TaskId
    where
        I: Send + 'static,
        T: Send + 'static,
        W: FnOnce(I) -> Outcome<T> + Send + 'static,
        C: FnOnce(&Dispatcher, Outcome<T>) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let completer: Completer = Box::new(move |dispatcher, outcome| {
            let outcome = match outcome.downcast::<Outcome<T>>() {
                Ok(outcome) => *outcome,
                Err(_) => Err(TaskError::Lost),
            };
            complete(dispatcher, outcome)
        });
        self.inner.pending.borrow_mut().insert(id, completer);

        let task = Task { id, inputs };
        let tx = self.inner.tx.clone();
        self.inner.runtime.spawn_blocking(move || {
            let finished = task.run(work);
            if tx.send(finished).is_err() {
                tracing::debug!(task = id, "dispatcher gone before completion");
            }
        });
        tracing::trace!(task = id, "task submitted");
        id
    }

    /// Number of submitted tasks whose completion has not run yet.
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Run every completion that has already arrived. Never blocks.
    pub fn poll(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.rx.borrow_mut().try_recv();
            match next {
                Ok(finished) => {
                    self.deliver(finished);
                    ran += 1;
                }
                Err(_) => return ran,
            }
        }
    }

    /// Wait for and run completions until no task is pending, including tasks
    /// submitted by completions along the way.
    ///
    /// Blocks the calling thread between completions; panics if called from
    /// inside an async runtime.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.pending() > 0 {
            let next = self.inner.rx.borrow_mut().blocking_recv();
            match next {
                Some(finished) => {
                    self.deliver(finished);
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    fn deliver(&self, finished: Finished) {
        // the table borrow ends here so completions may submit again
        let completer = self.inner.pending.borrow_mut().remove(&finished.id);
        match completer {
            Some(complete) => {
                tracing::trace!(task = finished.id, "task completed");
                complete(self, finished.outcome);
            }
            None => tracing::warn!(task = finished.id, "completion for unknown task"),
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if Rc::strong_count(&self.inner) > 1 || self.pending() == 0 {
            return;
        }
        // blocking_recv would panic here
        if std::thread::panicking() || tokio::runtime::Handle::try_current().is_ok() {
            tracing::warn!(pending = self.pending(), "last dispatcher handle dropped; not draining");
            return;
        }
        let ran = self.run_until_idle();
        tracing::debug!(ran, "drained dispatcher on drop");
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").field("pending", &self.pending()).finish()
    }
}
