/// TaskQueue - work to be executed on the context-owning thread
///
/// Any thread may submit; only the thread that owns the context drains.
/// Submitted tasks are not guaranteed to run in submission order. A task that
/// depends on another should be submitted by that other task once it has run;
/// submitting from inside a running task is allowed.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A unit of work that needs the native context
///
/// Tasks usually cross threads, so they should carry immutable inputs
/// (a source string, a size) rather than references to shared mutable state.
/// Closures taking `&mut C` implement this trait.
pub trait ContextTask<C: ?Sized>: Send {
    /// Run the task on the context-owning thread
    fn execute(self: Box<Self>, context: &mut C);
}

impl<C: ?Sized, F> ContextTask<C> for F
where
    F: FnOnce(&mut C) + Send,
{
    fn execute(self: Box<Self>, context: &mut C) {
        (*self)(context)
    }
}

/// Thread-safe queue of [`ContextTask`]s
pub struct TaskQueue<C: ?Sized> {
    tasks: Mutex<VecDeque<Box<dyn ContextTask<C>>>>,
}

impl<C: ?Sized> TaskQueue<C> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Box<dyn ContextTask<C>>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit a task for eventual execution
    ///
    /// Only promises that the task runs during some later
    /// [`TaskQueue::drain_and_run`]; not when, and not in which order.
    pub fn submit<T: ContextTask<C> + 'static>(&self, task: T) {
        self.submit_boxed(Box::new(task));
    }

    /// Submit an already boxed task
    pub fn submit_boxed(&self, task: Box<dyn ContextTask<C>>) {
        self.lock().push_back(task);
    }

    /// Execute the tasks that are queued when this call begins
    ///
    /// Tasks submitted while draining, including by the tasks being run, wait
    /// for the next call. This bounds the time spent here even when a task
    /// keeps resubmitting itself. The lock is not held while a task runs.
    ///
    /// Must only be called from the thread that owns `context`.
    ///
    /// Returns the number of tasks executed.
    pub fn drain_and_run(&self, context: &mut C) -> usize {
        let pending = self.lock().len();
        let mut executed = 0;
        for _ in 0..pending {
            let task = self.lock().pop_front();
            match task {
                Some(task) => {
                    task.execute(context);
                    executed += 1;
                }
                None => break,
            }
        }
        executed
    }

    /// Number of tasks waiting
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no task is waiting
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<C: ?Sized> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "task_queue_tests.rs"]
mod tests;
