/// CoalescingTask - a task slot that is queued at most once
///
/// Meant for work whose input is "the latest value of something": a viewport
/// size while the user drags a window edge, a shader source while the user
/// types. Only the latest submission matters, so a burst of submissions
/// before the queue is drained collapses into one queued entry that runs the
/// last task.
///
/// Slightly more expensive than a plain task; use it for expensive work that
/// is resubmitted often.

use std::sync::{Arc, Mutex, PoisonError};
use crate::task::{ContextTask, TaskQueue};

struct Slot<C: ?Sized> {
    task: Mutex<Option<Box<dyn ContextTask<C>>>>,
}

impl<C: ?Sized> Slot<C> {
    fn swap(&self, task: Option<Box<dyn ContextTask<C>>>) -> Option<Box<dyn ContextTask<C>>> {
        let mut guard = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, task)
    }
}

// Only CoalescingTask::submit can enqueue this, which keeps the slot protocol
// private.
struct SlotRunner<C: ?Sized> {
    slot: Arc<Slot<C>>,
}

impl<C: ?Sized> ContextTask<C> for SlotRunner<C> {
    fn execute(self: Box<Self>, context: &mut C) {
        match self.slot.swap(None) {
            Some(task) => task.execute(context),
            None => panic!("coalescing slot was queued but holds no task"),
        }
    }
}

/// A slot confining "latest value" tasks to one entry in a [`TaskQueue`]
///
/// Cloning yields another handle to the same slot.
pub struct CoalescingTask<C: ?Sized + 'static> {
    queue: Arc<TaskQueue<C>>,
    slot: Arc<Slot<C>>,
}

impl<C: ?Sized + 'static> CoalescingTask<C> {
    /// Create a slot that submits into `queue`
    pub fn new(queue: Arc<TaskQueue<C>>) -> Self {
        Self {
            queue,
            slot: Arc::new(Slot { task: Mutex::new(None) }),
        }
    }

    /// Submit `task`, replacing the task still waiting in this slot, if any
    ///
    /// The slot is queued only when it was empty before the swap, so at most
    /// one entry per slot is ever outstanding in the queue.
    pub fn submit<T: ContextTask<C> + 'static>(&self, task: T) {
        let previous = self.slot.swap(Some(Box::new(task)));
        if previous.is_none() {
            self.queue.submit(SlotRunner { slot: self.slot.clone() });
        }
    }

    /// Whether a task is waiting in this slot
    pub fn is_pending(&self) -> bool {
        self.slot
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<C: ?Sized + 'static> Clone for CoalescingTask<C> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            slot: self.slot.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "coalescing_task_tests.rs"]
mod tests;
