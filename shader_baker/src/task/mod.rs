//! Work submission to the thread that owns the graphics context

mod task_queue;
mod coalescing_task;

pub use task_queue::{ContextTask, TaskQueue};
pub use coalescing_task::CoalescingTask;
