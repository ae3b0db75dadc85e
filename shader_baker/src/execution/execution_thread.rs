/// ExecutionThread - the thread owning the native graphics context.
///
/// The context is created on the new thread and never leaves it. Each loop
/// iteration drains the task queue, runs one validation pass, calls the frame
/// hook, then sleeps for the configured frame interval. Stopping is
/// cooperative: the flag is checked once per iteration, and on the way out
/// the validator's cache is cleared before the context is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crate::config::EngineConfig;
use crate::context::GraphicsContext;
use crate::error::Result;
use crate::task::{CoalescingTask, ContextTask, TaskQueue};
use crate::validation::{ContextCache, Validator};
use crate::{baker_bail, baker_err};

/// Per-iteration callback run on the execution thread after validation
pub trait FrameHook<C>: Send {
    fn render(&mut self, _context: &mut C, _validator: &Validator) {}
}

impl<C, F> FrameHook<C> for F
where
    F: FnMut(&mut C, &Validator) + Send,
{
    fn render(&mut self, context: &mut C, validator: &Validator) {
        self(context, validator)
    }
}

/// Frame hook that draws nothing
pub struct NoRender;

impl<C> FrameHook<C> for NoRender {}

struct Worker<C: 'static, H> {
    queue: Arc<TaskQueue<C>>,
    cancel: Arc<AtomicBool>,
    validator: Validator,
    hook: H,
    frame_interval: Duration,
}

impl<C: GraphicsContext + 'static, H: FrameHook<C>> Worker<C, H> {
    fn run(mut self, mut context: C) {
        crate::baker_info!("shader_baker::ExecutionThread", "Execution thread started");

        while !self.cancel.load(Ordering::Acquire) {
            self.queue.drain_and_run(&mut context);
            self.validator.validate(&mut context);
            self.hook.render(&mut context, &self.validator);
            thread::park_timeout(self.frame_interval);
        }

        self.validator.clear(&mut context);
        drop(context);
        crate::baker_info!("shader_baker::ExecutionThread", "Execution thread stopped");
    }
}

/// Handle to the execution thread
///
/// Dropping the handle stops and joins the thread.
pub struct ExecutionThread<C: GraphicsContext + 'static> {
    queue: Arc<TaskQueue<C>>,
    resize: CoalescingTask<C>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl<C: GraphicsContext + 'static> ExecutionThread<C> {
    /// Start the thread, create the context on it, and wait until the context
    /// exists
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the thread cannot be spawned or the factory
    /// fails.
    pub fn spawn<F, H>(
        context_factory: F,
        validator: Validator,
        hook: H,
        config: &EngineConfig,
    ) -> Result<Self>
    where
        F: FnOnce() -> Result<C> + Send + 'static,
        H: FrameHook<C> + 'static,
    {
        let queue = Arc::new(TaskQueue::new());
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            queue: queue.clone(),
            cancel: cancel.clone(),
            validator,
            hook,
            frame_interval: config.frame_interval,
        };

        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let context = match context_factory() {
                    Ok(context) => context,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                worker.run(context);
            })
            .map_err(|err| {
                baker_err!(
                    InitializationFailed,
                    "shader_baker::ExecutionThread",
                    "cannot spawn execution thread: {}",
                    err
                )
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                let _ = thread.join();
                baker_bail!(
                    InitializationFailed,
                    "shader_baker::ExecutionThread",
                    "context creation failed: {}",
                    err.message()
                );
            }
            Err(_) => {
                let _ = thread.join();
                baker_bail!(
                    InitializationFailed,
                    "shader_baker::ExecutionThread",
                    "execution thread exited while creating the context"
                );
            }
        }

        Ok(Self {
            resize: CoalescingTask::new(queue.clone()),
            queue,
            cancel,
            thread: Some(thread),
        })
    }

    /// Queue a task for the next loop iteration
    pub fn submit<T: ContextTask<C> + 'static>(&self, task: T) {
        self.queue.submit(task);
    }

    /// The task queue, for producers that outlive a borrow of this handle
    pub fn queue(&self) -> Arc<TaskQueue<C>> {
        self.queue.clone()
    }

    /// A new coalescing slot feeding this thread's queue
    pub fn coalescing_task(&self) -> CoalescingTask<C> {
        CoalescingTask::new(self.queue.clone())
    }

    /// Resize the viewport; bursts of resizes collapse into the last one
    pub fn resize(&self, width: u32, height: u32) {
        self.resize.submit(move |context: &mut C| context.set_viewport(width, height));
    }

    /// Ask the thread to stop after its current iteration
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(thread) = &self.thread {
            thread.thread().unpark();
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Stop the thread and wait for it to release the context
    ///
    /// # Errors
    ///
    /// `BackendError` if the thread panicked.
    pub fn join(mut self) -> Result<()> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<()> {
        self.stop();
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        if thread.join().is_err() {
            baker_bail!(BackendError, "shader_baker::ExecutionThread", "execution thread panicked");
        }
        Ok(())
    }
}

impl<C: GraphicsContext + 'static> Drop for ExecutionThread<C> {
    fn drop(&mut self) {
        // Already logged on failure
        let _ = self.stop_and_join();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "execution_thread_tests.rs"]
mod tests;
