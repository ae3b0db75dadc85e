//! Execution thread (context owner) and control-thread publish cadence

mod execution_thread;
mod publish_ticker;

pub use execution_thread::{ExecutionThread, FrameHook, NoRender};
pub use publish_ticker::PublishTicker;
