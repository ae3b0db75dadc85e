//! Small building blocks shared by the engine and the backends.

mod mailbox;
mod name_allocator;

pub use mailbox::Mailbox;
pub use name_allocator::NameAllocator;
