mod error;
mod process_control_block;
mod queue;
mod scheduler;
mod stack;
mod store;

pub mod display;
pub mod driver;

pub use driver::Driver;
pub use error::KernelError;
pub use process_control_block::ProcessClass;
pub use scheduler::Scheduler;
pub use stack::{DEFAULT_REGION_SIZE, MAX_STACK_SIZE};
