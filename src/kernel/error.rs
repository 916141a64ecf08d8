use std::error::Error;
use std::fmt;

use super::process_control_block::{ExecutionState, MAX_NAME_LEN, MAX_PRIORITY, MIN_PRIORITY};
use super::stack::MAX_STACK_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    AllocationFailure { requested: usize, available: usize },
    NotFound(String),
    OutOfRange(i64),
    DuplicateName(String),
    InvalidName(String),
    InvalidStackSize(usize),
    InvalidState {
        name: String,
        state: ExecutionState,
        suspended: bool,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::AllocationFailure { requested, available } => write!(
                f,
                "unable to allocate a {} byte stack ({} bytes available)",
                requested, available
            ),
            KernelError::NotFound(name) => write!(f, "no process named '{}'", name),
            KernelError::OutOfRange(priority) => write!(
                f,
                "priority {} is outside {}..={}",
                priority, MIN_PRIORITY, MAX_PRIORITY
            ),
            KernelError::DuplicateName(name) => {
                write!(f, "a process named '{}' already exists", name)
            }
            KernelError::InvalidName(name) => write!(
                f,
                "invalid process name '{}' (1 to {} bytes, no whitespace)",
                name, MAX_NAME_LEN
            ),
            KernelError::InvalidStackSize(size) => write!(
                f,
                "stack size {} is outside 1..={}",
                size, MAX_STACK_SIZE
            ),
            KernelError::InvalidState { name, state, suspended } => {
                write!(f, "process '{}' is {}", name, state)?;
                if *suspended {
                    write!(f, " and suspended")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for KernelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_out_of_range() {
        let err = KernelError::OutOfRange(12);
        assert_eq!(err.to_string(), "priority 12 is outside 0..=9");
    }

    #[test]
    fn test_error_display_invalid_name_counts_bytes() {
        let err = KernelError::InvalidName(String::from("two words"));
        assert_eq!(
            err.to_string(),
            "invalid process name 'two words' (1 to 31 bytes, no whitespace)"
        );
    }

    #[test]
    fn test_error_display_invalid_state() {
        let err = KernelError::InvalidState {
            name: String::from("P1"),
            state: ExecutionState::Ready,
            suspended: true,
        };
        assert_eq!(err.to_string(), "process 'P1' is ready and suspended");
    }
}
