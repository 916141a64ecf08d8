use std::fmt;
use std::str::FromStr;

use super::stack::StackHandle;
use super::KernelError;

pub const MAX_PRIORITY: u8 = 9;
pub const MIN_PRIORITY: u8 = 0;

// In bytes.
pub const MAX_NAME_LEN: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessClass {
    System,
    Application,
}

impl fmt::Display for ProcessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessClass::System => write!(f, "system"),
            ProcessClass::Application => write!(f, "application"),
        }
    }
}

impl FromStr for ProcessClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" | "sys" | "s" => Ok(ProcessClass::System),
            "application" | "app" | "a" => Ok(ProcessClass::Application),
            _ => Err(format!("unknown process class '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Ready,
    #[allow(dead_code)]
    Running,
    Blocked,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionState::Ready => write!(f, "ready"),
            ExecutionState::Running => write!(f, "running"),
            ExecutionState::Blocked => write!(f, "blocked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u8);

impl Priority {
    pub fn new(value: i64) -> Result<Priority, KernelError> {
        if value < MIN_PRIORITY as i64 || value > MAX_PRIORITY as i64 {
            return Err(KernelError::OutOfRange(value));
        }

        Ok(Priority(value as u8))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn validate_name(name: &str) -> Result<(), KernelError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || name.chars().any(char::is_whitespace) {
        return Err(KernelError::InvalidName(name.to_string()));
    }

    Ok(())
}

#[derive(Debug)]
pub struct ProcessControlBlock {
    pub state: ExecutionState,
    pub suspended: bool,

    name: String,
    class: ProcessClass,
    priority: Priority,

    stack: StackHandle,
}

impl ProcessControlBlock {
    pub(crate) fn new(name: &str, class: ProcessClass, priority: Priority, stack: StackHandle) -> ProcessControlBlock {
        ProcessControlBlock {
            name: name.to_string(),
            class,
            priority,
            state: ExecutionState::Ready,
            suspended: false,
            stack,
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_class(&self) -> ProcessClass {
        self.class
    }

    pub fn get_priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn get_stack_bottom(&self) -> usize {
        self.stack.bottom()
    }

    pub fn get_stack_top(&self) -> usize {
        self.stack.top()
    }

    pub(crate) fn into_stack(self) -> StackHandle {
        self.stack
    }
}
