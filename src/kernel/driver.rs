use std::io::{self, BufRead, Write};

use log::{error, info};

use super::{display, Scheduler};

use crate::command::{Command, HELP_TEXT};
use crate::config::KernelConfig;

const PROMPT: &str = "pcb> ";

pub struct Driver {
    scheduler: Scheduler,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Exit,
}

impl Driver {
    pub fn new(config: &KernelConfig) -> Driver {
        Driver {
            scheduler: Scheduler::new(config.stack_size, config.stack_region_size),
        }
    }

    pub fn start(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        self.run(stdin.lock(), &mut stdout)
    }

    /// Every PCB is released before returning, even when reading fails.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        info!("shell started");
        writeln!(output, "PCB simulator. Type 'help' for commands.")?;

        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut read_error = None;

        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    error!("failed to read command: {}", err);
                    read_error = Some(err);
                    break;
                }
            };

            if line.trim().is_empty() {
                write!(output, "{}", PROMPT)?;
                output.flush()?;
                continue;
            }

            match self.execute_line(&line) {
                Outcome::Continue(text) => {
                    if !text.is_empty() {
                        writeln!(output, "{}", text.trim_end())?;
                    }
                }
                Outcome::Exit => break,
            }

            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }

        let released = self.scheduler.shutdown();
        writeln!(output, "Released {} process(es). Goodbye.", released)?;

        match read_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn execute_line(&mut self, line: &str) -> Outcome {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command),
            Err(err) => Outcome::Continue(format!("Error: {}", err)),
        }
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let scheduler = &mut self.scheduler;

        let result = match command {
            Command::Create { name, class, priority } => scheduler
                .create(&name, class, priority)
                .map(|_| format!("Created '{}'.", name)),
            Command::Delete(name) => scheduler.delete(&name).map(|_| format!("Deleted '{}'.", name)),
            Command::Block(name) => scheduler.block(&name).map(|_| format!("Blocked '{}'.", name)),
            Command::Unblock(name) => scheduler
                .unblock(&name)
                .map(|_| format!("Unblocked '{}'.", name)),
            Command::Suspend(name) => scheduler
                .suspend(&name)
                .map(|_| format!("Suspended '{}'.", name)),
            Command::Resume(name) => scheduler.resume(&name).map(|_| format!("Resumed '{}'.", name)),
            Command::SetPriority { name, priority } => scheduler
                .set_priority(&name, priority)
                .map(|_| format!("Set priority of '{}' to {}.", name, priority)),
            Command::Show(name) => display::show(scheduler, &name),
            Command::ShowReady => Ok(display::show_ready(scheduler)),
            Command::ShowBlocked => Ok(display::show_blocked(scheduler)),
            Command::ShowAll => Ok(display::show_all(scheduler)),
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Exit => return Outcome::Exit,
        };

        match result {
            Ok(text) => Outcome::Continue(text),
            Err(err) => {
                error!("command failed: {}", err);
                Outcome::Continue(format!("Error: {}", err))
            }
        }
    }
}
