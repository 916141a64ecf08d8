use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::kernel::ProcessClass;

pub const HELP_TEXT: &str = "\
Commands:
  create <name> <system|application> <priority>   create a ready process
  delete <name>                                    remove a process
  block <name>                                     move a ready process to the blocked queue
  unblock <name>                                   move a blocked process back to ready
  suspend <name>                                   mark a process suspended
  resume <name>                                    clear the suspended mark
  setpriority <name> <priority>                    change a process priority (0-9)
  show <name>                                      show one process
  showready | showblocked | showall                show queue contents
  help                                             show this text
  exit                                             release every process and quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        name: String,
        class: ProcessClass,
        priority: i64,
    },
    Delete(String),
    Block(String),
    Unblock(String),
    Suspend(String),
    Resume(String),
    SetPriority { name: String, priority: i64 },
    Show(String),
    ShowReady,
    ShowBlocked,
    ShowAll,
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    UnknownCommand(String),
    WrongArgumentCount { command: &'static str, expected: usize },
    InvalidArgument(String),
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCommandError::Empty => write!(f, "no command given"),
            ParseCommandError::UnknownCommand(command) => {
                write!(f, "unknown command '{}', try 'help'", command)
            }
            ParseCommandError::WrongArgumentCount { command, expected } => {
                write!(f, "'{}' takes {} argument(s)", command, expected)
            }
            ParseCommandError::InvalidArgument(reason) => write!(f, "{}", reason),
        }
    }
}

impl Error for ParseCommandError {}

fn expect_args(command: &'static str, args: &[&str], expected: usize) -> Result<(), ParseCommandError> {
    if args.len() != expected {
        return Err(ParseCommandError::WrongArgumentCount { command, expected });
    }

    Ok(())
}

fn parse_priority(value: &str) -> Result<i64, ParseCommandError> {
    value
        .parse()
        .map_err(|_| ParseCommandError::InvalidArgument(format!("priority '{}' is not a number", value)))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ParseCommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        let named = |name: &'static str| -> Result<String, ParseCommandError> {
            expect_args(name, &args, 1)?;
            Ok(args[0].to_string())
        };

        match command.to_ascii_lowercase().as_str() {
            "create" => {
                expect_args("create", &args, 3)?;
                let class = args[1].parse().map_err(ParseCommandError::InvalidArgument)?;
                Ok(Command::Create {
                    name: args[0].to_string(),
                    class,
                    priority: parse_priority(args[2])?,
                })
            }
            "delete" => Ok(Command::Delete(named("delete")?)),
            "block" => Ok(Command::Block(named("block")?)),
            "unblock" => Ok(Command::Unblock(named("unblock")?)),
            "suspend" => Ok(Command::Suspend(named("suspend")?)),
            "resume" => Ok(Command::Resume(named("resume")?)),
            "setpriority" => {
                expect_args("setpriority", &args, 2)?;
                Ok(Command::SetPriority {
                    name: args[0].to_string(),
                    priority: parse_priority(args[1])?,
                })
            }
            "show" => Ok(Command::Show(named("show")?)),
            "showready" => expect_args("showready", &args, 0).map(|_| Command::ShowReady),
            "showblocked" => expect_args("showblocked", &args, 0).map(|_| Command::ShowBlocked),
            "showall" => expect_args("showall", &args, 0).map(|_| Command::ShowAll),
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            _ => Err(ParseCommandError::UnknownCommand(command.to_string())),
        }
    }
}
