//! Module `commands`
//!
//! The closed set of shell commands, their parser, and the result type
//! every handler returns.

use crate::navigate::ResolvedPath;

/// A shell command parsed from one input line.
///
/// Path arguments are kept as the user typed them; handlers resolve them
/// against the session.
#[derive(Debug, PartialEq)]
pub enum Command {
    MakeDir(String),
    MakeFile(String),
    ChangeDir(String),
    WriteFile(String),
    ReadFile(String),
    Delete(String),
    Copy(String, String),
    Move(String, String),
    Free,
    Exit,
    /// Blank line
    Empty,
    /// Known command, wrong number of arguments
    Usage(&'static str),
    /// Unknown or unsupported command
    Unknown(String),
}

/// Represents the outcome status of executing a command.
#[derive(Debug)]
pub enum CommandStatus {
    Success,
    Failure(String),
    /// The next input line is content to append to this file.
    AwaitContent(ResolvedPath),
    CloseConnection,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: Option<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message,
        }
    }
}

fn one(args: &[&str], usage: &'static str) -> Result<String, Command> {
    match args {
        [path] => Ok(path.to_string()),
        _ => Err(Command::Usage(usage)),
    }
}

fn two(args: &[&str], usage: &'static str) -> Result<(String, String), Command> {
    match args {
        [src, dst] => Ok((src.to_string(), dst.to_string())),
        _ => Err(Command::Usage(usage)),
    }
}

fn none(args: &[&str], usage: &'static str) -> Result<(), Command> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Command::Usage(usage))
    }
}

/// Parses a raw input line into a [`Command`].
///
/// Command words are case-insensitive and each has a short alias.
/// Arguments are whitespace separated; a known command with the wrong
/// number of arguments parses as [`Command::Usage`].
pub fn parse_command(raw: &str) -> Command {
    let mut parts = raw.split_whitespace();
    let Some(word) = parts.next() else {
        return Command::Empty;
    };
    let args: Vec<&str> = parts.collect();

    let parsed = match word.to_ascii_lowercase().as_str() {
        "makefold" | "mkdir" => one(&args, "MakeFold <path>").map(Command::MakeDir),
        "makefile" | "touch" => one(&args, "MakeFile <path>").map(Command::MakeFile),
        "cd" => one(&args, "CD <path>").map(Command::ChangeDir),
        "writetextfile" | "write" => one(&args, "WriteTextFile <path>").map(Command::WriteFile),
        "viewtextfile" | "cat" => one(&args, "ViewTextFile <path>").map(Command::ReadFile),
        "delete" | "rm" => one(&args, "Delete <path>").map(Command::Delete),
        "copy" | "cp" => {
            two(&args, "Copy <source> <destination>").map(|(s, d)| Command::Copy(s, d))
        }
        "move" | "mv" => {
            two(&args, "Move <source> <destination>").map(|(s, d)| Command::Move(s, d))
        }
        "memory" | "free" => none(&args, "Memory").map(|()| Command::Free),
        "exit" | "quit" => none(&args, "Exit").map(|()| Command::Exit),
        _ => Ok(Command::Unknown(word.to_string())),
    };

    parsed.unwrap_or_else(|usage| usage)
}
