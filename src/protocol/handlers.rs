//! Command handlers module for the RAX FS shell.
//!
//! One handler per [`Command`] variant. Handlers resolve path arguments
//! through the session, run the operation, and render the reply. A failed
//! command never changes session state and never ends the session.

use crate::client::Session;
use crate::error::FsError;
use crate::error::handlers::{error_reply, handle_fs_error};
use crate::navigate::ResolvedPath;
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::storage::FreeSpace;
use log::debug;

/// Dispatches a parsed command to its handler.
pub fn handle_command(session: &mut Session, command: &Command) -> CommandResult {
    debug!("{} ran {:?}", session.username(), command);

    match command {
        Command::MakeDir(path) => done(session, session.make_dir(path)),
        Command::MakeFile(path) => done(session, session.make_file(path)),
        Command::ChangeDir(path) => handle_cmd_cd(session, path),
        Command::WriteFile(path) => handle_cmd_write(session, path),
        Command::ReadFile(path) => handle_cmd_view(session, path),
        Command::Delete(path) => {
            let result = session.delete(path);
            done(session, result)
        }
        Command::Copy(src, dst) => done(session, session.copy(src, dst)),
        Command::Move(src, dst) => {
            let result = session.move_path(src, dst);
            done(session, result)
        }
        Command::Free => handle_cmd_free(session),
        Command::Exit => handle_cmd_exit(),
        Command::Empty => CommandResult::success(None),
        Command::Usage(usage) => CommandResult {
            status: CommandStatus::Failure("Wrong number of arguments".into()),
            message: Some(format!("Usage: {usage}\r\n")),
        },
        Command::Unknown(word) => CommandResult {
            status: CommandStatus::Failure("Unknown command".into()),
            message: Some(format!("Error: Unknown command: {word}\r\n")),
        },
    }
}

/// Appends the content line that followed a `WriteTextFile` command.
pub fn handle_content(session: &Session, path: &ResolvedPath, text: &str) -> CommandResult {
    match session.append(path, text) {
        Ok(_) => CommandResult::success(None),
        Err(e) => failure(session, e),
    }
}

/// Success with no output, or the rendered failure.
fn done<T>(session: &Session, result: Result<T, FsError>) -> CommandResult {
    match result {
        Ok(_) => CommandResult::success(None),
        Err(e) => failure(session, e),
    }
}

fn failure(session: &Session, err: FsError) -> CommandResult {
    handle_fs_error(&err);

    let mut message = error_reply(&err);
    if matches!(err, FsError::QuotaExceeded { .. }) {
        // A rejected write is always followed by a free-space report
        message.push_str(&free_report(session));
    }

    CommandResult {
        status: CommandStatus::Failure(err.to_string()),
        message: Some(message),
    }
}

fn free_report(session: &Session) -> String {
    match session.free() {
        Ok(FreeSpace::Limited { available, limit }) => {
            format!("Available {available}B of {limit}B.\r\n")
        }
        Ok(FreeSpace::Unlimited) => "No quota configured.\r\n".to_string(),
        Err(e) => {
            handle_fs_error(&e);
            error_reply(&e)
        }
    }
}

fn handle_cmd_cd(session: &mut Session, path: &str) -> CommandResult {
    match session.change_dir(path) {
        Ok(_) => CommandResult::success(None),
        Err(e) => failure(session, e),
    }
}

fn handle_cmd_write(session: &Session, path: &str) -> CommandResult {
    match session.begin_write(path) {
        Ok(target) => CommandResult {
            status: CommandStatus::AwaitContent(target),
            message: None,
        },
        Err(e) => failure(session, e),
    }
}

fn handle_cmd_view(session: &Session, path: &str) -> CommandResult {
    match session.read_file(path) {
        Ok(mut text) => {
            if !text.ends_with('\n') {
                text.push_str("\r\n");
            }
            CommandResult::success(Some(text))
        }
        Err(e) => failure(session, e),
    }
}

fn handle_cmd_free(session: &Session) -> CommandResult {
    CommandResult::success(Some(free_report(session)))
}

fn handle_cmd_exit() -> CommandResult {
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some("Goodbye\r\n".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_command;
    use std::fs;
    use tempfile::TempDir;

    fn session(dir: &TempDir, quota: Option<u64>) -> Session {
        Session::open("alice", &dir.path().join("alice"), quota).unwrap()
    }

    fn run(session: &mut Session, line: &str) -> CommandResult {
        handle_command(session, &parse_command(line))
    }

    #[test]
    fn test_make_dir_twice() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, None);
        let result = run(&mut session, "MakeFold /docs");
        assert!(matches!(result.status, CommandStatus::Success));
        assert!(result.message.is_none());

        let result = run(&mut session, "MakeFold /docs");
        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert_eq!(
            result.message.as_deref(),
            Some("Error: File or directory already exists: /docs\r\n")
        );
    }

    #[test]
    fn test_write_awaits_content() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, None);
        run(&mut session, "MakeFile a.txt");

        let result = run(&mut session, "WriteTextFile a.txt");
        let CommandStatus::AwaitContent(target) = result.status else {
            panic!("expected AwaitContent");
        };
        let result = handle_content(&session, &target, "hello");
        assert!(matches!(result.status, CommandStatus::Success));

        let result = run(&mut session, "ViewTextFile a.txt");
        assert_eq!(result.message.as_deref(), Some("hello\r\n"));
    }

    #[test]
    fn test_write_to_missing_file_does_not_wait() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, None);
        let result = run(&mut session, "WriteTextFile nope.txt");
        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert_eq!(
            result.message.as_deref(),
            Some("Error: No such file: /nope.txt\r\n")
        );
    }

    #[test]
    fn test_quota_failure_reports_free_space() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, Some(60));
        fs::write(session.root().join("big.bin"), vec![0u8; 50]).unwrap();

        let result = run(&mut session, "Copy big.bin copy.bin");
        assert!(matches!(result.status, CommandStatus::Failure(_)));
        let message = result.message.unwrap();
        assert!(message.starts_with("Error: Not enough free space"));
        assert!(message.ends_with("Available 10B of 60B.\r\n"));
        assert!(!session.root().join("copy.bin").exists());
    }

    #[test]
    fn test_free_reports() {
        let dir = TempDir::new().unwrap();
        let mut limited = session(&dir, Some(1000));
        let result = run(&mut limited, "Memory");
        assert_eq!(result.message.as_deref(), Some("Available 1000B of 1000B.\r\n"));

        let mut unlimited = session(&dir, None);
        let result = run(&mut unlimited, "Memory");
        assert_eq!(result.message.as_deref(), Some("No quota configured.\r\n"));
    }

    #[test]
    fn test_unknown_and_usage() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, None);

        let result = run(&mut session, "Format C:");
        assert_eq!(
            result.message.as_deref(),
            Some("Error: Unknown command: Format\r\n")
        );

        let result = run(&mut session, "Copy a");
        assert_eq!(
            result.message.as_deref(),
            Some("Usage: Copy <source> <destination>\r\n")
        );
        assert!(session.cwd().is_root());
    }

    #[test]
    fn test_exit_closes() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir, None);
        let result = run(&mut session, "Exit");
        assert!(matches!(result.status, CommandStatus::CloseConnection));
    }
}
