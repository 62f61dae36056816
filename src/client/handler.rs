//! Client session loop
//!
//! Drives one connection from login to exit over any line-oriented
//! reader/writer pair, so the console and TCP transports share it.

use log::{debug, error, info, warn};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::auth::AuthOutcome;
use crate::client::SessionState;
use crate::error::ShellError;
use crate::error::handlers::{auth_reply, handle_error};
use crate::protocol::{CommandStatus, handle_command, handle_content, parse_command};
use crate::server::SessionRouter;

const GREETING: &str = "Welcome to RAX FS Shell\r\n";

/// Why an input line was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineError {
    /// Longer than the limit; the rest of the line was discarded.
    TooLong,
    /// Not valid UTF-8.
    BadEncoding,
}

impl LineError {
    fn reply(self) -> &'static str {
        match self {
            LineError::TooLong => "Error: Command too long\r\n",
            LineError::BadEncoding => "Error: invalid input encoding\r\n",
        }
    }
}

/// Reads one line holding at most `limit` bytes before its newline and
/// strips the terminator. `None` at end of input.
///
/// Never buffers more than `limit + 1` bytes of a line.
async fn read_line<R>(
    reader: &mut R,
    limit: usize,
) -> io::Result<Option<Result<String, LineError>>>
where
    R: AsyncBufRead + Unpin,
{
    let cap = (limit as u64).saturating_add(1);
    let mut buf = Vec::new();
    let n = (&mut *reader).take(cap).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') && n as u64 >= cap {
        discard_line(reader).await?;
        return Ok(Some(Err(LineError::TooLong)));
    }

    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8(buf).map_err(|_| LineError::BadEncoding)))
}

/// Skips input up to and including the next newline.
async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

async fn send<W>(writer: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}

/// Handles a shell session from greeting to exit.
///
/// - Prompts for login and password until credentials are accepted,
///   rejected, or input ends.
/// - Dispatches each command line through `handle_command`.
/// - A `WriteTextFile` command consumes the following line as content.
pub async fn handle_client<R, W>(
    mut reader: R,
    mut writer: W,
    router: &SessionRouter,
    peer: &str,
    max_command_length: usize,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = SessionState::Unauthenticated;

    send(&mut writer, GREETING).await?;

    while matches!(state, SessionState::Unauthenticated) {
        send(&mut writer, "Login: ").await?;
        let username = match read_line(&mut reader, max_command_length).await? {
            None => {
                info!("{} disconnected during login", peer);
                return Ok(());
            }
            Some(Ok(line)) => line.trim().to_string(),
            Some(Err(e)) => {
                warn!("{} sent an unreadable login line: {:?}", peer, e);
                send(&mut writer, e.reply()).await?;
                continue;
            }
        };

        send(&mut writer, "Password: ").await?;
        let password = match read_line(&mut reader, max_command_length).await? {
            None => {
                info!("{} disconnected during login", peer);
                return Ok(());
            }
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("{} sent an unreadable password line: {:?}", peer, e);
                send(&mut writer, e.reply()).await?;
                continue;
            }
        };

        match router.login(&mut state, &username, &password).await {
            Ok(AuthOutcome::Registered) => {
                send(&mut writer, &format!("Registered new user {username}\r\n")).await?;
            }
            Ok(AuthOutcome::Authenticated) => {}
            Err(e) => {
                send(&mut writer, &auth_reply(&e)).await?;
                handle_error(&ShellError::Auth(e));
            }
        }
    }

    if state.is_terminated() {
        return Ok(());
    }

    if let Err(e) = router.activate(&mut state).await {
        handle_error(&e);
        let reply = match &e {
            ShellError::Auth(auth) => auth_reply(auth),
            _ => "Error: could not open home directory\r\n".to_string(),
        };
        send(&mut writer, &reply).await?;
        return Ok(());
    }

    let result = command_loop(&mut reader, &mut writer, &mut state, peer, max_command_length).await;
    router.terminate(&mut state).await;
    result
}

async fn command_loop<R, W>(
    reader: &mut R,
    writer: &mut W,
    state: &mut SessionState,
    peer: &str,
    max_command_length: usize,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let state_name = state.name();
    let Some(session) = state.session_mut() else {
        error!("Command loop entered while {}", state_name);
        return Ok(());
    };
    loop {
        send(writer, &session.prompt()).await?;

        let line = match read_line(reader, max_command_length).await? {
            None => {
                info!("Input closed by {}", peer);
                return Ok(());
            }
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!("{} sent an unreadable command: {:?}", peer, e);
                send(writer, e.reply()).await?;
                continue;
            }
        };

        let command = parse_command(&line);
        debug!("Received from {}: {:?}", peer, &command);

        let result = handle_command(session, &command);
        if let Some(msg) = &result.message {
            send(writer, msg).await?;
        }

        match result.status {
            CommandStatus::CloseConnection => {
                info!("{} exited", peer);
                return Ok(());
            }
            CommandStatus::AwaitContent(target) => {
                let content = match read_line(reader, max_command_length).await? {
                    None => {
                        info!("Input closed by {} before file content", peer);
                        return Ok(());
                    }
                    Some(Ok(content)) => content,
                    Some(Err(e)) => {
                        warn!("{} sent unreadable content for {}: {:?}", peer, target, e);
                        send(writer, e.reply()).await?;
                        continue;
                    }
                };
                let result = handle_content(session, &target, &content);
                if let Some(msg) = &result.message {
                    send(writer, msg).await?;
                }
            }
            CommandStatus::Success | CommandStatus::Failure(_) => {}
        }
    }
}
