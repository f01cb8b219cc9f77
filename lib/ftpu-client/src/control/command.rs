/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::FtpControlChannel;
use super::response::FtpReply;
use crate::error::FtpCommandError;

/// The control commands a session sends.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FtpCommand {
    /// not sent, the server greets right after connect
    Greeting,
    User,
    Pass,
    Quit,
    Cwd,
    TypeBinary,
    Pasv,
    Mlst,
    Size,
    Retr,
    Stor,
}

impl FtpCommand {
    fn verb(self) -> &'static str {
        match self {
            FtpCommand::Greeting => "",
            FtpCommand::User => "USER",
            FtpCommand::Pass => "PASS",
            FtpCommand::Quit => "QUIT",
            FtpCommand::Cwd => "CWD",
            FtpCommand::TypeBinary => "TYPE I",
            FtpCommand::Pasv => "PASV",
            FtpCommand::Mlst => "MLST",
            FtpCommand::Size => "SIZE",
            FtpCommand::Retr => "RETR",
            FtpCommand::Stor => "STOR",
        }
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpCommand::Greeting => f.write_str("greeting"),
            cmd => f.write_str(cmd.verb()),
        }
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    async fn send_command(
        &mut self,
        cmd: FtpCommand,
        arg: Option<&str>,
    ) -> Result<(), FtpCommandError> {
        let verb = cmd.verb();
        let mut line = String::with_capacity(verb.len() + arg.map_or(0, |s| s.len() + 1) + 2);
        line.push_str(verb);
        if let Some(arg) = arg {
            line.push(' ');
            line.push_str(arg);
        }

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_cmd(cmd, &line);

        line.push_str("\r\n");
        self.stream
            .write_all(line.as_bytes())
            .await
            .map_err(|e| FtpCommandError::SendFailed(cmd, e))?;
        self.stream
            .flush()
            .await
            .map_err(|e| FtpCommandError::SendFailed(cmd, e))
    }

    /// Send one command and wait for its reply, which is not checked here.
    pub(super) async fn exchange(
        &mut self,
        cmd: FtpCommand,
        arg: Option<&str>,
    ) -> Result<FtpReply, FtpCommandError> {
        self.send_command(cmd, arg).await?;
        let reply = self.timed_read_reply(cmd).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(FtpCommand::TypeBinary.to_string(), "TYPE I");
        assert_eq!(FtpCommand::Greeting.to_string(), "greeting");
        assert_eq!(FtpCommand::Retr.to_string(), "RETR");
    }
}
