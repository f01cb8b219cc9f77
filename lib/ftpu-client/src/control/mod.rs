/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::SocketAddr;
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

use crate::error::{
    FtpCommandError, FtpFileRetrieveStartError, FtpFileStoreStartError, FtpTransferServerError,
};
use crate::{FtpControlConfig, FtpFileFacts, Password, Username};

mod response;
use response::FtpReply;

mod command;
pub use command::FtpCommand;

/// Where the login is after a USER or PASS reply.
pub(crate) enum FtpAuthStatus {
    LoggedIn,
    NeedPassword,
    NeedAccount,
    NotLoggedIn,
}

impl FtpAuthStatus {
    fn from_reply(cmd: FtpCommand, reply: &FtpReply) -> Result<Self, FtpCommandError> {
        match reply.code() {
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }
}

pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
        }
    }

    pub(crate) async fn close(mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }

    /// Wait for 220, skipping any 120 delay notice.
    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_reply().await?;
            match reply.code() {
                120 => {}
                220 => return Ok(()),
                n => return Err(FtpCommandError::from_reply_code(FtpCommand::Greeting, n)),
            }
        }
    }

    pub(crate) async fn send_username(
        &mut self,
        name: &Username,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::User;
        let reply = self.exchange(cmd, Some(name.as_original())).await?;
        FtpAuthStatus::from_reply(cmd, &reply)
    }

    pub(crate) async fn send_password(
        &mut self,
        pass: &Password,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::Pass;
        let reply = self.exchange(cmd, Some(pass.as_original())).await?;
        FtpAuthStatus::from_reply(cmd, &reply)
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::Quit;
        let reply = self.exchange(cmd, None).await?;
        match reply.code() {
            221 => Ok(()),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }

    /// Returns false if the server says the directory is unavailable.
    pub(crate) async fn change_working_directory(
        &mut self,
        path: &str,
    ) -> Result<bool, FtpCommandError> {
        let cmd = FtpCommand::Cwd;
        let reply = self.exchange(cmd, Some(path)).await?;
        match reply.code() {
            200 | 250 => Ok(true),
            550 => Ok(false),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }

    /// Returns None if the server says the file is unavailable.
    pub(crate) async fn request_mlst(
        &mut self,
        path: &str,
    ) -> Result<Option<FtpFileFacts>, FtpCommandError> {
        let cmd = FtpCommand::Mlst;
        let reply = self.exchange(cmd, Some(path)).await?;
        match reply.code() {
            250 => {
                // the facts are on the only line between the start and end line
                let facts = match reply.lines() {
                    Some([_, line, _]) => FtpFileFacts::parse_line(line).ok(),
                    _ => None,
                };
                facts
                    .map(Some)
                    .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 250))
            }
            550 => Ok(None),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }

    /// Returns None if the server says the file is unavailable.
    pub(crate) async fn request_size(
        &mut self,
        path: &str,
    ) -> Result<Option<u64>, FtpCommandError> {
        let cmd = FtpCommand::Size;
        let reply = self.exchange(cmd, Some(path)).await?;
        match reply.code() {
            213 => reply
                .line_trimmed()
                .and_then(|s| u64::from_str(s).ok())
                .map(Some)
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 213)),
            550 => Ok(None),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }

    pub(crate) async fn request_pasv_port(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::Pasv;
        let reply = self.exchange(cmd, None).await?;
        match reply.code() {
            227 => reply
                .parse_pasv_227_reply()
                .ok_or(FtpCommandError::InvalidReplySyntax(cmd, 227)),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }

    pub(crate) async fn request_binary_type(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::TypeBinary;
        let reply = self.exchange(cmd, None).await?;
        match reply.code() {
            200 => Ok(()),
            n => Err(FtpCommandError::from_reply_code(cmd, n)),
        }
    }

    pub(crate) async fn start_retrieve(
        &mut self,
        path: &str,
    ) -> Result<(), FtpFileRetrieveStartError> {
        let cmd = FtpCommand::Retr;
        let reply = self.exchange(cmd, Some(path)).await?;
        match reply.code() {
            125 | 150 => Ok(()),
            450 | 550 => Err(FtpFileRetrieveStartError::FileUnavailable),
            n => Err(FtpCommandError::from_reply_code(cmd, n).into()),
        }
    }

    pub(crate) async fn start_store(&mut self, path: &str) -> Result<(), FtpFileStoreStartError> {
        let cmd = FtpCommand::Stor;
        let reply = self.exchange(cmd, Some(path)).await?;
        match reply.code() {
            125 | 150 => Ok(()),
            450 | 550 => Err(FtpFileStoreStartError::FileUnavailable),
            452 => Err(FtpFileStoreStartError::InsufficientStorageSpace),
            532 => Err(FtpFileStoreStartError::NeedAccountForStoring),
            553 => Err(FtpFileStoreStartError::FileNameNotAllowed),
            n => Err(FtpCommandError::from_reply_code(cmd, n).into()),
        }
    }

    /// Read the reply sent by the server after the data connection of `cmd` is closed.
    pub(crate) async fn wait_transfer_end(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<(), FtpTransferServerError> {
        let reply = self.read_reply().await?;
        match reply.code() {
            226 | 250 => Ok(()),
            110 => Err(FtpTransferServerError::RestartNeeded),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            551 => Err(FtpTransferServerError::PageTypeUnknown),
            552 => Err(FtpTransferServerError::ExceededStorageAllocation),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(cmd, n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn new_channel(mock: tokio_test::io::Mock) -> FtpControlChannel<tokio_test::io::Mock> {
        FtpControlChannel::new(mock, FtpControlConfig::default())
    }

    #[tokio::test]
    async fn greeting_with_delay() {
        let mock = Builder::new()
            .read(b"120 Service ready in 1 minute\r\n")
            .read(b"220-Welcome\r\n220 Ready\r\n")
            .build();
        let mut channel = new_channel(mock);
        channel.wait_greetings().await.unwrap();
    }

    #[tokio::test]
    async fn greeting_refused() {
        let mock = Builder::new().read(b"421 Too many users\r\n").build();
        let mut channel = new_channel(mock);
        assert!(matches!(
            channel.wait_greetings().await,
            Err(FtpCommandError::ServiceNotAvailable)
        ));
    }

    #[tokio::test]
    async fn login_exchange() {
        let mock = Builder::new()
            .write(b"USER ftpuser\r\n")
            .read(b"331 Password required\r\n")
            .write(b"PASS secret\r\n")
            .read(b"230 Logged in\r\n")
            .build();
        let mut channel = new_channel(mock);
        let user = Username::from_original("ftpuser").unwrap();
        let pass = Password::from_original("secret").unwrap();
        assert!(matches!(
            channel.send_username(&user).await,
            Ok(FtpAuthStatus::NeedPassword)
        ));
        assert!(matches!(
            channel.send_password(&pass).await,
            Ok(FtpAuthStatus::LoggedIn)
        ));
    }

    #[tokio::test]
    async fn change_directory() {
        let mock = Builder::new()
            .write(b"CWD /pub\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .write(b"CWD /none\r\n")
            .read(b"550 Failed to change directory.\r\n")
            .write(b"CWD /pub\r\n")
            .read(b"530 Please login with USER and PASS.\r\n")
            .build();
        let mut channel = new_channel(mock);
        assert!(channel.change_working_directory("/pub").await.unwrap());
        assert!(!channel.change_working_directory("/none").await.unwrap());
        assert!(matches!(
            channel.change_working_directory("/pub").await,
            Err(FtpCommandError::NotLoggedIn)
        ));
    }

    #[tokio::test]
    async fn mlst_facts() {
        let mock = Builder::new()
            .write(b"MLST /pub/a.bin\r\n")
            .read(b"250-Listing /pub/a.bin\r\n type=file;size=4096;modify=20240101000000; /pub/a.bin\r\n250 End\r\n")
            .write(b"MLST /pub/none\r\n")
            .read(b"550 No such file\r\n")
            .write(b"MLST /pub/b.bin\r\n")
            .read(b"250 /pub/b.bin\r\n")
            .build();
        let mut channel = new_channel(mock);
        let facts = channel.request_mlst("/pub/a.bin").await.unwrap().unwrap();
        assert_eq!(facts.size(), Some(4096));
        assert_eq!(facts.entry_path(), "/pub/a.bin");
        assert!(channel.request_mlst("/pub/none").await.unwrap().is_none());
        assert!(matches!(
            channel.request_mlst("/pub/b.bin").await,
            Err(FtpCommandError::InvalidReplySyntax(FtpCommand::Mlst, 250))
        ));
    }

    #[tokio::test]
    async fn size_invalid_reply() {
        let mock = Builder::new()
            .write(b"SIZE a.bin\r\n")
            .read(b"213 lots\r\n")
            .build();
        let mut channel = new_channel(mock);
        assert!(matches!(
            channel.request_size("a.bin").await,
            Err(FtpCommandError::InvalidReplySyntax(FtpCommand::Size, 213))
        ));
    }

    #[tokio::test]
    async fn store_end_reply() {
        let mock = Builder::new()
            .write(b"STOR a.bin\r\n")
            .read(b"150 Ok to send data\r\n")
            .read(b"552 Quota exceeded\r\n")
            .build();
        let mut channel = new_channel(mock);
        channel.start_store("a.bin").await.unwrap();
        assert!(matches!(
            channel.wait_transfer_end(FtpCommand::Stor).await,
            Err(FtpTransferServerError::ExceededStorageAllocation)
        ));
    }

    #[tokio::test]
    async fn binary_type_rejected() {
        let mock = Builder::new()
            .write(b"TYPE I\r\n")
            .read(b"504 Command not implemented for that parameter.\r\n")
            .build();
        let mut channel = new_channel(mock);
        let e = channel.request_binary_type().await.unwrap_err();
        assert!(matches!(
            e,
            FtpCommandError::ParameterNotImplemented(FtpCommand::TypeBinary)
        ));
        assert!(!e.is_transport_error());
    }

    #[tokio::test]
    async fn connection_closed() {
        let mock = Builder::new().write(b"TYPE I\r\n").build();
        let mut channel = new_channel(mock);
        let e = channel.request_binary_type().await.unwrap_err();
        assert!(e.is_transport_error());
    }
}
