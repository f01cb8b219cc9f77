/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::{
    FtpCommandError, FtpFileRetrieveError, FtpFileRetrieveStartError, FtpFileStoreError,
    FtpFileStoreStartError,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpErrorKind {
    ConnectionRefused,
    AuthenticationFailed,
    RemoteDirectoryNotFound,
    UnsupportedTransferMode,
    RemoteFileNotFound,
    LogoutRejected,
    TransportError,
    NotLoggedIn,
    TransferInProgress,
    NoTransferInProgress,
    InvalidArgument,
}

/// The only error type returned by [`crate::FtpClient`].
///
/// Every lower level protocol error is translated into one of these kinds,
/// the display string carries the detail.
#[derive(Debug, Error)]
pub enum FtpError {
    #[error("ftp server refused connection: {0}")]
    ConnectionRefused(String),
    #[error("could not login to the server: {0}")]
    AuthenticationFailed(String),
    #[error("could not change working directory to {0}, the directory may not exist")]
    RemoteDirectoryNotFound(String),
    #[error("could not set binary file type: {0}")]
    UnsupportedTransferMode(String),
    #[error("the file {0} may not exist on the server")]
    RemoteFileNotFound(String),
    #[error("could not log out from the server: {0}")]
    LogoutRejected(String),
    #[error("i/o error: {0}")]
    TransportError(String),
    #[error("not logged in to the server")]
    NotLoggedIn,
    #[error("another file transfer is in progress")]
    TransferInProgress,
    #[error("no {0} transfer in progress")]
    NoTransferInProgress(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl FtpError {
    pub fn kind(&self) -> FtpErrorKind {
        match self {
            FtpError::ConnectionRefused(_) => FtpErrorKind::ConnectionRefused,
            FtpError::AuthenticationFailed(_) => FtpErrorKind::AuthenticationFailed,
            FtpError::RemoteDirectoryNotFound(_) => FtpErrorKind::RemoteDirectoryNotFound,
            FtpError::UnsupportedTransferMode(_) => FtpErrorKind::UnsupportedTransferMode,
            FtpError::RemoteFileNotFound(_) => FtpErrorKind::RemoteFileNotFound,
            FtpError::LogoutRejected(_) => FtpErrorKind::LogoutRejected,
            FtpError::TransportError(_) => FtpErrorKind::TransportError,
            FtpError::NotLoggedIn => FtpErrorKind::NotLoggedIn,
            FtpError::TransferInProgress => FtpErrorKind::TransferInProgress,
            FtpError::NoTransferInProgress(_) => FtpErrorKind::NoTransferInProgress,
            FtpError::InvalidArgument(_) => FtpErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn from_command_error<F>(e: FtpCommandError, f: F) -> Self
    where
        F: FnOnce(&FtpCommandError) -> FtpError,
    {
        if e.is_transport_error() {
            FtpError::TransportError(e.to_string())
        } else {
            f(&e)
        }
    }
}

impl FtpError {
    pub(crate) fn from_greeting_error(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => {
                FtpError::ConnectionRefused("service not available".to_string())
            }
            FtpCommandError::SendFailed(..) | FtpCommandError::RecvFailed(_) => {
                FtpError::TransportError(format!("no valid greeting: {e}"))
            }
            e => FtpError::ConnectionRefused(e.to_string()),
        }
    }

    pub(crate) fn from_login_error(e: FtpCommandError) -> Self {
        FtpError::from_command_error(e, |e| FtpError::AuthenticationFailed(e.to_string()))
    }

    pub(crate) fn from_store_start_error(e: FtpFileStoreStartError) -> Self {
        FtpError::TransportError(format!("error uploading file: {e}"))
    }

    pub(crate) fn from_retrieve_start_error(path: &str, e: FtpFileRetrieveStartError) -> Self {
        match e {
            FtpFileRetrieveStartError::FileUnavailable => {
                FtpError::RemoteFileNotFound(path.to_string())
            }
            FtpFileRetrieveStartError::CommandError(e) => {
                FtpError::from_command_error(e, |_| FtpError::RemoteFileNotFound(path.to_string()))
            }
            e => FtpError::TransportError(format!("error downloading file: {e}")),
        }
    }

    pub(crate) fn from_store_end_error(e: FtpFileStoreError) -> Self {
        FtpError::TransportError(format!("upload not completed: {e}"))
    }

    pub(crate) fn from_retrieve_end_error(e: FtpFileRetrieveError) -> Self {
        FtpError::TransportError(format!("download not completed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::control::FtpCommand;
    use crate::error::FtpReplyError;

    #[test]
    fn greeting_error() {
        let e = FtpError::from_greeting_error(FtpCommandError::UnexpectedReplyCode(
            FtpCommand::Greeting,
            530,
        ));
        assert_eq!(e.kind(), FtpErrorKind::ConnectionRefused);
        assert_eq!(
            e.to_string(),
            "ftp server refused connection: unexpected reply code 530 to greeting"
        );

        let e = FtpError::from_greeting_error(FtpCommandError::ServiceNotAvailable);
        assert_eq!(e.kind(), FtpErrorKind::ConnectionRefused);

        let e = FtpError::from_greeting_error(FtpCommandError::RecvFailed(
            FtpReplyError::ConnectionClosed,
        ));
        assert_eq!(e.kind(), FtpErrorKind::TransportError);
    }

    #[test]
    fn login_error() {
        let e = FtpError::from_login_error(FtpCommandError::RejectedCommandSyntax(
            FtpCommand::User,
        ));
        assert_eq!(e.kind(), FtpErrorKind::AuthenticationFailed);
        assert_eq!(
            e.to_string(),
            "could not login to the server: USER rejected as a syntax error"
        );

        let e = FtpError::from_login_error(FtpCommandError::SendFailed(
            FtpCommand::Pass,
            io::Error::from(io::ErrorKind::BrokenPipe),
        ));
        assert_eq!(e.kind(), FtpErrorKind::TransportError);
    }

    #[test]
    fn retrieve_start_error() {
        let e = FtpError::from_retrieve_start_error(
            "/pub/a.bin",
            FtpFileRetrieveStartError::FileUnavailable,
        );
        assert_eq!(e.kind(), FtpErrorKind::RemoteFileNotFound);
        assert_eq!(e.to_string(), "the file /pub/a.bin may not exist on the server");

        let e = FtpError::from_retrieve_start_error(
            "/pub/a.bin",
            FtpFileRetrieveStartError::ServiceNotAvailable,
        );
        assert_eq!(e.kind(), FtpErrorKind::TransportError);
    }
}
