/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use super::FtpReplyError;
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpCommandError {
    #[error("failed to send {0}: {1}")]
    SendFailed(FtpCommand, io::Error),
    #[error("no valid reply: {0}")]
    RecvFailed(#[from] FtpReplyError),
    #[error("service not available, closing control connection")]
    ServiceNotAvailable,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{0} rejected as a syntax error")]
    RejectedCommandSyntax(FtpCommand),
    #[error("{0} is not implemented by the server")]
    CommandNotImplemented(FtpCommand),
    #[error("{0} parameter is not implemented by the server")]
    ParameterNotImplemented(FtpCommand),
    #[error("{0} sent out of sequence")]
    BadCommandSequence(FtpCommand),
    #[error("unexpected reply code {1} to {0}")]
    UnexpectedReplyCode(FtpCommand, u16),
    #[error("malformed {1} reply to {0}")]
    InvalidReplySyntax(FtpCommand, u16),
}

impl FtpCommandError {
    /// Map a reply code which has no command specific meaning.
    pub(crate) fn from_reply_code(cmd: FtpCommand, code: u16) -> Self {
        match code {
            421 => FtpCommandError::ServiceNotAvailable,
            500 | 501 => FtpCommandError::RejectedCommandSyntax(cmd),
            502 => FtpCommandError::CommandNotImplemented(cmd),
            503 => FtpCommandError::BadCommandSequence(cmd),
            504 => FtpCommandError::ParameterNotImplemented(cmd),
            530 => FtpCommandError::NotLoggedIn,
            n => FtpCommandError::UnexpectedReplyCode(cmd, n),
        }
    }

    /// The control channel can no longer be trusted to be in sync after this error.
    pub(crate) fn is_transport_error(&self) -> bool {
        matches!(
            self,
            FtpCommandError::SendFailed(..)
                | FtpCommandError::RecvFailed(_)
                | FtpCommandError::ServiceNotAvailable
                | FtpCommandError::InvalidReplySyntax(..)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_reply_code() {
        let e = FtpCommandError::from_reply_code(FtpCommand::TypeBinary, 504);
        assert!(matches!(
            e,
            FtpCommandError::ParameterNotImplemented(FtpCommand::TypeBinary)
        ));
        assert!(!e.is_transport_error());
        assert_eq!(e.to_string(), "TYPE I parameter is not implemented by the server");

        let e = FtpCommandError::from_reply_code(FtpCommand::Cwd, 421);
        assert!(e.is_transport_error());

        let e = FtpCommandError::from_reply_code(FtpCommand::Quit, 250);
        assert_eq!(e.to_string(), "unexpected reply code 250 to QUIT");
    }
}
