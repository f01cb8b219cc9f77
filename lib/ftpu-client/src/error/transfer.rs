/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::{FtpCommandError, FtpReplyError};
use crate::control::FtpCommand;

#[derive(Debug, Error)]
pub enum FtpTransferSetupError {
    #[error("command error: {0}")]
    CommandError(FtpCommandError),
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("data connect failed: {0}")]
    DataConnectFailed(String),
    #[error("timed out to connect data channel")]
    DataConnectTimedOut,
}

impl FtpTransferSetupError {
    pub(crate) fn is_transport_error(&self) -> bool {
        match self {
            FtpTransferSetupError::CommandError(e) => e.is_transport_error(),
            FtpTransferSetupError::ServiceNotAvailable => true,
            FtpTransferSetupError::DataConnectFailed(_)
            | FtpTransferSetupError::DataConnectTimedOut => false,
        }
    }
}

impl From<FtpCommandError> for FtpTransferSetupError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => FtpTransferSetupError::ServiceNotAvailable,
            _ => FtpTransferSetupError::CommandError(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpTransferServerError {
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpReplyError),
    #[error("restart marker reply is not supported")]
    RestartNeeded,
    #[error("can't open data connection")]
    DataTransferNotEstablished,
    #[error("connection closed, transfer aborted")]
    DataTransferLost,
    #[error("local error in processing")]
    ServerFailed,
    #[error("page type unknown")]
    PageTypeUnknown,
    #[error("exceeded storage allocation")]
    ExceededStorageAllocation,
    #[error("unexpected end reply code ({0} -> {1})")]
    UnexpectedEndReplyCode(FtpCommand, u16),
}
