/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::command::FtpCommandError;
use super::reply::FtpReplyError;
use super::transfer::{FtpTransferServerError, FtpTransferSetupError};

#[derive(Debug, Error)]
pub enum FtpFileFactsParseError {
    #[error("no space delimiter")]
    NoSpaceDelimiter,
    #[error("no delimiter in fact ({0})")]
    NoDelimiterInFact(String),
    #[error("invalid size")]
    InvalidSize,
}

#[derive(Debug, Error)]
pub enum FtpFileRetrieveStartError {
    #[error("data transfer setup error: {0}")]
    TransferSetupFailed(FtpTransferSetupError),
    #[error("command error: {0}")]
    CommandError(FtpCommandError),
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("file unavailable")]
    FileUnavailable,
}

impl FtpFileRetrieveStartError {
    pub(crate) fn is_transport_error(&self) -> bool {
        match self {
            FtpFileRetrieveStartError::TransferSetupFailed(e) => e.is_transport_error(),
            FtpFileRetrieveStartError::CommandError(e) => e.is_transport_error(),
            FtpFileRetrieveStartError::ServiceNotAvailable => true,
            FtpFileRetrieveStartError::FileUnavailable => false,
        }
    }
}

impl From<FtpCommandError> for FtpFileRetrieveStartError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => FtpFileRetrieveStartError::ServiceNotAvailable,
            _ => FtpFileRetrieveStartError::CommandError(e),
        }
    }
}

impl From<FtpTransferSetupError> for FtpFileRetrieveStartError {
    fn from(e: FtpTransferSetupError) -> Self {
        match e {
            FtpTransferSetupError::ServiceNotAvailable => {
                FtpFileRetrieveStartError::ServiceNotAvailable
            }
            _ => FtpFileRetrieveStartError::TransferSetupFailed(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpFileStoreStartError {
    #[error("data transfer setup error: {0}")]
    TransferSetupFailed(FtpTransferSetupError),
    #[error("command error: {0}")]
    CommandError(FtpCommandError),
    #[error("service not available")]
    ServiceNotAvailable,
    #[error("file unavailable")]
    FileUnavailable,
    #[error("need account for storing")]
    NeedAccountForStoring,
    #[error("filename not allowed")]
    FileNameNotAllowed,
    #[error("insufficient storage space")]
    InsufficientStorageSpace,
}

impl FtpFileStoreStartError {
    pub(crate) fn is_transport_error(&self) -> bool {
        match self {
            FtpFileStoreStartError::TransferSetupFailed(e) => e.is_transport_error(),
            FtpFileStoreStartError::CommandError(e) => e.is_transport_error(),
            FtpFileStoreStartError::ServiceNotAvailable => true,
            _ => false,
        }
    }
}

impl From<FtpCommandError> for FtpFileStoreStartError {
    fn from(e: FtpCommandError) -> Self {
        match e {
            FtpCommandError::ServiceNotAvailable => FtpFileStoreStartError::ServiceNotAvailable,
            _ => FtpFileStoreStartError::CommandError(e),
        }
    }
}

impl From<FtpTransferSetupError> for FtpFileStoreStartError {
    fn from(e: FtpTransferSetupError) -> Self {
        match e {
            FtpTransferSetupError::ServiceNotAvailable => {
                FtpFileStoreStartError::ServiceNotAvailable
            }
            _ => FtpFileStoreStartError::TransferSetupFailed(e),
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpFileRetrieveError {
    #[error("server reported error: {0}")]
    ServerReportedError(FtpTransferServerError),
    #[error("timeout to wait end reply")]
    TimeoutToWaitEndReply,
    #[error("control read error: {0}")]
    ControlReadError(#[from] FtpReplyError),
}

impl From<FtpTransferServerError> for FtpFileRetrieveError {
    fn from(e: FtpTransferServerError) -> Self {
        if let FtpTransferServerError::RecvFailed(e) = e {
            FtpFileRetrieveError::ControlReadError(e)
        } else {
            FtpFileRetrieveError::ServerReportedError(e)
        }
    }
}

#[derive(Debug, Error)]
pub enum FtpFileStoreError {
    #[error("server reported error: {0}")]
    ServerReportedError(FtpTransferServerError),
    #[error("timeout to wait end reply")]
    TimeoutToWaitEndReply,
    #[error("data stream close failed: {0:?}")]
    DataCloseFailed(std::io::Error),
    #[error("control read error: {0}")]
    ControlReadError(#[from] FtpReplyError),
}

impl From<FtpTransferServerError> for FtpFileStoreError {
    fn from(e: FtpTransferServerError) -> Self {
        if let FtpTransferServerError::RecvFailed(e) = e {
            FtpFileStoreError::ControlReadError(e)
        } else {
            FtpFileStoreError::ServerReportedError(e)
        }
    }
}
