/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod reply;
pub use reply::FtpReplyError;

mod command;
pub use command::FtpCommandError;

mod file;
pub use file::{
    FtpFileFactsParseError, FtpFileRetrieveError, FtpFileRetrieveStartError, FtpFileStoreError,
    FtpFileStoreStartError,
};

mod transfer;
pub use transfer::{FtpTransferServerError, FtpTransferSetupError};

mod client;
pub use client::{FtpError, FtpErrorKind};
