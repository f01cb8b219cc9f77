/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;

use thiserror::Error;

use crate::control::FtpCommand;

/// Failure to read one reply from the control connection.
#[derive(Debug, Error)]
pub enum FtpReplyError {
    #[error("read failed: {0}")]
    ReadFailed(io::Error),
    #[error("control connection closed by peer")]
    ConnectionClosed,
    #[error("reply line exceeds {0} bytes")]
    LineTooLong(usize),
    #[error("malformed reply line")]
    MalformedLine,
    #[error("reply code {0} out of range")]
    CodeOutOfRange(u16),
    #[error("reply text is not utf-8")]
    NotUtf8,
    #[error("reply has more than {0} lines")]
    TooManyLines(usize),
    #[error("no reply to {0} in time")]
    TimedOut(FtpCommand),
}
