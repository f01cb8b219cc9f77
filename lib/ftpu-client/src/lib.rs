/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod debug;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};

mod addr;
pub use addr::{Host, UpstreamAddr, UpstreamAddrError};

mod auth;
pub use auth::{FtpCredentialError, Password, Username};

mod config;
pub use config::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};

mod connection;
pub use connection::{FtpConnectionProvider, TcpConnectionProvider};

mod error;
pub use error::*;

mod io;

mod control;
pub use control::FtpCommand;

mod facts;
pub use facts::{FtpFileEntryType, FtpFileFacts};

mod client;
pub use client::{FtpClient, FtpSessionState};

mod blocking;
pub use blocking::BlockingFtpClient;
