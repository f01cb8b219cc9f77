/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::error::Error;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::UpstreamAddr;

mod tcp;
pub use tcp::TcpConnectionProvider;

/// Opens the sockets an FTP session runs on.
///
/// The control connection is opened once per session, a data connection is
/// opened for every file transfer, to the address the server advertised in
/// its PASV reply.
#[async_trait]
pub trait FtpConnectionProvider<T: AsyncRead + AsyncWrite, E: Error> {
    async fn new_control_connection(&mut self, upstream: &UpstreamAddr) -> Result<T, E>;
    async fn new_data_connection(&mut self, server_addr: &UpstreamAddr) -> Result<T, E>;
}
