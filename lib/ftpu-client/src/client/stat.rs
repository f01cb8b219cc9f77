/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use tokio::io::{AsyncRead, AsyncWrite};

use super::{FtpClient, FtpFault, check_remote_path, logged_in_control};
use crate::error::{FtpCommandError, FtpError};
use crate::{FtpConnectionProvider, log_msg};

fn file_not_found(path: &str, e: FtpCommandError) -> FtpFault {
    FtpFault::from_command_error(e, |_| FtpError::RemoteFileNotFound(path.to_string()))
}

impl<CP, S, E> FtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    /// Get the size in bytes of the remote file at `path`.
    pub async fn file_size(&mut self, path: &str) -> Result<u64, FtpError> {
        let r = self.query_file_size(path).await;
        self.settle(r).await
    }

    async fn query_file_size(&mut self, path: &str) -> Result<u64, FtpFault> {
        if self.transfer.is_some() {
            return Err(FtpError::TransferInProgress.into());
        }
        let control = logged_in_control(&mut self.control, self.state)?;
        check_remote_path(path)?;

        match control.request_mlst(path).await {
            Ok(Some(facts)) => {
                if !facts.maybe_file() {
                    return Err(FtpError::RemoteFileNotFound(path.to_string()).into());
                }
                if let Some(size) = facts.size() {
                    return Ok(size);
                }
            }
            Ok(None) => return Err(FtpError::RemoteFileNotFound(path.to_string()).into()),
            Err(
                FtpCommandError::CommandNotImplemented(_)
                | FtpCommandError::ParameterNotImplemented(_)
                | FtpCommandError::RejectedCommandSyntax(_),
            ) => {}
            Err(e) => return Err(file_not_found(path, e)),
        }

        log_msg!("no size fact for {path}, fall back to SIZE command");
        match control.request_size(path).await {
            Ok(Some(size)) => Ok(size),
            Ok(None) => Err(FtpError::RemoteFileNotFound(path.to_string()).into()),
            Err(e) => Err(file_not_found(path, e)),
        }
    }
}
