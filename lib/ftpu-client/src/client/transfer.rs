/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{FtpClient, FtpFault, check_remote_path, logged_in_control};
use crate::control::{FtpCommand, FtpControlChannel};
use crate::error::{
    FtpError, FtpFileRetrieveError, FtpFileRetrieveStartError, FtpFileStoreError,
    FtpFileStoreStartError, FtpTransferServerError, FtpTransferSetupError,
};
use crate::{FtpConnectionProvider, UpstreamAddr, log_msg};

pub(super) enum FtpDataTransfer<S> {
    Store { stream: S, path: String },
    Retrieve { stream: S, path: String },
}

impl<S> FtpDataTransfer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(super) fn action(&self) -> &'static str {
        match self {
            FtpDataTransfer::Store { .. } => "upload",
            FtpDataTransfer::Retrieve { .. } => "download",
        }
    }

    pub(super) fn path(&self) -> &str {
        match self {
            FtpDataTransfer::Store { path, .. } => path,
            FtpDataTransfer::Retrieve { path, .. } => path,
        }
    }

    fn command(&self) -> FtpCommand {
        match self {
            FtpDataTransfer::Store { .. } => FtpCommand::Stor,
            FtpDataTransfer::Retrieve { .. } => FtpCommand::Retr,
        }
    }

    /// Close the data connection and consume the end reply, ignoring the result.
    ///
    /// Returns false if no complete end reply was read, the control channel
    /// is then out of sync.
    pub(super) async fn abort(
        self,
        control: &mut FtpControlChannel<S>,
        end_wait: Duration,
    ) -> bool {
        let cmd = self.command();
        drop(self);
        match tokio::time::timeout(end_wait, control.wait_transfer_end(cmd)).await {
            Ok(Ok(_)) => true,
            Ok(Err(FtpTransferServerError::RecvFailed(_))) => false,
            Ok(Err(_)) => true,
            Err(_) => false,
        }
    }
}

async fn open_data_stream<CP, S, E>(
    control: &mut FtpControlChannel<S>,
    conn_provider: &mut CP,
    connect_timeout: Duration,
) -> Result<S, FtpTransferSetupError>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    let pasv_addr = control.request_pasv_port().await?;
    let data_server = UpstreamAddr::from(pasv_addr);

    match tokio::time::timeout(
        connect_timeout,
        conn_provider.new_data_connection(&data_server),
    )
    .await
    {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(FtpTransferSetupError::DataConnectFailed(e.to_string())),
        Err(_) => Err(FtpTransferSetupError::DataConnectTimedOut),
    }
}

async fn start_store<CP, S, E>(
    control: &mut FtpControlChannel<S>,
    conn_provider: &mut CP,
    connect_timeout: Duration,
    file_name: &str,
) -> Result<S, FtpFileStoreStartError>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    let data_stream =
        open_data_stream::<CP, S, E>(control, conn_provider, connect_timeout).await?;
    control.start_store(file_name).await?;
    Ok(data_stream)
}

async fn start_retrieve<CP, S, E>(
    control: &mut FtpControlChannel<S>,
    conn_provider: &mut CP,
    connect_timeout: Duration,
    path: &str,
) -> Result<S, FtpFileRetrieveStartError>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    let data_stream =
        open_data_stream::<CP, S, E>(control, conn_provider, connect_timeout).await?;
    control.start_retrieve(path).await?;
    Ok(data_stream)
}

impl<CP, S, E> FtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    /// Start uploading to `remote_dir`, the remote file is named after the base name of `local_file`.
    ///
    /// The local file is not read here, send its content by [`Self::write_file_bytes`]
    /// and then call [`Self::finish`].
    pub async fn upload_file(
        &mut self,
        local_file: &Path,
        remote_dir: &str,
    ) -> Result<(), FtpError> {
        let r = self.start_upload(local_file, remote_dir).await;
        self.settle(r).await
    }

    async fn start_upload(&mut self, local_file: &Path, remote_dir: &str) -> Result<(), FtpFault> {
        if self.transfer.is_some() {
            return Err(FtpError::TransferInProgress.into());
        }
        let control = logged_in_control(&mut self.control, self.state)?;
        check_remote_path(remote_dir)?;
        let Some(file_name) = local_file.file_name().and_then(|s| s.to_str()) else {
            return Err(FtpError::InvalidArgument(format!(
                "no valid file name in local path {}",
                local_file.display()
            ))
            .into());
        };
        check_remote_path(file_name)?;

        let not_found = || FtpError::RemoteDirectoryNotFound(remote_dir.to_string());
        let changed = control
            .change_working_directory(remote_dir)
            .await
            .map_err(|e| FtpFault::from_command_error(e, |_| not_found()))?;
        if !changed {
            return Err(not_found().into());
        }

        control
            .request_binary_type()
            .await
            .map_err(FtpFault::binary_type_rejected)?;

        let data_stream = start_store::<CP, S, E>(
            control,
            &mut self.conn_provider,
            self.config.transfer.data_connect_timeout,
            file_name,
        )
        .await
        .map_err(|e| {
            let fatal = e.is_transport_error();
            FtpFault::new(FtpError::from_store_start_error(e), fatal)
        })?;

        let path = format!("{}/{file_name}", remote_dir.trim_end_matches('/'));
        log_msg!("upload of {path} to ftp server {} started", self.server);
        self.transfer = Some(FtpDataTransfer::Store {
            stream: data_stream,
            path,
        });
        Ok(())
    }

    /// Send `len` bytes of `buf`, starting at `offset`, to the open upload.
    pub async fn write_file_bytes(
        &mut self,
        buf: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<(), FtpError> {
        let Some(FtpDataTransfer::Store { stream, .. }) = self.transfer.as_mut() else {
            return Err(FtpError::NoTransferInProgress("upload"));
        };
        let Some(data) = offset
            .checked_add(len)
            .and_then(|end| buf.get(offset..end))
        else {
            return Err(FtpError::InvalidArgument(format!(
                "range {offset}+{len} is out of the buffer of size {}",
                buf.len()
            )));
        };

        let r = stream.write_all(data).await;
        if let Err(e) = r {
            let fault = FtpFault::fatal(FtpError::TransportError(format!(
                "failed to write file data: {e}"
            )));
            return self.settle(Err(fault)).await;
        }
        Ok(())
    }

    /// Start downloading `remote_path`.
    ///
    /// Read the content by [`Self::input_stream`] or [`Self::read_file_bytes`]
    /// and then call [`Self::finish`].
    pub async fn download_file(&mut self, remote_path: &str) -> Result<(), FtpError> {
        let r = self.start_download(remote_path).await;
        self.settle(r).await
    }

    async fn start_download(&mut self, remote_path: &str) -> Result<(), FtpFault> {
        if self.transfer.is_some() {
            return Err(FtpError::TransferInProgress.into());
        }
        let control = logged_in_control(&mut self.control, self.state)?;
        check_remote_path(remote_path)?;

        control
            .request_binary_type()
            .await
            .map_err(FtpFault::binary_type_rejected)?;

        let data_stream = start_retrieve::<CP, S, E>(
            control,
            &mut self.conn_provider,
            self.config.transfer.data_connect_timeout,
            remote_path,
        )
        .await
        .map_err(|e| {
            let fatal = e.is_transport_error();
            FtpFault::new(FtpError::from_retrieve_start_error(remote_path, e), fatal)
        })?;

        log_msg!(
            "download of {remote_path} from ftp server {} started",
            self.server
        );
        self.transfer = Some(FtpDataTransfer::Retrieve {
            stream: data_stream,
            path: remote_path.to_string(),
        });
        Ok(())
    }

    /// The data stream of the open download, read it until EOF.
    pub fn input_stream(&mut self) -> Result<&mut S, FtpError> {
        match self.transfer.as_mut() {
            Some(FtpDataTransfer::Retrieve { stream, .. }) => Ok(stream),
            _ => Err(FtpError::NoTransferInProgress("download")),
        }
    }

    /// Read from the open download, 0 means all the file content has been received.
    pub async fn read_file_bytes(&mut self, buf: &mut [u8]) -> Result<usize, FtpError> {
        let stream = self.input_stream()?;
        let r = stream.read(buf).await;
        match r {
            Ok(n) => Ok(n),
            Err(e) => {
                let fault = FtpFault::fatal(FtpError::TransportError(format!(
                    "failed to read file data: {e}"
                )));
                self.settle(Err(fault)).await
            }
        }
    }

    /// Complete the open upload or download.
    ///
    /// The data connection is closed and the end reply from the server is consumed.
    pub async fn finish(&mut self) -> Result<(), FtpError> {
        let r = self.finish_transfer().await;
        self.settle(r).await
    }

    async fn finish_transfer(&mut self) -> Result<(), FtpFault> {
        let Some(transfer) = self.transfer.take() else {
            return Err(FtpError::NoTransferInProgress("file").into());
        };
        let control = logged_in_control(&mut self.control, self.state)?;
        let end_wait = self.config.transfer.end_wait_timeout;

        match transfer {
            FtpDataTransfer::Store {
                stream: mut data_stream,
                path,
            } => {
                if let Err(e) = data_stream.shutdown().await {
                    return Err(FtpFault::fatal(FtpError::from_store_end_error(
                        FtpFileStoreError::DataCloseFailed(e),
                    )));
                }
                drop(data_stream);

                let end_reply = control.wait_transfer_end(FtpCommand::Stor);
                let e = match tokio::time::timeout(end_wait, end_reply).await {
                    Ok(Ok(_)) => {
                        log_msg!("upload of {path} to ftp server {} finished", self.server);
                        return Ok(());
                    }
                    Ok(Err(e)) => FtpFileStoreError::from(e),
                    Err(_) => FtpFileStoreError::TimeoutToWaitEndReply,
                };
                let fatal = !matches!(e, FtpFileStoreError::ServerReportedError(_));
                Err(FtpFault::new(FtpError::from_store_end_error(e), fatal))
            }
            FtpDataTransfer::Retrieve {
                stream: data_stream,
                path,
            } => {
                drop(data_stream);

                let end_reply = control.wait_transfer_end(FtpCommand::Retr);
                let e = match tokio::time::timeout(end_wait, end_reply).await {
                    Ok(Ok(_)) => {
                        log_msg!(
                            "download of {path} from ftp server {} finished",
                            self.server
                        );
                        return Ok(());
                    }
                    Ok(Err(e)) => FtpFileRetrieveError::from(e),
                    Err(_) => FtpFileRetrieveError::TimeoutToWaitEndReply,
                };
                let fatal = !matches!(e, FtpFileRetrieveError::ServerReportedError(_));
                Err(FtpFault::new(FtpError::from_retrieve_end_error(e), fatal))
            }
        }
    }
}
