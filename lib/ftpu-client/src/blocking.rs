/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;

use crate::{
    FtpClient, FtpClientConfig, FtpConnectionProvider, FtpError, FtpSessionState, Password,
    TcpConnectionProvider, UpstreamAddr, Username,
};

/// A [`FtpClient`] driven by its own current thread runtime.
///
/// Every call blocks the calling thread until the operation completes.
/// Do not use it inside an async context.
pub struct BlockingFtpClient<CP = TcpConnectionProvider, S = TcpStream, E = io::Error>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    rt: Runtime,
    client: FtpClient<CP, S, E>,
}

impl BlockingFtpClient {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self, FtpError> {
        let server = UpstreamAddr::from_host_str_and_port(host, port)
            .map_err(|e| FtpError::InvalidArgument(format!("invalid host {host}: {e}")))?;
        let username = Username::from_original(username)
            .map_err(|e| FtpError::InvalidArgument(format!("invalid username: {e}")))?;
        let password = Password::from_original(password)
            .map_err(|e| FtpError::InvalidArgument(format!("invalid password: {e}")))?;

        let client = FtpClient::new(
            server,
            username,
            password,
            TcpConnectionProvider::default(),
            Arc::new(FtpClientConfig::default()),
        );
        BlockingFtpClient::with_client(client)
    }
}

impl<CP, S, E> BlockingFtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    pub fn with_client(client: FtpClient<CP, S, E>) -> Result<Self, FtpError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FtpError::TransportError(format!("failed to create runtime: {e}")))?;
        Ok(BlockingFtpClient { rt, client })
    }

    #[inline]
    pub fn state(&self) -> FtpSessionState {
        self.client.state()
    }

    pub fn connect(&mut self) -> Result<(), FtpError> {
        self.rt.block_on(self.client.connect())
    }

    pub fn upload_file(&mut self, local_file: &Path, remote_dir: &str) -> Result<(), FtpError> {
        self.rt.block_on(self.client.upload_file(local_file, remote_dir))
    }

    pub fn write_file_bytes(
        &mut self,
        buf: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<(), FtpError> {
        self.rt.block_on(self.client.write_file_bytes(buf, offset, len))
    }

    pub fn download_file(&mut self, remote_path: &str) -> Result<(), FtpError> {
        self.rt.block_on(self.client.download_file(remote_path))
    }

    pub fn read_file_bytes(&mut self, buf: &mut [u8]) -> Result<usize, FtpError> {
        self.rt.block_on(self.client.read_file_bytes(buf))
    }

    pub fn finish(&mut self) -> Result<(), FtpError> {
        self.rt.block_on(self.client.finish())
    }

    pub fn file_size(&mut self, path: &str) -> Result<u64, FtpError> {
        self.rt.block_on(self.client.file_size(path))
    }

    pub fn disconnect(&mut self) -> Result<(), FtpError> {
        self.rt.block_on(self.client.disconnect())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;
    use crate::FtpErrorKind;
    use crate::client::tests::{PASV_REPLY, logged_in, mock_client};

    #[test]
    fn invalid_arguments() {
        let e = BlockingFtpClient::new("", 21, "ftpuser", "secret").err().unwrap();
        assert_eq!(e.kind(), FtpErrorKind::InvalidArgument);
        let e = BlockingFtpClient::new("127.0.0.1", 21, "", "secret").err().unwrap();
        assert_eq!(e.kind(), FtpErrorKind::InvalidArgument);
        let e = BlockingFtpClient::new("127.0.0.1", 21, "ftpuser", "secret\r\nDELE a")
            .err()
            .unwrap();
        assert_eq!(e.kind(), FtpErrorKind::InvalidArgument);
    }

    #[test]
    fn not_connected() {
        let mut client = BlockingFtpClient::new("127.0.0.1", 21, "ftpuser", "secret").unwrap();
        assert_eq!(client.state(), FtpSessionState::Disconnected);
        let e = client.file_size("/pub/a.bin").unwrap_err();
        assert_eq!(e.kind(), FtpErrorKind::NotLoggedIn);
        let e = client.read_file_bytes(&mut [0u8; 16]).unwrap_err();
        assert_eq!(e.kind(), FtpErrorKind::NoTransferInProgress);
        client.disconnect().unwrap();
    }

    #[test]
    fn upload_file() {
        let control = logged_in()
            .write(b"CWD /upload\r\n")
            .read(b"250 Directory successfully changed.\r\n")
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"PASV\r\n")
            .read(PASV_REPLY)
            .write(b"STOR a.bin\r\n")
            .read(b"150 Ok to send data.\r\n")
            .read(b"226 Transfer complete.\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 Goodbye.\r\n")
            .build();
        let data = Builder::new().write(b"0123").write(b"4567").build();
        let mut client = BlockingFtpClient::with_client(mock_client(control, vec![data])).unwrap();

        client.connect().unwrap();
        assert_eq!(client.state(), FtpSessionState::LoggedIn);
        client.upload_file(Path::new("a.bin"), "/upload").unwrap();
        let content = b"01234567";
        for chunk in 0..2 {
            client.write_file_bytes(content, chunk * 4, 4).unwrap();
        }
        client.finish().unwrap();
        client.disconnect().unwrap();
        assert_eq!(client.state(), FtpSessionState::Disconnected);
    }
}
