/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command, value_parser};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use ftpu_client::{FtpClient, FtpConnectionProvider};

pub(super) const COMMAND: &str = "get";

const COMMAND_ARG_REMOTE_PATH: &str = "remote-path";
const COMMAND_ARG_LOCAL_FILE: &str = "local-file";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Download a remote file")
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_PATH)
                .value_name("REMOTE PATH")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_LOCAL_FILE)
                .help("local file to save to, the remote file name will be used if not set")
                .value_name("LOCAL FILE")
                .num_args(1)
                .value_parser(value_parser!(PathBuf)),
        )
}

fn remote_file_name(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

/// The hidden sibling file the content is saved to before it is complete.
fn partial_file_path(local_file: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(local_file.file_name().unwrap_or(OsStr::new(COMMAND)));
    name.push(".part");
    local_file.with_file_name(name)
}

async fn receive_file<CP, S, E>(
    client: &mut FtpClient<CP, S, E>,
    remote_path: &str,
    save_path: &Path,
) -> anyhow::Result<u64>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    let mut file = tokio::fs::File::create(save_path)
        .await
        .context(format!("failed to create local file {}", save_path.display()))?;

    let data_stream = client.input_stream()?;
    let total = tokio::io::copy(data_stream, &mut file)
        .await
        .context(format!("failed to download {remote_path}"))?;
    file.flush()
        .await
        .context(format!("failed to write local file {}", save_path.display()))?;
    client.finish().await?;
    Ok(total)
}

pub(super) async fn run<CP, S, E>(
    client: &mut FtpClient<CP, S, E>,
    args: &ArgMatches,
) -> anyhow::Result<()>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    let Some(remote_path) = args.get_one::<String>(COMMAND_ARG_REMOTE_PATH) else {
        return Err(anyhow!("no remote path set"));
    };
    let local_file = match args.get_one::<PathBuf>(COMMAND_ARG_LOCAL_FILE) {
        Some(path) => path.clone(),
        None => match remote_file_name(remote_path) {
            Some(name) => PathBuf::from(name),
            None => return Err(anyhow!("no file name found in remote path {remote_path}")),
        },
    };

    // an existing local file is only replaced by a complete download
    client.download_file(remote_path).await?;
    let save_path = partial_file_path(&local_file);
    let total = match receive_file(client, remote_path, &save_path).await {
        Ok(total) => total,
        Err(e) => {
            let _ = tokio::fs::remove_file(&save_path).await;
            return Err(e);
        }
    };
    tokio::fs::rename(&save_path, &local_file)
        .await
        .context(format!(
            "failed to rename {} to {}",
            save_path.display(),
            local_file.display()
        ))?;

    println!("{total} bytes saved to {}", local_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::str::FromStr;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio_test::io::{Builder, Mock};

    use ftpu_client::{FtpClientConfig, Password, UpstreamAddr, Username};

    use super::*;

    struct MockConnectionProvider {
        control: Option<Mock>,
        data: Option<Mock>,
    }

    #[async_trait]
    impl FtpConnectionProvider<Mock, io::Error> for MockConnectionProvider {
        async fn new_control_connection(&mut self, _upstream: &UpstreamAddr) -> io::Result<Mock> {
            self.control
                .take()
                .ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused))
        }

        async fn new_data_connection(&mut self, _server: &UpstreamAddr) -> io::Result<Mock> {
            self.data
                .take()
                .ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused))
        }
    }

    fn retrieve_session(retr_replies: &[&[u8]]) -> Mock {
        let mut builder = Builder::new();
        builder
            .read(b"220 Welcome\r\n")
            .write(b"USER anonymous\r\n")
            .read(b"230 Login successful.\r\n")
            .write(b"TYPE I\r\n")
            .read(b"200 Switching to Binary mode.\r\n")
            .write(b"PASV\r\n")
            .read(b"227 Entering Passive Mode (10,0,0,1,195,80).\r\n")
            .write(b"RETR /pub/a.bin\r\n");
        for reply in retr_replies {
            builder.read(reply);
        }
        builder
            .write(b"QUIT\r\n")
            .read(b"221 Goodbye.\r\n")
            .build()
    }

    fn new_client(
        control: Mock,
        data: Mock,
    ) -> FtpClient<MockConnectionProvider, Mock, io::Error> {
        FtpClient::new(
            UpstreamAddr::from_str("127.0.0.1:21").unwrap(),
            Username::anonymous(),
            Password::anonymous(),
            MockConnectionProvider {
                control: Some(control),
                data: Some(data),
            },
            Arc::new(FtpClientConfig::default()),
        )
    }

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ftpu-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn file_name() {
        assert_eq!(remote_file_name("/pub/a.bin"), Some("a.bin"));
        assert_eq!(remote_file_name("a.bin"), Some("a.bin"));
        assert_eq!(remote_file_name("/pub/"), None);
    }

    #[test]
    fn partial_file() {
        assert_eq!(
            partial_file_path(Path::new("/data/a.bin")),
            Path::new("/data/.a.bin.part")
        );
        assert_eq!(partial_file_path(Path::new("a.bin")), Path::new(".a.bin.part"));
    }

    #[tokio::test]
    async fn missing_remote_file_keeps_local_file() {
        let dir = test_dir("get-missing");
        let local_file = dir.join("a.bin");
        std::fs::write(&local_file, b"local data").unwrap();

        let control = retrieve_session(&[b"550 Failed to open file.\r\n"]);
        let mut client = new_client(control, Builder::new().build());
        client.connect().await.unwrap();

        let args = command()
            .try_get_matches_from(["get", "/pub/a.bin", local_file.to_str().unwrap()])
            .unwrap();
        assert!(run(&mut client, &args).await.is_err());
        client.disconnect().await.unwrap();

        assert_eq!(std::fs::read(&local_file).unwrap(), b"local data");
        assert!(!partial_file_path(&local_file).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn replace_local_file() {
        let dir = test_dir("get-replace");
        let local_file = dir.join("a.bin");
        std::fs::write(&local_file, b"old content").unwrap();

        let control = retrieve_session(&[
            b"150 Opening BINARY mode data connection.\r\n",
            b"226 Transfer complete.\r\n",
        ]);
        let data = Builder::new().read(b"new ").read(b"content").build();
        let mut client = new_client(control, data);
        client.connect().await.unwrap();

        let args = command()
            .try_get_matches_from(["get", "/pub/a.bin", local_file.to_str().unwrap()])
            .unwrap();
        run(&mut client, &args).await.unwrap();
        client.disconnect().await.unwrap();

        assert_eq!(std::fs::read(&local_file).unwrap(), b"new content");
        assert!(!partial_file_path(&local_file).exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
