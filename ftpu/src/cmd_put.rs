/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command, value_parser};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use ftpu_client::{FtpClient, FtpConnectionProvider};

pub(super) const COMMAND: &str = "put";

const COMMAND_ARG_LOCAL_FILE: &str = "local-file";
const COMMAND_ARG_REMOTE_DIR: &str = "remote-dir";

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload a local file into a remote directory")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL_FILE)
                .value_name("LOCAL FILE")
                .num_args(1)
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_DIR)
                .value_name("REMOTE DIR")
                .num_args(1)
                .required(true),
        )
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
    let Some(local_file) = args.get_one::<PathBuf>(COMMAND_ARG_LOCAL_FILE) else {
        return Err(anyhow!("no local file set"));
    };
    let Some(remote_dir) = args.get_one::<String>(COMMAND_ARG_REMOTE_DIR) else {
        return Err(anyhow!("no remote dir set"));
    };
    let Some(file_name) = local_file.file_name().and_then(|s| s.to_str()) else {
        return Err(anyhow!(
            "no valid file name found in {}",
            local_file.display()
        ));
    };

    let mut file = tokio::fs::File::open(local_file)
        .await
        .context(format!("failed to open local file {}", local_file.display()))?;

    client.upload_file(local_file, remote_dir).await?;

    let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let nr = file
            .read(&mut buf)
            .await
            .context(format!("failed to read local file {}", local_file.display()))?;
        if nr == 0 {
            break;
        }
        client.write_file_bytes(&buf, 0, nr).await?;
        total += nr as u64;
    }
    client.finish().await?;

    // the working directory has been changed to the remote dir
    let size = client.file_size(file_name).await?;
    if size != total {
        return Err(anyhow!(
            "remote file size {size} mismatch with the uploaded size {total}"
        ));
    }
    println!("{total} bytes uploaded to {remote_dir}");

    Ok(())
}
