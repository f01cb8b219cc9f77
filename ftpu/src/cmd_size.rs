/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};
use tokio::io::{AsyncRead, AsyncWrite};

use ftpu_client::{FtpClient, FtpConnectionProvider};

pub(super) const COMMAND: &str = "size";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Show the size of a remote file")
        .arg(
            Arg::new(COMMAND_ARG_PATH)
                .value_name("PATH")
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
    let Some(path) = args.get_one::<String>(COMMAND_ARG_PATH) else {
        return Err(anyhow!("no remote path set"));
    };

    let size = client.file_size(path).await?;
    println!("{size}");
    Ok(())
}
