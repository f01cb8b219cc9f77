/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;
use yaml_rust::YamlLoader;

use ftpu_client::{
    FtpClient, FtpClientConfig, Password, TcpConnectionProvider, UpstreamAddr, Username,
};

mod logger;

mod cmd_get;
mod cmd_put;
mod cmd_size;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_SOURCE_IP: &str = "source-ip";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

const FTP_DEFAULT_PORT: u16 = 21;

fn build_cli_args() -> Command {
    Command::new("ftpu")
        .about("Upload and download files over FTP")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address, port 21 is used if not set")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .value_parser(value_parser!(UpstreamAddr))
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("FTP username, anonymous login will be used if not set")
                .num_args(1)
                .value_name("USERNAME")
                .value_parser(Username::from_original)
                .short('u')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("FTP password")
                .num_args(1)
                .value_name("PASSWORD")
                .value_parser(Password::from_original)
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SOURCE_IP)
                .help("source ip address")
                .num_args(1)
                .value_name("IP ADDRESS")
                .value_parser(value_parser!(IpAddr))
                .long("source")
                .short('s')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("yaml config file for the ftp client")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .long("config")
                .short('c')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_put::command())
        .subcommand(cmd_get::command())
        .subcommand(cmd_size::command())
}

fn load_config(path: &Path) -> anyhow::Result<FtpClientConfig> {
    let content = std::fs::read_to_string(path)
        .context(format!("failed to read config file {}", path.display()))?;
    let docs = YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
    match docs.first() {
        Some(doc) => FtpClientConfig::parse_yaml(doc)
            .context(format!("invalid ftp client config in file {}", path.display())),
        None => Ok(FtpClientConfig::default()),
    }
}

async fn run_subcommand(
    client: &mut FtpClient<TcpConnectionProvider, tokio::net::TcpStream, io::Error>,
    subcommand: &str,
    args: &ArgMatches,
) -> anyhow::Result<()> {
    match subcommand {
        cmd_put::COMMAND => cmd_put::run(client, args).await,
        cmd_get::COMMAND => cmd_get::run(client, args).await,
        cmd_size::COMMAND => cmd_size::run(client, args).await,
        cmd => Err(anyhow!("invalid subcommand {cmd}")),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let logger = logger::SyncLogger::new(verbose_level);
    logger
        .into_global_logger()
        .map_err(|e| anyhow!("failed to setup logger: {e}"))?;

    let Some(server) = args.get_one::<UpstreamAddr>(GLOBAL_ARG_SERVER) else {
        return Err(anyhow!("no ftp server address set"));
    };
    let mut server = server.clone();
    if server.port() == 0 {
        server.set_port(FTP_DEFAULT_PORT);
    }

    let username = args
        .get_one::<Username>(GLOBAL_ARG_USERNAME)
        .cloned()
        .unwrap_or_else(Username::anonymous);
    let password = args
        .get_one::<Password>(GLOBAL_ARG_PASSWORD)
        .cloned()
        .unwrap_or_else(Password::anonymous);

    let mut conn_provider = TcpConnectionProvider::default();
    if let Some(ip) = args.get_one::<IpAddr>(GLOBAL_ARG_SOURCE_IP) {
        conn_provider.set_bind_ip(*ip);
    }

    let config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => load_config(path)?,
        None => FtpClientConfig::default(),
    };

    let Some((subcommand, args)) = args.subcommand() else {
        return Err(anyhow!("no subcommand found"));
    };

    let mut client = FtpClient::new(
        server,
        username,
        password,
        conn_provider,
        Arc::new(config),
    );
    client.connect().await?;

    let ret = run_subcommand(&mut client, subcommand, args).await;
    let quit = client.disconnect().await;
    ret?;
    quit?;
    Ok(())
}
