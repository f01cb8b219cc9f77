/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::control::{FtpAuthStatus, FtpControlChannel};
use crate::error::{FtpCommandError, FtpError};
use crate::{FtpClientConfig, FtpConnectionProvider, Password, UpstreamAddr, Username, log_msg};

mod transfer;
use transfer::FtpDataTransfer;

mod stat;


#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FtpSessionState {
    Disconnected,
    Connected,
    LoggedIn,
}

/// An error from an inner operation, and whether the session is still usable after it.
struct FtpFault {
    error: FtpError,
    fatal: bool,
}

impl FtpFault {
    fn new(error: FtpError, fatal: bool) -> Self {
        FtpFault { error, fatal }
    }

    fn fatal(error: FtpError) -> Self {
        FtpFault { error, fatal: true }
    }

    fn from_command_error<F>(e: FtpCommandError, f: F) -> Self
    where
        F: FnOnce(&FtpCommandError) -> FtpError,
    {
        let fatal = e.is_transport_error();
        FtpFault::new(FtpError::from_command_error(e, f), fatal)
    }

    fn binary_type_rejected(e: FtpCommandError) -> Self {
        FtpFault::from_command_error(e, |e| FtpError::UnsupportedTransferMode(e.to_string()))
    }
}

impl From<FtpError> for FtpFault {
    fn from(error: FtpError) -> Self {
        FtpFault {
            error,
            fatal: false,
        }
    }
}

/// A single FTP session to one server.
///
/// The session owns its control connection and at most one data connection.
/// Every operation runs its control exchange to completion before it returns.
/// Errors which leave the control connection out of sync, such as i/o errors
/// or reply timeouts, close the session, and a new `connect` is needed.
pub struct FtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    config: Arc<FtpClientConfig>,
    server: UpstreamAddr,
    username: Username,
    password: Password,
    conn_provider: CP,
    control: Option<FtpControlChannel<S>>,
    transfer: Option<FtpDataTransfer<S>>,
    state: FtpSessionState,
    _phantom: PhantomData<E>,
}

impl<CP, S, E> FtpClient<CP, S, E>
where
    CP: FtpConnectionProvider<S, E>,
    S: AsyncRead + AsyncWrite + Unpin,
    E: std::error::Error,
{
    pub fn new(
        server: UpstreamAddr,
        username: Username,
        password: Password,
        conn_provider: CP,
        config: Arc<FtpClientConfig>,
    ) -> Self {
        FtpClient {
            config,
            server,
            username,
            password,
            conn_provider,
            control: None,
            transfer: None,
            state: FtpSessionState::Disconnected,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn server(&self) -> &UpstreamAddr {
        &self.server
    }

    #[inline]
    pub fn state(&self) -> FtpSessionState {
        self.state
    }

    #[inline]
    pub fn is_logged_in(&self) -> bool {
        self.state == FtpSessionState::LoggedIn
    }

    /// Open the control connection and login with the stored credentials.
    ///
    /// Does nothing if the session is already logged in.
    pub async fn connect(&mut self) -> Result<(), FtpError> {
        match self.state {
            FtpSessionState::LoggedIn => return Ok(()),
            // a previous connect was dropped before login completed
            FtpSessionState::Connected => self.reset().await,
            FtpSessionState::Disconnected => {}
        }

        let control = self.new_control_channel().await?;
        log_msg!("connected to ftp server {}", self.server);
        let control = self.control.insert(control);
        self.state = FtpSessionState::Connected;

        if let Err(e) = login(control, &self.username, &self.password).await {
            log_msg!(
                "login to ftp server {} as {} failed: {e}",
                self.server,
                self.username.as_original()
            );
            self.reset().await;
            return Err(e);
        }

        self.state = FtpSessionState::LoggedIn;
        log_msg!(
            "logged in to ftp server {} as {}",
            self.server,
            self.username.as_original()
        );
        Ok(())
    }

    async fn new_control_channel(&mut self) -> Result<FtpControlChannel<S>, FtpError> {
        let stream = match tokio::time::timeout(
            self.config.connect_timeout,
            self.conn_provider.new_control_connection(&self.server),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(FtpError::TransportError(format!(
                    "failed to connect to {}: {e}",
                    self.server
                )));
            }
            Err(_) => {
                return Err(FtpError::TransportError(format!(
                    "timed out to connect to {}",
                    self.server
                )));
            }
        };

        let mut control = FtpControlChannel::new(stream, self.config.control.clone());
        match tokio::time::timeout(self.config.greeting_timeout, control.wait_greetings()).await {
            Ok(Ok(_)) => Ok(control),
            Ok(Err(e)) => Err(FtpError::from_greeting_error(e)),
            Err(_) => Err(FtpError::TransportError(
                "timed out to receive greetings".to_string(),
            )),
        }
    }

    /// Logout and close the control connection.
    ///
    /// The session is disconnected after this returns, even on error.
    /// Calling it on a disconnected session does nothing.
    pub async fn disconnect(&mut self) -> Result<(), FtpError> {
        self.state = FtpSessionState::Disconnected;
        let Some(mut control) = self.control.take() else {
            return Ok(());
        };

        let mut in_sync = true;
        if let Some(transfer) = self.transfer.take() {
            log_msg!(
                "abort {} of {} on disconnect",
                transfer.action(),
                transfer.path()
            );
            in_sync = transfer
                .abort(&mut control, self.config.transfer.end_wait_timeout)
                .await;
        }

        let quit_result = if in_sync {
            control.send_quit().await
        } else {
            // a late end reply would be taken as the QUIT reply
            log_msg!("no end reply of the aborted transfer, close without QUIT");
            Ok(())
        };
        let close_result = control.close().await;
        log_msg!("disconnected from ftp server {}", self.server);

        quit_result.map_err(|e| {
            FtpError::from_command_error(e, |e| FtpError::LogoutRejected(e.to_string()))
        })?;
        match close_result {
            Ok(_) => Ok(()),
            // the server may close first after replying to QUIT
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(FtpError::TransportError(format!(
                "failed to close control connection: {e}"
            ))),
        }
    }

    /// Drop all connections without talking to the server.
    async fn reset(&mut self) {
        self.transfer = None;
        self.state = FtpSessionState::Disconnected;
        if let Some(control) = self.control.take() {
            let _ = control.close().await;
        }
    }

    async fn settle<T>(&mut self, r: Result<T, FtpFault>) -> Result<T, FtpError> {
        match r {
            Ok(v) => Ok(v),
            Err(fault) => {
                if fault.fatal {
                    log_msg!(
                        "close session to ftp server {} on error: {}",
                        self.server,
                        fault.error
                    );
                    self.reset().await;
                }
                Err(fault.error)
            }
        }
    }
}

async fn login<S>(
    control: &mut FtpControlChannel<S>,
    username: &Username,
    password: &Password,
) -> Result<(), FtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut status = control
        .send_username(username)
        .await
        .map_err(FtpError::from_login_error)?;
    if matches!(status, FtpAuthStatus::NeedPassword) {
        status = control
            .send_password(password)
            .await
            .map_err(FtpError::from_login_error)?;
    }

    match status {
        FtpAuthStatus::LoggedIn => Ok(()),
        FtpAuthStatus::NeedAccount => Err(FtpError::AuthenticationFailed(
            "an extra account is needed".to_string(),
        )),
        FtpAuthStatus::NotLoggedIn | FtpAuthStatus::NeedPassword => Err(
            FtpError::AuthenticationFailed("login incorrect".to_string()),
        ),
    }
}

fn logged_in_control<S>(
    control: &mut Option<FtpControlChannel<S>>,
    state: FtpSessionState,
) -> Result<&mut FtpControlChannel<S>, FtpError>
where
    S: AsyncRead + AsyncWrite,
{
    match control {
        Some(control) if state == FtpSessionState::LoggedIn => Ok(control),
        _ => Err(FtpError::NotLoggedIn),
    }
}

fn check_remote_path(path: &str) -> Result<(), FtpError> {
    if path.is_empty() {
        Err(FtpError::InvalidArgument("empty remote path".to_string()))
    } else if path.contains(['\r', '\n']) {
        Err(FtpError::InvalidArgument(format!(
            "line break found in remote path {}",
            path.escape_debug()
        )))
    } else {
        Ok(())
    }
}
