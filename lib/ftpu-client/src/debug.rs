/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::Level;

pub const FTP_DEBUG_LOG_LEVEL: Level = Level::Debug;
pub const FTP_DEBUG_LOG_TARGET: &str = "ftpu";

#[macro_export]
macro_rules! log_msg {
    ($s:literal) => (
        log::log!(target: $crate::FTP_DEBUG_LOG_TARGET, $crate::FTP_DEBUG_LOG_LEVEL, $s)
    );
    ($s:literal, $($arg:tt)+) => (
        log::log!(target: $crate::FTP_DEBUG_LOG_TARGET, $crate::FTP_DEBUG_LOG_LEVEL, $s, $($arg)+)
    );
}

#[cfg(feature = "log-raw-io")]
pub(crate) fn log_cmd(cmd: crate::FtpCommand, line: &str) {
    let line = match cmd {
        crate::FtpCommand::Pass => "PASS ****",
        _ => line,
    };
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "> {}",
        line
    );
}

#[cfg(feature = "log-raw-io")]
pub(crate) fn log_rsp(rsp: &[u8]) {
    log::log!(
        target: FTP_DEBUG_LOG_TARGET,
        FTP_DEBUG_LOG_LEVEL,
        "< {}",
        String::from_utf8_lossy(rsp).trim_end()
    );
}
