/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpControlConfig {
    pub(crate) max_line_len: usize,
    pub(crate) max_multi_lines: usize,
    pub(crate) command_timeout: Duration,
}

impl Default for FtpControlConfig {
    fn default() -> Self {
        FtpControlConfig {
            max_line_len: 2048,
            max_multi_lines: 128,
            command_timeout: Duration::from_secs(10),
        }
    }
}

impl FtpControlConfig {
    pub fn set_command_timeout(&mut self, timeout: Duration) {
        self.command_timeout = timeout;
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpTransferConfig {
    pub(crate) data_connect_timeout: Duration,
    pub(crate) end_wait_timeout: Duration,
}

impl Default for FtpTransferConfig {
    fn default() -> Self {
        FtpTransferConfig {
            data_connect_timeout: Duration::from_secs(30),
            end_wait_timeout: Duration::from_secs(2),
        }
    }
}

impl FtpTransferConfig {
    pub fn set_data_connect_timeout(&mut self, timeout: Duration) {
        self.data_connect_timeout = timeout;
    }

    pub fn set_end_wait_timeout(&mut self, timeout: Duration) {
        self.end_wait_timeout = timeout;
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpClientConfig {
    pub(crate) control: FtpControlConfig,
    pub(crate) transfer: FtpTransferConfig,
    pub(crate) connect_timeout: Duration,
    pub(crate) greeting_timeout: Duration,
}

impl Default for FtpClientConfig {
    fn default() -> Self {
        FtpClientConfig {
            control: FtpControlConfig::default(),
            transfer: FtpTransferConfig::default(),
            connect_timeout: Duration::from_secs(30),
            greeting_timeout: Duration::from_secs(10),
        }
    }
}

impl FtpClientConfig {
    #[inline]
    pub fn control_mut(&mut self) -> &mut FtpControlConfig {
        &mut self.control
    }

    #[inline]
    pub fn transfer_mut(&mut self) -> &mut FtpTransferConfig {
        &mut self.transfer
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    pub fn set_greeting_timeout(&mut self, timeout: Duration) {
        self.greeting_timeout = timeout;
    }
}
