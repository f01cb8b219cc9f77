/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes every log record to stderr in the calling thread.
pub(crate) struct SyncLogger {
    level: LevelFilter,
}

impl SyncLogger {
    pub(crate) fn new(verbose_level: u8) -> Self {
        let level = match verbose_level {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        SyncLogger { level }
    }

    pub(crate) fn into_global_logger(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for SyncLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "{:<5} {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn verbose_level() {
        assert_eq!(SyncLogger::new(0).level, LevelFilter::Warn);
        assert_eq!(SyncLogger::new(1).level, LevelFilter::Info);
        assert_eq!(SyncLogger::new(2).level, LevelFilter::Debug);
        assert_eq!(SyncLogger::new(5).level, LevelFilter::Trace);

        let logger = SyncLogger::new(1);
        let metadata = Metadata::builder().level(Level::Debug).target("ftpu").build();
        assert!(!logger.enabled(&metadata));
        let metadata = Metadata::builder().level(Level::Warn).target("ftpu").build();
        assert!(logger.enabled(&metadata));
    }
}
