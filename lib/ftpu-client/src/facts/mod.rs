/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use crate::error::FtpFileFactsParseError;

mod entry_type;
pub use entry_type::FtpFileEntryType;

/// Facts about a single remote entry, as returned in a MLST reply.
#[derive(Debug)]
pub struct FtpFileFacts {
    entry_path: String,
    entry_type: FtpFileEntryType,
    size: Option<u64>,
}

impl FtpFileFacts {
    fn new(path: &str) -> Self {
        FtpFileFacts {
            entry_path: path.to_string(),
            entry_type: FtpFileEntryType::Unknown,
            size: None,
        }
    }

    #[inline]
    pub fn entry_path(&self) -> &str {
        self.entry_path.as_str()
    }

    #[inline]
    pub fn entry_type(&self) -> &FtpFileEntryType {
        &self.entry_type
    }

    #[inline]
    pub fn maybe_file(&self) -> bool {
        self.entry_type.maybe_file()
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub(crate) fn parse_line(line: &str) -> Result<Self, FtpFileFactsParseError> {
        let Some((facts, path)) = line.trim_start().split_once(' ') else {
            return Err(FtpFileFactsParseError::NoSpaceDelimiter);
        };

        let mut ff = FtpFileFacts::new(path);
        for fact in facts.split(';') {
            if fact.is_empty() {
                continue;
            }

            let Some((key, value)) = fact.split_once('=') else {
                return Err(FtpFileFactsParseError::NoDelimiterInFact(fact.to_string()));
            };
            ff.set_fact(key, value)?;
        }
        Ok(ff)
    }

    fn set_fact(&mut self, key: &str, value: &str) -> Result<(), FtpFileFactsParseError> {
        if key.eq_ignore_ascii_case("type") {
            self.entry_type = FtpFileEntryType::parse(value);
        } else if key.eq_ignore_ascii_case("size") {
            let size = u64::from_str(value).map_err(|_| FtpFileFactsParseError::InvalidSize)?;
            self.size = Some(size);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line() {
        let ff = FtpFileFacts::parse_line("type=pdir;sizd=4096;modify=20210525083610;UNIX.mode=0755;UNIX.uid=0;UNIX.gid=0;unique=804g2; /").unwrap();
        assert_eq!(ff.entry_type, FtpFileEntryType::ParentDir);
        assert!(ff.size.is_none());
        assert!(!ff.maybe_file());

        let ff = FtpFileFacts::parse_line(" Type=file;Size=1024; /upload/report.csv").unwrap();
        assert_eq!(ff.entry_type(), &FtpFileEntryType::File);
        assert_eq!(ff.size(), Some(1024));
        assert_eq!(ff.entry_path(), "/upload/report.csv");
    }

    #[test]
    fn parse_bad_line() {
        assert!(matches!(
            FtpFileFacts::parse_line("type=file;size=10;"),
            Err(FtpFileFactsParseError::NoSpaceDelimiter)
        ));
        assert!(matches!(
            FtpFileFacts::parse_line("type=file;size; a.bin"),
            Err(FtpFileFactsParseError::NoDelimiterInFact(_))
        ));
        assert!(matches!(
            FtpFileFacts::parse_line("type=file;size=-1; a.bin"),
            Err(FtpFileFactsParseError::InvalidSize)
        ));
    }
}
