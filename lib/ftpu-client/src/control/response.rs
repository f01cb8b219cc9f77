/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncWrite};

use super::{FtpCommand, FtpControlChannel};
use crate::error::FtpReplyError;
use crate::io::LimitedBufReadExt;

#[derive(Debug)]
pub(super) enum FtpReply {
    SingleLine(u16, String),
    MultiLine(u16, Vec<String>),
}

fn parse_reply_code(line: &[u8]) -> Result<u16, FtpReplyError> {
    let digits = &line[0..3];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(FtpReplyError::MalformedLine);
    }
    let code = digits
        .iter()
        .fold(0u16, |acc, c| acc * 10 + (c - b'0') as u16);
    if !(100..600).contains(&code) {
        return Err(FtpReplyError::CodeOutOfRange(code));
    }
    Ok(code)
}

fn reply_text(text: &[u8]) -> Result<String, FtpReplyError> {
    let text = std::str::from_utf8(text).map_err(|_| FtpReplyError::NotUtf8)?;
    Ok(text.trim_end().to_string())
}

impl FtpReply {
    pub(super) fn parse_single_line(line: &[u8]) -> Result<Self, FtpReplyError> {
        let code = parse_reply_code(line)?;
        Ok(FtpReply::SingleLine(code, reply_text(&line[4..])?))
    }

    pub(super) fn code(&self) -> u16 {
        match self {
            FtpReply::SingleLine(code, _) | FtpReply::MultiLine(code, _) => *code,
        }
    }

    pub(super) fn line_trimmed(&self) -> Option<&str> {
        match self {
            FtpReply::SingleLine(_, line) => Some(line.trim()),
            FtpReply::MultiLine(_, _) => None,
        }
    }

    pub(super) fn lines(&self) -> Option<&[String]> {
        match self {
            FtpReply::SingleLine(_, _) => None,
            FtpReply::MultiLine(_, lines) => Some(lines),
        }
    }

    /// Get the data address from `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
    pub(super) fn parse_pasv_227_reply(&self) -> Option<SocketAddr> {
        let FtpReply::SingleLine(_, line) = self else {
            return None;
        };

        let p_start = memchr::memchr(b'(', line.as_bytes())?;
        let p_end = memchr::memchr(b')', &line.as_bytes()[p_start..])? + p_start;

        let mut v = [0u8; 6];
        let mut parts = line[p_start + 1..p_end].split(',');
        for b in v.iter_mut() {
            *b = u8::from_str(parts.next()?.trim()).ok()?;
        }
        if parts.next().is_some() {
            return None;
        }

        let ip = IpAddr::V4(Ipv4Addr::new(v[0], v[1], v[2], v[3]));
        let port = u16::from_be_bytes([v[4], v[5]]);
        Some(SocketAddr::new(ip, port))
    }
}

/// Collects the lines of a `xyz-` reply until the `xyz ` line.
pub(super) struct MultiLineReply {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
}

impl MultiLineReply {
    pub(super) fn start(first_line: &[u8], max_lines: usize) -> Result<Self, FtpReplyError> {
        let code = parse_reply_code(first_line)?;
        let mut lines = Vec::with_capacity(max_lines.min(16));
        lines.push(reply_text(&first_line[4..])?);
        Ok(MultiLineReply {
            code,
            end_prefix: [first_line[0], first_line[1], first_line[2], b' '],
            lines,
        })
    }

    /// Returns true if this is the last line.
    pub(super) fn feed_line(&mut self, line: &[u8]) -> Result<bool, FtpReplyError> {
        if line.starts_with(&self.end_prefix) {
            self.lines.push(reply_text(&line[4..])?);
            Ok(true)
        } else {
            // leading space is part of the text, e.g. MLST facts
            self.lines.push(reply_text(line)?);
            Ok(false)
        }
    }

    pub(super) fn finish(self) -> FtpReply {
        FtpReply::MultiLine(self.code, self.lines)
    }
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Read one `\n` terminated line which is at least `min_len` bytes long.
    async fn read_line(&mut self, buf: &mut Vec<u8>, min_len: usize) -> Result<(), FtpReplyError> {
        buf.clear();

        let max_len = self.config.max_line_len;
        let (found, len) = self
            .stream
            .limited_read_until(b'\n', max_len, buf)
            .await
            .map_err(FtpReplyError::ReadFailed)?;

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_rsp(buf);

        if !found {
            return if len >= max_len {
                Err(FtpReplyError::LineTooLong(max_len))
            } else {
                Err(FtpReplyError::ConnectionClosed)
            };
        }
        if len < min_len {
            return Err(FtpReplyError::MalformedLine);
        }
        Ok(())
    }

    pub(super) async fn read_reply(&mut self) -> Result<FtpReply, FtpReplyError> {
        let mut buf = Vec::<u8>::with_capacity(self.config.max_line_len);
        // at least "xyz\n"
        self.read_line(&mut buf, 5).await?;

        match buf[3] {
            b' ' => FtpReply::parse_single_line(&buf),
            b'-' => {
                let max_lines = self.config.max_multi_lines;
                let mut reply = MultiLineReply::start(&buf, max_lines)?;
                for _ in 0..max_lines {
                    self.read_line(&mut buf, 1).await?;
                    if reply.feed_line(&buf)? {
                        return Ok(reply.finish());
                    }
                }
                Err(FtpReplyError::TooManyLines(max_lines))
            }
            _ => Err(FtpReplyError::MalformedLine),
        }
    }

    pub(super) async fn timed_read_reply(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<FtpReply, FtpReplyError> {
        match tokio::time::timeout(self.config.command_timeout, self.read_reply()).await {
            Ok(r) => r,
            Err(_) => Err(FtpReplyError::TimedOut(cmd)),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;
    use crate::FtpControlConfig;

    #[test]
    fn single_line() {
        let rsp = FtpReply::parse_single_line(b"220 FTP server ready.\r\n").unwrap();
        assert_eq!(rsp.code(), 220);
        assert_eq!(rsp.line_trimmed(), Some("FTP server ready."));
        assert!(rsp.lines().is_none());
    }

    #[test]
    fn invalid_code() {
        assert!(matches!(
            FtpReply::parse_single_line(b"abc hello\r\n"),
            Err(FtpReplyError::MalformedLine)
        ));
        assert!(matches!(
            FtpReply::parse_single_line(b"099 hello\r\n"),
            Err(FtpReplyError::CodeOutOfRange(99))
        ));
        assert!(matches!(
            FtpReply::parse_single_line(b" 20 hello\r\n"),
            Err(FtpReplyError::MalformedLine)
        ));
    }

    #[test]
    fn multi_line() {
        let mut reply = MultiLineReply::start(b"250-Listing /pub/a.bin\r\n", 8).unwrap();
        assert!(!reply.feed_line(b" type=file;size=10; /pub/a.bin\r\n").unwrap());
        assert!(reply.feed_line(b"250 End\r\n").unwrap());
        let rsp = reply.finish();
        assert_eq!(rsp.code(), 250);
        let lines = rsp.lines().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], " type=file;size=10; /pub/a.bin");
        assert_eq!(lines[2], "End");
    }

    #[test]
    fn pasv_reply() {
        let rsp =
            FtpReply::parse_single_line(b"227 Entering Passive Mode (192,168,1,2,195,80).\r\n")
                .unwrap();
        let addr = rsp.parse_pasv_227_reply().unwrap();
        assert_eq!(addr, SocketAddr::from_str("192.168.1.2:50000").unwrap());

        let rsp =
            FtpReply::parse_single_line(b"227 Entering Passive Mode (1,2,3,4,5).\r\n").unwrap();
        assert!(rsp.parse_pasv_227_reply().is_none());

        let rsp =
            FtpReply::parse_single_line(b"227 Entering Passive Mode (1,2,3,4,5,6,7).\r\n").unwrap();
        assert!(rsp.parse_pasv_227_reply().is_none());

        let rsp = FtpReply::parse_single_line(b"227 Entering Passive Mode\r\n").unwrap();
        assert!(rsp.parse_pasv_227_reply().is_none());
    }

    #[tokio::test]
    async fn closed_in_the_middle_of_line() {
        let mock = Builder::new().read(b"220 Serv").build();
        let mut channel = FtpControlChannel::new(mock, FtpControlConfig::default());
        assert!(matches!(
            channel.read_reply().await,
            Err(FtpReplyError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn line_too_long() {
        let mock = Builder::new()
            .read(b"220 a very long greeting line\r\n")
            .build();
        let config = FtpControlConfig {
            max_line_len: 16,
            ..Default::default()
        };
        let mut channel = FtpControlChannel::new(mock, config);
        assert!(matches!(
            channel.read_reply().await,
            Err(FtpReplyError::LineTooLong(16))
        ));
    }
}
