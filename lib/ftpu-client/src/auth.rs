/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use thiserror::Error;

const USERNAME_MAX_LENGTH: usize = u8::MAX as usize;
const PASSWORD_MAX_LENGTH: usize = u8::MAX as usize;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum FtpCredentialError {
    #[error("empty {0} is not allowed")]
    Empty(&'static str),
    #[error("too long string for a {0}")]
    TooLong(&'static str),
    #[error("line break character is not allowed in {0}")]
    LineBreak(&'static str),
}

fn check_credential(s: &str, max_len: usize, name: &'static str) -> Result<(), FtpCredentialError> {
    if s.len() > max_len {
        return Err(FtpCredentialError::TooLong(name));
    }
    // the value is sent as a single command line on the control channel
    if s.contains(['\r', '\n']) {
        return Err(FtpCredentialError::LineBreak(name));
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Username {
    inner: String,
}

impl Username {
    pub fn anonymous() -> Self {
        Username {
            inner: "anonymous".to_string(),
        }
    }

    pub fn from_original(s: &str) -> Result<Self, FtpCredentialError> {
        if s.is_empty() {
            return Err(FtpCredentialError::Empty("username"));
        }
        check_credential(s, USERNAME_MAX_LENGTH, "username")?;
        Ok(Username {
            inner: s.to_string(),
        })
    }

    #[inline]
    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Password {
    inner: String,
}

impl Password {
    pub fn anonymous() -> Self {
        Password {
            inner: "anonymous@".to_string(),
        }
    }

    pub fn from_original(s: &str) -> Result<Self, FtpCredentialError> {
        check_credential(s, PASSWORD_MAX_LENGTH, "password")?;
        Ok(Password {
            inner: s.to_string(),
        })
    }

    #[inline]
    pub fn as_original(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(****)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username() {
        let name = Username::from_original("ftpuser").unwrap();
        assert_eq!(name.as_original(), "ftpuser");
        assert_eq!(Username::anonymous().as_original(), "anonymous");

        assert_eq!(
            Username::from_original(""),
            Err(FtpCredentialError::Empty("username"))
        );
        assert_eq!(
            Username::from_original("user\r\nDELE x"),
            Err(FtpCredentialError::LineBreak("username"))
        );
        let long = "u".repeat(256);
        assert_eq!(
            Username::from_original(&long),
            Err(FtpCredentialError::TooLong("username"))
        );
    }

    #[test]
    fn password() {
        let pass = Password::from_original("s3cret").unwrap();
        assert_eq!(pass.as_original(), "s3cret");
        assert_eq!(format!("{pass:?}"), "Password(****)");
        assert!(Password::from_original("").is_ok());
        assert!(Password::from_original("a\nb").is_err());
    }
}
