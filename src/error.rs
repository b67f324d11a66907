// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// The config file could not be turned into a `LaunchConfig`
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("could not read config: {0}")]
    Read(#[source] io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("failed to load {}: {source}", .path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: ConfigLoadError,
    },
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("child exited unsuccessfully: {0}")]
    ChildExit(ExitStatus),
    #[error("an error occured: {0}")]
    ErrorMsg(String),
    #[error("an error occured: {0}")]
    ErrorStr(&'static str),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    pub(crate) fn config_load(path: impl Into<PathBuf>, source: ConfigLoadError) -> Self {
        Self::from_kind(ErrorKind::ConfigLoad {
            path: path.into(),
            source,
        })
    }

    /// True if the launch never got as far as reading a usable config
    pub fn is_config_load(&self) -> bool {
        matches!(self.0, ErrorKind::ConfigLoad { .. })
    }
}

impl<E> From<E> for Error
where
    E: Into<ErrorKind>,
{
    fn from(err: E) -> Self {
        Self::from_kind(err.into())
    }
}

impl From<&'static str> for Error {
    fn from(err: &'static str) -> Self {
        Self::from_kind(ErrorKind::ErrorStr(err))
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::from_kind(ErrorKind::ErrorMsg(err))
    }
}
