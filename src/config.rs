// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Loading of the launcher configuration file

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConfigLoadError, Error};

pub const DEFAULT_CONFIG: &str = "config/env.json";
pub const DEFAULT_CHECKS: &str = "config/checks.json";

const CHANNEL_FIELD: &str = "SLACK_CHANNEL";
const TOKEN_FIELD: &str = "SLACK_TOKEN";

/// Which document layout the config file is expected to have
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigShape {
    /// `{ "SLACK_CHANNEL": "..", "SLACK_TOKEN": ".." }`
    Flat,
    /// `{ "slack": { "SLACK_CHANNEL": "..", "SLACK_TOKEN": ".." } }`
    Nested,
    /// Either of the above, the `slack` section wins when present
    Auto,
}

impl ConfigShape {
    pub const VARIANTS: &'static [&'static str] = &["flat", "nested", "auto"];
}

impl Default for ConfigShape {
    fn default() -> Self {
        ConfigShape::Auto
    }
}

impl FromStr for ConfigShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "flat" => Ok(ConfigShape::Flat),
            "nested" => Ok(ConfigShape::Nested),
            "auto" => Ok(ConfigShape::Auto),
            other => Err(format!("unknown config shape: {}", other).into()),
        }
    }
}

#[derive(Deserialize)]
struct SlackSection {
    #[serde(rename = "SLACK_CHANNEL")]
    channel: Option<String>,
    #[serde(rename = "SLACK_TOKEN")]
    token: Option<String>,
}

#[derive(Deserialize)]
struct RawConfig {
    slack: Option<SlackSection>,
    #[serde(flatten)]
    flat: SlackSection,
}

/// Everything the launched process needs, read once at start-up
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub channel: String,
    pub token: String,
    pub config_path: PathBuf,
}

impl LaunchConfig {
    pub fn new(
        channel: impl Into<String>,
        token: impl Into<String>,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            channel: channel.into(),
            token: token.into(),
            config_path: config_path.into(),
        }
    }

    /// Read and parse the config file at `path`
    ///
    /// `CONFIG_PATH` for the child defaults to `config/checks.json`, use [`Self::with_config_path`] to change it.
    pub fn load(path: impl AsRef<Path>, shape: ConfigShape) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| Error::config_load(path, ConfigLoadError::Read(e)))?;

        Self::from_json(&contents, shape).map_err(|e| Error::config_load(path, e))
    }

    pub fn from_json(contents: &str, shape: ConfigShape) -> Result<Self, ConfigLoadError> {
        let raw: RawConfig = serde_json::from_str(contents).map_err(ConfigLoadError::Parse)?;

        let section = match (shape, raw.slack) {
            (ConfigShape::Flat, _) => raw.flat,
            (ConfigShape::Nested, Some(slack)) | (ConfigShape::Auto, Some(slack)) => slack,
            (ConfigShape::Nested, None) => return Err(ConfigLoadError::MissingField("slack")),
            (ConfigShape::Auto, None) => raw.flat,
        };

        let channel = section
            .channel
            .ok_or(ConfigLoadError::MissingField(CHANNEL_FIELD))?;
        let token = section
            .token
            .ok_or(ConfigLoadError::MissingField(TOKEN_FIELD))?;

        Ok(Self::new(channel, token, DEFAULT_CHECKS))
    }

    pub fn with_config_path(mut self, config_path: impl Into<PathBuf>) -> Self {
        self.config_path = config_path.into();
        self
    }
}

// the token must never end up in logs
impl fmt::Debug for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchConfig")
            .field("channel", &self.channel)
            .field("token", &"<redacted>")
            .field("config_path", &self.config_path)
            .finish()
    }
}
