// Copyright 2019 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

mod launcher;
mod supervisor;

pub use launcher::Launch;
pub use supervisor::Supervise;

use async_trait::async_trait;
use clap::{App, Arg, ArgMatches};

use crate::config::{ConfigShape, LaunchConfig, DEFAULT_CHECKS, DEFAULT_CONFIG};
use crate::fork::{EnvStyle, Launcher, StdioMode, DEFAULT_COMMAND};
use crate::Error;

pub const CONFIG: &str = "config";
pub const SHAPE: &str = "shape";
pub const STDIO: &str = "stdio";
pub const ENV_STYLE: &str = "env-style";
pub const COMMAND: &str = "command";
pub const CHECKS: &str = "checks";

pub const CONFIG_ENV: &str = "WMLAUNCH_CONFIG";

/// A trait to define common construction of a sub-command
#[async_trait]
pub trait Process: Sized + Send + 'static {
    const NAME: &'static str;

    /// CLI SubCommand without the shared launch options
    fn inner_sub_command() -> App<'static, 'static>;

    fn sub_command() -> App<'static, 'static> {
        Self::inner_sub_command().launch_opts()
    }

    async fn run(self, args: &ArgMatches<'_>) -> Result<(), Error>;
}

pub trait LaunchOpts {
    fn launch_opts(self) -> Self;
}

impl<'a, 'b> LaunchOpts for App<'a, 'b> {
    fn launch_opts(self) -> Self {
        self.arg(
            Arg::with_name(CONFIG)
                .short("c")
                .long(CONFIG)
                .value_name("FILE")
                .env(CONFIG_ENV)
                .default_value(DEFAULT_CONFIG)
                .help("JSON file holding SLACK_CHANNEL and SLACK_TOKEN")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(SHAPE)
                .long(SHAPE)
                .value_name("SHAPE")
                .possible_values(ConfigShape::VARIANTS)
                .default_value("auto")
                .help("layout of the config file, auto prefers a nested `slack` section")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(STDIO)
                .long(STDIO)
                .value_name("MODE")
                .possible_values(StdioMode::VARIANTS)
                .default_value("inherit")
                .help("capture the child's output or pass it through to this terminal")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(ENV_STYLE)
                .long(ENV_STYLE)
                .value_name("STYLE")
                .possible_values(EnvStyle::VARIANTS)
                .default_value("generic")
                .help("generic: CHANNEL_ID/ACCESS_TOKEN, slack: SLACK_CHANNEL/SLACK_TOKEN")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(COMMAND)
                .long(COMMAND)
                .value_name("CMD")
                .default_value(DEFAULT_COMMAND)
                .help("command line run through `sh -c`")
                .takes_value(true),
        )
        .arg(
            Arg::with_name(CHECKS)
                .long(CHECKS)
                .value_name("FILE")
                .default_value(DEFAULT_CHECKS)
                .help("value of CONFIG_PATH for the child")
                .takes_value(true),
        )
    }
}

/// Everything a sub-command needs to start the child
#[derive(Debug)]
pub struct LaunchArgs {
    pub config: LaunchConfig,
    pub launcher: Launcher,
}

impl LaunchArgs {
    /// Loads the config file, nothing is spawned if this fails
    pub fn from_matches(args: &ArgMatches<'_>) -> Result<Self, Error> {
        let config_file = args.value_of(CONFIG).unwrap_or(DEFAULT_CONFIG);
        let shape: ConfigShape = args.value_of(SHAPE).unwrap_or("auto").parse()?;
        let stdio: StdioMode = args.value_of(STDIO).unwrap_or("inherit").parse()?;
        let env_style: EnvStyle = args.value_of(ENV_STYLE).unwrap_or("generic").parse()?;
        let command = args.value_of(COMMAND).unwrap_or(DEFAULT_COMMAND);
        let checks = args.value_of(CHECKS).unwrap_or(DEFAULT_CHECKS);

        let config = LaunchConfig::load(config_file, shape)?.with_config_path(checks);
        let launcher = Launcher::new(stdio)
            .command(command)
            .env_style(env_style);

        Ok(Self { config, launcher })
    }
}
