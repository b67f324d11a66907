// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use async_trait::async_trait;
use clap::{App, ArgMatches, SubCommand};
use tracing::info;

use crate::procs::{LaunchArgs, Process};
use crate::Error;

/// Launch the monitor and forget about it
///
/// Rules:
/// - read configuration file for process to launch.
/// - never waits on the child, its exit status is not observed
/// - captured output is discarded without holding a pipe to the child
/// - the child outlives this process
#[derive(Debug)]
pub struct Launch;

#[async_trait]
impl Process for Launch {
    const NAME: &'static str = "launch";

    fn inner_sub_command() -> App<'static, 'static> {
        SubCommand::with_name(Self::NAME).about("Start the monitor and exit without waiting on it")
    }

    async fn run(self, args: &ArgMatches<'_>) -> Result<(), Error> {
        let LaunchArgs { config, launcher } = LaunchArgs::from_matches(args)?;

        // nothing stays behind to read from the child once this process exits
        let child = launcher.launch_detached(&config)?;
        info!(pid = ?child.id(), "{} finished, not waiting on child", Self::NAME);

        Ok(())
    }
}
