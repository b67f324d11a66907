// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use async_trait::async_trait;
use clap::{App, ArgMatches, SubCommand};
use tracing::{error, info};

use crate::procs::{LaunchArgs, Process};
use crate::Error;

/// Launch and monitor the process
///
/// Rules:
///   - waits for the child to exit
///   - an unsuccessful exit is an error
///   - never restarts the child
#[derive(Debug)]
pub struct Supervise;

#[async_trait]
impl Process for Supervise {
    const NAME: &'static str = "supervise";

    fn inner_sub_command() -> App<'static, 'static> {
        SubCommand::with_name(Self::NAME)
            .about("Start the monitor and wait for it, failing if it fails")
    }

    async fn run(self, args: &ArgMatches<'_>) -> Result<(), Error> {
        let LaunchArgs { config, launcher } = LaunchArgs::from_matches(args)?;

        let child = launcher.launch(&config)?;
        let pid = child.id();

        match child.check_exit().await {
            Ok(()) => {
                info!(pid = ?pid, "child exited successfully");
                Ok(())
            }
            Err(e) => {
                error!(pid = ?pid, "child failed: {}", e);
                Err(e)
            }
        }
    }
}
