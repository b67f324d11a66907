// Copyright 2019 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use clap::{App, ArgMatches};
use tokio::runtime;
use tracing::error;
use tracing_subscriber::EnvFilter;

use wmlaunch::procs::{Launch, Process, Supervise};
use wmlaunch::Error;

const DEFAULT_LOG_FILTER: &str = "wmlaunch=info";

trait SetupClapApp {
    fn setup_clap_app(self) -> Self;
}

impl<'a, 'b> SetupClapApp for App<'a, 'b> {
    fn setup_clap_app(self) -> Self {
        self.version(env!("CARGO_PKG_VERSION"))
            .author(env!("CARGO_PKG_AUTHORS"))
    }
}

/// stdout belongs to an inherited child, all logging goes to stderr
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Error> {
    let args = App::new(env!("CARGO_PKG_NAME"))
        .setup_clap_app()
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand(Launch::sub_command().setup_clap_app())
        .subcommand(Supervise::sub_command().setup_clap_app())
        .get_matches();

    init_logging();

    let runtime = runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        match args.subcommand() {
            (Launch::NAME, Some(args)) => run(Launch, args).await,
            (Supervise::NAME, Some(args)) => run(Supervise, args).await,
            ("", None) => {
                println!("command required");
                println!("{}", args.usage());
                std::process::exit(1);
            }
            (arg, _) => {
                println!("unexpected argument: {}", arg);
                println!("{}", args.usage());
                std::process::exit(2);
            }
        }
    });

    // the child is never waited on in `launch`, dropping the runtime leaves it running
    drop(runtime);
    result
}

async fn run<P: Process>(process: P, args: &ArgMatches<'_>) -> Result<(), Error> {
    process.run(args).await.map_err(|e| {
        error!("{} failed: {}", P::NAME, e);
        e
    })
}
