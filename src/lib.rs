// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Launcher for the web monitor
//!
//! The Slack channel and token are read once from a JSON file and handed to the monitor through its
//!   environment, together with the path to its checks file.

pub mod config;
mod error;
pub mod fork;
pub mod procs;

pub use config::{ConfigShape, LaunchConfig};
pub use error::{ConfigLoadError, Error, ErrorKind};
pub use fork::{child_env, Child, EnvStyle, Launcher, StdioMode};
