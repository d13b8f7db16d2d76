// Copyright 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::io::IsTerminal;

use clap::Parser;
use colored::Colorize;

mod cli;

/// Initialize logging, filtered through the `RUST_LOG` environment
/// variable and printed to stderr.
fn init_tracing() {
    let log_env_set = std::env::var("RUST_LOG").is_ok();
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_line_number(log_env_set)
        .with_level(true)
        .with_writer(std::io::stderr);
    if !log_env_set {
        fmt.with_target(false).without_time().init();
    } else {
        fmt.compact().init();
    }
}

pub fn main() {
    init_tracing();

    let cli = cli::SiloCli::parse();
    let flags = cli.flags;

    use cli::SiloSubcommands::*;
    let res = match cli.subcommand {
        Add(a) => cli::add_cli(&flags, a),
        Deps(d) => cli::deps_cli(&flags, d),
        Package(p) => cli::package_cli(&flags, p),
        Sync(s) => cli::sync_cli(&flags, s),
    };
    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:?}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}
