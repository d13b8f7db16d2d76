// silo: The sandboxed build system and package manager.
// Copyright (C) 2024 International Digital Economy Academy
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
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

use std::path::PathBuf;

use colored::Colorize;

use silofetch::snapshot::{PkgToolReader, read_snapshot};
use siloutil::cli::UniversalFlags;
use siloutil::silo_dir;

/// Show the merged package view across all sandboxes
#[derive(Debug, clap::Parser)]
pub struct DepsSubcommand {
    /// The cache root holding the sandboxes
    #[clap(long)]
    pub cache_root: Option<PathBuf>,

    /// The global package database
    #[clap(long)]
    pub global_db: Option<PathBuf>,
}

pub fn deps_cli(flags: &UniversalFlags, cmd: DepsSubcommand) -> anyhow::Result<i32> {
    let cache_root = cmd.cache_root.unwrap_or_else(silo_dir::add_source_cache);
    let global_db = cmd.global_db.unwrap_or_else(silo_dir::global_package_db);

    let snapshot = read_snapshot(&PkgToolReader, &global_db, &cache_root)?;

    if !flags.quiet {
        println!(
            "{} globally installed package(s)",
            snapshot.global_packages.len()
        );
        for (db, graph) in &snapshot.per_sandbox {
            println!("{} {}", "Sandbox".blue().bold(), db.display());
            println!(
                "  {} package(s), {} dependency edge(s)",
                graph.package_count(),
                graph.edge_count()
            );
            if flags.verbose {
                for (id, key) in graph.all_packages_and_id() {
                    println!("  {} ({} deps)", key, graph.dep_count(id));
                }
            }
        }
    }
    Ok(0)
}
