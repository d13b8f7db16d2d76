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

use anyhow::Context;
use colored::Colorize;

use silofetch::export::SiloPackageExporter;
use silofetch::extract::extract_add_source_deps;
use silofetch::git::GitCommandImpl;
use siloutil::cli::UniversalFlags;
use siloutil::manifest::read_manifest_in_dir;
use siloutil::packages::{AddSourceDep, AddSourceOrigin};
use siloutil::silo_dir;

/// Resolve and materialize the project's add-source dependencies
#[derive(Debug, clap::Parser)]
pub struct SyncSubcommand {
    /// The project directory; defaults to the current directory
    #[clap(long)]
    pub source_dir: Option<PathBuf>,

    /// The shared add-source cache root
    #[clap(long)]
    pub cache_root: Option<PathBuf>,

    /// Register a local directory as an additional add-source dependency;
    /// may be repeated. Takes precedence over the manifest.
    #[clap(long = "add-source", value_name = "DIR")]
    pub add_source: Vec<PathBuf>,
}

pub fn sync_cli(flags: &UniversalFlags, cmd: SyncSubcommand) -> anyhow::Result<i32> {
    let source_dir = match cmd.source_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let cache_root = cmd.cache_root.unwrap_or_else(silo_dir::add_source_cache);

    let mut explicit = vec![];
    for dir in &cmd.add_source {
        let dir = dunce::canonicalize(dir)
            .with_context(|| format!("no such add-source directory `{}`", dir.display()))?;
        let manifest = read_manifest_in_dir(&dir)?;
        explicit.push(AddSourceDep {
            name: manifest.name,
            origin: AddSourceOrigin::Local { dir },
        });
    }

    let pinned = extract_add_source_deps(
        &GitCommandImpl,
        &SiloPackageExporter,
        &cache_root,
        &source_dir,
        explicit,
    )?;

    if !flags.quiet {
        for dep in &pinned {
            println!("{} {}", "Pinned".green().bold(), dep);
        }
    }
    Ok(0)
}
