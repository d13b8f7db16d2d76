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

use anyhow::bail;
use colored::Colorize;

use siloutil::cli::UniversalFlags;
use siloutil::common::MANIFEST_SUFFIX;
use siloutil::dependency::DependencyInfo;
use siloutil::manifest::{
    convert_manifest_to_json, manifest_paths_in_dir, read_manifest_from_json,
    write_manifest_json_to_file,
};

/// Add an add-source dependency to the project manifest
#[derive(Debug, clap::Parser)]
pub struct AddSubcommand {
    /// The dependency name
    pub name: String,

    /// Git repository URL of the dependency
    #[clap(long)]
    pub git: Option<String>,

    /// Git branch, tag or revision to use
    #[clap(long, requires = "git")]
    pub rev: Option<String>,

    /// Local path to the dependency
    #[clap(long, conflicts_with = "git")]
    pub path: Option<String>,

    /// The project directory; defaults to the current directory
    #[clap(long)]
    pub source_dir: Option<PathBuf>,
}

pub fn add_cli(flags: &UniversalFlags, cmd: AddSubcommand) -> anyhow::Result<i32> {
    let source_dir = match cmd.source_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let paths = manifest_paths_in_dir(&source_dir)?;
    let manifest_path = match paths.as_slice() {
        [] => bail!(
            "no `*{}` manifest found in `{}`",
            MANIFEST_SUFFIX,
            source_dir.display()
        ),
        [path] => path,
        _ => bail!(
            "multiple `*{}` manifests found in `{}`",
            MANIFEST_SUFFIX,
            source_dir.display()
        ),
    };

    let info = match (&cmd.git, &cmd.path) {
        (Some(git), None) => DependencyInfo {
            git: Some(git.clone()),
            git_rev: cmd.rev.clone(),
            ..Default::default()
        },
        (None, Some(path)) => DependencyInfo {
            path: Some(path.clone()),
            ..Default::default()
        },
        _ => bail!("specify the dependency source with either --git or --path"),
    };

    let mut manifest = read_manifest_from_json(manifest_path)?;
    manifest.deps.insert(cmd.name.clone(), info);
    write_manifest_json_to_file(&convert_manifest_to_json(manifest), manifest_path)?;

    if !flags.quiet {
        println!(
            "{} add-source dependency `{}`; run {} to materialize it",
            "Added".green().bold(),
            cmd.name,
            "`silo sync`".bold()
        );
    }
    Ok(0)
}
