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

use std::path::{Path, PathBuf};

use colored::Colorize;
use walkdir::WalkDir;

use siloutil::cli::UniversalFlags;
use siloutil::common::IGNORE_DIRS;
use siloutil::manifest::read_manifest_in_dir;

/// Export a distributable source tree of a package
#[derive(Debug, clap::Parser)]
pub struct PackageSubcommand {
    /// The package directory; defaults to the current directory
    #[clap(long)]
    pub source_dir: Option<PathBuf>,

    /// Where to write the exported tree
    #[clap(long)]
    pub output_dir: PathBuf,
}

/// Copy the distributable parts of `source_dir` into `output_dir`,
/// skipping build products and version-control metadata.
pub fn export_source_tree(source_dir: &Path, output_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let walker = WalkDir::new(source_dir).min_depth(1).into_iter();
    for entry in walker.filter_entry(|e| {
        !(e.file_type().is_dir()
            && IGNORE_DIRS.contains(&e.file_name().to_string_lossy().as_ref()))
    }) {
        let entry = entry?;
        let target = output_dir.join(
            entry
                .path()
                .strip_prefix(source_dir)
                .expect("walked path is under its root"),
        );
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

pub fn package_cli(flags: &UniversalFlags, cmd: PackageSubcommand) -> anyhow::Result<i32> {
    let source_dir = match cmd.source_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    // A tree without exactly one manifest is not a package.
    let manifest = read_manifest_in_dir(&source_dir)?;

    export_source_tree(&source_dir, &cmd.output_dir)?;

    if !flags.quiet {
        println!(
            "{} {} into `{}`",
            "Packaged".green().bold(),
            manifest.name,
            cmd.output_dir.display()
        );
    }
    Ok(0)
}

#[cfg(test)]
mod test {
    use expect_test::expect;
    use walkdir::WalkDir;

    use super::*;

    fn list_dir_contents(dir: &Path) -> String {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .map(|e| {
                e.unwrap()
                    .path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_export_skips_ignored_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("lib")).unwrap();
        std::fs::create_dir_all(src.join("target").join("debug")).unwrap();
        std::fs::create_dir_all(src.join(".git")).unwrap();
        std::fs::write(src.join("pkg.silo.json"), r#"{ "name": "pkg" }"#).unwrap();
        std::fs::write(src.join("lib").join("main.hl"), "main = ()\n").unwrap();
        std::fs::write(src.join("target").join("debug").join("pkg.o"), "junk").unwrap();
        std::fs::write(src.join(".git").join("HEAD"), "ref: refs/heads/main").unwrap();

        let out = tmp.path().join("out");
        export_source_tree(&src, &out).unwrap();

        expect![[r#"

            lib
            lib/main.hl
            pkg.silo.json"#]]
        .assert_eq(&list_dir_contents(&out));
    }
}
