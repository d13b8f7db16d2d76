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

//! The package build capability: producing a distributable source tree from
//! a local package directory.

use std::path::Path;

use anyhow::Context;

use siloutil::process::run;
use siloutil::silo_bin;

pub trait SourceExporter {
    /// Export a distributable source tree of `source_dir` into `out_dir`.
    /// `out_dir` may already exist (empty); the exporter fills it.
    fn export(&self, source_dir: &Path, out_dir: &Path) -> anyhow::Result<()>;
}

/// Exports by invoking the sibling `silo` binary's `package` subcommand.
pub struct SiloPackageExporter;

impl SourceExporter for SiloPackageExporter {
    fn export(&self, source_dir: &Path, out_dir: &Path) -> anyhow::Result<()> {
        let mut command = silo_bin::call_silo();
        command
            .arg("package")
            .arg("--source-dir")
            .arg(source_dir)
            .arg("--output-dir")
            .arg(out_dir);
        run(&mut command)
            .with_context(|| format!("failed to export source of `{}`", source_dir.display()))?;
        Ok(())
    }
}
