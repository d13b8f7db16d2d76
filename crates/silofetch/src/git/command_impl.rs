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

//! This module provides an implementation of the [`GitOps`] trait by directly
//! calling the `git` command line tool.

use std::{path::Path, process::Command};

use siloutil::process::{run, run_stdout};

use super::GitOps;

pub struct GitCommandImpl;

impl GitOps for GitCommandImpl {
    type Error = std::io::Error;

    fn ls_remote(&self, url: &str, reference: &str) -> Result<Vec<(String, String)>, Self::Error> {
        let mut command = Command::new("git");
        command.arg("ls-remote").arg(url).arg(reference);
        let output = run_stdout(&mut command)?;

        let mut refs = vec![];
        for line in output.lines() {
            let Some((revision, refname)) = line.split_once('\t') else {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Malformed ls-remote line from `{}`: {}", url, line),
                ));
            };
            refs.push((revision.trim().to_string(), refname.trim().to_string()));
        }
        Ok(refs)
    }

    fn clone(&self, url: &str, dst: &Path) -> Result<(), Self::Error> {
        let mut command = Command::new("git");
        command.arg("clone").arg("--quiet").arg(url).arg(dst);
        run(&mut command)
    }

    fn reset_hard(&self, dst: &Path, revision: &str) -> Result<(), Self::Error> {
        let mut command = Command::new("git");
        command
            .arg("-C")
            .arg(dst)
            .arg("reset")
            .arg("--hard")
            .arg("--quiet")
            .arg(revision);
        run(&mut command)
    }

    fn strip_metadata(&self, dst: &Path) -> Result<(), Self::Error> {
        let metadata = dst.join(".git");
        if metadata.is_dir() {
            std::fs::remove_dir_all(metadata)?;
        }
        Ok(())
    }
}
