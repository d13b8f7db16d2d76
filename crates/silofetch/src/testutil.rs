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

//! In-memory stand-ins for the external collaborators, for tests only.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::export::SourceExporter;
use crate::git::GitOps;

/// Errors on any use. Lets tests assert that a code path never touches
/// version control.
pub(crate) struct FailingGit;

impl GitOps for FailingGit {
    type Error = std::io::Error;

    fn ls_remote(&self, url: &str, _: &str) -> Result<Vec<(String, String)>, Self::Error> {
        Err(std::io::Error::other(format!("unexpected ls-remote of {url}")))
    }

    fn clone(&self, url: &str, _: &Path) -> Result<(), Self::Error> {
        Err(std::io::Error::other(format!("unexpected clone of {url}")))
    }

    fn reset_hard(&self, _: &Path, _: &str) -> Result<(), Self::Error> {
        Err(std::io::Error::other("unexpected reset"))
    }

    fn strip_metadata(&self, _: &Path) -> Result<(), Self::Error> {
        Err(std::io::Error::other("unexpected metadata strip"))
    }
}

/// Serves a fixed ref listing; all other operations error.
pub(crate) struct RefsOnlyGit(pub Vec<(String, String)>);

impl GitOps for RefsOnlyGit {
    type Error = std::io::Error;

    fn ls_remote(&self, _: &str, _: &str) -> Result<Vec<(String, String)>, Self::Error> {
        Ok(self.0.clone())
    }

    fn clone(&self, _: &str, _: &Path) -> Result<(), Self::Error> {
        Err(std::io::Error::other("unexpected clone"))
    }

    fn reset_hard(&self, _: &Path, _: &str) -> Result<(), Self::Error> {
        Err(std::io::Error::other("unexpected reset"))
    }

    fn strip_metadata(&self, _: &Path) -> Result<(), Self::Error> {
        Err(std::io::Error::other("unexpected metadata strip"))
    }
}

/// A "remote" backed by local fixture trees: cloning copies the tree for the
/// url, resetting is a no-op, refs come from a fixed table. Counts clones so
/// tests can assert cache hits.
pub(crate) struct FakeGit {
    repos: HashMap<String, PathBuf>,
    refs: HashMap<String, Vec<(String, String)>>,
    pub clones: Cell<usize>,
}

impl FakeGit {
    pub fn new() -> Self {
        FakeGit {
            repos: HashMap::new(),
            refs: HashMap::new(),
            clones: Cell::new(0),
        }
    }

    pub fn with_repo(mut self, url: &str, tree: &Path) -> Self {
        self.repos.insert(url.to_string(), tree.to_path_buf());
        self
    }

    pub fn with_ref(mut self, url: &str, refname: &str, revision: &str) -> Self {
        self.refs
            .entry(url.to_string())
            .or_default()
            .push((revision.to_string(), refname.to_string()));
        self
    }
}

impl GitOps for FakeGit {
    type Error = std::io::Error;

    fn ls_remote(&self, url: &str, reference: &str) -> Result<Vec<(String, String)>, Self::Error> {
        let refs = self.refs.get(url).cloned().unwrap_or_default();
        Ok(refs
            .into_iter()
            .filter(|(_, name)| name.ends_with(reference))
            .collect())
    }

    fn clone(&self, url: &str, dst: &Path) -> Result<(), Self::Error> {
        let tree = self.repos.get(url).ok_or_else(|| {
            std::io::Error::other(format!("no such repository: {url}"))
        })?;
        self.clones.set(self.clones.get() + 1);
        copy_tree_contents(tree, dst)
    }

    fn reset_hard(&self, _: &Path, _: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    fn strip_metadata(&self, dst: &Path) -> Result<(), Self::Error> {
        let metadata = dst.join(".git");
        if metadata.is_dir() {
            std::fs::remove_dir_all(metadata)?;
        }
        Ok(())
    }
}

/// Exports by plain copy. Counts exports so tests can observe that the
/// local branch always re-exports.
pub(crate) struct CopyExporter {
    pub exports: Cell<usize>,
}

impl CopyExporter {
    pub fn new() -> Self {
        CopyExporter {
            exports: Cell::new(0),
        }
    }
}

impl SourceExporter for CopyExporter {
    fn export(&self, source_dir: &Path, out_dir: &Path) -> anyhow::Result<()> {
        self.exports.set(self.exports.get() + 1);
        std::fs::create_dir_all(out_dir)?;
        copy_tree_contents(source_dir, out_dir)?;
        Ok(())
    }
}

/// Errors on any use, for asserting export short-circuits.
pub(crate) struct FailingExporter;

impl SourceExporter for FailingExporter {
    fn export(&self, source_dir: &Path, _: &Path) -> anyhow::Result<()> {
        anyhow::bail!("unexpected export of {}", source_dir.display())
    }
}

/// Copy the contents of `src` into the (possibly existing) directory `dst`.
pub(crate) fn copy_tree_contents(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// The contents of a directory as sorted relative paths, for snapshotting.
pub(crate) fn list_dir_contents(dir: &Path) -> String {
    walkdir::WalkDir::new(dir)
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
