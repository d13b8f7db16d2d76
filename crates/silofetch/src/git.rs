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

//! The version control capability used by the pipeline.
//!
//! Everything that touches a repository goes through [`GitOps`] so the
//! resolution and caching logic can be exercised against fakes, without a
//! network or a `git` installation.

use std::path::Path;

pub mod command_impl;

pub use command_impl::GitCommandImpl;

pub trait GitOps {
    type Error: std::error::Error + Send + Sync + 'static;

    /// List remote refs matching `reference`, as `(revision, refname)`
    /// pairs in the remote's order.
    fn ls_remote(&self, url: &str, reference: &str) -> Result<Vec<(String, String)>, Self::Error>;

    /// Clone `url` into `dst` (which must not exist yet), with full history.
    fn clone(&self, url: &str, dst: &Path) -> Result<(), Self::Error>;

    /// Hard-reset the work tree at `dst` to `revision`.
    fn reset_hard(&self, dst: &Path, revision: &str) -> Result<(), Self::Error>;

    /// Remove version-control metadata from `dst`, leaving exported
    /// content only.
    fn strip_metadata(&self, dst: &Path) -> Result<(), Self::Error>;
}
