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

//! Resolution and materialization of add-source dependencies, plus the
//! sandbox package-database aggregation that feeds the installer.
//!
//! Add-source dependencies point at mutable locations (a git ref or a local
//! directory). This crate turns each into an immutable, content-addressed
//! entry under `<cache root>/<name>/<revision>` that later builds reuse
//! without re-fetching or re-exporting.

pub mod cache;
pub mod export;
pub mod extract;
pub mod fingerprint;
pub mod git;
pub mod resolver;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testutil;
