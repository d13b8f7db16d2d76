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

/// Build manifests are named `<pkg>.silo.json`. Matching is by this suffix,
/// so a directory may legitimately contain zero or several of them.
pub const MANIFEST_SUFFIX: &str = ".silo.json";

/// Per-sandbox package database directories end with this suffix; the prefix
/// is sandbox-defined (in practice the compiler version).
pub const PACKAGE_DB_SUFFIX: &str = "-packages.conf.d";

/// Name prefix of in-flight staging directories inside the cache root.
pub const STAGING_PREFIX: &str = ".staging";

/// Directories never included in a distributable source export.
pub const IGNORE_DIRS: &[&str] = &["target", ".git", ".silo-cache"];
