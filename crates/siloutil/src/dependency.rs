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

//! Dependency info requires a detour to support both string and structured formats

use std::str::FromStr;

use semver::VersionReq;
use serde::{Deserialize, Serialize};

/// Information about a specific dependency
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct DependencyInfo {
    #[serde(default, skip_serializing_if = "version_is_default")]
    pub version: VersionReq,

    /// Local path to the dependency. Overrides the version requirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Git repository URL. Overrides the version requirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,
    /// Git branch, tag or revision to use.
    #[serde(skip_serializing_if = "Option::is_none", rename = "rev")]
    pub git_rev: Option<String>,
}

fn version_is_default(version: &VersionReq) -> bool {
    version.comparators.is_empty()
}

impl std::fmt::Debug for DependencyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_simple() {
            write!(f, "{}", self.version)
        } else {
            f.debug_struct("DependencyInfo")
                .field("version", &format_args!("{}", self.version))
                .field("path", &self.path)
                .field("git", &self.git)
                .field("rev", &self.git_rev)
                .finish()
        }
    }
}

/// The JSON representation of a dependency info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyInfoJson {
    /// A simple version requirement
    Simple(VersionReq),
    /// A detailed dependency info
    Detailed(DependencyInfo),
}

impl DependencyInfo {
    /// Check if the requirement is simple. That is, it only contains a version requirement
    fn is_simple(&self) -> bool {
        self.path.is_none() && self.git.is_none() && self.git_rev.is_none()
    }

    fn from_simple(version: VersionReq) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// Whether this dependency points at a mutable source location instead of
    /// a registry release.
    pub fn is_add_source(&self) -> bool {
        self.path.is_some() || self.git.is_some()
    }
}

impl From<DependencyInfo> for DependencyInfoJson {
    fn from(dep: DependencyInfo) -> Self {
        if dep.is_simple() {
            DependencyInfoJson::Simple(dep.version)
        } else {
            DependencyInfoJson::Detailed(dep)
        }
    }
}

impl From<DependencyInfoJson> for DependencyInfo {
    fn from(dep: DependencyInfoJson) -> Self {
        match dep {
            DependencyInfoJson::Simple(v) => DependencyInfo::from_simple(v),
            DependencyInfoJson::Detailed(d) => d,
        }
    }
}

impl FromStr for DependencyInfo {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DependencyInfo::from_simple(VersionReq::parse(s)?))
    }
}
