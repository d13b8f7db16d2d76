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

//! Reading and writing of `*.silo.json` build manifests.
//!
//! The manifest is deliberately dumb: a declared package name, an optional
//! version, and a dependency table. All resolution logic lives elsewhere.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::bail;
use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::common::MANIFEST_SUFFIX;
use crate::dependency::{DependencyInfo, DependencyInfoJson};

/// An in-memory build manifest.
#[derive(Debug, Clone)]
pub struct SiloManifest {
    pub name: String,
    pub version: Option<Version>,
    pub deps: IndexMap<String, DependencyInfo>,
}

/// The on-disk JSON representation of a build manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiloManifestJSON {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deps: IndexMap<String, DependencyInfoJson>,
}

#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("`name` should not be empty")]
    EmptyName,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load `{}`", path.display())]
pub struct ManifestJSONFormatError {
    path: Box<Path>,
    #[source]
    kind: ManifestJSONFormatErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestJSONFormatErrorKind {
    #[error("I/O error")]
    IO(#[from] std::io::Error),
    #[error("Parse error")]
    Parse(#[from] serde_json_lenient::Error),
    #[error("`name` bad format")]
    Name(#[from] NameError),
    #[error("`version` bad format")]
    Version(#[from] semver::Error),
}

impl TryFrom<SiloManifestJSON> for SiloManifest {
    type Error = ManifestJSONFormatErrorKind;

    fn try_from(j: SiloManifestJSON) -> Result<Self, Self::Error> {
        if j.name.is_empty() {
            return Err(NameError::EmptyName.into());
        }
        let version = match &j.version {
            None => None,
            Some(v) => Some(Version::parse(v)?),
        };
        Ok(SiloManifest {
            name: j.name,
            version,
            deps: j.deps.into_iter().map(|(k, v)| (k, v.into())).collect(),
        })
    }
}

pub fn convert_manifest_to_json(m: SiloManifest) -> SiloManifestJSON {
    SiloManifestJSON {
        name: m.name,
        version: m.version.map(|v| v.to_string()),
        deps: m.deps.into_iter().map(|(k, v)| (k, v.into())).collect(),
    }
}

pub fn read_manifest_from_json(path: &Path) -> Result<SiloManifest, ManifestJSONFormatError> {
    let file = File::open(path).map_err(|e| ManifestJSONFormatError {
        path: path.into(),
        kind: ManifestJSONFormatErrorKind::IO(e),
    })?;
    let reader = BufReader::new(file);
    let j: SiloManifestJSON =
        serde_json_lenient::from_reader(reader).map_err(|e| ManifestJSONFormatError {
            path: path.into(),
            kind: ManifestJSONFormatErrorKind::Parse(e),
        })?;
    j.try_into().map_err(|e| ManifestJSONFormatError {
        path: path.into(),
        kind: e,
    })
}

pub fn write_manifest_json_to_file(m: &SiloManifestJSON, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json_lenient::to_writer_pretty(&mut writer, &m)?;
    Ok(())
}

/// All build manifests directly inside `dir`, sorted by file name.
///
/// Only plain files whose name ends in [`MANIFEST_SUFFIX`] count; callers
/// decide what zero or several matches mean for them.
pub fn manifest_paths_in_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for entry in dir.read_dir()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(MANIFEST_SUFFIX) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read the single build manifest in `dir`, failing when there is none or
/// more than one.
pub fn read_manifest_in_dir(dir: &Path) -> anyhow::Result<SiloManifest> {
    let paths = manifest_paths_in_dir(dir)?;
    match paths.as_slice() {
        [] => bail!("no `*{}` manifest found in `{}`", MANIFEST_SUFFIX, dir.display()),
        [path] => Ok(read_manifest_from_json(path)?),
        _ => bail!(
            "multiple `*{}` manifests found in `{}`",
            MANIFEST_SUFFIX,
            dir.display()
        ),
    }
}
