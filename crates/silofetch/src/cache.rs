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

//! Materializes a resolved add-source origin into the shared cache.
//!
//! Every published entry lives at `<cache root>/<name>/<revision>` and is
//! immutable from the moment it appears: sources are staged in a temporary
//! directory, identity-checked, and moved into place with a single rename.
//! Entry existence is the only index; there is no metadata file and no
//! cross-process lock. Two processes racing on the same key may both do the
//! fetch work, but only one rename wins and the loser's staging directory is
//! discarded.

use std::fs;
use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use siloutil::common::STAGING_PREFIX;
use siloutil::manifest::{manifest_paths_in_dir, read_manifest_from_json};
use siloutil::packages::{AddSourceOrigin, PinnedDep};

use crate::export::SourceExporter;
use crate::fingerprint::fingerprint_tree;
use crate::git::GitOps;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no build manifest found in add-source dependency from {origin}")]
    ManifestNotFound { origin: AddSourceOrigin },
    #[error("multiple build manifests found in add-source dependency from {origin}")]
    AmbiguousManifest { origin: AddSourceOrigin },
    #[error(
        "add-source dependency from {origin} declares package name `{declared}`, expected `{expected}`"
    )]
    NameMismatch {
        origin: AddSourceOrigin,
        declared: String,
        expected: String,
    },
}

/// Confirm that the single build manifest in `staged` declares
/// `expected_name`. A mis-specified url or a moved directory would otherwise
/// cache one package under another package's slot.
pub fn check_identity(
    staged: &Path,
    expected_name: &str,
    origin: &AddSourceOrigin,
) -> anyhow::Result<()> {
    let manifests = manifest_paths_in_dir(staged)?;
    let path = match manifests.as_slice() {
        [] => {
            return Err(IdentityError::ManifestNotFound {
                origin: origin.clone(),
            }
            .into());
        }
        [path] => path,
        _ => {
            return Err(IdentityError::AmbiguousManifest {
                origin: origin.clone(),
            }
            .into());
        }
    };
    let manifest = read_manifest_from_json(path)?;
    if manifest.name != expected_name {
        return Err(IdentityError::NameMismatch {
            origin: origin.clone(),
            declared: manifest.name,
            expected: expected_name.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Materialize `origin` for the dependency `name` into `cache_root`,
/// returning the pinned revision.
///
/// Git origins must carry an already-pinned revision (the extractor resolves
/// symbolic refs first); their cache slot is known up front, so an existing
/// entry short-circuits before any subprocess runs. Local origins are always
/// exported first, since the fingerprint only exists once the exported tree
/// does.
pub fn materialize<G: GitOps, X: SourceExporter>(
    git: &G,
    exporter: &X,
    cache_root: &Path,
    name: &str,
    origin: &AddSourceOrigin,
) -> anyhow::Result<PinnedDep> {
    fs::create_dir_all(cache_root).with_context(|| {
        format!("failed to create cache root `{}`", cache_root.display())
    })?;

    match origin {
        AddSourceOrigin::Git { url, rev } => {
            let dest = cache_root.join(name).join(rev);
            if dest.is_dir() {
                log::debug!("cache hit for {}@{}", name, rev);
                return Ok(PinnedDep {
                    name: name.to_string(),
                    revision: rev.clone(),
                });
            }

            let staging = staging_dir(cache_root)?;
            let staged = staging.path().join(name);
            fs::create_dir(&staged)?;
            git.clone(url, &staged)
                .with_context(|| format!("failed to clone `{url}`"))?;
            git.reset_hard(&staged, rev)
                .with_context(|| format!("failed to reset `{url}` to {rev}"))?;
            git.strip_metadata(&staged)
                .with_context(|| format!("failed to strip metadata of `{url}`"))?;

            publish(&staged, &dest, name, origin)?;
            Ok(PinnedDep {
                name: name.to_string(),
                revision: rev.clone(),
            })
        }
        AddSourceOrigin::Local { dir } => {
            let staging = staging_dir(cache_root)?;
            let staged = staging.path().join(name);
            fs::create_dir(&staged)?;
            exporter.export(dir, &staged)?;

            let revision = fingerprint_tree(&staged)?;
            let dest = cache_root.join(name).join(&revision);
            if dest.is_dir() {
                // The export produced bytes we already have; drop it.
                log::debug!(
                    "discarding export of `{}`; {}@{} is already cached",
                    dir.display(),
                    name,
                    revision
                );
            } else {
                publish(&staged, &dest, name, origin)?;
            }
            Ok(PinnedDep {
                name: name.to_string(),
                revision,
            })
        }
    }
}

/// A fresh staging directory inside the cache root. Kept on the same
/// filesystem so the final rename cannot degrade into a copy; removed on
/// drop along with anything still staged in it.
fn staging_dir(cache_root: &Path) -> anyhow::Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(cache_root)
        .with_context(|| {
            format!(
                "failed to create staging directory in `{}`",
                cache_root.display()
            )
        })
}

fn publish(
    staged: &Path,
    dest: &Path,
    expected_name: &str,
    origin: &AddSourceOrigin,
) -> anyhow::Result<()> {
    check_identity(staged, expected_name, origin)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    // Re-check immediately before the move: a concurrent build may have
    // published the same key while we were fetching. Losing that race is
    // fine, the existing entry is the same content.
    if dest.exists() {
        log::debug!("lost publish race for `{}`", dest.display());
        return Ok(());
    }
    match fs::rename(staged, dest) {
        Ok(()) => Ok(()),
        Err(_) if dest.exists() => {
            log::debug!("lost publish race for `{}`", dest.display());
            Ok(())
        }
        Err(e) => {
            Err(e).with_context(|| format!("failed to publish `{}`", dest.display()))
        }
    }
}
