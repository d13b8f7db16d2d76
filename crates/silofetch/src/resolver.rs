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

//! Pins a symbolic git reference to an immutable revision id.

use anyhow::Context;
use thiserror::Error;
use url::Url;

use crate::git::GitOps;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("`{reference}` does not name a revision in `{url}`")]
    InvalidReference { url: String, reference: String },
}

/// Whether `s` already is a revision id: exactly 40 lowercase hex digits.
pub fn is_revision_id(s: &str) -> bool {
    s.len() == 40
        && s.bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Resolve `reference` (a branch, tag or revision) against the remote at
/// `url` to a pinned revision id.
///
/// An already-pinned reference is returned unchanged without touching the
/// network, so re-resolving on every build stays free.
pub fn resolve_revision<G: GitOps>(git: &G, url: &str, reference: &str) -> anyhow::Result<String> {
    if is_revision_id(reference) {
        return Ok(reference.to_string());
    }

    Url::parse(url).context("Malformed git source url")?;
    log::debug!("Listing remote refs of {} matching `{}`", url, reference);
    let refs = git
        .ls_remote(url, reference)
        .with_context(|| format!("failed to list remote refs of `{url}`"))?;

    match refs.first() {
        Some((revision, _)) if is_revision_id(revision) => Ok(revision.clone()),
        _ => Err(ResolveError::InvalidReference {
            url: url.to_string(),
            reference: reference.to_string(),
        }
        .into()),
    }
}
