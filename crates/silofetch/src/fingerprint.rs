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

//! Content fingerprinting for local add-source dependencies.
//!
//! Local directories have no version-control revision to key the cache by,
//! so an exported tree is hashed instead. The fingerprint covers entry names
//! and file contents only; timestamps, permissions and other filesystem
//! metadata never enter the hash.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Deterministic content hash of a directory tree, as lowercase hex.
pub fn fingerprint_tree(dir: &Path) -> anyhow::Result<String> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(dir)
            .expect("walked path is under its root");
        // Normalize separators so the fingerprint is host-independent.
        let rel = rel.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            hasher.update(b"dir\0");
            hasher.update(rel.as_bytes());
            hasher.update(b"\0");
        } else {
            hasher.update(b"file\0");
            hasher.update(rel.as_bytes());
            hasher.update(b"\0");

            let mut file = std::fs::File::open(entry.path())
                .with_context(|| format!("failed to open `{}`", entry.path().display()))?;
            let mut buffer = [0; 1024];
            loop {
                let bytes_read = file.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            hasher.update(b"\0");
        }
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
