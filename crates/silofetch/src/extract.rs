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

//! Collects the add-source dependencies of a build and drives resolution
//! and materialization for each of them.

use std::path::Path;

use anyhow::bail;
use indexmap::IndexMap;

use siloutil::common::MANIFEST_SUFFIX;
use siloutil::manifest::{SiloManifest, manifest_paths_in_dir, read_manifest_from_json};
use siloutil::packages::{AddSourceDep, AddSourceOrigin, PinnedDep};

use crate::cache::materialize;
use crate::export::SourceExporter;
use crate::git::GitOps;
use crate::resolver::resolve_revision;

/// Read the project manifest in `project_dir`, if there is one.
fn read_project_manifest(project_dir: &Path) -> anyhow::Result<Option<SiloManifest>> {
    let paths = manifest_paths_in_dir(project_dir)?;
    match paths.as_slice() {
        [] => Ok(None),
        [path] => Ok(Some(read_manifest_from_json(path)?)),
        _ => bail!(
            "multiple `*{}` manifests found in `{}`",
            MANIFEST_SUFFIX,
            project_dir.display()
        ),
    }
}

/// The add-source entries declared in a project manifest. Registry
/// dependencies are not materialized here and fall through.
fn manifest_add_source_deps(project_dir: &Path, manifest: &SiloManifest) -> Vec<AddSourceDep> {
    let mut deps = vec![];
    for (name, info) in &manifest.deps {
        if let Some(path) = &info.path {
            let path = Path::new(path);
            let dir = if path.is_absolute() {
                path.to_path_buf()
            } else {
                project_dir.join(path)
            };
            deps.push(AddSourceDep {
                name: name.clone(),
                origin: AddSourceOrigin::Local { dir },
            });
        } else if let Some(url) = &info.git {
            deps.push(AddSourceDep {
                name: name.clone(),
                origin: AddSourceOrigin::Git {
                    url: url.clone(),
                    rev: info.git_rev.clone().unwrap_or_else(|| "HEAD".to_string()),
                },
            });
        }
    }
    deps
}

/// Resolve and materialize every add-source dependency of the build:
/// `explicit` requests merged with the project manifest's declarations
/// (deduplicated by name, first occurrence wins, so explicit requests
/// override the manifest), each pinned to an immutable revision and
/// published into `cache_root`.
///
/// Dependencies are processed strictly in merge order, one at a time; the
/// first failure aborts the whole extraction.
pub fn extract_add_source_deps<G: GitOps, X: SourceExporter>(
    git: &G,
    exporter: &X,
    cache_root: &Path,
    project_dir: &Path,
    explicit: Vec<AddSourceDep>,
) -> anyhow::Result<Vec<PinnedDep>> {
    let manifest = read_project_manifest(project_dir)?;
    let from_manifest = manifest
        .as_ref()
        .map(|m| manifest_add_source_deps(project_dir, m))
        .unwrap_or_default();

    let mut merged: IndexMap<String, AddSourceDep> = IndexMap::new();
    for dep in explicit.into_iter().chain(from_manifest) {
        merged.entry(dep.name.clone()).or_insert(dep);
    }

    let mut pinned = Vec::with_capacity(merged.len());
    for (name, dep) in merged {
        let origin = match dep.origin {
            AddSourceOrigin::Git { url, rev } => {
                let rev = resolve_revision(git, &url, &rev)?;
                AddSourceOrigin::Git { url, rev }
            }
            local @ AddSourceOrigin::Local { .. } => local,
        };
        log::info!("Materializing add-source dependency {} ({})", name, origin);
        pinned.push(materialize(git, exporter, cache_root, &name, &origin)?);
    }
    Ok(pinned)
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use test_log::test;

    use super::*;
    use crate::testutil::{CopyExporter, FailingExporter, FakeGit};

    const REV: &str = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3";

    fn make_pkg_tree(dir: &Path, name: &str, version: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join(format!("{name}.silo.json")),
            format!(r#"{{ "name": "{name}", "version": "{version}" }}"#),
        )
        .unwrap();
        std::fs::write(dir.join("main.hl"), format!("// {name} {version}\n")).unwrap();
    }

    #[test]
    fn test_explicit_wins_over_manifest() {
        let tmp = tempfile::tempdir().unwrap();

        // Two checkouts of "a" with different contents, plus a "b".
        let a_v1 = tmp.path().join("a-v1");
        let a_v2 = tmp.path().join("a-v2");
        let b_v1 = tmp.path().join("b-v1");
        make_pkg_tree(&a_v1, "a", "1.0.0");
        make_pkg_tree(&a_v2, "a", "2.0.0");
        make_pkg_tree(&b_v1, "b", "1.0.0");

        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("project.silo.json"),
            format!(
                r#"{{
                    "name": "project",
                    "deps": {{
                        "a": {{ "path": "{}" }},
                        "b": {{ "path": "{}" }},
                        "registry-only": "1.0.0"
                    }}
                }}"#,
                a_v2.display(),
                b_v1.display()
            ),
        )
        .unwrap();

        let explicit = vec![AddSourceDep {
            name: "a".to_string(),
            origin: AddSourceOrigin::Local { dir: a_v1.clone() },
        }];

        let cache_root = tmp.path().join("cache");
        let exporter = CopyExporter::new();
        let pinned = extract_add_source_deps(
            &FakeGit::new(),
            &exporter,
            &cache_root,
            &project,
            explicit,
        )
        .unwrap();

        // Exactly {a, b}, in first-occurrence order, and `a` is the
        // explicit checkout, not the manifest's.
        assert_eq!(
            pinned.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );
        let a_entry = cache_root.join("a").join(&pinned[0].revision);
        let content = std::fs::read_to_string(a_entry.join("main.hl")).unwrap();
        assert_eq!(content, "// a 1.0.0\n");
    }

    #[test]
    fn test_git_dep_is_pinned_before_materializing() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = tmp.path().join("remote");
        make_pkg_tree(&remote, "lens", "0.4.0");

        let url = "https://example.com/lens.git";
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("project.silo.json"),
            format!(
                r#"{{ "name": "project", "deps": {{ "lens": {{ "git": "{url}", "rev": "main" }} }} }}"#
            ),
        )
        .unwrap();

        let git = FakeGit::new()
            .with_repo(url, &remote)
            .with_ref(url, "refs/heads/main", REV);
        let cache_root = tmp.path().join("cache");
        let pinned = extract_add_source_deps(
            &git,
            &FailingExporter,
            &cache_root,
            &project,
            vec![],
        )
        .unwrap();

        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].revision, REV);
        assert!(cache_root.join("lens").join(REV).is_dir());
    }

    #[test]
    fn test_no_manifest_means_only_explicit_deps() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();

        let cache_root = tmp.path().join("cache");
        let pinned = extract_add_source_deps(
            &FakeGit::new(),
            &CopyExporter::new(),
            &cache_root,
            &project,
            vec![],
        )
        .unwrap();
        assert!(pinned.is_empty());
    }

    #[test]
    fn test_first_failure_aborts_extraction() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good");
        make_pkg_tree(&good, "good", "1.0.0");

        let project = tmp.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            project.join("project.silo.json"),
            format!(
                r#"{{
                    "name": "project",
                    "deps": {{
                        "missing": {{ "path": "{}" }},
                        "good": {{ "path": "{}" }}
                    }}
                }}"#,
                tmp.path().join("does-not-exist").display(),
                good.display()
            ),
        )
        .unwrap();

        let cache_root = tmp.path().join("cache");
        let res = extract_add_source_deps(
            &FakeGit::new(),
            &CopyExporter::new(),
            &cache_root,
            &project,
            vec![],
        );
        assert!(res.is_err());
        // The failing first entry stops the run before `good` is touched.
        assert!(!cache_root.join("good").exists());
    }
}
