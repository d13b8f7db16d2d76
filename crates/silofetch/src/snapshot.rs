// Copyright 2024 International Digital Economy Academy
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
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! A merged, queryable view of the package databases across all sandboxes
//! under a cache root.
//!
//! This is a pure read path: sandboxes are discovered by listing the cache
//! root, each sandbox's package database is located by its fixed name
//! suffix, and the database contents themselves come from the external
//! `silo-pkg` tool. Nothing here is cached between calls; the snapshot runs
//! at most once per build and sandbox counts are small.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use siloutil::common::PACKAGE_DB_SUFFIX;
use siloutil::packages::InstalledPackage;
use siloutil::packages::graph::PackageGraph;
use siloutil::process::run_stdout;
use siloutil::silo_bin;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no `*{}` package database found in sandbox `{}`", PACKAGE_DB_SUFFIX, .0.display())]
    PackageDbNotFound(PathBuf),
    #[error("multiple `*{}` package databases found in sandbox `{}`", PACKAGE_DB_SUFFIX, .0.display())]
    AmbiguousPackageDb(PathBuf),
}

/// Enumerates installed packages from a stack of package databases. Later
/// databases in the stack shadow earlier ones by package name.
pub trait PkgDbReader {
    fn list_installed(&self, dbs: &[PathBuf]) -> anyhow::Result<Vec<InstalledPackage>>;
}

/// Reads package databases through the external `silo-pkg` tool, which
/// prints one JSON object per installed package.
pub struct PkgToolReader;

#[derive(Debug, Deserialize)]
struct InstalledPackageJson {
    name: String,
    version: String,
    #[serde(default)]
    depends: Vec<String>,
}

fn parse_dump_output(output: &str) -> anyhow::Result<Vec<InstalledPackage>> {
    let mut packages = vec![];
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let j: InstalledPackageJson = serde_json::from_str(line)
            .with_context(|| format!("malformed package description: {line}"))?;
        let version = j
            .version
            .parse()
            .with_context(|| format!("bad version of installed package {}", j.name))?;
        packages.push(InstalledPackage {
            name: j.name,
            version,
            depends: j.depends,
        });
    }
    Ok(packages)
}

impl PkgDbReader for PkgToolReader {
    fn list_installed(&self, dbs: &[PathBuf]) -> anyhow::Result<Vec<InstalledPackage>> {
        let mut command = silo_bin::call_silo_pkg();
        command.arg("dump");
        for db in dbs {
            command.arg("--db").arg(db);
        }
        let output = run_stdout(&mut command).context("failed to run silo-pkg")?;
        parse_dump_output(&output)
    }
}

/// Merge an installed-package listing into a graph. The listing order is
/// the shadowing order: a later package with an already-seen name replaces
/// the earlier one. Dependencies on packages absent from the merged view
/// are skipped.
pub fn build_package_graph(packages: Vec<InstalledPackage>) -> PackageGraph {
    let mut by_name: IndexMap<String, InstalledPackage> = IndexMap::new();
    for pkg in packages {
        if let Some(prev) = by_name.insert(pkg.name.clone(), pkg) {
            log::debug!("package {} is shadowed by a later database", prev.name);
        }
    }

    let mut builder = PackageGraph::builder();
    let mut ids = HashMap::new();
    for (name, pkg) in &by_name {
        ids.insert(name.clone(), builder.add_package(pkg.clone()));
    }
    for (name, pkg) in &by_name {
        let from = ids[name];
        for dep in &pkg.depends {
            match ids.get(dep) {
                Some(&to) => builder.add_dependency(from, to),
                None => log::debug!("{} depends on `{}`, which is not installed", name, dep),
            }
        }
    }
    builder.build()
}

/// Locate the single package database inside a sandbox directory.
fn find_package_db(sandbox: &Path) -> anyhow::Result<PathBuf> {
    let mut matches = vec![];
    for entry in sandbox.read_dir()? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(PACKAGE_DB_SUFFIX) {
            matches.push(entry.path());
        }
    }
    matches.sort();
    match matches.as_slice() {
        [] => Err(SnapshotError::PackageDbNotFound(sandbox.to_path_buf()).into()),
        [db] => Ok(dunce::canonicalize(db)?),
        _ => Err(SnapshotError::AmbiguousPackageDb(sandbox.to_path_buf()).into()),
    }
}

/// The merged package view of one build invocation. Constructed fresh on
/// every read and never persisted.
#[derive(Debug)]
pub struct CacheSnapshot {
    pub global_packages: Vec<InstalledPackage>,
    /// One entry per sandbox, in sandbox listing order: the canonical
    /// package database path and the graph merging it with the global
    /// database.
    pub per_sandbox: Vec<(PathBuf, PackageGraph)>,
}

/// Scan `cache_root` for sandboxes and assemble the merged package view.
pub fn read_snapshot<R: PkgDbReader>(
    reader: &R,
    global_db: &Path,
    cache_root: &Path,
) -> anyhow::Result<CacheSnapshot> {
    let mut sandboxes = vec![];
    for entry in cache_root
        .read_dir()
        .with_context(|| format!("failed to list cache root `{}`", cache_root.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        // Hidden entries include in-flight staging directories.
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        sandboxes.push(entry.path());
    }
    sandboxes.sort();

    let mut per_sandbox = vec![];
    for sandbox in sandboxes {
        let db = find_package_db(&sandbox)?;
        let packages = reader
            .list_installed(&[global_db.to_path_buf(), db.clone()])
            .with_context(|| {
                format!(
                    "failed to read package databases of sandbox `{}`",
                    sandbox.display()
                )
            })?;
        per_sandbox.push((db, build_package_graph(packages)));
    }

    let global_packages = reader
        .list_installed(&[global_db.to_path_buf()])
        .context("failed to read the global package database")?;

    Ok(CacheSnapshot {
        global_packages,
        per_sandbox,
    })
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use semver::Version;

    use super::*;

    fn pkg(name: &str, version: &str, depends: &[&str]) -> InstalledPackage {
        InstalledPackage {
            name: name.into(),
            version: Version::parse(version).unwrap(),
            depends: depends.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Serves canned package listings keyed by database directory name.
    struct MockDbReader {
        dbs: HashMap<String, Vec<InstalledPackage>>,
    }

    impl MockDbReader {
        fn new(dbs: Vec<(&str, Vec<InstalledPackage>)>) -> Self {
            MockDbReader {
                dbs: dbs
                    .into_iter()
                    .map(|(name, pkgs)| (name.to_string(), pkgs))
                    .collect(),
            }
        }
    }

    impl PkgDbReader for MockDbReader {
        fn list_installed(&self, dbs: &[PathBuf]) -> anyhow::Result<Vec<InstalledPackage>> {
            let mut all = vec![];
            for db in dbs {
                let name = db.file_name().unwrap().to_string_lossy();
                all.extend(self.dbs.get(name.as_ref()).cloned().unwrap_or_default());
            }
            Ok(all)
        }
    }

    #[test]
    fn test_parse_dump_output() {
        let packages = parse_dump_output(
            r#"
            {"name": "base", "version": "4.18.2"}
            {"name": "lens", "version": "5.2.3", "depends": ["base", "ghc-prim"]}
            "#,
        )
        .unwrap();
        assert_eq!(
            packages,
            [
                pkg("base", "4.18.2", &[]),
                pkg("lens", "5.2.3", &["base", "ghc-prim"]),
            ]
        );

        assert!(parse_dump_output(r#"{"name": "broken"}"#).is_err());
        assert!(parse_dump_output(r#"{"name": "broken", "version": "not-semver"}"#).is_err());
    }

    #[test]
    fn test_graph_shadowing_by_name() {
        let graph = build_package_graph(vec![
            pkg("base", "4.18.0", &[]),
            pkg("lens", "5.2.3", &["base", "not-installed"]),
            // A sandbox copy of base shadows the global one.
            pkg("base", "4.19.1", &[]),
        ]);

        assert_eq!(graph.package_count(), 2);
        let names: Vec<_> = graph.all_packages().map(|k| k.to_string()).collect();
        assert_eq!(names, ["base-4.19.1", "lens-5.2.3"]);
        // The edge to the missing package is dropped, the one to base kept.
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_snapshot_lists_sandboxes_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_root = tmp.path().join("cache");
        let global_db = tmp.path().join("global-packages.conf.d");
        std::fs::create_dir_all(&global_db).unwrap();

        for sandbox in ["sb-two", "sb-one"] {
            let db = cache_root.join(sandbox).join("9.4.8-packages.conf.d");
            std::fs::create_dir_all(&db).unwrap();
        }
        // An in-flight staging directory is not a sandbox.
        std::fs::create_dir_all(cache_root.join(".staging123")).unwrap();

        let reader = MockDbReader::new(vec![
            ("global-packages.conf.d", vec![pkg("base", "4.18.2", &[])]),
            (
                "9.4.8-packages.conf.d",
                vec![pkg("lens", "5.2.3", &["base"])],
            ),
        ]);

        let snapshot = read_snapshot(&reader, &global_db, &cache_root).unwrap();
        assert_eq!(snapshot.global_packages, [pkg("base", "4.18.2", &[])]);
        assert_eq!(snapshot.per_sandbox.len(), 2);

        let dbs: Vec<_> = snapshot
            .per_sandbox
            .iter()
            .map(|(db, _)| {
                db.parent()
                    .unwrap()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(dbs, ["sb-one", "sb-two"]);

        for (_, graph) in &snapshot.per_sandbox {
            assert_eq!(graph.package_count(), 2);
            assert_eq!(graph.edge_count(), 1);
        }
    }

    #[test]
    fn test_sandbox_without_db_fails_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_root = tmp.path().join("cache");
        let global_db = tmp.path().join("global-packages.conf.d");
        std::fs::create_dir_all(&global_db).unwrap();
        std::fs::create_dir_all(cache_root.join("empty-sandbox")).unwrap();

        let reader = MockDbReader::new(vec![]);
        let err = read_snapshot(&reader, &global_db, &cache_root).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnapshotError>(),
            Some(SnapshotError::PackageDbNotFound(_))
        ));
    }

    #[test]
    fn test_sandbox_with_two_dbs_fails_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_root = tmp.path().join("cache");
        let global_db = tmp.path().join("global-packages.conf.d");
        std::fs::create_dir_all(&global_db).unwrap();
        let sandbox = cache_root.join("sb");
        std::fs::create_dir_all(sandbox.join("9.4.8-packages.conf.d")).unwrap();
        std::fs::create_dir_all(sandbox.join("9.8.1-packages.conf.d")).unwrap();

        let reader = MockDbReader::new(vec![]);
        let err = read_snapshot(&reader, &global_db, &cache_root).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnapshotError>(),
            Some(SnapshotError::AmbiguousPackageDb(_))
        ));
    }
}
