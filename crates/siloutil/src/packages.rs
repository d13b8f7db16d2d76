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

use std::path::PathBuf;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Where an add-source dependency comes from.
///
/// This is a closed sum: every pipeline stage matches over both cases, since
/// the two differ in control flow (network + version control vs. build-export
/// + fingerprint) far more than they share.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AddSourceOrigin {
    /// A git repository plus a branch, tag or already-pinned revision.
    Git { url: String, rev: String },
    /// A local directory. The path should be absolute.
    Local { dir: PathBuf },
}

impl std::fmt::Display for AddSourceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddSourceOrigin::Git { url, rev } => write!(f, "git {url}#{rev}"),
            AddSourceOrigin::Local { dir } => write!(f, "local {}", dir.display()),
        }
    }
}

/// An add-source dependency request, before resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddSourceDep {
    pub name: String,
    pub origin: AddSourceOrigin,
}

/// An add-source dependency pinned to an immutable revision: either a
/// 40-hex git revision or a content fingerprint. Never mutated once made.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PinnedDep {
    pub name: String,
    pub revision: String,
}

impl std::fmt::Display for PinnedDep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.revision)
    }
}

/// One installed package as reported by the package database reader.
/// `depends` entries are package names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
    pub depends: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    pub fn new_usize(id: usize) -> Self {
        Self(id as u32)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub name: String,
    pub version: Version,
}

impl std::fmt::Display for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

impl std::fmt::Debug for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self, f)
    }
}

pub mod graph {
    use indexmap::IndexSet;
    use petgraph::graphmap::DiGraphMap;

    use super::{InstalledPackage, PackageId, PackageKey};

    /// A merged view of installed packages and their "depends on" edges.
    #[derive(Debug)]
    pub struct PackageGraph {
        mapping: IndexSet<PackageKey>,
        /// Full records for all packages in the graph, index-aligned with
        /// `mapping`.
        packages: Vec<InstalledPackage>,
        dep_graph: DiGraphMap<PackageId, ()>,
    }

    impl PackageGraph {
        pub fn key_from_id(&self, id: PackageId) -> &PackageKey {
            &self.mapping[id.as_usize()]
        }

        pub fn id_from_key(&self, key: &PackageKey) -> Option<PackageId> {
            self.mapping
                .get_full(key)
                .map(|(id, _)| PackageId::new_usize(id))
        }

        pub fn package_info(&self, id: PackageId) -> &InstalledPackage {
            &self.packages[id.as_usize()]
        }

        pub fn graph(&self) -> &DiGraphMap<PackageId, ()> {
            &self.dep_graph
        }

        /// Direct dependencies of a package.
        pub fn deps(&self, id: PackageId) -> impl Iterator<Item = PackageId> + '_ {
            self.dep_graph
                .neighbors_directed(id, petgraph::Direction::Outgoing)
        }

        pub fn dep_count(&self, id: PackageId) -> usize {
            self.deps(id).count()
        }

        pub fn package_count(&self) -> usize {
            self.mapping.len()
        }

        pub fn edge_count(&self) -> usize {
            self.dep_graph.all_edges().count()
        }

        pub fn all_packages_and_id(&self) -> impl Iterator<Item = (PackageId, &PackageKey)> {
            self.mapping
                .iter()
                .enumerate()
                .map(|(id, key)| (PackageId::new_usize(id), key))
        }

        pub fn all_packages(&self) -> impl Iterator<Item = &PackageKey> {
            self.mapping.iter()
        }

        pub fn builder() -> PackageGraphBuilder {
            PackageGraphBuilder::new()
        }
    }

    pub struct PackageGraphBuilder {
        graph: PackageGraph,
    }

    impl PackageGraphBuilder {
        pub fn new() -> Self {
            Self {
                graph: PackageGraph {
                    mapping: IndexSet::new(),
                    packages: Vec::new(),
                    dep_graph: DiGraphMap::new(),
                },
            }
        }

        pub fn add_package(&mut self, pkg: InstalledPackage) -> PackageId {
            let id = PackageId::new_usize(self.graph.mapping.len());
            self.graph.mapping.insert(PackageKey {
                name: pkg.name.clone(),
                version: pkg.version.clone(),
            });
            self.graph.packages.push(pkg);
            self.graph.dep_graph.add_node(id);
            assert_eq!(self.graph.mapping.len(), self.graph.packages.len());
            id
        }

        pub fn add_dependency(&mut self, from: PackageId, to: PackageId) {
            self.graph.dep_graph.add_edge(from, to, ());
        }

        pub fn build(self) -> PackageGraph {
            self.graph
        }
    }

    impl Default for PackageGraphBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod test {
    use semver::Version;

    use super::graph::PackageGraph;
    use super::*;

    fn pkg(name: &str, version: &str, depends: &[&str]) -> InstalledPackage {
        InstalledPackage {
            name: name.into(),
            version: Version::parse(version).unwrap(),
            depends: depends.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_graph_builder() {
        let mut builder = PackageGraph::builder();
        let base = builder.add_package(pkg("base", "4.18.0", &[]));
        let lens = builder.add_package(pkg("lens", "5.2.3", &["base"]));
        builder.add_dependency(lens, base);
        let graph = builder.build();

        assert_eq!(graph.package_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dep_count(lens), 1);
        assert_eq!(graph.dep_count(base), 0);
        assert_eq!(graph.key_from_id(lens).to_string(), "lens-5.2.3");
        assert_eq!(
            graph.id_from_key(&PackageKey {
                name: "base".into(),
                version: Version::new(4, 18, 0),
            }),
            Some(base)
        );
        assert_eq!(graph.package_info(lens).depends, ["base"]);
    }

    #[test]
    fn test_origin_display() {
        let git = AddSourceOrigin::Git {
            url: "https://example.com/repo.git".into(),
            rev: "main".into(),
        };
        assert_eq!(git.to_string(), "git https://example.com/repo.git#main");

        let local = AddSourceOrigin::Local {
            dir: "/src/mypkg".into(),
        };
        assert_eq!(local.to_string(), "local /src/mypkg");
    }
}
