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

use anyhow::Context;

pub fn home() -> PathBuf {
    if let Ok(silo_home) = std::env::var("SILO_HOME") {
        return PathBuf::from(silo_home);
    }

    let h = home::home_dir();
    if h.is_none() {
        eprintln!("Failed to get home directory");
        std::process::exit(1);
    }
    let hm = h.unwrap().join(".silo");
    if !hm.exists() {
        std::fs::create_dir_all(&hm).unwrap();
    }
    hm
}

/// The shared cache root for materialized add-source dependencies.
pub fn add_source_cache() -> PathBuf {
    home().join("add-source")
}

/// Default location of the global package database.
pub fn global_package_db() -> PathBuf {
    home().join("global-packages.conf.d")
}

pub fn silo_tmp_dir() -> anyhow::Result<PathBuf> {
    let p = home().join("tmp");
    if !p.exists() {
        std::fs::create_dir_all(&p)
            .with_context(|| format!("failed to create tmp directory `{}`", p.display()))?;
    }
    Ok(p)
}

#[test]
fn test_silo_dir() {
    use expect_test::expect;

    let tmp = tempfile::tempdir().unwrap();
    unsafe { std::env::set_var("SILO_HOME", tmp.path()) };

    let dirs = [
        home(),
        add_source_cache(),
        global_package_db(),
        silo_tmp_dir().unwrap(),
    ];
    let dirs = dirs
        .iter()
        .map(|p| {
            p.strip_prefix(home())
                .unwrap()
                .to_str()
                .unwrap()
                .replace(['\\', '/'], "|")
        })
        .collect::<Vec<_>>();
    expect![[r#"
        [
            "",
            "add-source",
            "global-packages.conf.d",
            "tmp",
        ]
    "#]]
    .assert_debug_eq(&dirs);
}
