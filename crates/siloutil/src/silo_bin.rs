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

//! Locates the sibling `silo` and `silo-pkg` binaries.

use std::path::PathBuf;

fn determine_sibling_bin(name: &str) -> Option<PathBuf> {
    // Check if the binary is in the executable's directory
    let curr_exe = std::env::current_exe();
    if let Ok(curr_exe) = curr_exe {
        let mut bin = curr_exe.clone();
        bin.set_file_name(name);
        #[cfg(windows)]
        {
            bin.set_extension("exe");
        }
        if bin.is_file() {
            return Some(bin);
        }
    }
    None
}

/// A command invoking the `silo` binary, preferring the one next to the
/// current executable and falling back to `$PATH`.
pub fn call_silo() -> std::process::Command {
    std::process::Command::new(determine_sibling_bin("silo").unwrap_or_else(|| "silo".into()))
}

/// A command invoking the `silo-pkg` package database tool.
pub fn call_silo_pkg() -> std::process::Command {
    std::process::Command::new(
        determine_sibling_bin("silo-pkg").unwrap_or_else(|| "silo-pkg".into()),
    )
}
