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

//! Blocking subprocess helpers. A non-zero exit status is an error carrying
//! the command line, status, stdout and stderr, so external tool failures
//! stay diagnosable at the surface.

use std::process::Command;

pub fn run(command: &mut Command) -> Result<(), std::io::Error> {
    let output = command.output()?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(std::io::Error::other(format!(
            "Command {:?} failed with status: {}\nstdout: {}\nstderr: {}",
            command, output.status, stdout, stderr
        )));
    }
    Ok(())
}

pub fn run_stdout(command: &mut Command) -> Result<String, std::io::Error> {
    let output = command.output()?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(std::io::Error::other(format!(
            "Command {:?} failed with status: {}\nstdout: {}\nstderr: {}",
            command, output.status, stdout, stderr
        )));
    }
    String::from_utf8(output.stdout).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to parse stdout of command {:?}: {}", command, e),
        )
    })
}
