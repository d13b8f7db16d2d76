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

pub mod add;
pub mod deps;
pub mod package;
pub mod sync;

pub use add::*;
pub use deps::*;
pub use package::*;
pub use sync::*;

use siloutil::cli::UniversalFlags;

#[derive(Debug, clap::Parser)]
#[clap(
    name = "silo",
    about = "The sandboxed build system and package manager."
)]
pub struct SiloCli {
    #[clap(subcommand)]
    pub subcommand: SiloSubcommands,

    #[clap(flatten)]
    pub flags: UniversalFlags,
}

#[derive(Debug, clap::Parser)]
pub enum SiloSubcommands {
    // Dependencies
    Add(AddSubcommand),
    Sync(SyncSubcommand),
    Deps(DepsSubcommand),

    // Packaging
    Package(PackageSubcommand),
}
