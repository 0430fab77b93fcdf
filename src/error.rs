// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types.
//!
//! Failures that callers are expected to handle are modelled as typed enums
//! here. Application-level code wraps these with [`anyhow`] context.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised by playlist and sort index operations.
///
/// Neither variant leaves any state mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("unknown sort field: {0:?}")]
    UnknownField(String),

    #[error("index {index} is out of range for a playlist of {len} songs")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised while saving a playlist.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("playlist file I/O failed")]
    Io(#[from] io::Error),

    #[error("playlist file is malformed")]
    Format(#[from] serde_json::Error),
}

/// Errors raised while importing a folder into a playlist.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to enumerate {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
