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

//! Adding whole folders to a playlist.

use std::path::Path;

use log::info;
use walkdir::WalkDir;

use crate::{error::ImportError, library::scan::is_audio_file, model::SongKey, playlist::Playlist};

/// Appends every audio file under `dir`, recursively and sorted by path.
///
/// The folder is enumerated in full before the playlist is touched, so an
/// enumeration failure leaves it unchanged. Files are appended by path
/// whether or not the library knows them yet.
///
/// Returns the number of keys appended.
///
/// # Errors
///
/// Returns [`ImportError::Walk`] if any part of the folder cannot be read.
pub fn add_folder(playlist: &Playlist, dir: &Path) -> Result<usize, ImportError> {
    let keys = audio_files(dir)?;
    let count = playlist.append_keys(keys);

    info!(
        "Added {} files from {} to {}",
        count,
        dir.display(),
        playlist.name()
    );
    Ok(count)
}

fn audio_files(dir: &Path) -> Result<Vec<SongKey>, ImportError> {
    let mut keys = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| ImportError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            keys.push(entry.path().to_string_lossy().to_string());
        }
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use std::{fs, rc::Rc};

    use tempfile::TempDir;

    use super::*;
    use crate::{library::Library, model::Song};

    #[test]
    fn test_add_folder_appends_audio_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("disc2")).unwrap();
        fs::write(dir.path().join("01.mp3"), "").unwrap();
        fs::write(dir.path().join("cover.jpg"), "").unwrap();
        fs::write(dir.path().join("disc2").join("01.flac"), "").unwrap();

        let known = dir.path().join("01.mp3").to_string_lossy().to_string();
        let library = Library::new();
        library.insert(Song::new(known.clone(), "known"));
        let library = Rc::new(library);

        let playlist = Playlist::new(library.clone(), "Imported");
        assert_eq!(add_folder(&playlist, dir.path()).unwrap(), 2);

        assert_eq!(playlist.member_count(), 2);
        assert_eq!(playlist.member_keys()[0], known);
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn test_missing_folder_leaves_playlist_unchanged() {
        let dir = TempDir::new().unwrap();
        let library = Rc::new(Library::new());
        let playlist = Playlist::new(library.clone(), "Imported");

        let result = add_folder(&playlist, &dir.path().join("missing"));
        assert!(matches!(result, Err(ImportError::Walk { .. })));
        assert_eq!(playlist.member_count(), 0);
    }
}
