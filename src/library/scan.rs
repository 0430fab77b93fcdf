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

//! Media library indexing.
//!
//! This module handles the discovery of audio files on the local filesystem
//! and loads their tags into a [`Library`].
//!
//! It utilizes `WalkDir` for directory traversal and `Lofty` for metadata
//! extraction.

use anyhow::{Context, Result};
use lofty::prelude::*;
use lofty::probe::Probe;
use log::{debug, info, warn};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

use crate::library::Library;
use crate::model::Song;

/// File extensions recognised as playable audio, compared ignoring case.
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "flac", "ogg", "wav", "m4a"];

/// Whether `path` has one of the [`AUDIO_EXTENSIONS`].
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

/// Recursively scans each directory for audio files and adds them to the
/// library.
///
/// Directories that cannot be read are logged and skipped, as are files
/// whose tags cannot be read.
///
/// # Arguments
///
/// * `library` - The library to add songs to.
/// * `dirs` - The filesystem paths of the directories to scan.
///
/// # Returns
///
/// Returns the total number of songs added to the library.
pub fn scan_media_dirs(library: &Library, dirs: &[String]) -> usize {
    let mut count = 0;

    for dir in dirs {
        match scan_directory(library, Path::new(dir)) {
            Ok(n) => {
                info!("Scanned {} songs from {}", n, dir);
                count += n;
            }
            Err(e) => warn!("Failure scanning {}: {:#}", dir, e),
        }
    }

    count
}

fn scan_directory(library: &Library, root: &Path) -> Result<usize> {
    let date_added = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the UNIX epoch")?
        .as_secs();

    let mut count = 0;

    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();

        if !entry.file_type().is_file() || !is_audio_file(path) {
            continue;
        }

        match read_song(path) {
            Ok(mut song) => {
                song.date_added = Some(date_added);
                library.insert(song);
                count += 1;
            }
            Err(e) => debug!("Skipping {}: {:#}", path.display(), e),
        }
    }

    Ok(count)
}

/// Reads the tags of a single audio file into a [`Song`].
///
/// A missing title falls back to the file name when displayed.
pub fn read_song(path: &Path) -> Result<Song> {
    let tagged_file = Probe::open(path)
        .and_then(|p| p.read())
        .context("Failed to read tags")?;

    let filename = path
        .to_str()
        .context("Path contains invalid UTF-8")?
        .to_string();

    let mut song = Song {
        path: filename,
        duration: tagged_file.properties().duration(),
        ..Song::default()
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        song.title = tag.title().map(|s| s.to_string());
        song.artist = tag.artist().map(|s| s.to_string());
        song.album = tag.album().map(|s| s.to_string());
        song.genre = tag.genre().map(|s| s.to_string());
        song.disc_number = tag.disk();
        song.track_number = tag.track();
    }

    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_extensions_ignore_case() {
        assert!(is_audio_file(Path::new("/music/a.mp3")));
        assert!(is_audio_file(Path::new("/music/a.FLAC")));
        assert!(!is_audio_file(Path::new("/music/cover.jpg")));
        assert!(!is_audio_file(Path::new("/music/noext")));
    }

    #[test]
    fn test_scan_ignores_non_audio_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("nested").join("cover.jpg"), b"jpeg").unwrap();

        let library = Library::new();
        let dirs = vec![dir.path().to_string_lossy().to_string()];
        assert_eq!(scan_media_dirs(&library, &dirs), 0);
        assert!(library.is_empty());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let library = Library::new();
        let dirs = vec!["/definitely/not/a/music/dir".to_string()];
        assert_eq!(scan_media_dirs(&library, &dirs), 0);
    }
}
