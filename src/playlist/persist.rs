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

//! Playlist files.
//!
//! A playlist is saved as its name, cursor and membership keys. Display
//! order and sort state are not saved: loading replays the keys against the
//! library, exactly as if they had been added one by one.
//!
//! Saves go to a temporary file in the target directory which is then
//! renamed over the old file, so a playlist file is always either the old
//! version or the new one.

use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{error::PersistError, library::ItemStore, model::SongKey, playlist::Playlist};

#[derive(Serialize, Deserialize, Debug)]
struct PlaylistFile {
    name: String,
    #[serde(default)]
    current_index: usize,
    song_paths: Vec<SongKey>,
}

/// Saves `playlist` into `dir` as [`Playlist::file_name`].
///
/// Returns the path written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or written to. Any
/// existing file is left untouched in that case.
pub fn save(playlist: &Playlist, dir: &Path) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir)?;

    let path = dir.join(playlist.file_name());
    let file = PlaylistFile {
        name: playlist.name(),
        current_index: playlist.current_member_position().unwrap_or(0),
        song_paths: playlist.member_keys(),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, &file)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    info!("Saved playlist {} to {}", file.name, path.display());
    Ok(path)
}

/// Loads a playlist file, resolving its keys against `store`.
///
/// Returns `None` if the file is missing or malformed. The saved cursor is a
/// membership position; if that song no longer resolves the cursor moves to
/// the next one that does.
pub fn load(path: &Path, store: Rc<dyn ItemStore>) -> Option<Playlist> {
    let file = match read_file(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to load playlist {}: {:#}", path.display(), e);
            return None;
        }
    };

    let playlist = Playlist::with_keys(store, file.name, file.song_paths);
    playlist.set_current_member_position(file.current_index);

    info!(
        "Loaded playlist {} with {} songs",
        playlist.name(),
        playlist.len()
    );
    Some(playlist)
}

/// Loads `<dir>/<name>.json`, or creates an empty playlist called `name` if
/// it cannot be loaded.
pub fn load_or_create(dir: &Path, name: &str, store: Rc<dyn ItemStore>) -> Playlist {
    let path = dir.join(format!("{name}.json"));
    if path.exists() {
        if let Some(playlist) = load(&path, Rc::clone(&store)) {
            return playlist;
        }
    }

    Playlist::new(store, name)
}

fn read_file(path: &Path) -> anyhow::Result<PlaylistFile> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{library::Library, model::Song};

    fn library() -> Rc<Library> {
        let library = Library::new();
        for title in ["a", "b", "c"] {
            library.insert(Song::new(format!("{title}.mp3"), title));
        }
        Rc::new(library)
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let library = library();

        let playlist = Playlist::new(library.clone(), "Mix");
        playlist.add_key("c.mp3");
        playlist.add_key("a.mp3");
        playlist.add_key("c.mp3");
        playlist.set_current_index(1).unwrap();
        playlist.sort_by(0, "title").unwrap();

        let path = save(&playlist, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Mix.json"));

        let loaded = load(&path, library.clone()).unwrap();
        assert_eq!(loaded.name(), "Mix");
        assert_eq!(loaded.member_keys(), vec!["c.mp3", "a.mp3", "c.mp3"]);
        assert_eq!(loaded.current().unwrap().path, playlist.current().unwrap().path);
    }

    #[test]
    fn test_cursor_survives_sorted_save() {
        let dir = TempDir::new().unwrap();
        let library = library();

        let keys = ["c.mp3", "a.mp3", "b.mp3"].map(String::from).to_vec();
        let playlist = Playlist::with_keys(library.clone(), "Sorted", keys);
        playlist.sort_by(0, "title").unwrap();
        playlist.set_current_index(0).unwrap();
        assert_eq!(playlist.current().unwrap().path, "a.mp3");

        let path = save(&playlist, dir.path()).unwrap();
        let loaded = load(&path, library.clone()).unwrap();

        assert_eq!(loaded.current().unwrap().path, "a.mp3");
        assert_eq!(loaded.current_index(), 1);
    }

    #[test]
    fn test_load_clamps_cursor_to_resolving_songs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Old.json");
        fs::write(
            &path,
            r#"{"name":"Old","current_index":5,"song_paths":["a.mp3","gone.mp3"]}"#,
        )
        .unwrap();

        let loaded = load(&path, library()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.member_count(), 2);
        assert_eq!(loaded.current_index(), 0);
    }

    #[test]
    fn test_load_missing_or_malformed_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("missing.json"), library()).is_none());

        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load(&path, library()).is_none());
    }

    #[test]
    fn test_failed_save_keeps_old_file() {
        let dir = TempDir::new().unwrap();
        let library = library();
        let playlist = Playlist::new(library.clone(), "Keep");
        playlist.add_key("a.mp3");
        save(&playlist, dir.path()).unwrap();

        // A file where the directory should be makes the save fail.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, "").unwrap();
        assert!(save(&playlist, &blocked).is_err());

        let loaded = load(&dir.path().join("Keep.json"), library.clone()).unwrap();
        assert_eq!(loaded.member_keys(), vec!["a.mp3"]);
    }

    #[test]
    fn test_load_or_create() {
        let dir = TempDir::new().unwrap();
        let playlist = load_or_create(dir.path(), "Library", library());
        assert_eq!(playlist.name(), "Library");
        assert!(playlist.is_empty());
    }
}
