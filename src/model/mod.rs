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

//! Domain models and core data structures.
//!
//! This module defines the central entity of the application, the [`Song`],
//! together with the fixed catalog of fields a playlist can be sorted on.

mod field;

pub use field::{SortDirection, SortField};

use std::{cmp::Ordering, time::Duration};

/// The stable key a song is stored under in the library.
///
/// This is the song's file path.
pub type SongKey = String;

/// A single song in the library.
///
/// Songs are shared between the library and any number of playlists, and are
/// treated as immutable while they are indexed. To change a sortable field,
/// remove the song and add the updated copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    pub path: SongKey,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub disc_number: Option<u32>,
    pub track_number: Option<u32>,
    /// Star rating, 0 to 5.
    pub rating: u8,
    pub play_count: u32,
    pub duration: Duration,
    /// UNIX seconds.
    pub date_added: Option<u64>,
    /// UNIX seconds, `None` if never played.
    pub last_played: Option<u64>,
}

impl Song {
    /// Creates a song with just a key and a title.
    pub fn new(path: impl Into<SongKey>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Returns the grouping value of this song for a sortable field.
    ///
    /// Numeric fields are zero-padded so that comparing the returned strings
    /// orders them numerically. `None` means the song has no value for the
    /// field and is left out of that field's groups.
    pub fn field_value(&self, field: SortField) -> Option<String> {
        match field {
            SortField::Title => self.title.clone(),
            SortField::Artist => self.artist.clone(),
            SortField::Album => self.album.clone(),
            SortField::Genre => self.genre.clone(),
            SortField::Rating => Some(self.rating.to_string()),
            SortField::PlayCount => Some(format!("{:010}", self.play_count)),
            SortField::Length => Some(format!("{:010}", self.duration.as_secs())),
            SortField::DateAdded => self.date_added.map(|t| format!("{:020}", t)),
            SortField::LastPlayed => self.last_played.map(|t| format!("{:020}", t)),
        }
    }

    /// Orders two songs by disc number then track number.
    ///
    /// Missing numbers count as zero.
    pub fn cmp_disc_track(&self, other: &Self) -> Ordering {
        let disc = |s: &Song| s.disc_number.unwrap_or(0);
        let track = |s: &Song| s.track_number.unwrap_or(0);

        disc(self)
            .cmp(&disc(other))
            .then_with(|| track(self).cmp(&track(other)))
    }

    /// Name to show for this song, falling back to the file name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| {
            self.path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(self.path.as_str())
        })
    }
}
