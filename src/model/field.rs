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

//! The fixed catalog of sortable fields.

use std::{fmt, str::FromStr};

use crate::error::PlaylistError;

/// A field a playlist can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Title,
    Artist,
    Album,
    Genre,
    Rating,
    PlayCount,
    Length,
    DateAdded,
    LastPlayed,
}

impl SortField {
    /// Every sortable field, in catalog order.
    pub const ALL: [SortField; 9] = [
        SortField::Title,
        SortField::Artist,
        SortField::Album,
        SortField::Genre,
        SortField::Rating,
        SortField::PlayCount,
        SortField::Length,
        SortField::DateAdded,
        SortField::LastPlayed,
    ];

    /// The catalog name of this field.
    pub fn name(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Artist => "artist",
            SortField::Album => "album",
            SortField::Genre => "genre",
            SortField::Rating => "rating",
            SortField::PlayCount => "play count",
            SortField::Length => "length",
            SortField::DateAdded => "date added",
            SortField::LastPlayed => "last played",
        }
    }

    /// Position of this field in [`SortField::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether groups for this field are ordered by disc and track number.
    pub fn uses_tie_break(self) -> bool {
        matches!(self, SortField::Artist | SortField::Album)
    }
}

impl FromStr for SortField {
    type Err = PlaylistError;

    /// Looks a field up by name, ignoring case.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PlaylistError::UnknownField(name.to_string()))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Unsorted, sorts as ascending.
    #[default]
    None,
    Ascending,
    Descending,
}
