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

//! # Sortable playlists over a shared music library.
//!
//! A [`Playlist`](playlist::Playlist) is an ordered list of song keys drawn
//! from a [`Library`](library::Library). It keeps one grouping index per
//! sortable field so that sorting by any of them is a linear walk, and it
//! stays consistent as songs are added to or removed from either the
//! playlist or the library.
//!
//! ## Organization
//!
//! * [`model`]: The [`Song`](model::Song) record and the sortable field
//!   catalog.
//! * [`sort`]: The per-field grouping indexes.
//! * [`library`]: The library, its removal notifications and the media
//!   scanner.
//! * [`playlist`]: Playlists, along with saving, loading and folder import.
//! * [`config`]: The application configuration file.
//!
//! Everything here is single-threaded. Library removals are delivered to
//! playlists synchronously, before the removing call returns.

pub mod config;
pub mod error;
pub mod library;
pub mod model;
pub mod playlist;
pub mod sort;
pub mod util;
