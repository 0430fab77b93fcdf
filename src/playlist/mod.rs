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

//! Playlists.
//!
//! A [`Playlist`] is an ordered list of song keys drawn from a shared
//! library, together with the songs those keys currently resolve to, a
//! playback cursor and the active sort.
//!
//! Two orders are kept:
//!
//! * **Membership order** is the order keys were added in. It is what gets
//!   saved and it never changes when the playlist is sorted.
//! * **Display order** is the order of the resolved songs. It starts out as
//!   membership order and is replaced whenever a sort is applied. The cursor
//!   and every position-based operation refer to display order.
//!
//! Each displayed song is linked to the membership entry it came from, so
//! removing a displayed row removes exactly that entry even after sorting.

pub mod import;
pub mod persist;

use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::HashSet,
    rc::{Rc, Weak},
};

use log::{debug, error};
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    error::PlaylistError,
    library::{ItemStore, Subscription},
    model::{Song, SongKey, SortDirection, SortField},
    sort::{SortIndex, Sortable},
};

/// Identifies the UI column that requested a sort.
pub type ColumnId = usize;

/// The sort currently applied to a playlist's display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<ColumnId>,
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

/// A membership entry: one key, and the song it resolved to when it was
/// added, if any.
#[derive(Debug, Clone)]
struct Member {
    slot: u64,
    key: SongKey,
    song: Option<Rc<Song>>,
}

impl Member {
    fn entry(&self) -> Option<Entry> {
        self.song.as_ref().map(|song| Entry {
            slot: self.slot,
            song: Rc::clone(song),
        })
    }
}

/// A displayed song, linked to its membership entry by slot.
#[derive(Debug, Clone)]
struct Entry {
    slot: u64,
    song: Rc<Song>,
}

impl Sortable for Entry {
    fn field_value(&self, field: SortField) -> Option<String> {
        self.song.field_value(field)
    }

    fn tie_break(&self, other: &Self) -> Ordering {
        self.song.cmp_disc_track(&other.song)
    }

    fn is_same(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

struct State {
    name: String,
    store: Rc<dyn ItemStore>,
    members: Vec<Member>,
    songs: Vec<Entry>,
    index: SortIndex<Entry>,
    cursor: usize,
    sort: SortState,
    next_slot: u64,
    rng: StdRng,
}

impl State {
    fn new_member(&mut self, key: SongKey, song: Option<Rc<Song>>) -> Member {
        let slot = self.next_slot;
        self.next_slot += 1;
        Member { slot, key, song }
    }

    /// Rebuilds display order and indexes from membership order.
    fn materialize(&mut self) {
        self.songs = self.members.iter().filter_map(Member::entry).collect();
        self.index.rebuild(&self.songs);
        self.clamp_cursor();
        self.check_invariants();
    }

    fn resolve_all(&mut self) {
        for member in &mut self.members {
            member.song = self.store.lookup(&member.key);
        }
    }

    fn push_song(&mut self, song: Rc<Song>) {
        let member = self.new_member(song.path.clone(), Some(song));
        if let Some(entry) = member.entry() {
            self.index.add_item(&entry);
            self.songs.push(entry);
        }
        self.members.push(member);
        self.check_invariants();
    }

    fn add_key(&mut self, key: &str) -> bool {
        match self.store.lookup(key) {
            Some(song) => {
                self.push_song(song);
                true
            }
            None => {
                debug!("Ignoring {}, it is not in the library", key);
                false
            }
        }
    }

    fn append_keys(&mut self, keys: Vec<SongKey>) -> usize {
        let count = keys.len();

        for key in keys {
            let song = self.store.lookup(&key);
            let member = self.new_member(key, song);
            if let Some(entry) = member.entry() {
                self.index.add_item(&entry);
                self.songs.push(entry);
            }
            self.members.push(member);
        }

        self.check_invariants();
        count
    }

    fn insert(&mut self, position: usize, key: &str) -> bool {
        let Some(song) = self.store.lookup(key) else {
            debug!("Ignoring {}, it is not in the library", key);
            return false;
        };

        let position = position.min(self.songs.len());
        let member_position = self
            .songs
            .get(position)
            .and_then(|entry| self.members.iter().position(|m| m.slot == entry.slot))
            .unwrap_or(self.members.len());

        let member = self.new_member(song.path.clone(), Some(song));
        if let Some(entry) = member.entry() {
            self.index.add_item(&entry);
            self.songs.insert(position, entry);
        }
        self.members.insert(member_position, member);

        if self.songs.len() > 1 && self.cursor >= position {
            self.cursor += 1;
        }

        self.check_invariants();
        true
    }

    fn remove_at(&mut self, index: usize) -> Result<Rc<Song>, PlaylistError> {
        let len = self.songs.len();
        if index >= len {
            return Err(PlaylistError::IndexOutOfRange { index, len });
        }

        if self.cursor > index {
            self.cursor -= 1;
        }

        let entry = self.songs.remove(index);
        if let Some(pos) = self.members.iter().position(|m| m.slot == entry.slot) {
            self.members.remove(pos);
        }
        self.index.remove_item(&entry);

        self.clamp_cursor();
        self.check_invariants();
        Ok(entry.song)
    }

    fn remove_many(&mut self, indexes: &[usize]) -> Result<(), PlaylistError> {
        // The k-th removal sees k fewer songs.
        let len = self.songs.len();
        for (k, &index) in indexes.iter().enumerate() {
            let remaining = len.saturating_sub(k);
            if index >= remaining {
                return Err(PlaylistError::IndexOutOfRange {
                    index,
                    len: remaining,
                });
            }
        }

        if indexes.windows(2).any(|w| w[0] < w[1]) {
            debug!("remove_many called with indexes not in descending order");
        }

        for &index in indexes {
            self.remove_at(index)?;
        }

        Ok(())
    }

    fn remove_all(&mut self) {
        self.members.clear();
        self.songs.clear();
        self.cursor = 0;
        self.index.rebuild(&[]);
    }

    /// Drops every membership entry whose key is no longer in the library,
    /// highest position first.
    fn evict_missing(&mut self, removed: &HashSet<SongKey>) {
        let missing: Vec<usize> = self
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| !self.store.contains(&m.key))
            .map(|(i, _)| i)
            .collect();

        if missing.is_empty() {
            return;
        }

        debug!(
            "Playlist {} evicting {} entries after {} songs left the library",
            self.name,
            missing.len(),
            removed.len()
        );

        for member_position in missing.into_iter().rev() {
            let slot = self.members[member_position].slot;

            match self.songs.iter().position(|e| e.slot == slot) {
                Some(index) => {
                    if let Err(e) = self.remove_at(index) {
                        error!("Failed to evict {} from {}: {}", slot, self.name, e);
                    }
                }
                None => {
                    // Not displayed, either never resolved or hidden by a sort.
                    let member = self.members.remove(member_position);
                    if let Some(entry) = member.entry() {
                        self.index.remove_item(&entry);
                    }
                }
            }
        }

        self.check_invariants();
    }

    fn next(&mut self) -> Option<Rc<Song>> {
        if self.songs.is_empty() {
            return None;
        }

        self.cursor = if self.cursor + 1 < self.songs.len() {
            self.cursor + 1
        } else {
            0
        };

        Some(Rc::clone(&self.songs[self.cursor].song))
    }

    fn previous(&mut self) -> Option<Rc<Song>> {
        if self.songs.is_empty() {
            return None;
        }

        self.cursor = if self.cursor > 0 {
            self.cursor - 1
        } else {
            self.songs.len() - 1
        };

        Some(Rc::clone(&self.songs[self.cursor].song))
    }

    fn random(&mut self) -> Option<Rc<Song>> {
        self.songs
            .choose(&mut self.rng)
            .map(|entry| Rc::clone(&entry.song))
    }

    fn sort_by(&mut self, column: ColumnId, field: &str) -> Result<(), PlaylistError> {
        let field: SortField = field.parse()?;

        let direction = if self.sort.column == Some(column) {
            match self.sort.direction {
                SortDirection::None | SortDirection::Descending => SortDirection::Ascending,
                SortDirection::Ascending => SortDirection::Descending,
            }
        } else {
            SortDirection::Ascending
        };

        self.sort = SortState {
            column: Some(column),
            field: Some(field),
            direction,
        };
        self.songs = self.index.sorted(field, direction);

        self.clamp_cursor();
        self.check_invariants();
        Ok(())
    }

    fn current_member_position(&self) -> Option<usize> {
        let slot = self.songs.get(self.cursor)?.slot;
        self.members.iter().position(|m| m.slot == slot)
    }

    /// Moves the cursor to the song backing membership entry `position`.
    ///
    /// If that entry is not displayed, the first displayed song from a later
    /// entry is used, or the last displayed song if there is none.
    fn set_current_member_position(&mut self, position: usize) {
        if self.songs.is_empty() {
            self.cursor = 0;
            return;
        }

        let displayed = self.members.iter().skip(position).find_map(|m| {
            self.songs.iter().position(|e| e.slot == m.slot)
        });

        self.cursor = displayed.unwrap_or(self.songs.len() - 1);
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.songs.len() {
            self.cursor = self.songs.len().saturating_sub(1);
        }
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        debug_assert!(self.songs.len() <= self.members.len());
        debug_assert!(self.songs.is_empty() || self.cursor < self.songs.len());

        // Songs hidden by a sort are still members, and still indexed.
        for field in SortField::ALL {
            let resolved_with_value = self
                .members
                .iter()
                .filter_map(|m| m.song.as_ref())
                .filter(|song| song.field_value(field).is_some())
                .count();
            debug_assert_eq!(
                resolved_with_value,
                self.index.indexed_len(field),
                "{} index has diverged from the playlist",
                field
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn check_invariants(&self) {}
}

/// An ordered, sortable view over songs in a library.
///
/// The playlist subscribes to the library's removal notifications for as long
/// as it lives, and drops entries whose songs leave the library.
pub struct Playlist {
    state: Rc<RefCell<State>>,
    _subscription: Subscription,
}

impl Playlist {
    /// Creates an empty playlist.
    pub fn new(store: Rc<dyn ItemStore>, name: impl Into<String>) -> Self {
        Self::with_keys(store, name, Vec::new())
    }

    /// Creates a playlist from saved membership keys.
    ///
    /// Keys that do not resolve are kept as members but are not displayed.
    pub fn with_keys(store: Rc<dyn ItemStore>, name: impl Into<String>, keys: Vec<SongKey>) -> Self {
        let mut state = State {
            name: name.into(),
            store: Rc::clone(&store),
            members: Vec::with_capacity(keys.len()),
            songs: Vec::new(),
            index: SortIndex::new(),
            cursor: 0,
            sort: SortState::default(),
            next_slot: 0,
            rng: StdRng::from_rng(&mut rand::rng()),
        };

        for key in keys {
            let song = state.store.lookup(&key);
            let member = state.new_member(key, song);
            state.members.push(member);
        }
        state.materialize();

        let state = Rc::new(RefCell::new(state));
        let subscription = store.on_removed(Box::new(evict_callback(Rc::downgrade(&state))));

        Self {
            state,
            _subscription: subscription,
        }
    }

    /// Replaces the random source used by [`Playlist::random`].
    pub fn with_rng(self, rng: StdRng) -> Self {
        self.state.borrow_mut().rng = rng;
        self
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.state.borrow_mut().name = name.into();
    }

    /// The file name this playlist is saved under.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.state.borrow().name)
    }

    /// Number of displayed songs.
    pub fn len(&self) -> usize {
        self.state.borrow().songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of membership keys, including ones that do not resolve.
    pub fn member_count(&self) -> usize {
        self.state.borrow().members.len()
    }

    /// Membership keys in membership order.
    pub fn member_keys(&self) -> Vec<SongKey> {
        self.state
            .borrow()
            .members
            .iter()
            .map(|m| m.key.clone())
            .collect()
    }

    /// Displayed songs in display order.
    pub fn songs(&self) -> Vec<Rc<Song>> {
        self.state
            .borrow()
            .songs
            .iter()
            .map(|e| Rc::clone(&e.song))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<Rc<Song>> {
        self.state
            .borrow()
            .songs
            .get(index)
            .map(|e| Rc::clone(&e.song))
    }

    pub fn current_index(&self) -> usize {
        self.state.borrow().cursor
    }

    /// Moves the cursor to a display position.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::IndexOutOfRange`] if there is no song at
    /// `index`.
    pub fn set_current_index(&self, index: usize) -> Result<(), PlaylistError> {
        let mut state = self.state.borrow_mut();
        let len = state.songs.len();
        if index >= len {
            return Err(PlaylistError::IndexOutOfRange { index, len });
        }
        state.cursor = index;
        Ok(())
    }

    /// Position in membership order of the song under the cursor.
    ///
    /// Unlike [`Playlist::current_index`] this does not depend on the active
    /// sort, and is what gets saved.
    pub fn current_member_position(&self) -> Option<usize> {
        self.state.borrow().current_member_position()
    }

    /// Moves the cursor to the song added at membership `position`.
    ///
    /// If that entry does not resolve, the cursor goes to the next one that
    /// does, or to the last displayed song.
    pub fn set_current_member_position(&self, position: usize) {
        self.state.borrow_mut().set_current_member_position(position);
    }

    /// The song under the cursor.
    pub fn current(&self) -> Option<Rc<Song>> {
        let state = self.state.borrow();
        state.songs.get(state.cursor).map(|e| Rc::clone(&e.song))
    }

    pub fn sort_state(&self) -> SortState {
        self.state.borrow().sort
    }

    /// Appends `song` if its path resolves in the library.
    ///
    /// The library's copy of the song is the one added. Returns `false`, and
    /// changes nothing, if the path does not resolve.
    pub fn add(&self, song: &Song) -> bool {
        self.add_key(&song.path)
    }

    /// Appends the song stored under `key`, if there is one.
    pub fn add_key(&self, key: &str) -> bool {
        self.state.borrow_mut().add_key(key)
    }

    /// Appends each song in order. Returns how many were added.
    pub fn add_all(&self, songs: &[Song]) -> usize {
        songs.iter().filter(|song| self.add(song)).count()
    }

    /// Appends keys without requiring them to resolve.
    ///
    /// Resolving keys are displayed and indexed; the rest are kept as
    /// members only. Returns the number of keys appended.
    pub fn append_keys(&self, keys: Vec<SongKey>) -> usize {
        self.state.borrow_mut().append_keys(keys)
    }

    /// Inserts `song` at a display position, clamped to the end.
    ///
    /// Returns `false`, and changes nothing, if the song is not in the
    /// library.
    pub fn insert(&self, position: usize, song: &Song) -> bool {
        self.state.borrow_mut().insert(position, &song.path)
    }

    /// Inserts songs consecutively, starting at `position`.
    pub fn insert_all(&self, position: usize, songs: &[Song]) -> usize {
        let mut state = self.state.borrow_mut();
        let mut inserted = 0;

        for song in songs {
            if state.insert(position.saturating_add(inserted), &song.path) {
                inserted += 1;
            }
        }

        inserted
    }

    /// Removes the song at a display position.
    ///
    /// If the cursor was past the removed song it moves back by one, so it
    /// keeps pointing at the same song.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::IndexOutOfRange`] if there is no song at
    /// `index`. Nothing is changed in that case.
    pub fn remove_at(&self, index: usize) -> Result<Rc<Song>, PlaylistError> {
        self.state.borrow_mut().remove_at(index)
    }

    /// Removes several display positions, in the order given.
    ///
    /// **The caller must pass `indexes` sorted in descending order.** Each
    /// removal shifts every later position down by one, so any other order
    /// removes the wrong songs or fails part way through.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::IndexOutOfRange`] without removing anything
    /// if any index would be out of range when its turn comes, that is if
    /// the k-th index is not below the current length minus k.
    pub fn remove_many(&self, indexes: &[usize]) -> Result<(), PlaylistError> {
        self.state.borrow_mut().remove_many(indexes)
    }

    /// Removes every song and resets the cursor.
    pub fn remove_all(&self) {
        self.state.borrow_mut().remove_all();
    }

    /// Advances the cursor, wrapping to the start.
    pub fn next(&self) -> Option<Rc<Song>> {
        self.state.borrow_mut().next()
    }

    /// Moves the cursor back, wrapping to the end.
    pub fn previous(&self) -> Option<Rc<Song>> {
        self.state.borrow_mut().previous()
    }

    /// Picks a displayed song at random. The cursor does not move.
    pub fn random(&self) -> Option<Rc<Song>> {
        self.state.borrow_mut().random()
    }

    /// Sorts the display order in response to a column being clicked.
    ///
    /// Clicking the active column again flips the direction, any other
    /// column sorts ascending. Membership order is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::UnknownField`] if `field` is not a sortable
    /// field. Nothing is changed in that case.
    pub fn sort_by(&self, column: ColumnId, field: &str) -> Result<(), PlaylistError> {
        self.state.borrow_mut().sort_by(column, field)
    }

    /// Returns the songs ordered by `field` without changing the playlist.
    pub fn sorted(&self, field: &str, direction: SortDirection) -> Result<Vec<Rc<Song>>, PlaylistError> {
        let entries = self.state.borrow().index.sort(field, direction)?;
        Ok(entries.into_iter().map(|e| e.song).collect())
    }

    /// Clears the sort and shows every member that resolves, in membership
    /// order.
    pub fn show_all(&self) {
        let mut state = self.state.borrow_mut();
        state.sort = SortState::default();
        state.resolve_all();
        state.materialize();
    }
}

fn evict_callback(state: Weak<RefCell<State>>) -> impl Fn(&HashSet<SongKey>) {
    move |removed| {
        let Some(state) = state.upgrade() else {
            return;
        };

        match state.try_borrow_mut() {
            Ok(mut state) => state.evict_missing(removed),
            Err(_) => error!("Library changed while a playlist was being modified"),
        }
    }
}
