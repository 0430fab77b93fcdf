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

//! The song library.
//!
//! Playlists never own song data. They read it through the [`ItemStore`]
//! trait and subscribe to its removal notifications so they can evict songs
//! that disappear from the library.
//!
//! Notifications are delivered synchronously: by the time a mutating call on
//! the store returns, every subscriber has finished reacting to it.

pub mod scan;

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::{Rc, Weak},
};

use log::debug;

use crate::model::{Song, SongKey};

/// Read access to a collection of songs keyed by path.
pub trait ItemStore {
    /// Looks up the song stored under `key`.
    fn lookup(&self, key: &str) -> Option<Rc<Song>>;

    fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Registers `callback` to be invoked with the keys removed from the
    /// store. The callback stays registered until the returned
    /// [`Subscription`] is dropped.
    fn on_removed(&self, callback: Box<dyn Fn(&HashSet<SongKey>)>) -> Subscription;
}

type RemovalCallback = Rc<dyn Fn(&HashSet<SongKey>)>;

#[derive(Default)]
struct ListenerList {
    next_id: u64,
    callbacks: Vec<(u64, RemovalCallback)>,
}

/// A set of removal callbacks, for use by [`ItemStore`] implementations.
#[derive(Default)]
pub struct RemovalListeners {
    list: Rc<RefCell<ListenerList>>,
}

impl RemovalListeners {
    pub fn subscribe(&self, callback: Box<dyn Fn(&HashSet<SongKey>)>) -> Subscription {
        let mut list = self.list.borrow_mut();
        let id = list.next_id;
        list.next_id += 1;
        list.callbacks.push((id, Rc::from(callback)));

        Subscription {
            list: Rc::downgrade(&self.list),
            id,
        }
    }

    /// Invokes every registered callback with `removed`.
    ///
    /// Callbacks may subscribe or unsubscribe while being notified; such
    /// changes take effect from the next notification.
    pub fn notify(&self, removed: &HashSet<SongKey>) {
        let callbacks: Vec<RemovalCallback> = self
            .list
            .borrow()
            .callbacks
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(removed);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.list.borrow().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a removal callback registered. Dropping it unsubscribes.
pub struct Subscription {
    list: Weak<RefCell<ListenerList>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            list.borrow_mut().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

/// An in-memory library of songs.
///
/// Shared behind an [`Rc`] with any playlists drawing from it.
#[derive(Default)]
pub struct Library {
    songs: RefCell<HashMap<SongKey, Rc<Song>>>,
    listeners: RemovalListeners,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `song`, replacing any song already stored under the same path.
    ///
    /// Playlists holding the replaced song keep the old copy until it is
    /// removed and re-added.
    pub fn insert(&self, song: Song) -> Rc<Song> {
        let song = Rc::new(song);
        self.songs
            .borrow_mut()
            .insert(song.path.clone(), Rc::clone(&song));
        song
    }

    /// Removes songs by key and notifies subscribers of the keys that were
    /// actually present.
    ///
    /// Returns the number of songs removed.
    pub fn remove<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let removed: HashSet<SongKey> = {
            let mut songs = self.songs.borrow_mut();
            keys.into_iter()
                .filter_map(|key| songs.remove(key.as_ref()).map(|song| song.path.clone()))
                .collect()
        };

        if !removed.is_empty() {
            debug!("Removed {} songs from the library", removed.len());
            self.listeners.notify(&removed);
        }

        removed.len()
    }

    pub fn len(&self) -> usize {
        self.songs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every key in the library, sorted.
    pub fn keys(&self) -> Vec<SongKey> {
        let mut keys: Vec<SongKey> = self.songs.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of live removal subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ItemStore for Library {
    fn lookup(&self, key: &str) -> Option<Rc<Song>> {
        self.songs.borrow().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.songs.borrow().contains_key(key)
    }

    fn on_removed(&self, callback: Box<dyn Fn(&HashSet<SongKey>)>) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_lookup_and_remove() {
        let library = Library::new();
        library.insert(Song::new("a.mp3", "a"));
        library.insert(Song::new("b.mp3", "b"));

        assert!(library.contains("a.mp3"));
        assert_eq!(library.lookup("b.mp3").unwrap().display_title(), "b");

        assert_eq!(library.remove(["a.mp3", "missing.mp3"]), 1);
        assert!(!library.contains("a.mp3"));
        assert_eq!(library.keys(), vec!["b.mp3".to_string()]);
    }

    #[test]
    fn test_subscribers_see_removed_keys() {
        let library = Library::new();
        library.insert(Song::new("a.mp3", "a"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = library.on_removed(Box::new(move |keys| {
            sink.borrow_mut().extend(keys.iter().cloned());
        }));

        library.remove(["a.mp3"]);
        assert_eq!(*seen.borrow(), vec!["a.mp3".to_string()]);
    }

    #[test]
    fn test_no_notification_when_nothing_removed() {
        let library = Library::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _subscription = library.on_removed(Box::new(move |_| counter.set(counter.get() + 1)));

        library.remove(["missing.mp3"]);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let library = Library::new();
        library.insert(Song::new("a.mp3", "a"));

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let subscription = library.on_removed(Box::new(move |_| counter.set(counter.get() + 1)));
        assert_eq!(library.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(library.subscriber_count(), 0);

        library.remove(["a.mp3"]);
        assert_eq!(calls.get(), 0);
    }
}
