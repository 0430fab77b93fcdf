//! End-to-end behaviour of playlists over a shared library.

use std::{rc::Rc, time::Duration};

use tracklist::{
    error::PlaylistError,
    library::Library,
    model::{Song, SortDirection},
    playlist::Playlist,
};

fn song(path: &str, title: &str, artist: &str) -> Song {
    Song {
        artist: Some(artist.to_string()),
        ..Song::new(path, title)
    }
}

fn paths(songs: &[Rc<Song>]) -> Vec<String> {
    songs.iter().map(|s| s.path.clone()).collect()
}

#[test]
fn test_artist_sort_keeps_relative_order_of_equal_songs() {
    let library = Library::new();
    library.insert(song("1.mp3", "one", "B"));
    library.insert(song("2.mp3", "two", "A"));
    library.insert(song("3.mp3", "three", "A"));
    let library = Rc::new(library);

    let keys = vec!["1.mp3".into(), "2.mp3".into(), "3.mp3".into()];
    let playlist = Playlist::with_keys(library.clone(), "scenario", keys);

    let sorted = playlist.sorted("artist", SortDirection::Ascending).unwrap();
    assert_eq!(paths(&sorted), vec!["2.mp3", "3.mp3", "1.mp3"]);
}

#[test]
fn test_descending_is_reverse_except_within_album_groups() {
    let library = Library::new();
    let mut keys = Vec::new();
    for (i, (title, album, track)) in [("x", "A", 2), ("y", "B", 1), ("z", "A", 1), ("w", "C", 1)]
        .into_iter()
        .enumerate()
    {
        let path = format!("{i}.mp3");
        library.insert(Song {
            album: Some(album.to_string()),
            track_number: Some(track),
            ..Song::new(path.as_str(), title)
        });
        keys.push(path);
    }
    let library = Rc::new(library);
    let playlist = Playlist::with_keys(library.clone(), "albums", keys);

    let mut asc = paths(&playlist.sorted("title", SortDirection::Ascending).unwrap());
    let desc = paths(&playlist.sorted("title", SortDirection::Descending).unwrap());
    asc.reverse();
    assert_eq!(asc, desc);

    let asc = paths(&playlist.sorted("album", SortDirection::Ascending).unwrap());
    let desc = paths(&playlist.sorted("album", SortDirection::Descending).unwrap());
    assert_eq!(asc, vec!["2.mp3", "0.mp3", "1.mp3", "3.mp3"]);
    assert_eq!(desc, vec!["3.mp3", "1.mp3", "2.mp3", "0.mp3"]);
}

#[test]
fn test_sort_is_idempotent() {
    let library = Library::new();
    for (path, title) in [("1.mp3", "b"), ("2.mp3", "a"), ("3.mp3", "b")] {
        library.insert(Song {
            duration: Duration::from_secs(title.len() as u64 * 60),
            ..Song::new(path, title)
        });
    }
    let library = Rc::new(library);
    let keys = library.keys();
    let playlist = Playlist::with_keys(library.clone(), "idem", keys);

    let first = playlist.sorted("title", SortDirection::Descending).unwrap();
    let second = playlist.sorted("title", SortDirection::Descending).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_library_removal_of_duplicated_key() {
    let library = Library::new();
    for path in ["a.mp3", "b.mp3", "c.mp3"] {
        library.insert(Song::new(path, path));
    }
    let library = Rc::new(library);

    let keys = ["a.mp3", "b.mp3", "a.mp3", "c.mp3"]
        .iter()
        .map(|k| k.to_string())
        .collect();
    let playlist = Playlist::with_keys(library.clone(), "dupes", keys);
    playlist.set_current_index(3).unwrap();

    library.remove(["a.mp3"]);

    assert_eq!(playlist.member_keys(), vec!["b.mp3", "c.mp3"]);
    assert_eq!(paths(&playlist.songs()), vec!["b.mp3", "c.mp3"]);
    assert_eq!(playlist.current_index(), 1);
    assert_eq!(playlist.current().unwrap().path, "c.mp3");
}

#[test]
fn test_unknown_field_leaves_display_order_alone() {
    let library = Library::new();
    library.insert(Song::new("b.mp3", "b"));
    library.insert(Song::new("a.mp3", "a"));
    let library = Rc::new(library);
    let playlist = Playlist::with_keys(library.clone(), "bogus", vec!["b.mp3".into(), "a.mp3".into()]);

    let before = playlist.songs();
    assert_eq!(
        playlist.sorted("bogus_field", SortDirection::Ascending),
        Err(PlaylistError::UnknownField("bogus_field".to_string()))
    );
    assert!(playlist.sort_by(3, "bogus_field").is_err());
    assert_eq!(playlist.songs(), before);
}

#[test]
fn test_null_genre_is_left_out_of_genre_sort_only() {
    let library = Library::new();
    library.insert(Song {
        genre: Some("Jazz".to_string()),
        ..Song::new("1.mp3", "one")
    });
    library.insert(Song::new("2.mp3", "two"));
    let library = Rc::new(library);
    let playlist = Playlist::with_keys(library.clone(), "genres", library.keys());

    let by_genre = playlist.sorted("genre", SortDirection::Ascending).unwrap();
    assert_eq!(paths(&by_genre), vec!["1.mp3"]);

    let by_title = playlist.sorted("title", SortDirection::Descending).unwrap();
    assert_eq!(paths(&by_title), vec!["2.mp3", "1.mp3"]);
}

#[test]
fn test_membership_and_display_stay_consistent() {
    let library = Library::new();
    for i in 0..6 {
        library.insert(Song::new(format!("{i}.mp3"), format!("song {i}")));
    }
    let library = Rc::new(library);

    let mut keys: Vec<String> = (0..6).map(|i| format!("{i}.mp3")).collect();
    keys.push("never-in-library.mp3".to_string());
    let playlist = Playlist::with_keys(library.clone(), "consistency", keys);

    let unresolved = |p: &Playlist| {
        p.member_keys()
            .iter()
            .filter(|k| !library.keys().contains(k))
            .count()
    };
    let check = |p: &Playlist| assert_eq!(p.len() + unresolved(p), p.member_count());

    check(&playlist);
    playlist.add_key("2.mp3");
    check(&playlist);
    playlist.remove_at(0).unwrap();
    check(&playlist);
    playlist.sort_by(0, "title").unwrap();
    check(&playlist);
    playlist.remove_many(&[4, 2]).unwrap();
    check(&playlist);
    library.remove(["5.mp3"]);
    check(&playlist);
    playlist.show_all();
    check(&playlist);
}

#[test]
fn test_cursor_after_remove_at() {
    let library = Library::new();
    for i in 0..5 {
        library.insert(Song::new(format!("{i}.mp3"), format!("{i}")));
    }
    let library = Rc::new(library);

    for cursor in 0..5 {
        for removed in 0..5 {
            let playlist = Playlist::with_keys(library.clone(), "cursor", library.keys());
            playlist.set_current_index(cursor).unwrap();
            playlist.remove_at(removed).unwrap();

            let expected = if cursor > removed {
                cursor - 1
            } else {
                cursor.min(playlist.len() - 1)
            };
            assert_eq!(playlist.current_index(), expected, "cursor {cursor}, removed {removed}");
        }
    }
}
