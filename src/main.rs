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

//! # Playlist command line.
//!
//! Scans the configured media directories into a library, opens the startup
//! playlist (importing the media directories into it if it is new), applies
//! an optional sort, prints it and saves it again.
//!
//! ```text
//! tracklist [--sort FIELD] [--desc] [--import DIR]... [--random]
//! ```

use std::{path::Path, rc::Rc};

use anyhow::{Context, Result, bail};
use log::{LevelFilter, error, info, warn};

use tracklist::{
    config::{self, AppConfig},
    library::{Library, scan},
    playlist::{Playlist, import, persist},
    util::format::format_row,
};

/// Parsed command line options.
#[derive(Debug, Default)]
struct Options {
    sort: Option<String>,
    descending: bool,
    imports: Vec<String>,
    random: bool,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Options::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--sort" => options.sort = Some(args.next().context("--sort needs a field")?),
                "--desc" => options.descending = true,
                "--import" => options.imports.push(args.next().context("--import needs a folder")?),
                "--random" => options.random = true,
                other => bail!("Unknown argument {other:?}"),
            }
        }

        Ok(options)
    }
}

/// The entry point of the application.
fn main() -> Result<()> {
    let config = config::load_config();
    init_logging(&config);

    // Writes the defaults out on first run, and any newly added settings
    // after an upgrade.
    if let Err(e) = config::save_config(&config) {
        warn!("Failed to save configuration: {}", e);
    }

    let options = Options::parse(std::env::args().skip(1))?;

    run(&config, &options).context("Application error occurred")
}

fn init_logging(config: &AppConfig) {
    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = colog::default_builder();
    builder.filter(None, level);
    builder.init();
}

fn run(config: &AppConfig, options: &Options) -> Result<()> {
    let library = Rc::new(Library::new());
    let count = scan::scan_media_dirs(&library, &config.media_dirs);
    info!("Library holds {} songs", count);

    let playlist_dir = Path::new(&config.playlist_dir);
    let playlist = persist::load_or_create(playlist_dir, &config.startup_playlist, library.clone());

    if playlist.member_count() == 0 {
        for dir in &config.media_dirs {
            import_folder(&playlist, dir);
        }
    }

    for dir in &options.imports {
        import_folder(&playlist, dir);
    }

    if let Some(field) = &options.sort {
        playlist.sort_by(0, field)?;
        if options.descending {
            playlist.sort_by(0, field)?;
        }
    }

    print_playlist(&playlist);

    if options.random {
        if let Some(song) = playlist.random() {
            println!("Random pick: {}", song.display_title());
        }
    }

    persist::save(&playlist, playlist_dir)
        .with_context(|| format!("Failed to save playlist {}", playlist.name()))?;

    Ok(())
}

fn import_folder(playlist: &Playlist, dir: &str) {
    if let Err(e) = import::add_folder(playlist, Path::new(dir)) {
        error!("Add folder to playlist failed: {:#}", anyhow::Error::from(e));
    }
}

fn print_playlist(playlist: &Playlist) {
    let current = playlist.current_index();

    println!("{} ({} songs)", playlist.name(), playlist.len());
    for (i, song) in playlist.songs().iter().enumerate() {
        println!("{}", format_row(i, song, i == current));
    }
}
