//! Filenames for saved `.torrent` files.
//!
//! Names are derived from the release title, with characters that are
//! invalid on common filesystems replaced.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Extension appended to every saved torrent.
pub const TORRENT_EXTENSION: &str = ".torrent";

/// Maps one release-title character to its filesystem-safe replacement.
///
/// `/` becomes `-` so titles like `Pitfall II / Lost Caverns` stay readable;
/// every other reserved character becomes `_`.
fn map_char(c: char) -> char {
    match c {
        '/' => '-',
        '[' | ']' | '\\' | '"' | '*' | '?' | '<' | '>' | '|' | ':' => '_',
        c if c.is_control() => '_',
        c => c,
    }
}

/// Sanitizes a release title into a filename stem (no extension).
#[must_use]
pub fn sanitize_release_title(title: &str) -> String {
    title.trim().chars().map(map_char).collect()
}

/// Builds the `.torrent` filename for a release.
///
/// Falls back to `torrent_<id>` when the title is empty or would resolve to
/// a relative path component such as `.` or `..`.
#[must_use]
pub fn torrent_filename(release_title: &str, torrent_id: u64) -> String {
    let stem = sanitize_release_title(release_title);
    let stem = if is_safe_filename_segment(&stem) {
        stem
    } else {
        format!("torrent_{torrent_id}")
    };
    format!("{stem}{TORRENT_EXTENSION}")
}

/// Builds the filename used when `torrent_filename` is already taken in this run.
#[must_use]
pub fn disambiguated_filename(release_title: &str, torrent_id: u64) -> String {
    let base = torrent_filename(release_title, torrent_id);
    let stem = base.strip_suffix(TORRENT_EXTENSION).unwrap_or(&base);
    format!("{stem}_{torrent_id}{TORRENT_EXTENSION}")
}

/// Picks a filename not yet in `used` and records it.
///
/// Tries [`torrent_filename`], then [`disambiguated_filename`], then the
/// disambiguated stem with a counter (`<title>_<id>_2.torrent`, ...).
pub fn unique_filename(used: &mut HashSet<String>, release_title: &str, torrent_id: u64) -> String {
    let plain = torrent_filename(release_title, torrent_id);
    if used.insert(plain.clone()) {
        return plain;
    }
    let with_id = disambiguated_filename(release_title, torrent_id);
    if used.insert(with_id.clone()) {
        return with_id;
    }
    let stem = with_id
        .strip_suffix(TORRENT_EXTENSION)
        .unwrap_or(&with_id)
        .to_string();
    let mut counter: u64 = 2;
    loop {
        let candidate = format!("{stem}_{counter}{TORRENT_EXTENSION}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Joins `filename` onto `dir`.
#[must_use]
pub fn torrent_path(dir: &Path, filename: &str) -> PathBuf {
    dir.join(filename)
}

fn is_safe_filename_segment(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
