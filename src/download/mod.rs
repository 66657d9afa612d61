//! Saving `.torrent` files to the output directory.
//!
//! - [`filename`] turns release titles into safe filenames
//! - [`save_response`] streams a download response to disk, removing the
//!   partial file on failure

pub mod filename;
mod writer;

pub use filename::{
    TORRENT_EXTENSION, disambiguated_filename, sanitize_release_title, torrent_filename,
    torrent_path, unique_filename,
};
pub use writer::save_response;
