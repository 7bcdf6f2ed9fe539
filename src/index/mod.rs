//! Top-level index page updater.

pub mod html;

pub use html::{
    DIRECTORIES_END_MARKER, DIRECTORIES_START_MARKER, IndexOutcome, merge_index, render_default_index,
    render_directory_list, update_index,
};
