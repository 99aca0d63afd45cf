//! Mirror writing: page directories, HTML snapshots and media files

// Module declarations
mod html_saver;
pub mod media_saver;
mod page_dir;

pub use html_saver::write_html;
pub use media_saver::{MediaSaveOutcome, is_capturable_image, media_file_name, save_media_if_absent};
pub use page_dir::{PageDirs, prepare_page_dir};
