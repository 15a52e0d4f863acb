/// Input acquisition
///
/// This module handles:
/// - Drop target highlight and first-file selection (drop_zone.rs)
/// - Reading candidate files and checking they are images (acquire.rs)

pub mod acquire;
pub mod drop_zone;

pub use acquire::{check_extension, load_source, PICKER_EXTENSIONS};
pub use drop_zone::DropZone;
