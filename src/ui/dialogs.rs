/// Native dialogs: file picker, save dialog and blocking alerts

use std::path::PathBuf;
use std::sync::Arc;

use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};

use crate::error::{CompressorError, CompressorResult};
use crate::input::PICKER_EXTENSIONS;

/// Ask the user for an image; None if cancelled
pub async fn pick_image() -> Option<PathBuf> {
    AsyncFileDialog::new()
        .set_title("Select an image")
        .add_filter("Images", PICKER_EXTENSIONS)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Ask where to save the compressed image and write it there
pub async fn save_artifact(file_name: String, data: Arc<Vec<u8>>) -> CompressorResult<Option<PathBuf>> {
    let Some(handle) = AsyncFileDialog::new()
        .set_title("Save compressed image")
        .set_file_name(file_name)
        .save_file()
        .await
    else {
        return Ok(None);
    };

    let path = handle.path().to_path_buf();
    tokio::fs::write(&path, data.as_slice())
        .await
        .map_err(|e| CompressorError::download(format!("{}: {}", path.display(), e)))?;

    Ok(Some(path))
}

/// Show an error and wait until the user dismisses it
pub async fn alert(message: String) {
    let _ = AsyncMessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title("Image Compressor")
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show()
        .await;
}
