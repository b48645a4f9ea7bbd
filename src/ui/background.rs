//! Controller background image
//!
//! Loaded once at startup. A missing or unreadable file is not an error for
//! the application: the overlay simply draws without a background.

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions, Vec2};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("Background image {0} not found")]
    NotFound(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Uploaded background texture and its pixel size
pub struct Background {
    pub size: Vec2,
    pub texture: TextureHandle,
}

/// Decodes the image at `path` (see [`resolve`]) and uploads it
///
/// Returns `None` after logging a warning if anything goes wrong.
pub fn load(ctx: &egui::Context, path: &Path) -> Option<Background> {
    match decode(path) {
        Ok(image) => {
            let size = Vec2::new(image.size[0] as f32, image.size[1] as f32);
            info!(
                "Loaded background {} ({}x{})",
                path.display(),
                image.size[0],
                image.size[1]
            );
            let texture = ctx.load_texture("controller-background", image, TextureOptions::LINEAR);
            Some(Background { size, texture })
        }
        Err(e) => {
            warn!("{}, drawing without background", e);
            None
        }
    }
}

pub fn decode(path: &Path) -> Result<ColorImage, BackgroundError> {
    let resolved = resolve(path).ok_or_else(|| BackgroundError::NotFound(path.to_path_buf()))?;
    debug!("Decoding background from {}", resolved.display());

    let rgba = image::open(&resolved)
        .map_err(|source| BackgroundError::Decode {
            path: resolved.clone(),
            source,
        })?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Finds the image relative to the working directory, then next to the executable
pub fn resolve(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    let mut candidates = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        candidates.push(cwd.join(path));
    }
    if let Some(exe_dir) = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        candidates.push(exe_dir.join(path));
    }

    candidates.into_iter().find(|candidate| candidate.is_file())
}
