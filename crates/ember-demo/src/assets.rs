use std::path::PathBuf;

use anyhow::{Context, Result};

pub const CHECKER: &str = "checker";

const CHECKER_SIZE: u32 = 256;
const CHECKER_CELL: u32 = 32;

/// Writes the demo's textures to a scratch directory (once) and returns it,
/// for use as the texture root.
pub fn prepare_textures() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join("ember-demo").join("textures");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join(format!("{CHECKER}.png"));
    if !path.exists() {
        checker_image()
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
    }
    Ok(dir)
}

fn checker_image() -> image::RgbaImage {
    image::RgbaImage::from_fn(CHECKER_SIZE, CHECKER_SIZE, |x, y| {
        if (x / CHECKER_CELL + y / CHECKER_CELL) % 2 == 0 {
            image::Rgba([230, 120, 40, 255])
        } else {
            image::Rgba([245, 235, 220, 255])
        }
    })
}
