use ab_glyph::FontVec;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

/// Searched in order when no font path is configured.
pub const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn find_system_font() -> Option<PathBuf> {
    FALLBACK_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Loads `path`, or the first available system font when `None`.
pub fn load_font(path: Option<&Path>) -> Result<FontVec> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match find_system_font() {
            Some(p) => p,
            None => bail!(
                "no usable font found; set display.font_path (looked in {})",
                FALLBACK_FONTS.join(", ")
            ),
        },
    };
    let bytes =
        std::fs::read(&path).with_context(|| format!("reading font {}", path.display()))?;
    let font = FontVec::try_from_vec(bytes)
        .with_context(|| format!("parsing font {}", path.display()))?;
    info!(path = %path.display(), "font loaded");
    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let err = load_font(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn garbage_is_not_a_font() {
        let dir = std::env::temp_dir().join(format!("cogex-font-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bogus.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(load_font(Some(&path)).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
