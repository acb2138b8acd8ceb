//! Bundled asset access and sprite-sheet resolution.
//!
//! Everything under `assets/` is embedded into the binary. Lookups never fail on the game loop's
//! path: a missing image degrades to a flat-colored fallback and missing audio to silence.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Cursor;

use image::{ImageReader, ImageResult};
use parking_lot::Mutex;
use rust_embed::RustEmbed;
use strum_macros::{Display, IntoStaticStr};
use tracing::{trace, warn};

use crate::error::AssetError;

/// Path of the bundled difficulty table, relative to the asset root.
pub const DIFFICULTY_TABLE: &str = "difficulty.json";

/// Extensions accepted when resolving an image key.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];
const AUDIO_EXTENSIONS: &[&str] = &[".ogg", ".wav"];

/// Sheet layout assumed when a filename carries no `WxH` token.
pub const DEFAULT_SHEET_GRID: SheetGrid = SheetGrid { columns: 12, rows: 8 };

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Raw bytes of an embedded file.
pub fn get_asset_bytes(path: &str) -> Result<Cow<'static, [u8]>, AssetError> {
    Assets::get(path)
        .map(|file| file.data)
        .ok_or_else(|| AssetError::NotFound(path.to_string()))
}

pub fn get_asset_text(path: &str) -> Result<String, AssetError> {
    let bytes = get_asset_bytes(path)?;
    String::from_utf8(bytes.into_owned()).map_err(|_| AssetError::Encoding(path.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum AssetKind {
    Images,
    Audio,
}

/// `(kind, category, name)`, e.g. `(Images, "enemies", "nina")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub kind: AssetKind,
    pub category: String,
    pub name: String,
}

impl AssetKey {
    pub fn new(kind: AssetKind, category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            category: category.into(),
            name: name.into(),
        }
    }

    /// Builds an image key from a `category/name` sheet path.
    pub fn image(sheet: &str) -> Self {
        let (category, name) = sheet.split_once('/').unwrap_or(("", sheet));
        Self::new(AssetKind::Images, category, name)
    }

    pub fn sound(name: &str) -> Self {
        Self::new(AssetKind::Audio, "sfx", name)
    }

    pub fn music(name: &str) -> Self {
        Self::new(AssetKind::Audio, "music", name)
    }

    /// Directory prefix every matching file starts with.
    fn prefix(&self) -> String {
        format!("{}/{}/{}", self.kind, self.category, self.name)
    }
}

/// Columns and rows of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGrid {
    pub columns: u32,
    pub rows: u32,
}

impl SheetGrid {
    /// Infers the grid from a `WxH` token in the file name (`nina_4x2.png`), else the default.
    pub fn from_filename(filename: &str) -> Self {
        let stem = filename.rsplit('/').next().unwrap_or(filename);
        let stem = stem.split('.').next().unwrap_or(stem);
        stem.split(['_', '-', ' '])
            .find_map(Self::parse_token)
            .unwrap_or(DEFAULT_SHEET_GRID)
    }

    fn parse_token(token: &str) -> Option<Self> {
        let (w, h) = token.split_once(['x', 'X'])?;
        let columns = w.parse().ok().filter(|&c: &u32| c > 0)?;
        let rows = h.parse().ok().filter(|&r: &u32| r > 0)?;
        Some(Self { columns, rows })
    }

    pub fn frame_count(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Pixel rectangle of one frame within a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub grid: SheetGrid,
}

impl ImageHandle {
    /// Frame `index` in row-major order, wrapping past the last frame.
    pub fn frame_rect(&self, index: u16) -> FrameRect {
        let cell_w = self.width / self.grid.columns;
        let cell_h = self.height / self.grid.rows;
        let index = index as u32 % self.grid.frame_count().max(1);
        FrameRect {
            x: (index % self.grid.columns) * cell_w,
            y: (index / self.grid.columns) * cell_h,
            width: cell_w,
            height: cell_h,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// What the renderer gets for an image key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sprite {
    Image(ImageHandle),
    Fallback { color: Rgb },
}

pub trait AssetProvider {
    fn image(&self, key: &AssetKey) -> Sprite;

    /// Encoded audio bytes, or `None` when the clip should be skipped.
    fn audio(&self, key: &AssetKey) -> Option<Cow<'static, [u8]>>;
}

/// Resolves keys against the embedded files, remembering each answer.
#[derive(Default)]
pub struct AssetCatalog {
    resolved: Mutex<HashMap<AssetKey, Sprite>>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(key: &AssetKey, extensions: &[&str]) -> Option<String> {
        let prefix = key.prefix();
        Assets::iter()
            .find(|path| path.starts_with(&prefix) && extensions.iter().any(|ext| path.ends_with(ext)))
            .map(|path| path.into_owned())
    }

    fn load_image(key: &AssetKey) -> Option<ImageHandle> {
        let path = Self::find(key, IMAGE_EXTENSIONS)?;
        let bytes = get_asset_bytes(&path).ok()?;
        let (width, height) = match image_dimensions(&bytes) {
            Ok(dimensions) => dimensions,
            Err(e) => {
                warn!(%path, error = %e, "Unreadable image header");
                return None;
            }
        };
        Some(ImageHandle {
            grid: SheetGrid::from_filename(&path),
            path,
            width,
            height,
        })
    }

    /// Deterministic flat color per category so fallbacks stay distinguishable.
    pub fn fallback_color(key: &AssetKey) -> Rgb {
        match key.category.as_str() {
            "player" => Rgb(240, 200, 60),
            "enemies" => match key.name.as_str() {
                "andy" => Rgb(90, 170, 255),
                "soul" => Rgb(230, 230, 255),
                "grime_soul" => Rgb(120, 160, 80),
                "tar_soul" => Rgb(70, 40, 90),
                "nina" => Rgb(230, 60, 60),
                _ => Rgb(200, 80, 200),
            },
            "markers" => Rgb(130, 130, 130),
            "effects" => Rgb(255, 150, 40),
            _ => Rgb(255, 0, 255),
        }
    }
}

impl AssetProvider for AssetCatalog {
    fn image(&self, key: &AssetKey) -> Sprite {
        let mut resolved = self.resolved.lock();
        if let Some(sprite) = resolved.get(key) {
            return sprite.clone();
        }

        let sprite = match Self::load_image(key) {
            Some(handle) => {
                trace!(path = %handle.path, grid = ?handle.grid, "Resolved sprite sheet");
                Sprite::Image(handle)
            }
            None => {
                warn!(category = %key.category, name = %key.name, "Missing image, using fallback");
                Sprite::Fallback {
                    color: Self::fallback_color(key),
                }
            }
        };
        resolved.insert(key.clone(), sprite.clone());
        sprite
    }

    fn audio(&self, key: &AssetKey) -> Option<Cow<'static, [u8]>> {
        let path = Self::find(key, AUDIO_EXTENSIONS)?;
        get_asset_bytes(&path).ok()
    }
}

/// Width and height from an encoded image's header. The format is sniffed from the bytes.
fn image_dimensions(bytes: &[u8]) -> ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, RgbaImage};

    use super::*;

    #[test]
    fn test_sheet_grid_from_filename() {
        assert_eq!(
            SheetGrid::from_filename("images/enemies/nina_4x2.png"),
            SheetGrid { columns: 4, rows: 2 }
        );
        assert_eq!(SheetGrid::from_filename("soul.png"), DEFAULT_SHEET_GRID);
        assert_eq!(SheetGrid::from_filename("box_0x3.png"), DEFAULT_SHEET_GRID);
    }

    #[test]
    fn test_frame_rect_wraps() {
        let handle = ImageHandle {
            path: "x".into(),
            width: 64,
            height: 32,
            grid: SheetGrid { columns: 4, rows: 2 },
        };
        assert_eq!(
            handle.frame_rect(5),
            FrameRect {
                x: 16,
                y: 16,
                width: 16,
                height: 16
            }
        );
        assert_eq!(handle.frame_rect(8), handle.frame_rect(0));
    }

    #[test]
    fn test_missing_image_falls_back() {
        let catalog = AssetCatalog::new();
        let key = AssetKey::image("enemies/does_not_exist");
        assert!(matches!(catalog.image(&key), Sprite::Fallback { .. }));
        assert!(catalog.audio(&AssetKey::sound("does_not_exist")).is_none());
    }

    #[test]
    fn test_image_dimensions_from_encoded_bytes() {
        let mut encoded = Cursor::new(Vec::new());
        RgbaImage::new(48, 16)
            .write_to(&mut encoded, ImageFormat::Png)
            .expect("encode png");
        assert_eq!(image_dimensions(encoded.get_ref()).ok(), Some((48, 16)));
        assert!(image_dimensions(b"not an image").is_err());
    }
}
