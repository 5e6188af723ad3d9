use std::fmt;

use image::ImageFormat;

/// Image formats accepted into the scene catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneFormat {
    Png,
    Jpeg,
    Webp,
    Tiff,
}

impl SceneFormat {
    pub const ALL: [SceneFormat; 4] = [
        SceneFormat::Png,
        SceneFormat::Jpeg,
        SceneFormat::Webp,
        SceneFormat::Tiff,
    ];

    /// Detect the format from the leading magic bytes. Nothing is decoded.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Some(SceneFormat::Png),
            ImageFormat::Jpeg => Some(SceneFormat::Jpeg),
            ImageFormat::WebP => Some(SceneFormat::Webp),
            ImageFormat::Tiff => Some(SceneFormat::Tiff),
            _ => None,
        }
    }

    /// Extension used when the image is written to the catalog.
    pub fn extension(self) -> &'static str {
        match self {
            SceneFormat::Png => "png",
            SceneFormat::Jpeg => "jpg",
            SceneFormat::Webp => "webp",
            SceneFormat::Tiff => "tiff",
        }
    }

    /// Exact inverse of [`extension`](Self::extension). Aliases such as `jpeg`,
    /// `tif` or upper-case spellings are never written by the catalog and are
    /// not treated as catalog records.
    pub fn from_extension(ext: &str) -> Option<Self> {
        SceneFormat::ALL
            .into_iter()
            .find(|format| format.extension() == ext)
    }
}

impl fmt::Display for SceneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneFormat::Png => "PNG",
            SceneFormat::Jpeg => "JPEG",
            SceneFormat::Webp => "WebP",
            SceneFormat::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}
