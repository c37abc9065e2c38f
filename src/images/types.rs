use std::path::{Path, PathBuf};

/// A still image on disk used as one slide of the reel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Path to the image file
    pub path: PathBuf,

    /// File name used for ordering and matching against the explicit order
    pub name: String,
}

impl ImageAsset {
    /// Create an asset from a path; returns `None` when the path has no UTF-8 file name
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Option<Self> {
        let path = path.into();
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self { path, name })
    }

    /// Lower-cased file extension
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }

    /// Check if this is a raster format the pipeline can decode
    pub fn is_supported(&self) -> bool {
        is_supported_image(&self.path)
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Case-insensitive match against the raster formats the `image` build supports
pub fn is_supported_image<P: AsRef<Path>>(path: P) -> bool {
    matches!(
        extension_of(path.as_ref()).as_deref(),
        Some("jpg") | Some("jpeg") | Some("png")
    )
}

/// The images of one reel, in playback order
#[derive(Debug, Clone, Default)]
pub struct OrderedImageSequence {
    images: Vec<ImageAsset>,
    skipped: Vec<String>,
}

impl OrderedImageSequence {
    /// Create a sequence from assets that are already ordered
    pub fn new(images: Vec<ImageAsset>) -> Self {
        Self { images, skipped: Vec::new() }
    }

    /// Record requested file names that were not present
    pub fn with_skipped(mut self, skipped: Vec<String>) -> Self {
        self.skipped = skipped;
        self
    }

    /// Get all images in playback order
    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    /// Requested file names that could not be found
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// File names in playback order
    pub fn names(&self) -> Vec<&str> {
        self.images.iter().map(|image| image.name.as_str()).collect()
    }

    /// Get the total number of images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Get images as an iterator
    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.images.iter()
    }
}

impl FromIterator<ImageAsset> for OrderedImageSequence {
    fn from_iter<I: IntoIterator<Item = ImageAsset>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_ignore_case() {
        assert!(is_supported_image("a.jpg"));
        assert!(is_supported_image("a.JPEG"));
        assert!(is_supported_image("a.Png"));
        assert!(!is_supported_image("a.gif"));
        assert!(!is_supported_image("a.svg"));
        assert!(!is_supported_image("jpg"));
    }

    #[test]
    fn test_asset_from_path() {
        let asset = ImageAsset::from_path("/photos/talk.JPG").unwrap();
        assert_eq!(asset.name, "talk.JPG");
        assert_eq!(asset.extension(), Some("jpg".to_string()));
        assert!(asset.is_supported());
    }
}
