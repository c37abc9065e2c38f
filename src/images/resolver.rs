use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ResolveError, Result};
use crate::images::types::{is_supported_image, ImageAsset, OrderedImageSequence};

/// Discovers the input images and applies the requested ordering
pub struct ImageSetResolver {
    directory: PathBuf,
}

impl ImageSetResolver {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Produce the playback order.
    ///
    /// With an empty `order` every supported image is used, sorted by file
    /// name. Otherwise the requested names are looked up one by one; names
    /// that are not present are skipped with a warning, and the run only
    /// fails when none of them exist.
    pub fn resolve(&self, order: &[String]) -> Result<OrderedImageSequence> {
        let available = self.discover()?;

        let sequence = if order.is_empty() {
            let mut images: Vec<ImageAsset> = available.into_values().collect();
            images.sort_by(|a, b| a.name.cmp(&b.name));
            OrderedImageSequence::new(images)
        } else {
            let mut images = Vec::with_capacity(order.len());
            let mut missing = Vec::new();

            for name in order {
                match available.get(name) {
                    Some(image) => images.push(image.clone()),
                    None => missing.push(name.clone()),
                }
            }

            if !missing.is_empty() {
                warn!("Some specified images not found: {:?}", missing);
            }

            if images.is_empty() {
                return Err(ResolveError::NoOrderedImagesFound {
                    requested: order.to_vec(),
                }
                .into());
            }

            OrderedImageSequence::new(images).with_skipped(missing)
        };

        info!("Using {} images in order:", sequence.len());
        for image in sequence.iter() {
            info!("  - {}", image.name);
        }

        Ok(sequence)
    }

    /// All supported images in the directory, keyed by file name
    fn discover(&self) -> Result<HashMap<String, ImageAsset>> {
        let directory = &self.directory;

        if !directory.is_dir() {
            return Err(ResolveError::DirectoryNotFound {
                path: directory.display().to_string(),
            }
            .into());
        }

        let mut available = HashMap::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();

            if !path.is_file() || !is_supported_image(&path) {
                continue;
            }

            match ImageAsset::from_path(&path) {
                Some(image) => {
                    available.insert(image.name.clone(), image);
                }
                None => debug!("Skipping file with non UTF-8 name: {:?}", path),
            }
        }

        if available.is_empty() {
            return Err(ResolveError::NoImagesFound {
                path: directory.display().to_string(),
            }
            .into());
        }

        debug!("Discovered {} images in {:?}", available.len(), directory);
        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"not decoded here").unwrap();
    }

    fn names(order: &[&str]) -> Vec<String> {
        order.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lexicographic_when_no_order() {
        let dir = tempdir().unwrap();
        for name in ["c.png", "a.jpg", "b.JPEG", "notes.txt", "logo.svg"] {
            touch(dir.path(), name);
        }

        let sequence = ImageSetResolver::new(dir.path()).resolve(&[]).unwrap();
        assert_eq!(sequence.names(), vec!["a.jpg", "b.JPEG", "c.png"]);
        assert!(sequence.skipped().is_empty());
    }

    #[test]
    fn test_explicit_order_skips_missing() {
        let dir = tempdir().unwrap();
        for name in ["llm_talk.jpg", "spline_talk.jpg", "group.jpg"] {
            touch(dir.path(), name);
        }

        let order = names(&["spline_talk.jpg", "missing.jpg", "llm_talk.jpg"]);
        let sequence = ImageSetResolver::new(dir.path()).resolve(&order).unwrap();

        assert_eq!(sequence.names(), vec!["spline_talk.jpg", "llm_talk.jpg"]);
        assert_eq!(sequence.skipped(), &["missing.jpg".to_string()]);
    }

    #[test]
    fn test_explicit_order_with_nothing_found() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.jpg");

        let result = ImageSetResolver::new(dir.path()).resolve(&names(&["x.jpg", "y.jpg"]));
        assert!(matches!(
            result,
            Err(ReelError::Resolve(ResolveError::NoOrderedImagesFound { .. }))
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "readme.md");

        let result = ImageSetResolver::new(dir.path()).resolve(&[]);
        assert!(matches!(
            result,
            Err(ReelError::Resolve(ResolveError::NoImagesFound { .. }))
        ));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let result = ImageSetResolver::new(dir.path().join("nope")).resolve(&[]);
        assert!(matches!(
            result,
            Err(ReelError::Resolve(ResolveError::DirectoryNotFound { .. }))
        ));
    }

    #[test]
    fn test_directories_named_like_images_are_ignored() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder.jpg")).unwrap();
        touch(dir.path(), "real.jpg");

        let sequence = ImageSetResolver::new(dir.path()).resolve(&[]).unwrap();
        assert_eq!(sequence.names(), vec!["real.jpg"]);
    }
}
