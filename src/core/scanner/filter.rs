//! Entry filtering for the source walk.

use std::path::Path;

/// Decides which directory entries take part in an import
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    /// Whether to include hidden files and directories
    include_hidden: bool,
}

impl SourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include hidden entries (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// True for `.`, `..` and dot-files
    pub fn is_hidden(path: &Path) -> bool {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.starts_with('.'),
            // `..` and `/` have no file name
            None => true,
        }
    }

    /// Check if an entry should be walked into or imported
    pub fn should_include(&self, path: &Path) -> bool {
        if Self::is_hidden(path) {
            return self.include_hidden
                && !matches!(path.file_name().and_then(|n| n.to_str()), Some(".") | Some("..") | None);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_files_are_included() {
        let filter = SourceFilter::new();
        assert!(filter.should_include(Path::new("/dump/IMG_0001.JPG")));
        assert!(filter.should_include(Path::new("/dump/no_extension")));
    }

    #[test]
    fn hidden_excluded_by_default() {
        let filter = SourceFilter::new();
        assert!(!filter.should_include(Path::new("/dump/.DS_Store")));
        assert!(!filter.should_include(Path::new("/dump/._IMG_0001.JPG")));
        assert!(!filter.should_include(Path::new("/dump/..")));
    }

    #[test]
    fn hidden_can_be_included() {
        let filter = SourceFilter::new().with_hidden(true);
        assert!(filter.should_include(Path::new("/dump/.hidden.jpg")));
        assert!(!filter.should_include(Path::new("/dump/..")));
    }
}
