use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

use crate::logger::Logger;

/// Maps a file stem (the question id) to the image file name in one directory.
///
/// Built fresh on every run from the directory listing and never modified
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageIndex {
    entries: BTreeMap<String, String>,
}

impl ImageIndex {
    /// Indexes the regular files directly inside `dir` whose extension
    /// matches `extension`, ignoring case.
    ///
    /// A missing directory is not an error: a warning is printed and the
    /// index is empty, meaning "no images available".
    pub fn build(dir: &Path, extension: &str) -> Self {
        let mut index = ImageIndex::default();
        if !dir.is_dir() {
            Logger::warning(&format!("Image directory not found: {}", dir.display()));
            return index;
        }

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    Logger::warning(&format!("Skipping unreadable image entry: {}", e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !has_extension(path, extension) {
                continue;
            }
            let (Some(stem), Some(name)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.file_name().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            index.entries.insert(stem.to_string(), name.to_string());
        }
        index
    }

    /// Resolved file name for a question id
    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

impl FromIterator<(String, String)> for ImageIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ImageIndex {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
