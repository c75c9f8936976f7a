//! Document loading for the offline index build.
//!
//! Reads plain-text and markdown files from the data directory. Form feeds
//! (`\x0c`) act as page breaks; each page becomes one document tagged with
//! its source file name and 1-based page number.

use crate::errors::Result;
use crate::rag::types::Passage;
use serde_json::{json, Map};
use std::fs;
use std::path::Path;
use tracing::info;

const PAGE_BREAK: char = '\x0c';

/// Load all documents from a directory, in stable (sorted) file order
pub fn load_documents(data_dir: &Path) -> Result<Vec<Passage>> {
    let mut paths: Vec<_> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            )
        })
        .collect();
    paths.sort();

    info!(dir = %data_dir.display(), files = paths.len(), "loading source documents");

    let mut documents = Vec::new();
    for path in &paths {
        let contents = fs::read_to_string(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for (page_index, page) in contents.split(PAGE_BREAK).enumerate() {
            if page.trim().is_empty() {
                continue;
            }
            let mut metadata = Map::new();
            metadata.insert("source".to_string(), json!(source));
            metadata.insert("page_number".to_string(), json!(page_index + 1));
            documents.push(Passage::new(page.to_string(), metadata));
        }
    }

    info!(pages = documents.len(), "documents loaded");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_loads_txt_and_md_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha content").unwrap();
        fs::write(dir.path().join("b.md"), "beta content").unwrap();
        fs::write(dir.path().join("c.pdf"), "ignored").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata["source"], "a.txt");
        assert_eq!(docs[1].metadata["source"], "b.md");
    }

    #[test]
    fn test_page_numbers_are_one_based() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("doc.txt"), "page one\x0cpage two").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].metadata["page_number"], 1);
        assert_eq!(docs[1].metadata["page_number"], 2);
        assert_eq!(docs[0].text, "page one");
        assert_eq!(docs[1].text, "page two");
    }

    #[test]
    fn test_blank_pages_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("doc.txt"), "content\x0c  \x0cmore").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        // Page numbering reflects position in the file, not the kept count
        assert_eq!(docs[1].metadata["page_number"], 3);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let docs = load_documents(dir.path()).unwrap();
        assert!(docs.is_empty());
    }
}
