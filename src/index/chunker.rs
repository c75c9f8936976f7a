//! Recursive character chunker.
//!
//! Splits document text on progressively finer separators (paragraph, line,
//! sentence, word) so chunk boundaries land on natural breaks, merging pieces
//! back up to the configured chunk size with a character overlap between
//! consecutive chunks.

use crate::rag::types::Passage;

/// Separator preference order; when none matches, text is window-split
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            // Overlap must leave room for new content in every chunk
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    /// Split one text into chunks of at most `chunk_size` characters
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    /// Split every document, carrying metadata through to its chunks
    pub fn chunk_documents(&self, documents: &[Passage]) -> Vec<Passage> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split(&doc.text)
                    .into_iter()
                    .map(|chunk| Passage::new(chunk, doc.metadata.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((sep, rest)) = separators.split_first() else {
            return self.window_split(text);
        };
        if !text.contains(*sep) {
            return self.split_with(text, rest);
        }

        let parts: Vec<&str> = text.split_inclusive(*sep).collect();
        self.merge(&parts, rest)
    }

    /// Greedily merge split parts into chunks, seeding each new chunk with
    /// the tail of the previous one when the overlap fits
    fn merge(&self, parts: &[&str], rest: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for part in parts {
            let part_len = char_len(part);

            if part_len > self.chunk_size {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                chunks.extend(self.split_with(part, rest));
                continue;
            }

            if current_len + part_len > self.chunk_size && !current.is_empty() {
                let carry = tail_chars(&current, self.chunk_overlap);
                chunks.push(std::mem::take(&mut current));
                if char_len(&carry) + part_len <= self.chunk_size {
                    current = carry;
                }
                current_len = char_len(&current);
            }

            current.push_str(part);
            current_len += part_len;
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Fallback for text with no usable separators: fixed windows advancing
    /// by `chunk_size - chunk_overlap`
    fn window_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = (self.chunk_size - self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn tail_chars(text: &str, n: usize) -> String {
    let len = char_len(text);
    text.chars().skip(len.saturating_sub(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = TextChunker::new(512, 64);
        let chunks = chunker.split("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let chunker = TextChunker::new(512, 64);
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_splits_on_paragraph_boundary() {
        let a = "a".repeat(100);
        let b = "b".repeat(100);
        let text = format!("{a}\n\n{b}");

        let chunker = TextChunker::new(120, 20);
        let chunks = chunker.split(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], a);
        assert!(chunks.iter().all(|c| c.chars().count() <= 120));
        // Second chunk carries overlap from the first
        assert!(chunks[1].starts_with("aa"));
        assert!(chunks[1].contains(&b));
    }

    #[test]
    fn test_window_split_without_separators() {
        let text = "x".repeat(300);
        let chunker = TextChunker::new(100, 10);
        let chunks = chunker.split(&text);

        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_sentence_level_split() {
        let sentences: Vec<String> = (0..5)
            .map(|i| format!("Sentence number {} padded with some words", i))
            .collect();
        let text = sentences.join(". ");

        let chunker = TextChunker::new(100, 10);
        let chunks = chunker.split(&text);

        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        let joined = chunks.join(" ");
        for i in 0..5 {
            assert!(joined.contains(&format!("Sentence number {}", i)));
        }
    }

    #[test]
    fn test_chunk_documents_carries_metadata() {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("policy.txt"));
        metadata.insert("page_number".to_string(), json!(2));
        let doc = Passage::new("p".repeat(300), metadata.clone());

        let chunker = TextChunker::new(100, 10);
        let chunks = chunker.chunk_documents(&[doc]);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.metadata == metadata));
    }
}
