//! Overlapping fixed-size text chunking for the offline index build.

#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// A text chunk with source information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    /// Source identifier (file name, page, record)
    pub source: String,
    /// Character offset in the original document
    pub start_offset: usize,
    pub chunk_index: usize,
}

pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split text into overlapping chunks, preferring to end a chunk on a
    /// sentence boundary near its end. Whitespace-only chunks are dropped.
    pub fn split(&self, text: &str, source: &str) -> Vec<TextChunk> {
        let chunk_size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        let step = chunk_size.saturating_sub(overlap).max(1);
        let mut start = 0;

        while start < total_chars {
            let end = (start + chunk_size).min(total_chars);
            let chunk_text: String = chars[start..end].iter().collect();

            let final_text = if end < total_chars {
                find_sentence_boundary(&chunk_text)
            } else {
                chunk_text
            };

            let trimmed = final_text.trim();
            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    text: trimmed.to_string(),
                    source: source.to_string(),
                    start_offset: start,
                    chunk_index: chunks.len(),
                });
            }

            if end == total_chars {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Cut the chunk after the last sentence ending in its final 20%, if any.
fn find_sentence_boundary(text: &str) -> String {
    let sentence_endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let mut search_start = (text.len() * 80) / 100;
    while !text.is_char_boundary(search_start) {
        search_start += 1;
    }
    let search_text = &text[search_start..];

    let best = sentence_endings
        .iter()
        .filter_map(|ending| search_text.rfind(ending).map(|pos| pos + ending.len()))
        .max();

    match best {
        Some(cut) => text[..search_start + cut].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize) -> Chunker {
        Chunker::new(ChunkerConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunker(1000, 100).split("Dengue causes high fever.", "doc");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Dengue causes high fever.");
        assert_eq!(chunks[0].source, "doc");
        assert_eq!(chunks[0].start_offset, 0);
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let text = "a".repeat(200);
        let chunks = chunker(80, 40).split(&text, "doc");

        let offsets: Vec<usize> = chunks.iter().map(|c| c.start_offset).collect();
        assert_eq!(offsets, vec![0, 40, 80, 120]);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 80));
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn chunks_prefer_sentence_boundaries() {
        let text = "This is a test. ".repeat(20);
        let chunks = chunker(100, 20).split(&text, "doc");

        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.text.ends_with('.'), "chunk did not end on a sentence: {:?}", chunk.text);
        }
    }

    #[test]
    fn empty_and_blank_text_yield_nothing() {
        assert!(chunker(100, 10).split("", "doc").is_empty());
        assert!(chunker(100, 10).split("   \n\n  ", "doc").is_empty());
    }

    #[test]
    fn multibyte_text_does_not_split_inside_characters() {
        let text = "জ্বর এবং মাথাব্যথা। ".repeat(30);
        let chunks = chunker(50, 10).split(&text, "bn");
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 50));
    }
}
