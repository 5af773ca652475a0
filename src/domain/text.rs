//! Text normalization and chunking for the ingest pipeline.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::entities::Chunk;

/// Tuning knobs for [`chunk_text`]. Sizes are in characters, counted with a
/// one-character separator per word.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid pattern"))
}

fn page_markers() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Page \d+ of \d+").expect("valid pattern"))
}

fn document_codes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"DAFMAN\s+\d+-\d+").expect("valid pattern"))
}

/// Cleans raw extractor output before chunking.
///
/// Collapses whitespace runs to single spaces, then strips the page markers
/// and DAFMAN document codes the PDF repeats as headers and footers, then
/// trims. Marker removal happens after the whitespace collapse so markers
/// broken across line ends are still caught.
pub fn normalize_text(text: &str) -> String {
    let collapsed = whitespace_runs().replace_all(text, " ");
    let without_pages = page_markers().replace_all(&collapsed, "");
    let without_codes = document_codes().replace_all(&without_pages, "");
    without_codes.trim().to_string()
}

/// Number of trailing words carried into the next buffer so consecutive
/// chunks share at least `overlap` characters. Walks backward until the
/// accumulated cost reaches the overlap, stopping early at `cap` so the
/// reseeded buffer still has room for the word that triggered the flush.
fn carry_word_count(words: &[&str], overlap: usize, cap: usize) -> usize {
    if overlap == 0 {
        return 0;
    }
    let mut chars = 0;
    let mut count = 0;
    for word in words.iter().rev() {
        if chars >= overlap {
            break;
        }
        let cost = word.chars().count() + 1;
        if chars + cost > cap {
            break;
        }
        chars += cost;
        count += 1;
    }
    count
}

/// Splits normalized text into overlapping word-aligned chunks.
///
/// Words accumulate until adding one more would push the buffer past
/// `chunk_size` characters; the buffer is then flushed as a chunk and
/// reseeded with its trailing words per [`carry_word_count`]. The carry is
/// capped so the reseeded buffer plus the incoming word fits the budget,
/// leaving a single word longer than `chunk_size` as the only way a chunk
/// exceeds it; such a word becomes its own chunk rather than being split.
/// Iteration is driven by the word list, so the loop terminates even when
/// the overlap is larger than a chunk.
pub fn chunk_text(text: &str, source: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_chars = 0usize;

    for word in text.split_whitespace() {
        let cost = word.chars().count() + 1;
        if buffer_chars + cost > config.chunk_size && !buffer.is_empty() {
            chunks.push(Chunk::new(chunks.len(), buffer.join(" "), source));
            let cap = config.chunk_size.saturating_sub(cost);
            let carry = carry_word_count(&buffer, config.overlap, cap);
            buffer.drain(..buffer.len() - carry);
            buffer_chars = buffer.iter().map(|w| w.chars().count() + 1).sum();
        }
        buffer.push(word);
        buffer_chars += cost;
    }

    if !buffer.is_empty() {
        chunks.push(Chunk::new(chunks.len(), buffer.join(" "), source));
    }

    chunks
}
