use serde::{Deserialize, Serialize};

/// Placeholder written to the store for metadata fields that have no value.
/// Vector stores reject null-valued payload entries, so absence is made explicit.
pub const ABSENT_FIELD: &str = "N/A";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Builds the chunk at sequential position `index`, deriving its id and
    /// length metadata from the text.
    pub fn new(index: usize, text: impl Into<String>, source: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self {
            id: format!("chunk_{index}"),
            text,
            metadata: ChunkMetadata {
                chunk_id: index,
                source: source.into(),
                length,
                page_number: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_id: usize,
    pub source: String,
    pub length: usize,
    pub page_number: Option<String>,
}

impl ChunkMetadata {
    /// Store-facing label for the page number: the value itself, or the
    /// explicit placeholder when absent.
    pub fn page_number_label(&self) -> &str {
        self.page_number.as_deref().unwrap_or(ABSENT_FIELD)
    }

    /// Inverse of `page_number_label`, used when reading payloads back.
    pub fn parse_page_label(label: &str) -> Option<String> {
        if label.is_empty() || label == ABSENT_FIELD {
            None
        } else {
            Some(label.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_and_length_follow_index_and_text() {
        let chunk = Chunk::new(3, "two words", "DAFMAN 36-2664");
        assert_eq!(chunk.id, "chunk_3");
        assert_eq!(chunk.metadata.chunk_id, 3);
        assert_eq!(chunk.metadata.length, 9);
        assert_eq!(chunk.metadata.source, "DAFMAN 36-2664");
        assert!(chunk.metadata.page_number.is_none());
    }

    #[test]
    fn page_label_round_trips_through_placeholder() {
        let absent = Chunk::new(0, "x", "src");
        assert_eq!(absent.metadata.page_number_label(), "N/A");
        assert_eq!(ChunkMetadata::parse_page_label("N/A"), None);

        let mut present = Chunk::new(0, "x", "src");
        present.metadata.page_number = Some("12".to_string());
        assert_eq!(present.metadata.page_number_label(), "12");
        assert_eq!(
            ChunkMetadata::parse_page_label("12"),
            Some("12".to_string())
        );
    }
}
