//! Recursive text splitting with character overlap
//!
//! Text is cut at the coarsest separator present (paragraph, line, sentence
//! punctuation, comma, word, then single characters) and the pieces are merged
//! back into windows of at most `chunk_size` characters, each starting with up
//! to `overlap` characters carried over from the previous window.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;

const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ".", "!", "?", ",", " ", ""];

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum window size in characters
    chunk_size: usize,
    /// Overlap between consecutive windows in characters
    overlap: usize,
    separators: Vec<&'static str>,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap: overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }

    /// Create from config
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Maximum window size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping windows
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep));
        let (separator, finer) = match position {
            Some(i) => (separators[i], &separators[i + 1..]),
            None => ("", &separators[separators.len()..]),
        };

        let mut windows = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                windows.extend(self.merge(&pending));
                pending.clear();
            }

            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    windows.push(trimmed.to_string());
                }
            } else {
                windows.extend(self.split_recursive(piece, finer));
            }
        }

        if !pending.is_empty() {
            windows.extend(self.merge(&pending));
        }

        windows
    }

    /// Merge contiguous pieces into windows, carrying the tail of each window forward
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !current.is_empty() {
                push_window(&mut windows, &current);

                while let Some(&(_, front_len)) = current.front() {
                    let over_overlap = total > self.overlap;
                    let no_room = total + len > self.chunk_size && total > 0;
                    if !(over_overlap || no_room) {
                        break;
                    }
                    current.pop_front();
                    total -= front_len;
                }
            }

            current.push_back((piece, len));
            total += len;
        }

        push_window(&mut windows, &current);
        windows
    }
}

fn push_window(windows: &mut Vec<String>, current: &VecDeque<(&str, usize)>) {
    let joined: String = current.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

/// Split at every occurrence of `separator`, keeping it at the start of the following piece
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
