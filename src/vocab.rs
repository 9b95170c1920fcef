/* ------------------------------------------------------------------ */
/* Vocabulary: char <-> dense index bijection                         */
/* ------------------------------------------------------------------ */
//
// Built once from the full corpus, immutable afterward. Indices are
// dense 0..V-1 in sorted character order, so the mapping is
// reproducible for a given corpus. Persisted as JSON (the character
// list alone; the reverse map is rebuilt on load).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub struct Vocab {
    char_to_idx: HashMap<char, usize>,
    idx_to_char: Vec<char>,
}

/// On-disk representation: the index→char list alone, as JSON.
#[derive(Serialize, Deserialize)]
struct VocabFile {
    chars: Vec<char>,
}

impl Vocab {
    pub fn from_text(text: &str) -> Result<Self> {
        let mut chars: Vec<char> = text.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        if chars.is_empty() {
            return Err(Error::config("empty corpus yields an empty vocabulary"));
        }
        Ok(Self::from_chars(chars))
    }

    fn from_chars(idx_to_char: Vec<char>) -> Self {
        let char_to_idx = idx_to_char
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        Self { char_to_idx, idx_to_char }
    }

    pub fn size(&self) -> usize {
        self.idx_to_char.len()
    }

    pub fn index_of(&self, c: char) -> Option<usize> {
        self.char_to_idx.get(&c).copied()
    }

    pub fn encode(&self, text: &str) -> Vec<usize> {
        text.chars()
            .filter_map(|c| self.char_to_idx.get(&c).copied())
            .collect()
    }

    pub fn decode(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .filter_map(|&idx| self.idx_to_char.get(idx))
            .collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = VocabFile { chars: self.idx_to_char.clone() };
        fs::write(path, serde_json::to_string(&file)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let file: VocabFile = serde_json::from_str(&json)?;
        if file.chars.is_empty() {
            return Err(Error::config("vocabulary file contains no characters"));
        }
        Ok(Self::from_chars(file.chars))
    }
}
