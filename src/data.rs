/* ------------------------------------------------------------------ */
/* Corpus reader: cyclic, gapless window stream                       */
/* ------------------------------------------------------------------ */
//
// Owns the encoded corpus and a single cursor. Each call to
// next_window() emits seq_length input indices plus the same slice
// shifted one character forward as targets (next-char prediction),
// then advances the cursor. When fewer than seq_length + 1 characters
// remain, the cursor wraps to 0 — a deterministic cyclic traversal,
// not random sampling.

use crate::error::{Error, Result};

pub struct CorpusReader {
    data: Vec<usize>,
    seq_length: usize,
    cursor: usize,
}

impl CorpusReader {
    pub fn new(data: Vec<usize>, vocab_size: usize, seq_length: usize) -> Result<Self> {
        if vocab_size == 0 {
            return Err(Error::config("vocabulary is empty"));
        }
        if seq_length == 0 {
            return Err(Error::config("seq_length must be > 0"));
        }
        if data.len() < seq_length + 1 {
            return Err(Error::config(format!(
                "corpus has {} characters but one window needs {}",
                data.len(),
                seq_length + 1
            )));
        }
        if let Some(&bad) = data.iter().find(|&&idx| idx >= vocab_size) {
            return Err(Error::config(format!(
                "corpus index {bad} out of range for vocabulary of size {vocab_size}"
            )));
        }
        Ok(Self { data, seq_length, cursor: 0 })
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// True iff the next window starts a fresh pass over the corpus.
    /// The orchestrator resets the carried hidden state exactly then.
    pub fn at_cycle_start(&self) -> bool {
        self.cursor == 0
    }

    /// Emit the next (inputs, targets) window and advance the cursor.
    pub fn next_window(&mut self) -> (Vec<usize>, Vec<usize>) {
        let start = self.cursor;
        let inputs = self.data[start..start + self.seq_length].to_vec();
        let targets = self.data[start + 1..start + self.seq_length + 1].to_vec();

        self.cursor += self.seq_length;
        // Wrap as soon as one more full window plus its one-char
        // lookahead no longer fits.
        if self.cursor + self.seq_length + 1 >= self.data.len() {
            self.cursor = 0;
        }

        (inputs, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // corpus "abcde" encoded with a=0..e=4
    fn abcde() -> Vec<usize> {
        vec![0, 1, 2, 3, 4]
    }

    #[test]
    fn first_window_and_wraparound_on_abcde() {
        let mut reader = CorpusReader::new(abcde(), 5, 2).unwrap();
        assert!(reader.at_cycle_start());

        let (inputs, targets) = reader.next_window();
        assert_eq!(inputs, vec![0, 1]); // "ab"
        assert_eq!(targets, vec![1, 2]); // "bc"
        // cursor advanced to 2, and 2 + 2 + 1 >= 5 forces a wrap
        assert!(reader.at_cycle_start());

        let (inputs, targets) = reader.next_window();
        assert_eq!(inputs, vec![0, 1]);
        assert_eq!(targets, vec![1, 2]);
    }

    #[test]
    fn targets_are_inputs_shifted_by_one() {
        let data: Vec<usize> = (0..23).map(|i| i % 7).collect();
        let mut reader = CorpusReader::new(data.clone(), 7, 5).unwrap();
        let mut pos = 0usize;
        for _ in 0..20 {
            let (inputs, targets) = reader.next_window();
            assert_eq!(inputs, data[pos..pos + 5].to_vec());
            assert_eq!(targets, data[pos + 1..pos + 6].to_vec());
            pos += 5;
            if pos + 5 + 1 >= data.len() {
                pos = 0;
            }
        }
    }

    #[test]
    fn traversal_eventually_wraps() {
        let data: Vec<usize> = (0..100).map(|i| i % 3).collect();
        let mut reader = CorpusReader::new(data, 3, 8).unwrap();
        reader.next_window();
        let mut wrapped = false;
        for _ in 0..1000 {
            if reader.at_cycle_start() {
                wrapped = true;
                break;
            }
            reader.next_window();
        }
        assert!(wrapped);
    }

    #[test]
    fn rejects_corpus_shorter_than_one_window() {
        // 3 chars cannot supply a window of 3 inputs + 1 lookahead
        let err = CorpusReader::new(vec![0, 1, 2], 3, 3);
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_vocabulary() {
        let err = CorpusReader::new(vec![], 0, 2);
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = CorpusReader::new(vec![0, 1, 9, 2], 3, 2);
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
