//! Word corpus and random word selection.
//!
//! A [`Corpus`] is a fixed, ordered, non-empty list of [`Word`]s. It is the
//! default [`WordSource`]: uniform random selection that avoids repeating the
//! previous word whenever another word is available.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::domain::{ToneCategory, Word};
use crate::error::CoreError;
use crate::ports::WordSource;

/// Built-in Thai vocabulary: `(text, transliteration, tone, translation)`.
const THAI_WORDS: &[(&str, &str, ToneCategory, &str)] = &[
    ("ไป", "pai", ToneCategory::Mid, "go"),
    ("ไก่", "kai", ToneCategory::Low, "chicken"),
    ("ได้", "dai", ToneCategory::Falling, "can/get"),
    ("โต๊ะ", "toh", ToneCategory::High, "table"),
    ("จ๋า", "jaa", ToneCategory::Rising, "yes (polite)"),
    ("มา", "maa", ToneCategory::Mid, "come"),
    ("สี่", "see", ToneCategory::Low, "four"),
    ("ข้าว", "khao", ToneCategory::Falling, "rice/food"),
    ("น้ำ", "naam", ToneCategory::High, "water"),
    ("สวย", "suay", ToneCategory::Rising, "beautiful"),
    ("กิน", "gin", ToneCategory::Mid, "eat"),
    ("ไข่", "khai", ToneCategory::Low, "egg"),
    ("หน้า", "naa", ToneCategory::Falling, "face/front"),
    ("ช้าง", "chaang", ToneCategory::High, "elephant"),
    ("หมู", "moo", ToneCategory::Rising, "pig"),
    ("นอน", "norn", ToneCategory::Mid, "sleep"),
    ("ปาก", "paak", ToneCategory::Low, "mouth"),
    ("เล่น", "len", ToneCategory::Falling, "play"),
    ("รัก", "rak", ToneCategory::High, "love"),
    ("ขาว", "khao", ToneCategory::Rising, "white"),
];

/// Fixed word list with a private random source.
pub struct Corpus {
    words: Vec<Word>,
    rng: Mutex<StdRng>,
}

impl Corpus {
    /// Build a corpus from a word list.
    ///
    /// Returns [`CoreError::EmptyCorpus`] if `words` is empty.
    pub fn new(words: Vec<Word>) -> Result<Self, CoreError> {
        if words.is_empty() {
            return Err(CoreError::EmptyCorpus);
        }
        Ok(Self {
            words,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// The built-in 20-word Thai corpus.
    #[must_use]
    pub fn thai() -> Self {
        let words = THAI_WORDS
            .iter()
            .map(|&(text, translit, tone, translation)| Word::new(text, translit, tone, translation))
            .collect();
        Self {
            words,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Parse a corpus from a JSON array of word records.
    pub fn from_json_str(json: &str, origin: &Path) -> Result<Self, CoreError> {
        let words: Vec<Word> =
            serde_json::from_str(json).map_err(|source| CoreError::CorpusParse {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::new(words)
    }

    /// Load a corpus from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|source| CoreError::CorpusIo {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_json_str(&json, path)?;
        tracing::info!(path = %path.display(), words = corpus.len(), "Loaded word list");
        Ok(corpus)
    }

    /// Reseed the random source for reproducible selection.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            words: self.words,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// All words, in corpus order.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of words (always at least one).
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.words.len()
    }
}

impl WordSource for Corpus {
    fn pick_next_word(&self, exclude: Option<&Word>) -> Word {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let filtered: Vec<&Word> = match exclude {
            Some(prev) if self.words.len() > 1 => {
                self.words.iter().filter(|w| !w.same_text(prev)).collect()
            }
            _ => Vec::new(),
        };

        let picked = if filtered.is_empty() {
            self.words.choose(&mut *rng)
        } else {
            filtered.choose(&mut *rng).copied()
        };

        // The corpus is non-empty by construction, so `choose` always yields.
        picked.cloned().unwrap_or_else(|| self.words[0].clone())
    }
}

impl std::fmt::Debug for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Corpus")
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    fn word(text: &str, tone: ToneCategory) -> Word {
        Word::new(text, text, tone, text)
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(Corpus::new(vec![]), Err(CoreError::EmptyCorpus)));
    }

    #[test]
    fn thai_corpus_covers_every_tone() {
        let corpus = Corpus::thai();
        assert_eq!(corpus.len(), 20);
        let tones: HashSet<_> = corpus.words().iter().map(|w| w.tone).collect();
        assert_eq!(tones.len(), ToneCategory::ALL.len());
    }

    #[test]
    fn excluded_word_never_returned() {
        let corpus = Corpus::thai().with_seed(7);
        let excluded = corpus.words()[3].clone();
        for _ in 0..1000 {
            let next = corpus.pick_next_word(Some(&excluded));
            assert_ne!(next.text, excluded.text);
        }
    }

    #[test]
    fn exclusion_uses_text_identity() {
        let corpus = Corpus::new(vec![
            word("a", ToneCategory::Mid),
            word("b", ToneCategory::Low),
        ])
        .unwrap()
        .with_seed(1);
        // Same text, different tone: still excluded.
        let lookalike = word("a", ToneCategory::High);
        for _ in 0..200 {
            assert_eq!(corpus.pick_next_word(Some(&lookalike)).text, "b");
        }
    }

    #[test]
    fn single_word_corpus_ignores_exclusion() {
        let only = word("only", ToneCategory::Rising);
        let corpus = Corpus::new(vec![only.clone()]).unwrap();
        assert_eq!(corpus.pick_next_word(Some(&only)), only);
        assert_eq!(corpus.pick_next_word(None), only);
    }

    #[test]
    fn selection_reaches_every_candidate() {
        let corpus = Corpus::thai().with_seed(42);
        let seen: HashSet<String> = (0..2000)
            .map(|_| corpus.pick_next_word(None).text)
            .collect();
        assert_eq!(seen.len(), corpus.len());
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = Corpus::thai().with_seed(99);
        let b = Corpus::thai().with_seed(99);
        for _ in 0..50 {
            assert_eq!(a.pick_next_word(None), b.pick_next_word(None));
        }
    }

    #[test]
    fn loads_word_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"text":"ม้า","transliteration":"maa","tone":"High","translation":"horse"}}]"#
        )
        .unwrap();

        let corpus = Corpus::from_json_file(file.path()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.words()[0].tone, ToneCategory::High);
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(matches!(
            Corpus::from_json_file(file.path()),
            Err(CoreError::EmptyCorpus)
        ));
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"text":"x"}}]"#).unwrap();
        let err = Corpus::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::CorpusParse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Corpus::from_json_file(Path::new("/nonexistent/tonerun/words.json")).unwrap_err();
        assert!(matches!(err, CoreError::CorpusIo { .. }));
    }
}
