//! Text to sparse feature vector transformation.
//!
//! The vectorizer is a serialized artifact: a fixed vocabulary mapping n-grams
//! to column indices, plus optional idf weights. It reproduces the usual
//! count / tf-idf pipeline:
//!
//! 1. optional lowercasing
//! 2. n-gram extraction (`char`, `char_wb` or `word` analyzer)
//! 3. term counting over the known vocabulary (unknown terms are dropped)
//! 4. optional `binary` / `sublinear_tf` transform
//! 5. optional idf weighting
//! 6. optional `l1` / `l2` normalization

use crate::{LangIdError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is valid"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").expect("whitespace pattern is valid"));

/// How text is cut into terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Word n-grams over tokens of two or more word characters
    #[default]
    Word,
    /// Character n-grams over the whole (whitespace-collapsed) text
    Char,
    /// Character n-grams inside word boundaries, words padded with spaces
    CharWb,
}

/// Vector normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Norm {
    L1,
    L2,
}

/// Sparse feature vector, entries sorted by column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense row.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|&(idx, value)| dense.get(idx).copied().unwrap_or(0.0) * value)
            .sum()
    }
}

/// Serialized text vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextVectorizer {
    #[serde(default)]
    pub analyzer: Analyzer,

    /// Inclusive `[min_n, max_n]`
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default)]
    pub binary: bool,

    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default)]
    pub norm: Option<Norm>,

    /// Term -> column index
    pub vocabulary: HashMap<String, usize>,

    /// One weight per column, when the vectorizer is tf-idf
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

impl TextVectorizer {
    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Check internal consistency of a freshly loaded artifact.
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(LangIdError::model(format!(
                "Invalid ngram_range [{}, {}]",
                min_n, max_n
            )));
        }
        if self.vocabulary.is_empty() {
            return Err(LangIdError::model("Vectorizer vocabulary is empty"));
        }

        let n_features = self.n_features();
        let mut seen = vec![false; n_features];
        for (term, &idx) in &self.vocabulary {
            if idx >= n_features || seen[idx] {
                return Err(LangIdError::model(format!(
                    "Vocabulary term '{}' has invalid or duplicate column {}",
                    term, idx
                )));
            }
            seen[idx] = true;
        }

        if let Some(idf) = &self.idf {
            if idf.len() != n_features {
                return Err(LangIdError::model(format!(
                    "idf has {} weights but vocabulary has {} terms",
                    idf.len(),
                    n_features
                )));
            }
        }
        Ok(())
    }

    /// Cut `text` into terms according to the analyzer settings.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let (min_n, max_n) = self.ngram_range;

        match self.analyzer {
            Analyzer::Word => {
                let tokens: Vec<&str> = TOKEN_PATTERN.find_iter(&text).map(|m| m.as_str()).collect();
                word_ngrams(&tokens, min_n, max_n)
            }
            Analyzer::Char => {
                let collapsed = WHITESPACE.replace_all(&text, " ");
                let chars: Vec<char> = collapsed.chars().collect();
                char_ngrams(&chars, min_n, max_n)
            }
            Analyzer::CharWb => char_wb_ngrams(&text, min_n, max_n),
        }
    }

    /// Turn `text` into a feature vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        for (idx, value) in entries.iter_mut() {
            if self.binary {
                *value = 1.0;
            } else if self.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            if let Some(idf) = &self.idf {
                *value *= idf.get(*idx).copied().unwrap_or(1.0);
            }
        }

        if let Some(norm) = self.norm {
            let total = match norm {
                Norm::L1 => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
                Norm::L2 => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            };
            if total > 0.0 {
                for (_, value) in entries.iter_mut() {
                    *value /= total;
                }
            }
        }

        SparseVector { entries }
    }
}

fn word_ngrams(tokens: &[&str], min_n: usize, max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        out.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    out
}

fn char_ngrams(chars: &[char], min_n: usize, max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in min_n..=max_n {
        if n > chars.len() {
            break;
        }
        out.extend(chars.windows(n).map(|window| window.iter().collect::<String>()));
    }
    out
}

fn char_wb_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for n in min_n..=max_n {
            if padded.len() <= n {
                // A short word is counted once, as a whole.
                out.push(padded.iter().collect());
                break;
            }
            out.extend(padded.windows(n).map(|window| window.iter().collect::<String>()));
        }
    }
    out
}
