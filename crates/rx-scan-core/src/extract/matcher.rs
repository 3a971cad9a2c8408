//! Approximate medicine-name matching.
//!
//! Two passes per line:
//! - Whole line: token-set ratio (normalized Levenshtein over sorted token
//!   sets) against every dictionary entry, accepted at `line_threshold`.
//! - Per word: Jaro-Winkler against every entry for words of at least
//!   `min_word_len` characters, accepted at the stricter `word_threshold`.
//!   Recovers names surrounded by OCR noise or misspelled ("Amoxcilin").
//!
//! Scores are on a 0-100 scale. Ties keep the earlier dictionary entry.

use std::ops::Range;

use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::debug;

/// Built-in medicine dictionary.
pub const DEFAULT_MEDICINES: &[&str] = &[
    "Paracetamol",
    "Amoxicillin",
    "Ibuprofen",
    "Cetirizine",
    "Metformin",
    "Atorvastatin",
    "Amlodipine",
    "Omeprazole",
    "Losartan",
    "Azithromycin",
    "Metoprolol",
    "Pantoprazole",
    "Gabapentin",
    "Prednisone",
    "Levothyroxine",
    "Dolo 650",
    "Augmentin",
    "Pan 40",
    "Telma 40",
    "Glycomet",
    "Insulin",
    "Aspirin",
    "Clopidogrel",
    "Rosuvastatin",
    "Vitamin D3",
    "Calcium",
];

/// Minimum whole-line score.
pub const DEFAULT_LINE_THRESHOLD: f64 = 85.0;

/// Minimum single-word score.
pub const DEFAULT_WORD_THRESHOLD: f64 = 90.0;

/// Words shorter than this are not matched on their own.
pub const DEFAULT_MIN_WORD_LEN: usize = 4;

/// Minimum normalized edit similarity (0-1) between a word and the name,
/// or one of its tokens, before the Jaro-Winkler score counts. Keeps a
/// shared prefix alone from matching ("Calcimax" is not "Calcium").
pub const WORD_EDIT_FLOOR: f64 = 0.75;

/// Which pass produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Line,
    Word,
}

/// A dictionary hit for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    /// Dictionary spelling
    pub canonical: String,
    /// Similarity (0-100)
    pub score: f64,
    pub mode: MatchMode,
    /// Byte range of the text that matched, if it could be located
    pub span: Option<Range<usize>>,
}

impl NameMatch {
    /// Remove the matched text from a line so it cannot feed the detail patterns.
    pub fn strip_from(&self, line: &str) -> String {
        match &self.span {
            Some(span) if span.end <= line.len() => {
                let mut stripped = String::with_capacity(line.len());
                stripped.push_str(&line[..span.start]);
                stripped.push(' ');
                stripped.push_str(&line[span.end..]);
                stripped
            }
            _ => line.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct DictionaryEntry {
    canonical: String,
    lower: String,
    tokens: Vec<String>,
}

impl DictionaryEntry {
    fn new(name: &str) -> Self {
        let canonical = name.trim().to_string();
        Self {
            lower: canonical.to_ascii_lowercase(),
            tokens: tokenize(&canonical),
            canonical,
        }
    }
}

/// Fuzzy matcher over an immutable medicine dictionary.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    entries: Vec<DictionaryEntry>,
    line_threshold: f64,
    word_threshold: f64,
    min_word_len: usize,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NameMatcher {
    /// Create a matcher over the built-in dictionary.
    pub fn new() -> Self {
        Self::with_names(std::iter::empty::<&str>())
    }

    /// Create a matcher over caller names followed by the built-in dictionary.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self {
            entries: Vec::new(),
            line_threshold: DEFAULT_LINE_THRESHOLD,
            word_threshold: DEFAULT_WORD_THRESHOLD,
            min_word_len: DEFAULT_MIN_WORD_LEN,
        };
        for name in names {
            matcher.add_name(name.as_ref());
        }
        for name in DEFAULT_MEDICINES {
            matcher.add_name(name);
        }
        matcher
    }

    /// Override both thresholds.
    pub fn with_thresholds(mut self, line_threshold: f64, word_threshold: f64) -> Self {
        self.line_threshold = line_threshold;
        self.word_threshold = word_threshold;
        self
    }

    /// Override the minimum word length for the per-word pass.
    pub fn with_min_word_len(mut self, min_word_len: usize) -> Self {
        self.min_word_len = min_word_len;
        self
    }

    /// Add a name to the end of the dictionary. Returns false for blanks and
    /// case-insensitive duplicates.
    pub fn add_name(&mut self, name: &str) -> bool {
        let entry = DictionaryEntry::new(name);
        if entry.canonical.is_empty() || self.entries.iter().any(|e| e.lower == entry.lower) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// A new matcher whose dictionary is `names` followed by this one's entries.
    ///
    /// Used for per-call dictionary extension; `self` is left untouched.
    pub fn extended<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self {
            entries: Vec::new(),
            ..self.clone()
        };
        for name in names {
            matcher.add_name(name.as_ref());
        }
        for entry in &self.entries {
            matcher.add_name(&entry.canonical);
        }
        matcher
    }

    /// Dictionary names in match priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the medicine named on a line, if any.
    pub fn find(&self, line: &str) -> Option<NameMatch> {
        if line.trim().is_empty() {
            return None;
        }

        if let Some((entry, score)) = self.best_line_match(line) {
            debug!(name = %entry.canonical, score, "whole-line name match");
            return Some(NameMatch {
                canonical: entry.canonical.clone(),
                score,
                mode: MatchMode::Line,
                span: locate(line, entry),
            });
        }

        for (start, word) in words_with_offsets(line) {
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            if core.chars().count() < self.min_word_len {
                continue;
            }
            if let Some((entry, score)) = self.best_word_match(core) {
                debug!(name = %entry.canonical, score, word, "per-word name match");
                return Some(NameMatch {
                    canonical: entry.canonical.clone(),
                    score,
                    mode: MatchMode::Word,
                    span: Some(start..start + word.len()),
                });
            }
        }

        None
    }

    fn best_line_match(&self, line: &str) -> Option<(&DictionaryEntry, f64)> {
        let line_tokens = tokenize(line);
        best_above(
            self.entries
                .iter()
                .map(|e| (e, token_set_ratio(&line_tokens, &e.tokens))),
            self.line_threshold,
        )
    }

    fn best_word_match(&self, word: &str) -> Option<(&DictionaryEntry, f64)> {
        let lower = word.to_ascii_lowercase();
        best_above(
            self.entries
                .iter()
                .map(|e| (e, word_score(&lower, e))),
            self.word_threshold,
        )
    }
}

fn word_score(word: &str, entry: &DictionaryEntry) -> f64 {
    let edit = entry
        .tokens
        .iter()
        .map(|t| normalized_levenshtein(word, t))
        .fold(normalized_levenshtein(word, &entry.lower), f64::max);
    if edit < WORD_EDIT_FLOOR {
        return 0.0;
    }
    jaro_winkler(word, &entry.lower) * 100.0
}

fn best_above<'a>(
    scored: impl Iterator<Item = (&'a DictionaryEntry, f64)>,
    threshold: f64,
) -> Option<(&'a DictionaryEntry, f64)> {
    let mut best: Option<(&DictionaryEntry, f64)> = None;
    for (entry, score) in scored {
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((entry, score));
        }
    }
    best.filter(|(_, score)| *score >= threshold)
}

/// Lowercase alphanumeric tokens, sorted and deduplicated.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

/// Token-set similarity of two sorted, deduplicated token lists (0-100).
///
/// Compares the shared tokens against each side's full token set, so a
/// dictionary name scores 100 when all of its tokens appear on the line.
pub fn token_set_ratio(a: &[String], b: &[String]) -> f64 {
    let shared: Vec<&str> = a
        .iter()
        .filter(|t| b.contains(t))
        .map(String::as_str)
        .collect();
    let only_a: Vec<&str> = a
        .iter()
        .filter(|t| !b.contains(t))
        .map(String::as_str)
        .collect();
    let only_b: Vec<&str> = b
        .iter()
        .filter(|t| !a.contains(t))
        .map(String::as_str)
        .collect();

    let sect = shared.join(" ");
    let with_a = join_nonempty(&sect, &only_a.join(" "));
    let with_b = join_nonempty(&sect, &only_b.join(" "));

    let mut best = ratio(&with_a, &with_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &with_a)).max(ratio(&sect, &with_b));
    }
    best
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{} {}", a, b),
    }
}

/// Whitespace-separated words with their byte offsets.
fn words_with_offsets(line: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (idx, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                words.push((s, &line[s..idx]));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        words.push((s, &line[s..]));
    }
    words
}

/// Byte range of a whole-line match: the canonical spelling if present
/// verbatim (ignoring ASCII case), else the most similar word.
fn locate(line: &str, entry: &DictionaryEntry) -> Option<Range<usize>> {
    let lower = line.to_ascii_lowercase();
    if let Some(start) = lower.find(&entry.lower) {
        return Some(start..start + entry.lower.len());
    }

    words_with_offsets(line)
        .into_iter()
        .map(|(start, word)| {
            let score = jaro_winkler(&word.to_ascii_lowercase(), &entry.lower);
            (start..start + word.len(), score)
        })
        .fold(None, |best: Option<(Range<usize>, f64)>, (span, score)| match best {
            Some((_, b)) if b >= score => best,
            _ => Some((span, score)),
        })
        .map(|(span, _)| span)
}
