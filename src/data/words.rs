//! Title tokenizing and word frequencies for the title word cloud.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of at least two word characters; apostrophes may follow the first.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w[\w']+").expect("token pattern is valid"));

/// General-purpose English stop words.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "can't", "cannot", "com", "could",
    "couldn't", "did", "didn't", "do", "does", "doesn't", "doing", "don't", "down",
    "during", "each", "else", "ever", "few", "for", "from", "further", "get", "had",
    "hadn't", "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll",
    "he's", "hence", "her", "here", "here's", "hers", "herself", "him", "himself", "his",
    "how", "how's", "however", "http", "i", "i'd", "i'll", "i'm", "i've", "if", "in",
    "into", "is", "isn't", "it", "it's", "its", "itself", "just", "k", "let's", "like",
    "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd",
    "she'll", "she's", "should", "shouldn't", "since", "so", "some", "such", "than",
    "that", "that's", "the", "their", "theirs", "them", "themselves", "then", "there",
    "there's", "therefore", "these", "they", "they'd", "they'll", "they're", "they've",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was",
    "wasn't", "we", "we'd", "we'll", "we're", "we've", "were", "weren't", "what",
    "what's", "when", "when's", "where", "where's", "which", "while", "who", "who's",
    "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www", "you", "you'd",
    "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

/// Words that are everywhere in this corpus and say nothing about a paper.
pub const DOMAIN_STOP_WORDS: &[&str] = &[
    "covid", "19", "2019", "study", "case", "report", "disease", "new", "clinical", "data",
    "sars", "cov", "2",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ENGLISH_STOP_WORDS
        .iter()
        .chain(DOMAIN_STOP_WORDS)
        .copied()
        .collect()
});

/// Case-insensitive stop-word check.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token.to_lowercase().as_str())
}

/// Split text into lowercase content tokens.
///
/// Stop words, purely numeric tokens and a trailing `'s` are removed.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .filter_map(|m| {
            let lower = m.as_str().to_lowercase();
            if is_stop_word(&lower) {
                return None;
            }
            let token = lower
                .strip_suffix("'s")
                .unwrap_or(&lower)
                .trim_end_matches('\'');
            let keep = token.chars().count() >= 2
                && !token.chars().all(|c| c.is_ascii_digit())
                && !is_stop_word(token);
            keep.then(|| token.to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// WordFrequencies
// ---------------------------------------------------------------------------

/// Token counts, most frequent first; equal counts keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequencies {
    entries: Vec<(String, usize)>,
}

impl WordFrequencies {
    pub fn from_text(text: &str) -> Self {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for token in tokenize(text) {
            match index.get(&token) {
                Some(&i) => order[i].1 += 1,
                None => {
                    index.insert(token.clone(), order.len());
                    order.push((token, 1));
                }
            }
        }

        // Fold "vaccines"-style plurals into their singular when both occur.
        let mut merged = vec![false; order.len()];
        for i in 0..order.len() {
            let word = &order[i].0;
            if !word.ends_with('s') || word.ends_with("ss") {
                continue;
            }
            if let Some(&j) = index.get(&word[..word.len() - 1]) {
                order[j].1 += order[i].1;
                merged[i] = true;
            }
        }
        let mut entries: Vec<(String, usize)> = order
            .into_iter()
            .zip(merged)
            .filter_map(|(entry, gone)| (!gone).then_some(entry))
            .collect();

        entries.sort_by(|a, b| b.1.cmp(&a.1));
        WordFrequencies { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.entries.first().map_or(0, |&(_, count)| count)
    }
}

// ---------------------------------------------------------------------------
// TitleCloud – title word outcome for one view
// ---------------------------------------------------------------------------

/// Outcome of the title word analysis for one filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleCloud {
    Words(WordFrequencies),
    /// No record in the view has a title.
    NoTitles,
    /// Titles exist but none yields a word: stop words, numbers or punctuation.
    NoUsableWords,
}

impl TitleCloud {
    pub fn from_titles<'a>(titles: impl IntoIterator<Item = &'a str>) -> Self {
        let text = titles.into_iter().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return TitleCloud::NoTitles;
        }
        let freqs = WordFrequencies::from_text(&text);
        if freqs.is_empty() {
            TitleCloud::NoUsableWords
        } else {
            TitleCloud::Words(freqs)
        }
    }

    pub fn notice(&self) -> Option<&'static str> {
        match self {
            TitleCloud::Words(_) => None,
            TitleCloud::NoTitles => {
                Some("No titles found for the selected year range to generate a word cloud.")
            }
            TitleCloud::NoUsableWords => Some(
                "Titles in the selected year range contain no usable words for a word cloud.",
            ),
        }
    }
}
