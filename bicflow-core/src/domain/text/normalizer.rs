// bicflow-core/src/domain/text/normalizer.rs

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::configuration::TextConfig;
use crate::domain::record::ValidatedRecord;
use crate::domain::text::lemmatizer::lemmatize;
use crate::domain::text::stopwords::ENGLISH_STOP_WORDS;

fn re_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"http\S+|www\S+").unwrap_or_else(|_| {
            // Hardcoded pattern, cannot fail.
            Regex::new("$^").unwrap_or_else(|_| unreachable!())
        })
    })
}

fn re_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+").unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

/// Turns the free-text fields of a change into one `clean_text` string.
///
/// Pure: the output only depends on the input text and on the configuration
/// the normalizer was built with, never on other rows.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    placeholder: String,
    lemmatize: bool,
    stop_words: HashSet<String>,
}

impl TextNormalizer {
    pub fn new(config: &TextConfig) -> Self {
        let base: Vec<String> = match &config.stop_words {
            Some(words) => words.iter().map(|w| w.to_lowercase()).collect(),
            None => ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        };
        let stop_words = base
            .into_iter()
            .chain(config.extra_stop_words.iter().map(|w| w.to_lowercase()))
            .collect();

        Self {
            placeholder: config.url_placeholder.clone(),
            lemmatize: config.lemmatize,
            stop_words,
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Joins the three text fields with single spaces and cleans the result.
    pub fn normalize_fields(&self, title: &str, description: &str, change_message: &str) -> String {
        self.normalize(&format!("{} {} {}", title, description, change_message))
    }

    pub fn normalize_record(&self, record: &ValidatedRecord) -> String {
        self.normalize_fields(&record.title, &record.description, &record.change_message)
    }

    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let with_placeholders = re_url().replace_all(&lowered, self.placeholder.as_str());
        let without_digits = re_digits().replace_all(&with_placeholders, "");
        let stripped: String = without_digits
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();
        // Stripping can glue a URL back together ("ht1tp://x" -> "httpx").
        let stripped = re_url().replace_all(&stripped, self.placeholder.as_str());

        stripped
            .split_whitespace()
            .filter(|token| !self.is_stop_word(token))
            .filter_map(|token| self.base_form(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Stop words are checked on the lemma too, so a second pass has nothing left to drop.
    fn base_form(&self, token: &str) -> Option<String> {
        if !self.lemmatize || token == self.placeholder {
            return Some(token.to_string());
        }
        let lemma = lemmatize(token);
        if self.is_stop_word(&lemma) {
            None
        } else {
            Some(lemma)
        }
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(&TextConfig::default())
    }
}
