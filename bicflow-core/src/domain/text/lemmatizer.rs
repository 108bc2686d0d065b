// bicflow-core/src/domain/text/lemmatizer.rs
//
// Rule-based lemmatizer. The category of a word is guessed from its shape,
// irregular forms are looked up first, then the suffix rules of the category
// apply. Rules only ever shorten a word (or swap a suffix for a shorter one),
// so repeated application reaches a fixed point.

/// Grammatical category driving the suffix rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "able", "ible", "ive", "less", "ical", "ish", "ic", "al",
];

impl PartOfSpeech {
    /// Guesses the category of a lowercase word. Ambiguous words are nouns.
    pub fn infer(word: &str) -> Self {
        if word.len() > 4 && word.ends_with("ly") {
            PartOfSpeech::Adverb
        } else if (word.len() > 5 && word.ends_with("ing")) || (word.len() > 4 && word.ends_with("ed"))
        {
            PartOfSpeech::Verb
        } else if ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| word.len() > suffix.len() + 2 && word.ends_with(suffix))
        {
            PartOfSpeech::Adjective
        } else {
            PartOfSpeech::Noun
        }
    }
}

// Every base form on the right must itself be a fixed point of `lemmatize`.
const IRREGULAR: &[(&str, &str)] = &[
    // nouns
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("indices", "index"),
    ("vertices", "vertex"),
    ("matrices", "matrix"),
    ("analyses", "analysis"),
    ("aliases", "alias"),
    ("biases", "bias"),
    ("caches", "cache"),
    ("series", "series"),
    ("species", "species"),
    ("news", "news"),
    // adjectives
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    // verbs
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("ran", "run"),
    ("goes", "go"),
    ("went", "go"),
    ("gone", "go"),
    ("got", "get"),
    ("gotten", "get"),
    ("built", "build"),
    ("broke", "break"),
    ("broken", "break"),
    ("wrote", "write"),
    ("written", "write"),
    ("rewrote", "rewrite"),
    ("rewritten", "rewrite"),
    ("overrode", "override"),
    ("overridden", "override"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("began", "begin"),
    ("begun", "begin"),
    ("brought", "bring"),
    ("caught", "catch"),
    ("thought", "think"),
    ("sent", "send"),
    ("spent", "spend"),
    ("held", "hold"),
    ("led", "lead"),
    ("fed", "feed"),
    ("lost", "lose"),
    ("meant", "mean"),
    ("said", "say"),
    ("saw", "see"),
    ("seen", "see"),
    ("took", "take"),
    ("taken", "take"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("hid", "hide"),
    ("hidden", "hide"),
    ("understood", "understand"),
    ("cached", "cache"),
    ("caching", "cache"),
    ("changed", "change"),
    ("changing", "change"),
    ("created", "create"),
    ("creating", "create"),
    ("deleted", "delete"),
    ("deleting", "delete"),
];

// Stem endings that lost a silent `e` when `-ed`/`-ing` was attached.
const SILENT_E_ENDINGS: &[&str] = &[
    "bl", "iz", "dl", "gl", "pl", "tl", "rg", "dg", "uc", "ov", "lv", "rv", "iv", "ut", "gur",
    "uir", "sur", "od", "rs", "ns", "ps", "nam", "ys", "yz", "ag", "ic", "vok", "eas", "aus",
    "gnor", "pos", "lud", "vid", "fin", "ac", "cap",
];

/// Reduces a lowercase ASCII word to its base form. Other words are returned
/// untouched. The result is a fixed point: `lemmatize(lemmatize(w)) == lemmatize(w)`,
/// however many suffixes are stacked on the word.
pub fn lemmatize(word: &str) -> String {
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }

    let mut current = word.to_string();
    // Terminates: suffix steps shorten the word and irregular bases map to themselves.
    loop {
        let next = step(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn step(word: &str) -> String {
    match irregular(word) {
        Some(base) => base.to_string(),
        None => lemmatize_as(word, PartOfSpeech::infer(word)),
    }
}

fn irregular(word: &str) -> Option<&'static str> {
    IRREGULAR
        .iter()
        .find(|(form, _)| *form == word)
        .map(|(_, base)| *base)
}

/// One application of the suffix rules of `pos`.
pub fn lemmatize_as(word: &str, pos: PartOfSpeech) -> String {
    match pos {
        PartOfSpeech::Noun => noun(word),
        PartOfSpeech::Verb => verb(word),
        // Adjective and adverb base forms are the surface forms outside the irregular table.
        PartOfSpeech::Adjective | PartOfSpeech::Adverb => word.to_string(),
    }
}

fn noun(word: &str) -> String {
    if word.len() > 4
        && let Some(stem) = word.strip_suffix("ies")
    {
        return format!("{stem}y");
    }

    for suffix in ["sses", "shes", "ches", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if word.len() > 3
        && word.ends_with('s')
        && !["ss", "us", "is", "ias"].iter().any(|e| word.ends_with(e))
    {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

fn verb(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ied")
        && stem.len() >= 2
    {
        return format!("{stem}y");
    }
    if word.ends_with("eed") {
        return word.to_string();
    }

    let Some(stem) = word
        .strip_suffix("ing")
        .or_else(|| word.strip_suffix("ed"))
    else {
        return word.to_string();
    };

    if stem.len() < 3 || !stem.bytes().any(|b| b"aeiouy".contains(&b)) {
        return word.to_string();
    }

    if let Some(short) = undouble(stem) {
        return short.to_string();
    }
    if needs_silent_e(stem) {
        return format!("{stem}e");
    }
    stem.to_string()
}

// running -> runn -> run, but add/call/pass keep their double letter.
fn undouble(stem: &str) -> Option<&str> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 4 && bytes[n - 1] == bytes[n - 2] && b"bdgmnprt".contains(&bytes[n - 1]) {
        Some(&stem[..n - 1])
    } else {
        None
    }
}

fn needs_silent_e(stem: &str) -> bool {
    if SILENT_E_ENDINGS.iter().any(|ending| stem.ends_with(ending)) {
        return true;
    }
    // updat, validat, migrat; but not treat/repeat
    if let Some(head) = stem.strip_suffix("at")
        && head.bytes().last().is_some_and(|b| !b"aeiou".contains(&b))
    {
        return true;
    }
    measure(stem) == 1 && ends_cvc(stem)
}

fn is_consonant(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(bytes, i - 1),
        _ => true,
    }
}

/// Number of vowel-run/consonant-run pairs in the word.
fn measure(word: &str) -> usize {
    let bytes = word.as_bytes();
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..bytes.len() {
        let consonant = is_consonant(bytes, i);
        if consonant && prev_vowel {
            m += 1;
        }
        prev_vowel = !consonant;
    }
    m
}

fn ends_cvc(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 3
        && is_consonant(bytes, n - 3)
        && !is_consonant(bytes, n - 2)
        && is_consonant(bytes, n - 1)
        && !b"wxy".contains(&bytes[n - 1])
}
