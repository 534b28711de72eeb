//! Turns free text into the word tokens that drive keyword scoring and
//! related-post ranking. Tokens are lowercase, accent-stripped, and filtered
//! against a fixed Spanish stopword list. There is no stemming: "corriendo"
//! and "correr" are different tokens.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this (in characters) are dropped.
pub const MIN_TOKEN_LEN: usize = 3;

/// Spanish function words, pronouns, and deictic time words. Must stay
/// sorted; [`is_stopword`] binary-searches it.
const STOPWORDS: &[&str] = &[
    "a", "al", "algo", "algunos", "ante", "antes", "asi", "aun", "aunque",
    "ayer", "bajo", "bien", "cada", "casi", "como", "con", "contra", "cual",
    "cuando", "de", "del", "desde", "donde", "dos", "el", "ella", "ellas",
    "ellos", "en", "entre", "era", "eres", "es", "esa", "ese", "eso", "esta",
    "estaba", "estamos", "estan", "estar", "este", "esto", "estos", "fue",
    "ha", "hace", "hacia", "han", "hasta", "hay", "hoy", "la", "las", "le",
    "les", "lo", "los", "manana", "mas", "me", "mi", "mis", "mismo", "mucho",
    "muy", "no", "nos", "nuestra", "nuestro", "o", "otra", "para", "pero",
    "poco", "por", "porque", "que", "quien", "se", "sea", "ser", "si", "sin",
    "sobre", "solo", "son", "su", "sus", "tambien", "te", "tener", "tiene",
    "tu", "tus", "tuya", "tuyo", "un", "una", "uno", "vos", "y", "ya",
];

/// Reports whether an already-folded token is a stopword.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lowercases `text`, strips diacritics, and replaces every character outside
/// `[a-z0-9-]` with a space. The result is pure ASCII.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => ' ',
        })
        .collect()
}

/// Splits `text` into tokens. The returned iterator is lazy and preserves
/// order and duplicates; call `tokenize` again to restart from the top.
pub fn tokenize(text: &str) -> Tokens {
    Tokens {
        folded: fold(text),
        pos: 0,
    }
}

/// Iterator returned by [`tokenize`].
#[derive(Clone, Debug)]
pub struct Tokens {
    folded: String,
    pos: usize,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            // `folded` is ASCII, so byte offsets are character offsets.
            let rest = &self.folded[self.pos..];
            let start = rest.find(|c: char| c != ' ')?;
            let word = rest[start..].split(' ').next().unwrap_or_default();
            self.pos += start + word.len();
            if word.len() >= MIN_TOKEN_LEN && !is_stopword(word) {
                return Some(word.to_owned());
            }
        }
    }
}
