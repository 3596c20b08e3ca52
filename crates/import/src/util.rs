use regex::Regex;

/// Declare a lazily compiled, process-wide regex accessor.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub(crate) use re;

/// Case-insensitive alternation of `words`, each matched as a whole word.
/// Returns `None` when there is nothing to match.
pub fn whole_word_pattern<S: AsRef<str>>(words: &[S]) -> Option<Regex> {
    let alternation = words
        .iter()
        .map(|w| w.as_ref().trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).ok()
}

/// Keep only the characters accepted by `keep`.
pub fn retain_chars(s: &str, keep: impl Fn(char) -> bool) -> String {
    s.chars().filter(|c| keep(*c)).collect()
}
