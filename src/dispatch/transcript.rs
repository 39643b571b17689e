/// Normalized recognizer output.
///
/// Lower-cased, sentence punctuation removed, whitespace collapsed.
/// Apostrophes are kept so "what's" still matches.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transcript(String);

const SENTINELS: [&str; 2] = ["none", "stop"];

impl Transcript {
    pub fn new(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .map(|c| match c {
                '.' | ',' | '!' | '?' | ';' | ':' => ' ',
                c => c,
            })
            .collect::<String>()
            .to_lowercase();
        Self(cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// "none" and "stop" re-poll without dispatching
    pub fn is_sentinel(&self) -> bool {
        SENTINELS.contains(&self.0.as_str())
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.0.contains(phrase)
    }

    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.0.contains(p))
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn token_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    /// Text after the first occurrence of `phrase`, trimmed
    pub fn after(&self, phrase: &str) -> Option<&str> {
        self.0
            .find(phrase)
            .map(|at| self.0[at + phrase.len()..].trim())
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
