//! Recognition languages and the model scripts they map to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// A language the recognizer can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (`en`).
    En,
    /// Russian (`ru`).
    Ru,
}

impl Language {
    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    /// Script of the recognition model able to read this language.
    pub fn script(&self) -> Script {
        match self {
            Language::En => Script::Latin,
            Language::Ru => Script::Cyrillic,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(OcrError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// The set of languages handed to the engine: one code, or the fixed
/// English + Russian pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSet {
    Single(Language),
    Multilingual,
}

impl LanguageSet {
    /// Build the set from a language and the multilingual switch.
    ///
    /// The multilingual pair wins over the single language.
    pub fn new(language: Language, multilingual: bool) -> Self {
        if multilingual {
            LanguageSet::Multilingual
        } else {
            LanguageSet::Single(language)
        }
    }

    /// Languages in the set, in the order they are passed to the engine.
    pub fn languages(&self) -> Vec<Language> {
        match self {
            LanguageSet::Single(language) => vec![*language],
            LanguageSet::Multilingual => vec![Language::En, Language::Ru],
        }
    }

    /// Recognition script that covers every language in the set.
    ///
    /// The Cyrillic dictionary includes the Latin alphabet, so any set
    /// containing Russian resolves to it.
    pub fn script(&self) -> Script {
        if self.languages().iter().any(|l| l.script() == Script::Cyrillic) {
            Script::Cyrillic
        } else {
            Script::Latin
        }
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        LanguageSet::Single(Language::En)
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.languages().iter().map(|l| l.code()).collect();
        f.write_str(&codes.join("+"))
    }
}

/// Recognition model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Cyrillic,
}

impl Script {
    /// All known scripts.
    pub const ALL: [Script; 2] = [Script::Latin, Script::Cyrillic];

    /// File name of the recognition model for this script.
    pub fn recognition_model(&self) -> &'static str {
        match self {
            Script::Latin => "latin_rec.onnx",
            Script::Cyrillic => "cyrillic_rec.onnx",
        }
    }

    /// File name of the character dictionary for this script.
    pub fn dictionary(&self) -> &'static str {
        match self {
            Script::Latin => "latin_dict.txt",
            Script::Cyrillic => "cyrillic_dict.txt",
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Script::Latin => write!(f, "latin"),
            Script::Cyrillic => write!(f, "cyrillic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_language() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!(" RU ".parse::<Language>().unwrap(), Language::Ru);
        assert!(matches!(
            "de".parse::<Language>(),
            Err(OcrError::UnsupportedLanguage(code)) if code == "de"
        ));
    }

    #[test]
    fn test_multilingual_overrides_language() {
        let set = LanguageSet::new(Language::Ru, true);
        assert_eq!(set, LanguageSet::Multilingual);
        assert_eq!(set.languages(), vec![Language::En, Language::Ru]);
        assert_eq!(set.to_string(), "en+ru");
    }

    #[test]
    fn test_script_selection() {
        assert_eq!(LanguageSet::Single(Language::En).script(), Script::Latin);
        assert_eq!(LanguageSet::Single(Language::Ru).script(), Script::Cyrillic);
        assert_eq!(LanguageSet::Multilingual.script(), Script::Cyrillic);
        assert_eq!(Script::Cyrillic.recognition_model(), "cyrillic_rec.onnx");
    }
}
