//! Controlled vocabulary for categorizing free-text judgments.
//!
//! Maps normalized synonyms onto registry breed names. Text that contains no
//! synonym is non-target.

use thiserror::Error;

use crate::domain::{JudgmentCategory, PreliminaryJudgment};
use crate::registry::{breeds, BreedRegistry};

/// Invalid vocabulary entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    /// A synonym is blank after normalization.
    #[error("synonym for '{breed}' must not be empty")]
    EmptySynonym {
        /// Breed the synonym was meant for.
        breed: String,
    },

    /// A synonym points at a breed the registry does not know.
    #[error("synonym '{synonym}' refers to unknown breed '{breed}'")]
    UnknownBreed {
        /// The synonym.
        synonym: String,
        /// The unknown breed name.
        breed: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Synonym {
    term: String,
    breed: String,
}

/// Synonym table, in priority order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<Synonym>,
}

const BUILTIN_SYNONYMS: &[(&str, &str)] = &[
    ("american pit bull terrier", breeds::APBT),
    ("pit bull", breeds::APBT),
    ("pitbull", breeds::APBT),
    ("apbt", breeds::APBT),
    ("美國比特鬥牛犬", breeds::APBT),
    ("比特", breeds::APBT),
    ("american staffordshire terrier", breeds::AMSTAFF),
    ("amstaff", breeds::AMSTAFF),
    ("美國史大佛夏牛頭犬", breeds::AMSTAFF),
    ("staffordshire bull terrier", breeds::SBT),
    ("staffy", breeds::SBT),
    ("sbt", breeds::SBT),
    ("史大佛夏牛頭犬", breeds::SBT),
    ("american bully", breeds::AMERICAN_BULLY),
    ("bully", breeds::AMERICAN_BULLY),
    ("美國惡霸犬", breeds::AMERICAN_BULLY),
];

impl Vocabulary {
    /// Synonyms for the built-in registry breeds.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_SYNONYMS
                .iter()
                .map(|&(term, breed)| Synonym {
                    term: normalize(term),
                    breed: breed.to_string(),
                })
                .collect(),
        }
    }

    /// Builds a vocabulary from `(synonym, breed)` pairs checked against
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError`] for blank synonyms or unknown breeds.
    pub fn new<I, S, B>(registry: &BreedRegistry, entries: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = (S, B)>,
        S: AsRef<str>,
        B: Into<String>,
    {
        let mut vocabulary = Self::default();
        vocabulary.extend(registry, entries)?;
        Ok(vocabulary)
    }

    /// Appends `(synonym, breed)` pairs checked against `registry`.
    ///
    /// Appended entries rank after existing ones when match lengths tie.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError`] for blank synonyms or unknown breeds. No
    /// entry is added when any entry is invalid.
    pub fn extend<I, S, B>(&mut self, registry: &BreedRegistry, entries: I) -> Result<(), VocabularyError>
    where
        I: IntoIterator<Item = (S, B)>,
        S: AsRef<str>,
        B: Into<String>,
    {
        let mut added = Vec::new();
        for (term, breed) in entries {
            let breed = breed.into();
            let term = normalize(term.as_ref());
            if term.is_empty() {
                return Err(VocabularyError::EmptySynonym { breed });
            }
            if !registry.contains(&breed) {
                return Err(VocabularyError::UnknownBreed {
                    synonym: term,
                    breed,
                });
            }
            added.push(Synonym { term, breed });
        }
        self.entries.extend(added);
        Ok(())
    }

    /// Number of synonyms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vocabulary has no synonyms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Synonyms registered for `breed`, in priority order.
    pub fn synonyms_for<'a>(&'a self, breed: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |s| s.breed == breed)
            .map(|s| s.term.as_str())
    }

    /// Maps free text onto a category.
    ///
    /// The text is case-folded and searched for every synonym. The longest
    /// matching synonym decides; equal lengths go to the earlier entry.
    #[must_use]
    pub fn categorize(&self, text: &str) -> JudgmentCategory {
        let text = normalize(text);
        let mut best: Option<&Synonym> = None;
        for entry in self.entries.iter().filter(|e| text.contains(&e.term)) {
            if best.map_or(true, |b| entry.term.chars().count() > b.term.chars().count()) {
                best = Some(entry);
            }
        }
        best.map_or(JudgmentCategory::NonTarget, |e| {
            JudgmentCategory::Target(e.breed.clone())
        })
    }

    /// Categorizes `text` into a [`PreliminaryJudgment`].
    #[must_use]
    pub fn judge(&self, text: impl Into<String>) -> PreliminaryJudgment {
        let text = text.into();
        let category = self.categorize(&text);
        PreliminaryJudgment { text, category }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
