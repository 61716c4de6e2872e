//! Species recommendation from reflective text.
//!
//! [`SpeciesRecommender`] is the pluggable strategy; any
//! `Fn(&str) -> SpeciesId` closure implements it. The shipped strategy,
//! [`KeywordRecommender`], is a best-effort keyword heuristic and not a
//! classifier: rules are checked in priority order (anger, sadness, anxiety,
//! stress, joy) with case-insensitive matching, and the first matching rule
//! wins. No match yields the default species.
//!
//! Latin keywords only match at the start of a word, so "anger" does not
//! fire inside "danger". CJK keywords match anywhere.

use mindforest_types::{SpeciesId, Wisdom};

use crate::catalog::DEFAULT_SPECIES;

/// Strategy mapping reflective text to a suggested species.
///
/// Implementations must be deterministic: the same input always yields the
/// same species.
pub trait SpeciesRecommender: Send + Sync {
    /// Recommend a species for free text.
    fn recommend(&self, text: &str) -> SpeciesId;

    /// Recommend a species for a wisdom record.
    ///
    /// The default joins the situation and the insight into one text.
    fn recommend_for_wisdom(&self, wisdom: &Wisdom) -> SpeciesId {
        self.recommend(&format!("{}\n{}", wisdom.situation, wisdom.insight))
    }
}

impl<F> SpeciesRecommender for F
where
    F: Fn(&str) -> SpeciesId + Send + Sync,
{
    fn recommend(&self, text: &str) -> SpeciesId {
        self(text)
    }
}

/// One keyword rule of the heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    /// Species recommended when the rule matches.
    pub species: SpeciesId,
    /// Keywords matched against the insight (or the whole free text).
    pub keywords: Vec<String>,
    /// Keywords that only describe situations, matched against the
    /// situation summary (or the whole free text).
    pub situation_keywords: Vec<String>,
}

impl KeywordRule {
    /// Build a rule. Keywords are stored lowercased.
    pub fn new(species: SpeciesId, keywords: &[&str], situation_keywords: &[&str]) -> Self {
        Self {
            species,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            situation_keywords: situation_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    fn matches_text(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .chain(&self.situation_keywords)
            .any(|k| contains_keyword(lowered, k))
    }

    fn matches_wisdom(&self, insight: &str, situation: &str) -> bool {
        self.keywords.iter().any(|k| contains_keyword(insight, k))
            || self
                .situation_keywords
                .iter()
                .any(|k| contains_keyword(situation, k))
    }
}

/// Whether `keyword` occurs in `text`, at a word start for ASCII keywords.
fn contains_keyword(text: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return text.contains(keyword);
    }
    text.match_indices(keyword).any(|(at, _)| {
        text.get(..at)
            .and_then(|before| before.chars().next_back())
            .is_none_or(|c| !c.is_ascii_alphanumeric())
    })
}

/// Ordered keyword heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRecommender {
    rules: Vec<KeywordRule>,
    fallback: SpeciesId,
}

impl KeywordRecommender {
    /// Build a recommender from rules in priority order.
    pub const fn new(rules: Vec<KeywordRule>, fallback: SpeciesId) -> Self {
        Self { rules, fallback }
    }

    /// The standard bilingual rule set.
    pub fn standard() -> Self {
        Self::new(
            vec![
                KeywordRule::new(
                    SpeciesId::Pine,
                    &["愤怒", "angry", "anger", "furious"],
                    &["责骂", "scolded", "yelled at"],
                ),
                KeywordRule::new(
                    SpeciesId::Willow,
                    &["悲伤", "失去", "sad", "grief", "grieving"],
                    &[],
                ),
                KeywordRule::new(
                    SpeciesId::Maple,
                    &["焦虑", "担心", "anxious", "anxiety", "worried", "worry"],
                    &[],
                ),
                KeywordRule::new(
                    SpeciesId::Bamboo,
                    &["压力", "紧张", "stress", "pressure", "tense"],
                    &[],
                ),
                KeywordRule::new(SpeciesId::Cherry, &["喜悦", "快乐", "joy", "happy"], &[]),
            ],
            DEFAULT_SPECIES,
        )
    }

    /// The rules in priority order.
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl Default for KeywordRecommender {
    fn default() -> Self {
        Self::standard()
    }
}

impl SpeciesRecommender for KeywordRecommender {
    fn recommend(&self, text: &str) -> SpeciesId {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches_text(&lowered))
            .map_or(self.fallback, |rule| rule.species)
    }

    fn recommend_for_wisdom(&self, wisdom: &Wisdom) -> SpeciesId {
        let insight = wisdom.insight.to_lowercase();
        let situation = wisdom.situation.to_lowercase();
        let species = self
            .rules
            .iter()
            .find(|rule| rule.matches_wisdom(&insight, &situation))
            .map_or(self.fallback, |rule| rule.species);
        tracing::debug!(wisdom_id = %wisdom.id, %species, "Recommended species for wisdom");
        species
    }
}
