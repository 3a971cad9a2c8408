//! Field-extraction pattern library.
//!
//! Each field has an ordered list of case-insensitive matchers. Matchers are
//! not exclusive: every match of every matcher on a line is collected. When a
//! matcher has capture groups, the non-empty groups are joined with a space;
//! otherwise the whole match is used.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{FieldKind, MedicineEntity};

/// Strength with a unit: 500mg, 12.5 mcg, 10 ml, 2 tsp.
pub const DOSAGE_STRENGTH: &str = r"\b\d+(?:[.,]\d+)?\s*(?:mg|g|mcg|iu|ml|tsp|tbsp)\b";
/// Fractional dose with an optional form: 1/2 tablet.
pub const DOSAGE_FRACTION: &str = r"\b\d+/\d+(?:\s*(?:tablet|tab|cap|capsule)s?\b)?";
/// Counted form: 2 tablets, 1 cap. The leading class keeps the denominator of
/// a fraction ("1/2 tablet") from matching on its own.
pub const DOSAGE_COUNT: &str =
    r"(?:^|[^/\d.,])(\d+(?:[.,]\d+)?\s*(?:tablet|tab|cap|capsule)s?)\b";
/// Split-dose notation: 3 or 4 single-digit slots (1-0-1, 1-1-1-1), or 2
/// slots of 0/1 (1-0). Ranges ("3-5", "500-1000") and dates do not qualify.
pub const DOSAGE_SPLIT: &str = r"\b(?:\d(?:-\d){2,3}|[01]-[01])\b";
/// Latin frequency abbreviations.
pub const DOSAGE_ABBREVIATION: &str = r"\b(?:bd|bid|tid|qid|od|sos|hs|stat|q\d+h)\b";
/// English frequency phrases.
pub const DOSAGE_PHRASE: &str = r"\b(?:once|twice|thrice|three times|four times)\s+a\s+day\b";

pub const TIMING_DAY_PART: &str = r"\b(?:morning|afternoon|evening|night|bedtime)\b";

pub const FOOD_MEAL_RELATION: &str =
    r"\b(before|after)\s+(food|meals?|breakfast|lunch|dinner|supper)\b";
pub const FOOD_EMPTY_STOMACH: &str = r"\bempty stomach\b";
pub const FOOD_WITH_FOOD: &str = r"\bwith food\b";

/// Count and unit: 5 days, 2 weeks, 1 month.
pub const DURATION_SPAN: &str = r"\b\d+\s*(?:days?|weeks?|months?|years?)\b";
/// Prefixed span: for 5 days.
pub const DURATION_FOR_SPAN: &str = r"\bfor\s+\d+\s*(?:days?|weeks?|months?|years?)\b";
/// Compact day count: 5d.
pub const DURATION_COMPACT: &str = r"\b\d+\s*d\b";
/// Open-ended course, resolved to a default length downstream.
pub const DURATION_UNTIL_FINISHED: &str = r"\b(?:till|until)\s+finish(?:ed)?\b";

/// Built-in matcher sources per field, in evaluation order.
pub const DEFAULT_PATTERNS: &[(FieldKind, &[&str])] = &[
    (
        FieldKind::Dosage,
        &[
            DOSAGE_STRENGTH,
            DOSAGE_FRACTION,
            DOSAGE_COUNT,
            DOSAGE_SPLIT,
            DOSAGE_ABBREVIATION,
            DOSAGE_PHRASE,
        ],
    ),
    (FieldKind::Timing, &[TIMING_DAY_PART]),
    (
        FieldKind::FoodInstruction,
        &[FOOD_MEAL_RELATION, FOOD_EMPTY_STOMACH, FOOD_WITH_FOOD],
    ),
    (
        FieldKind::Duration,
        &[
            DURATION_SPAN,
            DURATION_FOR_SPAN,
            DURATION_COMPACT,
            DURATION_UNTIL_FINISHED,
        ],
    ),
];

static BUILTIN: Lazy<PatternLibrary> = Lazy::new(|| {
    PatternLibrary::from_sources(DEFAULT_PATTERNS).expect("built-in patterns are valid regexes")
});

/// Ordered, per-field matcher sets.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    fields: Vec<(FieldKind, Vec<Regex>)>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternLibrary {
    /// The built-in dosage, timing, food and duration matchers.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Compile a library from per-field regex sources.
    pub fn from_sources(sources: &[(FieldKind, &[&str])]) -> Result<Self, regex::Error> {
        let mut library = Self { fields: Vec::new() };
        for (kind, patterns) in sources {
            for pattern in *patterns {
                library.add_pattern(*kind, pattern)?;
            }
        }
        Ok(library)
    }

    /// Append a custom matcher to a field. Matching is always case-insensitive.
    pub fn add_pattern(&mut self, kind: FieldKind, pattern: &str) -> Result<(), regex::Error> {
        let regex = Regex::new(&format!("(?i){}", pattern))?;
        match self.fields.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, list)) => list.push(regex),
            None => self.fields.push((kind, vec![regex])),
        }
        Ok(())
    }

    /// Number of matchers registered for a field.
    pub fn pattern_count(&self, kind: FieldKind) -> usize {
        self.fields
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, list)| list.len())
    }

    /// All matches for one field on a line, in matcher order.
    pub fn extract_field(&self, kind: FieldKind, line: &str) -> Vec<String> {
        let Some((_, patterns)) = self.fields.iter().find(|(k, _)| *k == kind) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for pattern in patterns {
            for caps in pattern.captures_iter(line) {
                if let Some(value) = flatten_captures(&caps) {
                    found.push(if kind.lowercases_values() {
                        value.to_lowercase()
                    } else {
                        value
                    });
                }
            }
        }
        found
    }

    /// Run every field's matchers over a line and append the results to an entity.
    pub fn extract_into(&self, line: &str, entity: &mut MedicineEntity) -> usize {
        let mut added = 0;
        for kind in FieldKind::ALL {
            for value in self.extract_field(kind, line) {
                entity.push(kind, value);
                added += 1;
            }
        }
        added
    }
}

fn flatten_captures(caps: &regex::Captures<'_>) -> Option<String> {
    if caps.len() == 1 {
        let whole = caps.get(0)?.as_str().trim();
        return (!whole.is_empty()).then(|| whole.to_string());
    }

    let parts: Vec<&str> = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
