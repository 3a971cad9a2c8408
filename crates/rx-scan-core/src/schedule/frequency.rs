//! Daily frequency inference from dosage tokens.
//!
//! Per token, split-dose notation wins over keywords. A split-dose token
//! counts its non-zero slots: each slot means "take at this time", not a
//! unit count, so "2-0-2" is twice a day. Across tokens the maximum is taken
//! so a redundant partial token ("OD" next to "1-0-1") cannot under-count.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::TimeSlot;

/// Frequency used when nothing in the dosage says otherwise.
pub const DEFAULT_DAILY_FREQUENCY: u32 = 1;

static SPLIT_DOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("({})", crate::extract::DOSAGE_SPLIT)).expect("split-dose regex")
});

static EVERY_N_HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bq(\d+)h\b").expect("interval regex"));

static KEYWORDS: Lazy<Vec<(Regex, FrequencyKeyword)>> = Lazy::new(|| {
    [
        (r"\b(?:qid|four times)\b", FrequencyKeyword::FourTimes),
        (r"\b(?:tid|thrice|three times)\b", FrequencyKeyword::Thrice),
        (r"\b(?:bd|bid|twice|two times)\b", FrequencyKeyword::Twice),
        (r"\b(?:od|once|one time)\b", FrequencyKeyword::Once),
        (r"\b(?:hs|bedtime)\b", FrequencyKeyword::Bedtime),
    ]
    .into_iter()
    .map(|(src, kw)| (Regex::new(&format!("(?i){}", src)).expect("keyword regex"), kw))
    .collect()
});

/// A recognised frequency abbreviation or phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyKeyword {
    Once,
    Twice,
    Thrice,
    FourTimes,
    Bedtime,
    /// q<n>h
    EveryHours(u32),
}

impl FrequencyKeyword {
    /// Doses per day implied by the keyword.
    pub fn daily_frequency(&self) -> u32 {
        match self {
            FrequencyKeyword::Once | FrequencyKeyword::Bedtime => 1,
            FrequencyKeyword::Twice => 2,
            FrequencyKeyword::Thrice => 3,
            FrequencyKeyword::FourTimes => 4,
            FrequencyKeyword::EveryHours(hours) => (24 / (*hours).max(1)).clamp(1, 24),
        }
    }

    /// Day-parts implied by the keyword when no explicit timing is given.
    pub fn default_slots(&self) -> Vec<TimeSlot> {
        match self {
            FrequencyKeyword::Bedtime => vec![TimeSlot::Night],
            other => slots_for_frequency(other.daily_frequency()),
        }
    }
}

/// Spread a daily frequency over the named day-parts.
pub fn slots_for_frequency(frequency: u32) -> Vec<TimeSlot> {
    match frequency {
        0 => vec![],
        1 => vec![TimeSlot::Morning],
        2 => vec![TimeSlot::Morning, TimeSlot::Night],
        3 => vec![TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Night],
        _ => vec![
            TimeSlot::Morning,
            TimeSlot::Afternoon,
            TimeSlot::Evening,
            TimeSlot::Night,
        ],
    }
}

/// Slot values of the first split-dose notation in a token ("1-0-1" → [1, 0, 1]).
pub fn split_dose_slots(token: &str) -> Option<Vec<u32>> {
    let notation = SPLIT_DOSE.captures(token)?.get(1)?.as_str();
    notation
        .split('-')
        .map(|part| part.parse::<u32>().ok())
        .collect()
}

/// Day-parts for the non-zero positions of a split-dose notation.
///
/// Two slots read as morning/night, three as morning/afternoon/night and four
/// as morning/afternoon/evening/night.
pub fn split_dose_time_slots(slots: &[u32]) -> Vec<TimeSlot> {
    let layout = match slots.len() {
        2 => slots_for_frequency(2),
        3 => slots_for_frequency(3),
        4 => slots_for_frequency(4),
        _ => return vec![],
    };
    layout
        .into_iter()
        .zip(slots)
        .filter(|(_, count)| **count > 0)
        .map(|(slot, _)| slot)
        .collect()
}

/// All frequency keywords present in a token.
pub fn keywords_in(token: &str) -> Vec<FrequencyKeyword> {
    let mut found: Vec<FrequencyKeyword> = KEYWORDS
        .iter()
        .filter(|(re, _)| re.is_match(token))
        .map(|(_, kw)| *kw)
        .collect();

    for caps in EVERY_N_HOURS.captures_iter(token) {
        if let Some(hours) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            if hours > 0 {
                found.push(FrequencyKeyword::EveryHours(hours));
            }
        }
    }
    found
}

/// Frequency implied by a single token, if it says anything about frequency.
pub fn token_frequency(token: &str) -> Option<u32> {
    if let Some(slots) = split_dose_slots(token) {
        return Some(slots.iter().filter(|s| **s > 0).count() as u32);
    }
    keywords_in(token)
        .iter()
        .map(FrequencyKeyword::daily_frequency)
        .max()
}

/// Doses per day for a medicine's dosage tokens (always >= 1).
pub fn estimate_frequency(dosage: &[String]) -> u32 {
    dosage
        .iter()
        .filter_map(|token| token_frequency(token))
        .max()
        .unwrap_or(DEFAULT_DAILY_FREQUENCY)
        .max(DEFAULT_DAILY_FREQUENCY)
}
