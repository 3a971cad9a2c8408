//! Administrative line filter.
//!
//! Drops prescriber, clinic and form-header lines before any matching runs.
//! A marker must start at a word boundary, so "age:" drops "Age: 42" but not
//! "Dosage: 1-0-1". Institution words are the exception and match anywhere.

/// Default administrative markers (lowercase), matched at word starts.
pub const DEFAULT_NOISE_MARKERS: &[&str] = &[
    "dr.", "clinic", "hospital", "ph:", "date:", "name:", "age:", "sex:", "rx",
];

/// Markers also matched inside a word ("Polyclinic", "CityHospital").
/// Short markers like "rx" and "age:" stay word-start only; they occur
/// inside drug names and field labels.
pub const DEFAULT_EMBEDDED_NOISE_MARKERS: &[&str] = &["clinic", "hospital"];

/// Stateless filter for header and prescriber lines.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    markers: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseFilter {
    /// Create a filter with the default markers.
    pub fn new() -> Self {
        Self {
            markers: DEFAULT_NOISE_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Add a custom marker (matched case-insensitively).
    pub fn add_marker(&mut self, marker: &str) {
        let marker = marker.trim().to_lowercase();
        if !marker.is_empty() && !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
    }

    /// Current markers.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Check if a line is administrative noise.
    pub fn is_noise(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        DEFAULT_EMBEDDED_NOISE_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
            || self
                .markers
                .iter()
                .any(|marker| contains_at_word_start(&lower, marker))
    }
}

fn contains_at_word_start(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |prev| !prev.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines_are_noise() {
        let filter = NoiseFilter::new();

        assert!(filter.is_noise("Dr. John Doe"));
        assert!(filter.is_noise("City Hospital"));
        assert!(filter.is_noise("Ph: 123456"));
        assert!(filter.is_noise("Rx"));
        assert!(filter.is_noise("DATE: 12/03/2024"));
        assert!(filter.is_noise("Patient Name: A. Kumar"));
        assert!(filter.is_noise("Sunrise clinic, 2nd floor"));
    }

    #[test]
    fn test_institution_words_match_inside_words() {
        let filter = NoiseFilter::new();

        assert!(filter.is_noise("Sunrise Polyclinic"));
        assert!(filter.is_noise("CityHospital, Ward 3"));
        assert!(!filter.is_noise("Dosage: 1-0-1"));
        assert!(!filter.is_noise("Orlistat 120mg"));
    }

    #[test]
    fn test_medicine_lines_are_kept() {
        let filter = NoiseFilter::new();

        assert!(!filter.is_noise("Paracetamol 500mg 1-0-1 for 5 days"));
        assert!(!filter.is_noise("1-0-1 after food"));
        assert!(!filter.is_noise("Dosage: 1/2 tablet"));
        assert!(!filter.is_noise("Hydrochlorothiazide 12.5 mg"));
    }

    #[test]
    fn test_custom_marker() {
        let mut filter = NoiseFilter::new();
        assert!(!filter.is_noise("Signature ________"));

        filter.add_marker("Signature");
        assert!(filter.is_noise("Signature ________"));
        assert!(filter.is_noise("signature"));

        filter.add_marker("signature");
        filter.add_marker("   ");
        assert_eq!(filter.markers().len(), DEFAULT_NOISE_MARKERS.len() + 1);
    }
}
