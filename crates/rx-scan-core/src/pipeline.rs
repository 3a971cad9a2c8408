//! End-to-end prescription parsing.
//!
//! [`PrescriptionParser`] turns text (or an image, via a [`TextRecognizer`])
//! into medicines, refill estimates and reminders. Input and recognition
//! failures are the only errors; everything after text acquisition degrades
//! through defaults instead of failing.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, ParserConfig};
use crate::extract::{EntityExtractor, NameMatcher, NoiseFilter, PatternLibrary};
use crate::models::ParsedPrescription;
use crate::schedule::{self, calculate_refills, ReminderScheduler};

/// Failures turning an image into text.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("could not load image: {0}")]
    ImageLoad(String),

    #[error("recognition failed: {0}")]
    Ocr(String),
}

/// Pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no text supplied: {0}")]
    Input(String),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Image-to-text collaborator (preprocessing plus OCR).
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<String, RecognitionError>;
}

/// One parse request.
#[derive(Debug, Clone, Default)]
pub struct ParseInput {
    pub text: Option<String>,
    pub image_path: Option<PathBuf>,
    /// YYYY-MM-DD; today when absent or malformed
    pub start_date: Option<String>,
    /// Names matched ahead of the parser's dictionary for this call only
    pub extra_names: Vec<String>,
}

impl ParseInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_image(path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_extra_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_names.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Prescription parser.
pub struct PrescriptionParser {
    extractor: EntityExtractor,
    scheduler: ReminderScheduler,
    recognizer: Option<Box<dyn TextRecognizer>>,
}

impl Default for PrescriptionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PrescriptionParser {
    /// Create a parser with the default configuration and no recognizer.
    pub fn new() -> Self {
        Self::build(ParserConfig::default())
    }

    /// Create a parser from a configuration, validating it first.
    pub fn from_config(config: ParserConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ParserConfig) -> Self {
        let matcher = NameMatcher::with_names(&config.medicine_names)
            .with_thresholds(config.line_threshold, config.word_threshold)
            .with_min_word_len(config.min_word_len);

        let mut noise = NoiseFilter::new();
        for marker in &config.noise_markers {
            noise.add_marker(marker);
        }

        let extractor = EntityExtractor::from_parts(noise, matcher, PatternLibrary::builtin());
        let scheduler = ReminderScheduler::new().with_food_offset(config.food_offset_minutes);

        Self {
            extractor,
            scheduler,
            recognizer: None,
        }
    }

    /// Attach the image-to-text collaborator.
    pub fn with_recognizer(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.recognizer = Some(Box::new(recognizer));
        self
    }

    /// Run the full pipeline. An image takes precedence over text.
    pub fn parse(&self, input: ParseInput) -> PipelineResult<ParsedPrescription> {
        let text = match (&input.image_path, &input.text) {
            (Some(path), _) => self.recognize(path)?,
            (None, Some(text)) if !text.trim().is_empty() => text.clone(),
            _ => {
                return Err(PipelineError::Input(
                    "neither text nor an image was provided".into(),
                ))
            }
        };

        let start = schedule::resolve_start_date(input.start_date.as_deref(), schedule::today());
        Ok(self.parse_text(&text, start, &input.extra_names))
    }

    /// Parse already-acquired text. Never fails.
    pub fn parse_text(
        &self,
        text: &str,
        start: NaiveDate,
        extra_names: &[String],
    ) -> ParsedPrescription {
        let medicines = if extra_names.is_empty() {
            self.extractor.extract(text)
        } else {
            let matcher = self.extractor.matcher().extended(extra_names);
            self.extractor.extract_with(text, &matcher)
        };

        let refill_info = calculate_refills(&medicines, start);
        let reminders = self.scheduler.schedule_all(&medicines, start);

        info!(
            medicines = medicines.len(),
            reminders = reminders.len(),
            start = %start,
            "parsed prescription"
        );

        ParsedPrescription {
            medicines,
            raw_text: text.to_string(),
            refill_info,
            reminders,
        }
    }

    fn recognize(&self, path: &Path) -> Result<String, RecognitionError> {
        if !path.is_file() {
            warn!(path = %path.display(), "image not found");
            return Err(RecognitionError::ImageLoad(path.display().to_string()));
        }
        let recognizer = self.recognizer.as_ref().ok_or_else(|| {
            warn!("image supplied but no text recognizer is configured");
            RecognitionError::Ocr("no text recognizer configured".into())
        })?;
        recognizer.recognize(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "text recognition failed");
            e
        })
    }
}
