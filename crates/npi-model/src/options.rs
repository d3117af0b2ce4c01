//! Options for the cleaning and shaping stages.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ============================================================================
// Cleaning
// ============================================================================

/// Options for the cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Raw `customer_type` code → normalized code.
    pub customer_type_replacements: BTreeMap<String, String>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        let customer_type_replacements = [("BPF", "BP"), ("PF", "P")]
            .into_iter()
            .map(|(raw, normalized)| (raw.to_string(), normalized.to_string()))
            .collect();
        Self {
            customer_type_replacements,
        }
    }
}

// ============================================================================
// Outlier detection
// ============================================================================

/// Anomaly detector applied to `qty` inside each peer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum OutlierMethod {
    /// Tukey fences on the interquartile range.
    #[default]
    #[serde(rename = "iqr")]
    Iqr,
    /// Modified z-score on the median absolute deviation.
    #[serde(rename = "mad")]
    Mad,
    /// Isolation forest anomaly score.
    #[serde(rename = "iso")]
    IsolationForest,
    /// One-class support vector machine with an RBF kernel.
    #[serde(rename = "svm")]
    OneClassSvm,
}

impl OutlierMethod {
    pub const fn all() -> &'static [OutlierMethod] {
        &[
            Self::Iqr,
            Self::Mad,
            Self::IsolationForest,
            Self::OneClassSvm,
        ]
    }

    /// Short tag used in configuration files and on the command line.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
            Self::Mad => "mad",
            Self::IsolationForest => "iso",
            Self::OneClassSvm => "svm",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Iqr => "Interquartile range",
            Self::Mad => "Median absolute deviation",
            Self::IsolationForest => "Isolation forest",
            Self::OneClassSvm => "One-class SVM",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Iqr => "Outside [max(floor, Q1 - k*IQR), Q3 + k*IQR]",
            Self::Mad => "|0.6745 * (x - median) / MAD| above threshold",
            Self::IsolationForest => "Average isolation depth gives a score above 0.5",
            Self::OneClassSvm => "Negative or zero RBF novelty decision value",
        }
    }
}

impl FromStr for OutlierMethod {
    type Err = ModelError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim();
        Self::all()
            .iter()
            .copied()
            .find(|method| normalized.eq_ignore_ascii_case(method.tag()))
            .ok_or_else(|| ModelError::UnknownOutlierMethod {
                tag: tag.to_string(),
            })
    }
}

impl TryFrom<String> for OutlierMethod {
    type Error = ModelError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Parameters of the outlier detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierOptions {
    pub method: OutlierMethod,

    /// Fence multiplier applied to the IQR.
    pub iqr_multiplier: f64,
    /// Lower bound never drops below this quantity.
    pub iqr_lower_floor: f64,

    /// Absolute modified z-score above which a value is anomalous.
    pub mad_threshold: f64,

    pub forest_trees: usize,
    /// Sub-sample size per tree, capped at the group size.
    pub forest_max_samples: usize,
    pub forest_seed: u64,

    /// Upper bound on the fraction of training errors.
    pub svm_nu: f64,
    /// RBF kernel coefficient. `None` uses `1 / feature_count`.
    pub svm_gamma: Option<f64>,
    /// Stopping tolerance of the SMO solver.
    pub svm_tolerance: f64,
}

impl Default for OutlierOptions {
    fn default() -> Self {
        Self {
            method: OutlierMethod::default(),
            iqr_multiplier: 1.5,
            iqr_lower_floor: 2.0,
            mad_threshold: 3.5,
            forest_trees: 100,
            forest_max_samples: 256,
            forest_seed: 42,
            svm_nu: 0.5,
            svm_gamma: None,
            svm_tolerance: 1e-3,
        }
    }
}

impl OutlierOptions {
    #[must_use]
    pub fn with_method(mut self, method: OutlierMethod) -> Self {
        self.method = method;
        self
    }
}

// ============================================================================
// Shaping
// ============================================================================

/// Options for the shaping stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingOptions {
    /// Orders created within this many weeks of a group's first order are
    /// first orders.
    pub week_inside_first: u32,

    /// Reference date for `till_today`. `None` uses the local date.
    pub today: Option<NaiveDate>,

    pub outlier: OutlierOptions,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self {
            week_inside_first: 2,
            today: None,
            outlier: OutlierOptions::default(),
        }
    }
}

impl ShapingOptions {
    #[must_use]
    pub fn with_week_inside_first(mut self, weeks: u32) -> Self {
        self.week_inside_first = weeks;
        self
    }

    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub fn with_outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier.method = method;
        self
    }

    /// The reference date, falling back to the local calendar date.
    pub fn reference_date(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
