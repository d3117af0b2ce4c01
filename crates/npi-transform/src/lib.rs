//! Cleaning and shaping of NPI order tables.
//!
//! # Overview
//!
//! - **Cleaning**: customer type normalization, aggregation over the
//!   dimension tuple, optional area lookup join
//! - **Shaping**: first-order labeling, common year-weeks, till-today and the
//!   comparability flags, run through an explicit stage plan
//! - **Outliers**: per peer group IQR, MAD, isolation forest or one-class SVM
//!
//! # Example
//!
//! ```ignore
//! use npi_model::{CleaningOptions, ShapingOptions};
//! use npi_transform::{cleaning, shape};
//!
//! let cleaned = cleaning(orders, &CleaningOptions::default(), None)?;
//! let shaped = shape(cleaned, &ShapingOptions::default())?;
//! ```

mod cleaning;
mod error;
mod outliers;
mod shaping;

// Error type
pub use error::{Result, TransformError};

// Cleaning
pub use cleaning::{cleaning, grouping, join_area_lookup, replacing_values};

// Shaping
pub use shaping::{
    RELEASES_PER_GROUP, ShapingPlan, ShapingStage, add_common_yearweeks, add_comp,
    add_comp_no_out, add_comp_today, add_comp_today_no_out, add_till_today, comparable,
    label_first_order, shape, till_today_threshold,
};

// Outlier detection
pub use outliers::{
    detect, flag_outliers, iqr_outliers, isolation_forest_outliers, mad_outliers,
    one_class_svm_outliers,
};
