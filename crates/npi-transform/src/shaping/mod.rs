//! Shaping stages and the plan that orders them.
//!
//! Every stage declares the columns it reads and the columns it adds. A
//! [`ShapingPlan`] is resolved from the stages a caller wants and runs their
//! dependency closure in a fixed order, checking inputs before each stage.

mod comparability;
mod first_order;
mod yearweek;

use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;

use npi_model::ShapingOptions;
use npi_model::schema::{columns, derived};
use polars::prelude::*;
use tracing::{info, info_span};

use crate::error::{Result, TransformError};
use crate::outliers::flag_outliers;

pub use comparability::{
    RELEASES_PER_GROUP, add_comp, add_comp_no_out, add_comp_today, add_comp_today_no_out,
    comparable,
};
pub use first_order::label_first_order;
pub use yearweek::{add_common_yearweeks, add_till_today, till_today_threshold};

/// One derivation step of the shaper.
///
/// Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapingStage {
    FirstOrder,
    CommonYearWeek,
    Comp,
    TillToday,
    CompToday,
    Outlier,
    CompNoOut,
    CompTodayNoOut,
}

impl ShapingStage {
    pub const fn all() -> &'static [ShapingStage] {
        &[
            Self::FirstOrder,
            Self::CommonYearWeek,
            Self::Comp,
            Self::TillToday,
            Self::CompToday,
            Self::Outlier,
            Self::CompNoOut,
            Self::CompTodayNoOut,
        ]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::FirstOrder => "first_order",
            Self::CommonYearWeek => "common_yearweek",
            Self::Comp => "comp",
            Self::TillToday => "till_today",
            Self::CompToday => "comp_today",
            Self::Outlier => "outlier",
            Self::CompNoOut => "comp_no_out",
            Self::CompTodayNoOut => "comp_today_no_out",
        }
    }

    /// Columns that must be present before the stage runs.
    pub const fn requires(&self) -> &'static [&'static str] {
        use columns::{
            ACQUISITION_MODE_GROUP, BRAND, CREATION_YEARWEEK, CUSTOMER, DEDALO_AREA,
            PLANNED_DELIVERY_YEARWEEK, QTY, RELEASE,
        };
        match self {
            Self::FirstOrder => &[
                RELEASE,
                BRAND,
                CUSTOMER,
                DEDALO_AREA,
                CREATION_YEARWEEK,
                ACQUISITION_MODE_GROUP,
            ],
            Self::CommonYearWeek => &[RELEASE, CREATION_YEARWEEK, PLANNED_DELIVERY_YEARWEEK],
            Self::Comp => &[
                RELEASE,
                BRAND,
                CUSTOMER,
                DEDALO_AREA,
                derived::NEW_ACQUISITION_MODE,
            ],
            Self::TillToday => &[derived::COMMON_CREATION_YEARWEEK],
            Self::CompToday => &[
                RELEASE,
                BRAND,
                CUSTOMER,
                DEDALO_AREA,
                derived::NEW_ACQUISITION_MODE,
                derived::TILL_TODAY,
                derived::COMP,
            ],
            Self::Outlier => &[BRAND, DEDALO_AREA, derived::NEW_ACQUISITION_MODE, QTY],
            Self::CompNoOut => &[derived::OUTLIER, derived::COMP],
            Self::CompTodayNoOut => &[
                RELEASE,
                BRAND,
                CUSTOMER,
                DEDALO_AREA,
                derived::NEW_ACQUISITION_MODE,
                derived::OUTLIER,
                derived::COMP_TODAY,
            ],
        }
    }

    /// Columns the stage adds.
    pub const fn produces(&self) -> &'static [&'static str] {
        match self {
            Self::FirstOrder => &[derived::FIRST_ORDER, derived::NEW_ACQUISITION_MODE],
            Self::CommonYearWeek => &[
                derived::COMMON_CREATION_YEARWEEK,
                derived::COMMON_PLANNED_DELIVERY_YEARWEEK,
            ],
            Self::Comp => &[derived::COMP],
            Self::TillToday => &[derived::TILL_TODAY],
            Self::CompToday => &[derived::COMP_TODAY],
            Self::Outlier => &[derived::OUTLIER],
            Self::CompNoOut => &[derived::COMP_NO_OUT],
            Self::CompTodayNoOut => &[derived::COMP_TODAY_NO_OUT],
        }
    }

    /// Stages whose output this stage reads.
    pub const fn dependencies(&self) -> &'static [ShapingStage] {
        match self {
            Self::FirstOrder | Self::CommonYearWeek => &[],
            Self::Comp | Self::Outlier => &[Self::FirstOrder],
            Self::TillToday => &[Self::CommonYearWeek],
            Self::CompToday => &[Self::Comp, Self::TillToday],
            Self::CompNoOut => &[Self::Comp, Self::Outlier],
            Self::CompTodayNoOut => &[Self::CompToday, Self::Outlier, Self::CompNoOut],
        }
    }

    fn run(self, df: DataFrame, options: &ShapingOptions) -> Result<DataFrame> {
        match self {
            Self::FirstOrder => label_first_order(df, options.week_inside_first),
            Self::CommonYearWeek => add_common_yearweeks(df),
            Self::Comp => add_comp(df),
            Self::TillToday => add_till_today(df, options.reference_date()),
            Self::CompToday => add_comp_today(df),
            Self::Outlier => flag_outliers(df, &options.outlier),
            Self::CompNoOut => add_comp_no_out(df),
            Self::CompTodayNoOut => add_comp_today_no_out(df),
        }
    }
}

impl fmt::Display for ShapingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of stages to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapingPlan {
    stages: Vec<ShapingStage>,
}

impl ShapingPlan {
    /// Dependency closure of `targets`, in execution order.
    pub fn resolve(targets: &[ShapingStage]) -> Self {
        let mut selected = BTreeSet::new();
        let mut pending: Vec<ShapingStage> = targets.to_vec();
        while let Some(stage) = pending.pop() {
            if selected.insert(stage) {
                pending.extend_from_slice(stage.dependencies());
            }
        }
        Self {
            stages: selected.into_iter().collect(),
        }
    }

    /// Every stage.
    pub fn full() -> Self {
        Self::resolve(ShapingStage::all())
    }

    pub fn stages(&self) -> &[ShapingStage] {
        &self.stages
    }

    /// Run the stages in order.
    pub fn execute(&self, mut df: DataFrame, options: &ShapingOptions) -> Result<DataFrame> {
        let span = info_span!("shape", rows = df.height(), stages = self.stages.len());
        let _guard = span.enter();
        let start = Instant::now();

        for &stage in &self.stages {
            check_inputs(&df, stage)?;
            let stage_span = info_span!("stage", name = stage.name());
            let _stage_guard = stage_span.enter();
            let stage_start = Instant::now();
            df = stage.run(df, options)?;
            info!(
                duration_ms = stage_start.elapsed().as_millis(),
                "stage complete"
            );
        }

        info!(
            rows = df.height(),
            duration_ms = start.elapsed().as_millis(),
            "shaping complete"
        );
        Ok(df)
    }
}

impl Default for ShapingPlan {
    fn default() -> Self {
        Self::full()
    }
}

/// Run every shaping stage.
pub fn shape(df: DataFrame, options: &ShapingOptions) -> Result<DataFrame> {
    ShapingPlan::full().execute(df, options)
}

fn check_inputs(df: &DataFrame, stage: ShapingStage) -> Result<()> {
    match stage
        .requires()
        .iter()
        .find(|name| df.column(name).is_err())
    {
        Some(missing) => Err(TransformError::MissingColumn {
            stage: stage.name(),
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Expression helpers
// ============================================================================

pub(crate) fn partition(keys: &[&str]) -> Vec<Expr> {
    keys.iter().map(|key| col(*key)).collect()
}

/// True when any of `keys` is null.
pub(crate) fn any_null(keys: &[&str]) -> Expr {
    keys.iter()
        .map(|key| col(*key).is_null())
        .reduce(|acc, next| acc.or(next))
        .unwrap_or_else(|| lit(false))
}

/// Map a boolean condition onto `Y`/`N`; null counts as `N`.
pub(crate) fn yes_no(condition: Expr) -> Expr {
    when(condition)
        .then(lit(npi_model::schema::flag::YES))
        .otherwise(lit(npi_model::schema::flag::NO))
}
