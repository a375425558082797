mod aggregate;
mod normalizer;
mod tier;

pub use aggregate::{round_to_cents, CategorySubtotal, MetricContribution};
pub use normalizer::{
    clamp_grade, clamp_score_sheet, contribution, normalize_legacy_score_sheet,
    normalize_legacy_value, MAX_GRADE, MIN_GRADE,
};
pub use tier::PerformanceCategory;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::MetricCatalog;
use super::domain::ScoreSheet;

/// Total score and tier for one score sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub total_score: f64,
    pub performance_category: PerformanceCategory,
}

/// Result plus the per-metric and per-category detail behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub result: EvaluationResult,
    pub contributions: Vec<MetricContribution>,
    pub categories: Vec<CategorySubtotal>,
}

/// Pure: the same sheet and catalog always yield the same result.
pub fn compute_result(sheet: &ScoreSheet, catalog: &MetricCatalog) -> EvaluationResult {
    let total_score = round_to_cents(aggregate::weighted_total(sheet, catalog));
    EvaluationResult {
        total_score,
        performance_category: PerformanceCategory::classify(total_score),
    }
}

/// Stateless scorer bound to a shared catalog.
#[derive(Debug, Clone)]
pub struct Scorer {
    catalog: Arc<MetricCatalog>,
}

impl Scorer {
    pub fn new(catalog: Arc<MetricCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn compute_result(&self, sheet: &ScoreSheet) -> EvaluationResult {
        compute_result(sheet, &self.catalog)
    }

    pub fn breakdown(&self, sheet: &ScoreSheet) -> ScoreBreakdown {
        ScoreBreakdown {
            result: self.compute_result(sheet),
            contributions: aggregate::contributions(sheet, &self.catalog),
            categories: aggregate::category_subtotals(sheet, &self.catalog),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Arc::new(MetricCatalog::standard()))
    }
}
