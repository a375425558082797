use serde::Serialize;

use super::super::catalog::{Metric, MetricCatalog};
use super::super::domain::ScoreSheet;
use super::normalizer::{clamp_grade, contribution};

/// Per-metric share of the total, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricContribution {
    pub key: String,
    pub label: String,
    pub category: String,
    pub weight: u8,
    /// Clamped grade actually used, `None` when the metric was not graded.
    pub grade: Option<f64>,
    pub contribution: f64,
}

/// Achieved versus available weight for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySubtotal {
    pub category: String,
    pub achieved: f64,
    pub available: u32,
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Grade used for a metric: the sheet value, or the fixed grade of a hidden metric.
pub(crate) fn resolve_grade(sheet: &ScoreSheet, metric: &Metric) -> Option<f64> {
    sheet
        .get(&metric.key)
        .filter(|value| !value.is_nan())
        .or_else(|| metric.fixed_score.filter(|_| metric.hidden))
}

/// Unrounded sum of contributions, in catalog order.
pub(crate) fn weighted_total(sheet: &ScoreSheet, catalog: &MetricCatalog) -> f64 {
    catalog
        .metrics()
        .iter()
        .map(|metric| contribution(resolve_grade(sheet, metric), metric))
        .sum()
}

pub(crate) fn contributions(sheet: &ScoreSheet, catalog: &MetricCatalog) -> Vec<MetricContribution> {
    catalog
        .metrics()
        .iter()
        .map(|metric| {
            let grade = resolve_grade(sheet, metric);
            MetricContribution {
                key: metric.key.clone(),
                label: metric.label.clone(),
                category: metric.category.clone(),
                weight: metric.weight,
                grade: grade.map(clamp_grade),
                contribution: round_to_cents(contribution(grade, metric)),
            }
        })
        .collect()
}

pub(crate) fn category_subtotals(
    sheet: &ScoreSheet,
    catalog: &MetricCatalog,
) -> Vec<CategorySubtotal> {
    catalog
        .category_weights()
        .into_iter()
        .map(|entry| {
            let achieved: f64 = catalog
                .metrics()
                .iter()
                .filter(|metric| metric.category == entry.category)
                .map(|metric| contribution(resolve_grade(sheet, metric), metric))
                .sum();
            CategorySubtotal {
                category: entry.category,
                achieved: round_to_cents(achieved),
                available: entry.weight,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to_cents(55.000000000001), 55.0);
        assert_eq!(round_to_cents(72.346), 72.35);
        assert_eq!(round_to_cents(9.999), 10.0);
    }

    #[test]
    fn hidden_metric_falls_back_to_fixed_grade() {
        let catalog = MetricCatalog::standard();
        let hidden = catalog
            .metrics()
            .iter()
            .find(|metric| metric.hidden)
            .expect("standard catalog has a hidden metric");

        let empty = ScoreSheet::default();
        assert_eq!(resolve_grade(&empty, hidden), hidden.fixed_score);

        let mut overridden = ScoreSheet::default();
        overridden.set(hidden.key.clone(), 3.0);
        assert_eq!(resolve_grade(&overridden, hidden), Some(3.0));
    }

    #[test]
    fn visible_metric_never_uses_fixed_grade() {
        let metric = Metric {
            key: "tone".to_string(),
            label: "Tone".to_string(),
            weight: 10,
            category: "Communication".to_string(),
            hidden: false,
            fixed_score: Some(9.0),
        };
        assert_eq!(resolve_grade(&ScoreSheet::default(), &metric), None);
    }

    #[test]
    fn unknown_sheet_keys_are_ignored() {
        let catalog = MetricCatalog::standard();
        let mut sheet = ScoreSheet::default();
        sheet.set("not_a_metric", 10.0);

        let hidden_only: f64 = catalog
            .metrics()
            .iter()
            .filter(|metric| metric.hidden)
            .map(|metric| contribution(metric.fixed_score, metric))
            .sum();
        assert_eq!(weighted_total(&sheet, &catalog), hidden_only);
    }

    #[test]
    fn category_subtotals_add_up_to_total() {
        let catalog = MetricCatalog::standard();
        let sheet: ScoreSheet = catalog
            .metrics()
            .iter()
            .map(|metric| (metric.key.clone(), 7.0))
            .collect();

        let subtotals = category_subtotals(&sheet, &catalog);
        let achieved: f64 = subtotals.iter().map(|entry| entry.achieved).sum();
        assert_eq!(round_to_cents(achieved), 70.0);
        assert_eq!(
            subtotals.iter().map(|entry| entry.available).sum::<u32>(),
            100
        );
    }
}
