use super::super::catalog::Metric;
use super::super::domain::ScoreSheet;

pub const MIN_GRADE: f64 = 1.0;
pub const MAX_GRADE: f64 = 10.0;

/// Clamp a raw grade into `[1, 10]`. NaN clamps to the floor.
pub fn clamp_grade(raw: f64) -> f64 {
    if raw.is_nan() {
        MIN_GRADE
    } else {
        raw.clamp(MIN_GRADE, MAX_GRADE)
    }
}

/// Weight-scaled share of the total for one metric. Unset grades contribute nothing.
pub fn contribution(raw: Option<f64>, metric: &Metric) -> f64 {
    match raw.filter(|value| !value.is_nan()) {
        Some(value) => clamp_grade(value) / MAX_GRADE * f64::from(metric.weight),
        None => 0.0,
    }
}

/// Map a persisted value back onto the 1-10 scale.
///
/// Values above 10 are legacy percentages: divided by 10 and rounded to the nearest grade
/// before clamping. Zero, negative and NaN values mean the metric was never graded.
pub fn normalize_legacy_value(value: f64) -> Option<f64> {
    if value.is_nan() || value <= 0.0 {
        return None;
    }

    let grade = if value > MAX_GRADE {
        (value / 10.0).round()
    } else {
        value
    };

    Some(clamp_grade(grade))
}

/// Freshly entered sheet as it is persisted: every grade clamped to `[1, 10]`, NaN entries
/// dropped as unset.
pub fn clamp_score_sheet(entered: &ScoreSheet) -> ScoreSheet {
    entered
        .iter()
        .filter(|(_, value)| !value.is_nan())
        .map(|(key, value)| (key.clone(), clamp_grade(value)))
        .collect()
}

/// Rebuild an editable sheet from persisted values, dropping ungraded entries.
pub fn normalize_legacy_score_sheet(persisted: &ScoreSheet) -> ScoreSheet {
    persisted
        .iter()
        .filter_map(|(key, value)| normalize_legacy_value(value).map(|grade| (key.clone(), grade)))
        .collect()
}
