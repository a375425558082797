use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Weight every valid catalog must add up to.
pub const TOTAL_WEIGHT: u32 = 100;

/// A single weighted rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub key: String,
    pub label: String,
    /// Percentage points of the total score this metric can contribute.
    pub weight: u8,
    pub category: String,
    /// Hidden metrics are not graded by evaluators but are still aggregated.
    #[serde(default)]
    pub hidden: bool,
    /// Grade a hidden metric contributes when the sheet carries no value for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_score: Option<f64>,
}

/// Summed weight of one rubric category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryWeight {
    pub category: String,
    pub weight: u32,
}

/// Ordered, validated rubric. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCatalog {
    metrics: Vec<Metric>,
}

impl MetricCatalog {
    pub fn new(metrics: Vec<Metric>) -> Result<Self, CatalogError> {
        if metrics.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for metric in &metrics {
            if !seen.insert(metric.key.as_str()) {
                return Err(CatalogError::DuplicateKey(metric.key.clone()));
            }
            if u32::from(metric.weight) > TOTAL_WEIGHT {
                return Err(CatalogError::WeightOutOfRange {
                    key: metric.key.clone(),
                    weight: metric.weight,
                });
            }
            if let Some(score) = metric.fixed_score {
                if !metric.hidden || !(1.0..=10.0).contains(&score) {
                    return Err(CatalogError::InvalidFixedScore {
                        key: metric.key.clone(),
                    });
                }
            }
        }

        let total: u32 = metrics.iter().map(|metric| u32::from(metric.weight)).sum();
        if total != TOTAL_WEIGHT {
            return Err(CatalogError::WeightTotal(total));
        }

        Ok(Self { metrics })
    }

    /// Load a catalog from a JSON array of metrics.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let metrics: Vec<Metric> = serde_json::from_str(raw)?;
        Self::new(metrics)
    }

    /// Built-in support interaction rubric.
    pub fn standard() -> Self {
        Self {
            metrics: standard_metrics(),
        }
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn visible_metrics(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter().filter(|metric| !metric.hidden)
    }

    pub fn metric(&self, key: &str) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.metric(key).is_some()
    }

    pub fn total_weight(&self) -> u32 {
        self.metrics
            .iter()
            .map(|metric| u32::from(metric.weight))
            .sum()
    }

    /// Category totals in the order each category first appears.
    pub fn category_weights(&self) -> Vec<CategoryWeight> {
        let mut totals: Vec<CategoryWeight> = Vec::new();
        for metric in &self.metrics {
            match totals
                .iter_mut()
                .find(|entry| entry.category == metric.category)
            {
                Some(entry) => entry.weight += u32::from(metric.weight),
                None => totals.push(CategoryWeight {
                    category: metric.category.clone(),
                    weight: u32::from(metric.weight),
                }),
            }
        }
        totals
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog has no metrics")]
    Empty,
    #[error("duplicate metric key '{0}'")]
    DuplicateKey(String),
    #[error("metric '{key}' has weight {weight}, expected 0-100")]
    WeightOutOfRange { key: String, weight: u8 },
    #[error("metric weights sum to {0}, expected 100")]
    WeightTotal(u32),
    #[error("metric '{key}' has a fixed score but is not hidden or is outside 1-10")]
    InvalidFixedScore { key: String },
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn metric(key: &str, label: &str, weight: u8, category: &str) -> Metric {
    Metric {
        key: key.to_string(),
        label: label.to_string(),
        weight,
        category: category.to_string(),
        hidden: false,
        fixed_score: None,
    }
}

fn standard_metrics() -> Vec<Metric> {
    vec![
        metric("greeting", "Greeting & Opening", 5, "Communication"),
        metric("tone_empathy", "Tone & Empathy", 10, "Communication"),
        metric("clarity", "Clarity & Grammar", 10, "Communication"),
        metric("active_listening", "Active Listening", 10, "Communication"),
        metric("issue_identification", "Issue Identification", 15, "Resolution"),
        metric("accuracy", "Accuracy of Information", 15, "Resolution"),
        metric("ownership", "Resolution Ownership", 10, "Resolution"),
        metric("documentation", "Ticket Documentation", 10, "Process"),
        metric("response_time", "Response Time", 10, "Process"),
        Metric {
            fixed_score: Some(10.0),
            hidden: true,
            ..metric("policy_compliance", "Policy Compliance", 5, "Process")
        },
    ]
}
