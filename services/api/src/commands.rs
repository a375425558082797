use clap::Args;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use support_qa::error::AppError;
use support_qa::evaluations::{
    normalize_legacy_score_sheet, MetricCatalog, ScoreBreakdown, ScoreSheet, Scorer,
};

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// JSON object of metric key to grade, e.g. {"accuracy": 9}
    #[arg(long)]
    pub(crate) sheet: Option<PathBuf>,
    /// Individual grade; repeat for several metrics. Overrides values from --sheet.
    #[arg(long = "grade", value_name = "KEY=VALUE", value_parser = parse_grade)]
    pub(crate) grades: Vec<(String, f64)>,
    /// Treat the sheet as a legacy 0-100 record and rescale it first
    #[arg(long)]
    pub(crate) legacy: bool,
    /// Rubric JSON file (defaults to the standard rubric)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Print the breakdown as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Rubric JSON file (defaults to the standard rubric)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn parse_grade(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("expected KEY=VALUE, got '{raw}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid grade for '{key}': {err}"))?;
    Ok((key.to_string(), value))
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let sheet = build_sheet(&args)?;
    let breakdown = Scorer::new(Arc::new(catalog)).breakdown(&sheet);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        print!("{}", render_breakdown(&breakdown));
    }
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    print!("{}", render_catalog(&catalog));
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<MetricCatalog, AppError> {
    match path {
        Some(path) => Ok(MetricCatalog::from_json_path(path)?),
        None => Ok(MetricCatalog::standard()),
    }
}

fn build_sheet(args: &ScoreArgs) -> Result<ScoreSheet, AppError> {
    let mut sheet = match &args.sheet {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<ScoreSheet>(&raw)?
        }
        None => ScoreSheet::new(),
    };
    for (key, value) in &args.grades {
        sheet.set(key.clone(), *value);
    }
    if args.legacy {
        sheet = normalize_legacy_score_sheet(&sheet);
    }
    Ok(sheet)
}

pub(crate) fn render_breakdown(breakdown: &ScoreBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "QA evaluation breakdown");
    let _ = writeln!(
        out,
        "Total: {:.2} ({})",
        breakdown.result.total_score, breakdown.result.performance_category
    );
    if breakdown.result.performance_category.requires_coaching() {
        let _ = writeln!(out, "Coaching recommended");
    }

    let _ = writeln!(out, "\nMetrics");
    for entry in &breakdown.contributions {
        let grade = entry
            .grade
            .map(|grade| format!("{grade:>5.1}"))
            .unwrap_or_else(|| "    -".to_string());
        let _ = writeln!(
            out,
            "  {:<24} {} x {:>2}% = {:>6.2}",
            entry.label, grade, entry.weight, entry.contribution
        );
    }

    let _ = writeln!(out, "\nCategories");
    for subtotal in &breakdown.categories {
        let _ = writeln!(
            out,
            "  {:<14} {:>6.2} / {}",
            subtotal.category, subtotal.achieved, subtotal.available
        );
    }
    out
}

pub(crate) fn render_catalog(catalog: &MetricCatalog) -> String {
    let mut out = String::new();
    for category in catalog.category_weights() {
        let _ = writeln!(out, "{} ({}%)", category.category, category.weight);
        for metric in catalog
            .metrics()
            .iter()
            .filter(|metric| metric.category == category.category)
        {
            let marker = match (metric.hidden, metric.fixed_score) {
                (true, Some(fixed)) => format!(" [hidden, fixed {fixed:.1}]"),
                (true, None) => " [hidden]".to_string(),
                _ => String::new(),
            };
            let _ = writeln!(
                out,
                "  {:<22} {:>2}%  {}{}",
                metric.key, metric.weight, metric.label, marker
            );
        }
    }
    let _ = writeln!(out, "Total weight: {}", catalog.total_weight());
    out
}
