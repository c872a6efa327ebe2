//! Counts and printable reports for plans and execution results.

use std::fmt::Write as _;

use serde::Serialize;

use crate::rename_engine::{ExecutionOutcome, ExecutionResult, PlanStatus, RenamePlan};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub total: usize,
    pub ready: usize,
    pub deselected: usize,
    pub unchanged: usize,
    pub no_metadata: usize,
    pub hidden: usize,
    pub errors: usize,
}

impl PlanSummary {
    pub fn of(plan: &RenamePlan) -> Self {
        let mut summary = Self { total: plan.len(), ..Default::default() };
        for entry in &plan.entries {
            match &entry.status {
                PlanStatus::Ready if entry.approved => summary.ready += 1,
                PlanStatus::Ready => summary.deselected += 1,
                PlanStatus::Unchanged => summary.unchanged += 1,
                PlanStatus::NoMetadata => summary.no_metadata += 1,
                PlanStatus::Hidden => summary.hidden += 1,
                PlanStatus::Error(_) => summary.errors += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ExecutionSummary {
    pub fn of(results: &[ExecutionResult]) -> Self {
        let mut summary = Self { total: results.len(), ..Default::default() };
        for result in results {
            match result.outcome {
                ExecutionOutcome::Renamed(_) => summary.renamed += 1,
                ExecutionOutcome::Skipped => summary.skipped += 1,
                ExecutionOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Serialize)]
pub struct PlanReport<'a> {
    pub summary: PlanSummary,
    #[serde(flatten)]
    pub plan: &'a RenamePlan,
}

#[derive(Debug, Serialize)]
pub struct ExecutionReport<'a> {
    pub plan: PlanSummary,
    pub summary: ExecutionSummary,
    pub results: &'a [ExecutionResult],
}

pub fn plan_json(plan: &RenamePlan) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&PlanReport { summary: PlanSummary::of(plan), plan })
}

pub fn execution_json(plan: &RenamePlan, results: &[ExecutionResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExecutionReport {
        plan: PlanSummary::of(plan),
        summary: ExecutionSummary::of(results),
        results,
    })
}

pub fn plan_table(plan: &RenamePlan) -> String {
    let mut out = String::new();
    for entry in &plan.entries {
        let marker = match &entry.status {
            PlanStatus::Ready if entry.approved => "READY",
            PlanStatus::Ready => "SKIP",
            PlanStatus::Unchanged => "SAME",
            PlanStatus::NoMetadata => "NONE",
            PlanStatus::Hidden => "HIDE",
            PlanStatus::Error(_) => "ERROR",
        };
        let target = match (&entry.status, &entry.proposed_name) {
            (PlanStatus::Error(reason), _) => reason.clone(),
            (PlanStatus::NoMetadata, _) => "(no usable metadata)".to_string(),
            (PlanStatus::Hidden, _) => "(hidden file, use --include-hidden)".to_string(),
            (_, Some(name)) => name.clone(),
            (_, None) => String::new(),
        };
        let _ = writeln!(out, "[{:<5}] {} -> {}", marker, entry.file.file_name(), target);
    }

    let s = PlanSummary::of(plan);
    let _ = writeln!(
        out,
        "{} file(s): {} to rename, {} unchanged, {} without metadata, {} hidden, {} error(s)",
        s.total, s.ready, s.unchanged, s.no_metadata, s.hidden, s.errors
    );
    out
}

pub fn execution_table(results: &[ExecutionResult]) -> String {
    let mut out = String::new();
    for result in results {
        let line = match &result.outcome {
            ExecutionOutcome::Renamed(target) => format!(
                "✓ {} -> {}",
                result.entry.file.file_name(),
                target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
            ),
            ExecutionOutcome::Skipped => format!("- {} (skipped)", result.entry.file.file_name()),
            ExecutionOutcome::Failed(reason) => format!("✗ {}: {}", result.entry.file.file_name(), reason),
        };
        let _ = writeln!(out, "{}", line);
    }

    let s = ExecutionSummary::of(results);
    let _ = writeln!(out, "Summary: {} renamed, {} skipped, {} failed", s.renamed, s.skipped, s.failed);
    out
}
