use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::deps::{referenced_ids, DependencyGraph};
use super::types::{TaskSpec, WorkflowSpec};
use crate::error::SpecError;

static TASK_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn task_id_regex() -> &'static Regex {
    TASK_ID_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*[A-Za-z0-9]$").expect("TASK_ID_REGEX is valid")
    })
}

pub fn is_valid_task_id(id: &str) -> bool {
    task_id_regex().is_match(id)
}

/// Runs every structural check on a loaded spec.
pub fn validate(spec: &WorkflowSpec) -> Result<DependencyGraph, SpecError> {
    normalize_start_date(&spec.start_date)?;
    check_duplicate_ids(&spec.workflow)?;
    check_dependencies_declared(&spec.task_dependencies, &spec.workflow)?;
    check_task_id_grammar(&spec.workflow)?;

    let graph = DependencyGraph::from_expressions(&spec.task_dependencies)?;
    graph.validate()?;

    tracing::debug!(
        target: "dagen.spec",
        stage = "validate",
        tasks = spec.workflow.len(),
        edges = graph.edge_count(),
        "workflow graph validated"
    );
    Ok(graph)
}

/// Every id named in a dependency expression must be a declared task.
/// Reports each missing id once, in order of first appearance.
pub fn check_dependencies_declared(
    task_dependencies: &[String],
    workflow: &[TaskSpec],
) -> Result<(), SpecError> {
    let declared: HashSet<&str> = workflow.iter().map(|t| t.id.as_str()).collect();
    let mut seen = HashSet::new();
    let mut missing = Vec::new();

    for line in task_dependencies {
        for id in referenced_ids(line) {
            if !declared.contains(id.as_str()) && seen.insert(id.clone()) {
                missing.push(id);
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SpecError::DependencyGraph { missing })
    }
}

pub fn check_task_id_grammar(workflow: &[TaskSpec]) -> Result<(), SpecError> {
    let malformed: Vec<String> = workflow
        .iter()
        .filter(|t| !is_valid_task_id(&t.id))
        .map(|t| t.id.clone())
        .collect();

    if malformed.is_empty() {
        Ok(())
    } else {
        Err(SpecError::IdentifierGrammar { malformed })
    }
}

pub fn check_duplicate_ids(workflow: &[TaskSpec]) -> Result<(), SpecError> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for t in workflow {
        if !seen.insert(t.id.as_str()) && !duplicates.contains(&t.id) {
            duplicates.push(t.id.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(SpecError::DuplicateTaskId { duplicates })
    }
}

/// `start_date` is spliced into a datetime constructor call, so it must be
/// 3 to 6 comma-separated integers. Returns the canonical `2019, 7, 1` form;
/// Python rejects zero-padded literals such as `07`.
pub fn normalize_start_date(start_date: &str) -> Result<String, SpecError> {
    let parts: Option<Vec<u32>> = start_date
        .split(',')
        .map(str::trim)
        .map(|p| {
            if p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            p.parse().ok()
        })
        .collect();

    match parts {
        Some(parts) if (3..=6).contains(&parts.len()) => Ok(parts
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")),
        _ => Err(SpecError::InvalidField {
            field: "start_date",
            reason: format!(
                "expected 3 to 6 comma-separated integers (e.g. \"2019, 7, 1\"), got \"{start_date}\""
            ),
        }),
    }
}
