//! Scan engine
//!
//! Every block is paired with every rule that matches it. Each pair runs on its own [ResultSet]
//! and pairs run in parallel. Outcomes are merged afterwards in block order, then in rule
//! registration order, so identical input always yields identical reports.
//!
//! A panicking check only loses its own pair. The panic is turned into a [RuleFault] and the scan
//! goes on.
use crate::block::Block;
use crate::context::EvaluationContext;
use crate::registry::Registry;
use crate::result::{Finding, ResultSet};
use crate::rule::{Rule, Severity};
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// worker threads, `None` uses the global pool, `Some(1)` runs on the calling thread
    pub parallelism: Option<NonZeroUsize>,
    /// rule ids or short codes that are not run at all
    pub excluded_rules: Vec<String>,
    /// findings below this severity are dropped
    pub minimum_severity: Option<Severity>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    /// checks that panicked, reported apart from the findings
    pub faults: Vec<RuleFault>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RuleFault {
    pub rule_id: String,
    pub short_code: String,
    /// full name of the block the rule failed on
    pub block: String,
    pub message: String,
}

impl std::fmt::Display for RuleFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rule '{}' failed on '{}': {}",
            self.short_code, self.block, self.message
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("Unable to start scan workers")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub struct Scanner<'r> {
    registry: &'r Registry,
    options: ScanOptions,
}

enum Outcome {
    Findings(Vec<Finding>),
    Fault(RuleFault),
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            options: Default::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Scans the top level blocks of every module in the context
    pub fn scan(&self, context: &EvaluationContext) -> Result<ScanReport, ScanError> {
        self.scan_blocks(&context.blocks())
    }

    pub fn scan_blocks(&self, blocks: &[Block<'_>]) -> Result<ScanReport, ScanError> {
        let rules: Vec<&Rule> = self
            .registry
            .rules()
            .iter()
            .filter(|rule| !self.is_excluded(rule))
            .collect();

        let pairs: Vec<(Block<'_>, &Rule)> = blocks
            .iter()
            .flat_map(|block| {
                rules
                    .iter()
                    .filter(move |rule| rule.matches(block))
                    .map(move |rule| (*block, *rule))
            })
            .collect();

        tracing::debug!(
            blocks = blocks.len(),
            rules = rules.len(),
            pairs = pairs.len(),
            "starting scan"
        );

        let outcomes: Vec<Outcome> = match self.options.parallelism.map(NonZeroUsize::get) {
            Some(1) => pairs.iter().map(|(block, rule)| run_check(block, rule)).collect(),
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| {
                    pairs
                        .par_iter()
                        .map(|(block, rule)| run_check(block, rule))
                        .collect()
                }),
            None => pairs
                .par_iter()
                .map(|(block, rule)| run_check(block, rule))
                .collect(),
        };

        let mut report = ScanReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Findings(findings) => report.findings.extend(
                    findings
                        .into_iter()
                        .filter(|finding| self.is_reported(finding.severity)),
                ),
                Outcome::Fault(fault) => report.faults.push(fault),
            }
        }

        tracing::debug!(
            findings = report.findings.len(),
            faults = report.faults.len(),
            "scan finished"
        );

        Ok(report)
    }

    fn is_excluded(&self, rule: &Rule) -> bool {
        let id = rule.id();
        self.options
            .excluded_rules
            .iter()
            .any(|excluded| *excluded == id || excluded == rule.short_code)
    }

    fn is_reported(&self, severity: Severity) -> bool {
        self.options
            .minimum_severity
            .map(|minimum| severity >= minimum)
            .unwrap_or(true)
    }
}

fn run_check(block: &Block, rule: &Rule) -> Outcome {
    let mut results = ResultSet::new();

    // the check only sees shared, immutable state and its own result set
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        (rule.check)(&mut results, *block, block.context())
    }));

    match outcome {
        Ok(()) => Outcome::Findings(results.into_findings(rule, block)),
        Err(payload) => {
            let fault = RuleFault {
                rule_id: rule.id(),
                short_code: rule.short_code.to_owned(),
                block: block.full_name(),
                message: panic_message(payload),
            };

            tracing::warn!(rule=%fault.rule_id, block=%fault.block, message=%fault.message, "rule check failed");
            Outcome::Fault(fault)
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send + 'static>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "check panicked".to_owned()
    }
}
