//! Parity Simulator - seeded randomized driver for the equivalence oracle
//!
//! Generates batches mixing ordinary records, boundary values and invalid
//! inputs, runs each through the oracle and collects every divergence.

use crate::oracle::EquivalenceOracle;
use crate::report::{Outcome, ParityReport, Verdict};
use payroll_core::{EmployeeRecord, DEFAULT_MAX_BATCH_SIZE};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Parity Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Batches to run through the oracle
    pub total_batches: u64,
    /// Largest generated batch
    pub max_batch_size: usize,
    /// Mix of record kinds
    pub distribution: RecordDistribution,
    pub stop_on_first_violation: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            total_batches: 100,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            distribution: RecordDistribution::default(),
            stop_on_first_violation: false,
        }
    }
}

/// Probability of each record kind
#[derive(Debug, Clone)]
pub struct RecordDistribution {
    /// Ordinary records
    pub valid: f64,
    /// Boundary values that must still encode
    pub edge_cases: f64,
    /// Values both paths must reject
    pub invalid: f64,
}

impl Default for RecordDistribution {
    fn default() -> Self {
        Self {
            valid: 0.80,
            edge_cases: 0.15,
            invalid: 0.05,
        }
    }
}

/// A divergence found while simulating
#[derive(Debug, Clone)]
pub struct Violation {
    pub batch_index: u64,
    pub report: ParityReport,
}

/// Statistics collected during simulation
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub total_batches: u64,
    pub total_records: u64,
    pub agreed: u64,
    pub both_failed: u64,
    pub diverged: u64,
    /// Shared failure kinds seen when both paths rejected a batch
    pub failures_by_kind: BTreeMap<String, u64>,
}

impl BatchStats {
    pub fn record(&mut self, report: &ParityReport) {
        self.total_batches += 1;
        self.total_records += report.inputs.len() as u64;
        match report.verdict {
            Verdict::Agree => self.agreed += 1,
            Verdict::BothFailed => {
                self.both_failed += 1;
                if let Outcome::Failure { signature, .. } = &report.native {
                    *self
                        .failures_by_kind
                        .entry(signature.kind.to_string())
                        .or_insert(0) += 1;
                }
            }
            Verdict::Diverged => self.diverged += 1,
        }
    }
}

/// Final report from the simulator
#[derive(Debug, Clone)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: BatchStats,
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    /// Check if simulation passed all criteria
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Generate a text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Payroll Parity Simulator Report ===\n\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Total Batches: {}", self.stats.total_batches);
        let _ = writeln!(report, "Total Records: {}", self.stats.total_records);
        let _ = writeln!(report, "Agreed: {}", self.stats.agreed);
        let _ = writeln!(report, "Both Failed: {}", self.stats.both_failed);
        let _ = writeln!(report, "Violations: {}", self.violations.len());

        if !self.stats.failures_by_kind.is_empty() {
            report.push_str("\n=== Shared Failures ===\n");
            for (kind, count) in &self.stats.failures_by_kind {
                let _ = writeln!(report, "{kind}: {count}");
            }
        }

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. batch {}: {}", i + 1, v.batch_index, v.report.summary());
                for m in &v.report.mismatches {
                    let _ = writeln!(report, "   - {m}");
                }
            }
        }

        let _ = write!(
            report,
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Run the Parity Simulator
pub async fn run_simulator(oracle: &EquivalenceOracle, config: SimulatorConfig) -> SimulatorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = BatchStats::default();
    let mut violations = Vec::new();

    tracing::info!(
        seed = config.seed,
        batches = config.total_batches,
        "starting parity simulation"
    );

    for batch_index in 0..config.total_batches {
        let batch = generate_batch(&mut rng, &config);
        let report = oracle.check(&batch).await;
        stats.record(&report);

        if !report.passed() {
            violations.push(Violation {
                batch_index,
                report,
            });
            if config.stop_on_first_violation {
                break;
            }
        }
    }

    SimulatorReport {
        config,
        stats,
        violations,
    }
}

/// Generate one batch of 1..=`max_batch_size` records
pub fn generate_batch(rng: &mut StdRng, config: &SimulatorConfig) -> Vec<EmployeeRecord> {
    let len = rng.random_range(1..=config.max_batch_size.max(1));
    (0..len)
        .map(|i| generate_record(rng, &config.distribution, i))
        .collect()
}

fn generate_record(
    rng: &mut StdRng,
    distribution: &RecordDistribution,
    index: usize,
) -> EmployeeRecord {
    let r: f64 = rng.random();

    if r < distribution.valid {
        generate_valid_record(rng, index)
    } else if r < distribution.valid + distribution.edge_cases {
        generate_edge_case_record(rng, index)
    } else {
        generate_invalid_record(rng, index)
    }
}

fn generate_valid_record(rng: &mut StdRng, index: usize) -> EmployeeRecord {
    let id = format!("E{:04}", rng.random_range(0..10_000u32));
    let hours = rng.random_range(0.0..80.0);
    let rate = rng.random_range(7.25..250.0);
    let tax = if rng.random_bool(0.2) {
        0.0
    } else {
        rng.random_range(0.0..2_000.0)
    };
    tracing::trace!(index, %id, "valid record");
    EmployeeRecord::new(id, hours, rate, tax)
}

/// Boundary values: every one of these must still encode
fn generate_edge_case_record(rng: &mut StdRng, index: usize) -> EmployeeRecord {
    let id = format!("B{index:02}");
    match rng.random_range(0..8) {
        0 => EmployeeRecord::new(id, 0.0, 0.0, 0.0),
        1 => EmployeeRecord::new(id, 999.99, 99_999.99, 0.0),
        2 => EmployeeRecord::new(id, 1.0, 0.0, 99_999.99),
        3 => EmployeeRecord::new("ABCDE", 40.0, 25.0, 100.0),
        4 => EmployeeRecord::new("EMPLOYEE-000042", 40.0, 25.0, 100.0),
        5 => {
            let rate = [0.125, 1.005, 2.675, 12.345][rng.random_range(0..4)];
            EmployeeRecord::new(id, 10.0, rate, 0.005)
        }
        6 => EmployeeRecord::new(id, 7.9, 10.0, 0.0),
        _ => EmployeeRecord::new(" E 1", 0.5, 99_999.985, 0.0),
    }
}

/// Values both paths must reject with the same signature
fn generate_invalid_record(rng: &mut StdRng, index: usize) -> EmployeeRecord {
    let id = format!("X{index:02}");
    match rng.random_range(0..7) {
        0 => EmployeeRecord::new(id, 10.0, f64::NAN, 0.0),
        1 => EmployeeRecord::new(id, f64::INFINITY, 10.0, 0.0),
        2 => EmployeeRecord::new(id, 10.0, -0.01, 0.0),
        3 => EmployeeRecord::new(id, 10.0, 100_000.0, 0.0),
        4 => EmployeeRecord::new(id, 1_000.0, 10.0, 0.0),
        5 => EmployeeRecord::new(id, -1.0, 10.0, 0.0),
        _ => EmployeeRecord::new("A,B", 10.0, 10.0, 0.0),
    }
}
