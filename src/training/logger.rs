//! Console progress reporting for training runs.

use serde::{Deserialize, Serialize};

use super::eval::MetricValue;

/// How much training progress to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Print nothing.
    #[default]
    Silent,
    /// One line per logging period with metric values.
    Info,
    /// Per-round details.
    Debug,
}

/// Prints training progress to stdout.
///
/// Kept deliberately simple: training is a batch process and callers that
/// want structured output can read metric history from the outcome instead.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    period: usize,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            period: 1,
        }
    }

    /// Log every `period` rounds (plus the first and last).
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period.max(1);
        self
    }

    pub fn start_training(&self, n_rounds: usize) {
        if self.verbosity >= Verbosity::Info {
            println!("training {n_rounds} rounds");
        }
    }

    pub fn log_round(&self, round: usize, n_rounds: usize, metrics: &[MetricValue]) {
        if self.verbosity < Verbosity::Info {
            return;
        }
        let is_edge = round == 0 || round + 1 == n_rounds;
        if !is_edge && round % self.period != 0 && self.verbosity < Verbosity::Debug {
            return;
        }
        let joined = metrics
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("\t");
        println!("[{round}]\t{joined}");
    }

    pub fn finish(&self, best_iteration: Option<usize>) {
        if self.verbosity >= Verbosity::Info {
            match best_iteration {
                Some(best) => println!("done, best iteration {best}"),
                None => println!("done"),
            }
        }
    }
}
