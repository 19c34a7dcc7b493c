//! Per-generation fitness statistics.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation that was evaluated.
    pub generation: u32,
    /// Highest fitness.
    pub best: f32,
    /// Mean fitness.
    pub mean: f32,
    /// Lowest fitness.
    pub worst: f32,
    /// Genomes carried over unmutated.
    pub elite_count: usize,
    /// Mutation amount applied to the rest.
    pub mutation_rate: f32,
}

impl GenerationSummary {
    /// Summarizes `fitness`, ignoring NaN scores.
    pub fn from_fitness(
        generation: u32,
        fitness: &[f32],
        elite_count: usize,
        mutation_rate: f32,
    ) -> Self {
        let scores: Vec<f32> = fitness.iter().copied().filter(|f| !f.is_nan()).collect();
        let (best, mean, worst) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                scores.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                scores.iter().sum::<f32>() / scores.len() as f32,
                scores.iter().copied().fold(f32::INFINITY, f32::min),
            )
        };

        Self {
            generation,
            best,
            mean,
            worst,
            elite_count,
            mutation_rate,
        }
    }
}

/// Bounded history of generation summaries, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationHistory {
    summaries: VecDeque<GenerationSummary>,
    max_history: usize,
}

impl Default for GenerationHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl GenerationHistory {
    /// Creates a history keeping at most `max_history` summaries.
    pub fn new(max_history: usize) -> Self {
        Self {
            summaries: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Appends a summary, dropping the oldest when full.
    pub fn record(&mut self, summary: GenerationSummary) {
        self.summaries.push_back(summary);
        while self.summaries.len() > self.max_history {
            self.summaries.pop_front();
        }
    }

    /// Most recent summary.
    pub fn latest(&self) -> Option<&GenerationSummary> {
        self.summaries.back()
    }

    /// Highest best-fitness among the kept summaries.
    pub fn best_ever(&self) -> Option<f32> {
        self.summaries
            .iter()
            .map(|s| s.best)
            .reduce(f32::max)
    }

    /// All kept summaries, oldest first.
    pub fn summaries(&self) -> &VecDeque<GenerationSummary> {
        &self.summaries
    }

    /// Number of kept summaries.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
