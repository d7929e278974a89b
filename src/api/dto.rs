use serde::{Deserialize, Serialize};

use crate::application::CorpusAnalysis;

/// Serializable summary of a corpus run, printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub trees: usize,
    pub twins: usize,
    pub distinct_hashes: usize,
    pub duplicate_hashes: usize,
    pub duplicate_ratio: f64,
    pub twins_equal: usize,
    pub contract_violations: usize,
    pub cache_enabled: bool,
    pub elapsed_ms: u64,
}

impl From<CorpusAnalysis> for DistributionReport {
    fn from(analysis: CorpusAnalysis) -> Self {
        DistributionReport {
            duplicate_ratio: analysis.duplicate_ratio(),
            trees: analysis.trees,
            twins: analysis.twins,
            distinct_hashes: analysis.distinct_hashes,
            duplicate_hashes: analysis.duplicate_hashes,
            twins_equal: analysis.twins_equal,
            contract_violations: analysis.contract_violations,
            cache_enabled: false,
            elapsed_ms: 0,
        }
    }
}

impl DistributionReport {
    pub fn with_run_info(mut self, cache_enabled: bool, elapsed_ms: u64) -> Self {
        self.cache_enabled = cache_enabled;
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// A corpus run is healthy when every tree had a twin, every twin matched
    /// and no equal pair hashed differently.
    pub fn is_healthy(&self) -> bool {
        self.twins == self.trees && self.twins_equal == self.trees && self.contract_violations == 0
    }

    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("trees:               {}", self.trees));
        lines.push(format!("twins:               {}", self.twins));
        lines.push(format!("distinct hashes:     {}", self.distinct_hashes));
        lines.push(format!(
            "duplicate hashes:    {} ({:.3}%)",
            self.duplicate_hashes,
            self.duplicate_ratio * 100.0
        ));
        lines.push(format!("twins equal:         {}/{}", self.twins_equal, self.trees));
        lines.push(format!("contract violations: {}", self.contract_violations));
        lines.push(format!("identity cache:      {}", if self.cache_enabled { "on" } else { "off" }));
        lines.push(format!("elapsed:             {} ms", self.elapsed_ms));
        lines.join("\n")
    }
}
