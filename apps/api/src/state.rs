use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analysis::analyzer::CandidateAnalyzer;
use crate::analysis::fit_scoring::{FitScorer, WeightedFitScorer};
use crate::config::Config;
use crate::ranking::ranker::{RankingEngine, RankingLimits};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable fit scorer. Default: WeightedFitScorer built from `config.scoring`.
    pub fit_scorer: Arc<dyn FitScorer>,
    /// Cancelled on shutdown; every ranking batch runs under a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, shutdown: CancellationToken) -> Self {
        let fit_scorer = Arc::new(WeightedFitScorer::new(
            config.scoring.fit_weights,
            config.scoring.cultural_signals_default,
        ));
        Self {
            config,
            fit_scorer,
            shutdown,
        }
    }

    pub fn analyzer(&self) -> CandidateAnalyzer {
        CandidateAnalyzer::new(self.fit_scorer.clone(), self.config.scoring.ats_weight)
    }

    pub fn ranking_engine(&self) -> RankingEngine {
        RankingEngine::new(
            self.analyzer(),
            RankingLimits {
                max_batch_size: self.config.max_batch_size,
                max_concurrent: self.config.max_concurrent_analyses,
                candidate_timeout: self.config.candidate_timeout,
            },
        )
    }
}
