//! Runs the candidate analyzer over a batch and orders the results.
//!
//! Candidates are analysed independently on the blocking pool, at most
//! `max_concurrent` at a time. Each one is bounded by its own timeout, so a slow
//! or panicking candidate only fails itself. The whole batch can be cancelled
//! through a `CancellationToken`; a cancelled batch never reports rankings.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::analysis::analyzer::CandidateAnalyzer;
use crate::analysis::AnalysisError;
use crate::models::candidate::{FullCandidateAnalysis, RecommendationType};
use crate::models::job::JobDescriptionData;
use crate::ranking::RankingError;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingLimits {
    pub max_batch_size: usize,
    pub max_concurrent: usize,
    pub candidate_timeout: Duration,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            max_batch_size: 10,
            max_concurrent: 4,
            candidate_timeout: Duration::from_secs(30),
        }
    }
}

/// One resume in a batch, keyed by the file it came from.
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateInput {
    pub file_name: String,
    #[serde(default)]
    pub resume: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRankingScore {
    /// 1-based.
    pub rank: usize,
    pub file_name: String,
    pub candidate_name: Option<String>,
    pub overall_score: u32,
    pub fit_score: u32,
    pub ats_score: u32,
    pub recommendation: RecommendationType,
    pub strengths_count: usize,
    pub red_flags_count: usize,
    pub has_critical_red_flags: bool,
    pub matched_skills: usize,
    pub missing_skills: usize,
    pub suggested_level: Option<String>,
    pub executive_summary: Option<String>,
}

impl CandidateRankingScore {
    fn from_analysis(rank: usize, analysis: &FullCandidateAnalysis) -> Self {
        let fit = analysis.fit_analysis.as_ref();
        Self {
            rank,
            file_name: analysis.file_name.clone(),
            candidate_name: analysis.candidate_name.clone(),
            overall_score: analysis.overall_score,
            fit_score: analysis.fit_score(),
            ats_score: analysis.ats_score,
            recommendation: analysis.recommendation(),
            strengths_count: fit.map_or(0, |f| f.strengths.len()),
            red_flags_count: analysis.red_flag_count(),
            has_critical_red_flags: analysis.has_critical_red_flags(),
            matched_skills: analysis.matched_skills.len(),
            missing_skills: analysis.missing_skills.len(),
            suggested_level: fit.and_then(|f| f.suggested_level.clone()),
            executive_summary: fit
                .map(|f| f.executive_summary.clone())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Counts of successful analyses per score band: excellent ≥ 90, good ≥ 70,
/// fair ≥ 50, poor below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl ScoreDistribution {
    pub fn add(&mut self, overall_score: u32) {
        match overall_score {
            90.. => self.excellent += 1,
            70..=89 => self.good += 1,
            50..=69 => self.fair += 1,
            _ => self.poor += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }

    pub fn hiring_recommendation(&self) -> String {
        let strong = self.excellent + self.good;
        match strong {
            1 => "STRONG — 1 candidate meets the bar".to_string(),
            n if n > 1 => format!("STRONG — {n} candidates meet the bar"),
            _ if self.fair > 0 => "ACCEPTABLE — review top candidates".to_string(),
            _ => "WEAK — no qualified candidates".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub success: bool,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub total_candidates: usize,
    pub successful: usize,
    pub failed: usize,
    pub rankings: Vec<CandidateRankingScore>,
    pub top_candidate: Option<CandidateRankingScore>,
    pub top_candidate_analysis: Option<FullCandidateAnalysis>,
    /// One entry per input file, failures included.
    pub all_analyses: BTreeMap<String, FullCandidateAnalysis>,
    pub score_distribution: ScoreDistribution,
    pub average_score: f64,
    pub hiring_recommendation: String,
    pub processing_time_ms: u64,
    pub error: Option<String>,
}

impl RankingResult {
    /// Orders the successful analyses and derives the batch statistics.
    pub fn from_analyses(
        jd: &JobDescriptionData,
        all_analyses: BTreeMap<String, FullCandidateAnalysis>,
        processing_time_ms: u64,
    ) -> Self {
        let mut successful: Vec<&FullCandidateAnalysis> =
            all_analyses.values().filter(|a| a.success).collect();
        successful.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        let rankings: Vec<CandidateRankingScore> = successful
            .iter()
            .enumerate()
            .map(|(i, a)| CandidateRankingScore::from_analysis(i + 1, a))
            .collect();

        let mut score_distribution = ScoreDistribution::default();
        for analysis in &successful {
            score_distribution.add(analysis.overall_score);
        }
        let average_score = if successful.is_empty() {
            0.0
        } else {
            let sum: u32 = successful.iter().map(|a| a.overall_score).sum();
            (sum as f64 / successful.len() as f64 * 10.0).round() / 10.0
        };

        let top_candidate_analysis = rankings
            .first()
            .and_then(|top| all_analyses.get(&top.file_name))
            .cloned();

        Self {
            success: true,
            job_title: jd.job_title.clone(),
            company_name: jd.company_name.clone(),
            total_candidates: all_analyses.len(),
            successful: successful.len(),
            failed: all_analyses.len() - successful.len(),
            top_candidate: rankings.first().cloned(),
            top_candidate_analysis,
            rankings,
            score_distribution,
            average_score,
            hiring_recommendation: score_distribution.hiring_recommendation(),
            processing_time_ms,
            error: None,
            all_analyses,
        }
    }

    fn cancelled(
        jd: &JobDescriptionData,
        all_analyses: BTreeMap<String, FullCandidateAnalysis>,
        processing_time_ms: u64,
    ) -> Self {
        let failed = all_analyses.values().filter(|a| !a.success).count();
        Self {
            success: false,
            job_title: jd.job_title.clone(),
            company_name: jd.company_name.clone(),
            total_candidates: all_analyses.len(),
            successful: all_analyses.len() - failed,
            failed,
            rankings: Vec::new(),
            top_candidate: None,
            top_candidate_analysis: None,
            all_analyses,
            score_distribution: ScoreDistribution::default(),
            average_score: 0.0,
            hiring_recommendation: String::new(),
            processing_time_ms,
            error: Some(AnalysisError::Cancelled.to_string()),
        }
    }
}

/// Overall desc, then fit desc, then ATS desc, then file name asc.
fn sort_key(a: &FullCandidateAnalysis) -> (Reverse<u32>, Reverse<u32>, Reverse<u32>, &str) {
    (
        Reverse(a.overall_score),
        Reverse(a.fit_score()),
        Reverse(a.ats_score),
        a.file_name.as_str(),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RankingEngine {
    analyzer: CandidateAnalyzer,
    limits: RankingLimits,
}

impl RankingEngine {
    pub fn new(analyzer: CandidateAnalyzer, limits: RankingLimits) -> Self {
        Self {
            analyzer,
            limits: RankingLimits {
                max_concurrent: limits.max_concurrent.max(1),
                ..limits
            },
        }
    }

    /// Structural checks that fail the whole batch before any analysis runs.
    pub fn check_batch(&self, jd: &JobDescriptionData, candidates: &[CandidateInput]) -> Result<(), RankingError> {
        if jd.is_empty() {
            return Err(RankingError::MissingJobDescription);
        }
        if candidates.is_empty() {
            return Err(RankingError::EmptyBatch);
        }
        if candidates.len() > self.limits.max_batch_size {
            return Err(RankingError::BatchTooLarge {
                size: candidates.len(),
                limit: self.limits.max_batch_size,
            });
        }
        let mut seen = HashSet::new();
        for candidate in candidates {
            if candidate.file_name.trim().is_empty() {
                return Err(RankingError::BlankFileName);
            }
            if !seen.insert(candidate.file_name.as_str()) {
                return Err(RankingError::DuplicateFileName(candidate.file_name.clone()));
            }
        }
        Ok(())
    }

    pub async fn rank(
        &self,
        jd: JobDescriptionData,
        candidates: Vec<CandidateInput>,
        as_of: NaiveDate,
        cancel: CancellationToken,
        request_id: Uuid,
    ) -> Result<RankingResult, RankingError> {
        self.check_batch(&jd, &candidates)?;
        let span = tracing::info_span!("rank_batch", %request_id, candidates = candidates.len());
        Ok(self.run(jd, candidates, as_of, cancel).instrument(span).await)
    }

    async fn run(
        &self,
        jd: JobDescriptionData,
        candidates: Vec<CandidateInput>,
        as_of: NaiveDate,
        cancel: CancellationToken,
    ) -> RankingResult {
        let started = Instant::now();
        let jd = Arc::new(jd);
        let total = candidates.len();
        let slots = Arc::new(Semaphore::new(self.limits.max_concurrent));

        let analyses: Vec<FullCandidateAnalysis> = stream::iter(candidates)
            .map(|candidate| {
                let jd = jd.clone();
                let cancel = cancel.clone();
                let slots = slots.clone();
                async move {
                    if cancel.is_cancelled() {
                        return FullCandidateAnalysis::failed(candidate.file_name, &AnalysisError::Cancelled, 0);
                    }
                    self.analyze_one(candidate, jd, as_of, slots, &cancel).await
                }
            })
            .buffer_unordered(self.limits.max_concurrent)
            .collect()
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let all_analyses: BTreeMap<String, FullCandidateAnalysis> =
            analyses.into_iter().map(|a| (a.file_name.clone(), a)).collect();

        if cancel.is_cancelled() {
            warn!(candidates = total, elapsed_ms, "Ranking batch cancelled");
            return RankingResult::cancelled(&jd, all_analyses, elapsed_ms);
        }

        let result = RankingResult::from_analyses(&jd, all_analyses, elapsed_ms);
        info!(
            candidates = result.total_candidates,
            successful = result.successful,
            failed = result.failed,
            elapsed_ms,
            "Ranking complete"
        );
        result
    }

    async fn analyze_one(
        &self,
        candidate: CandidateInput,
        jd: Arc<JobDescriptionData>,
        as_of: NaiveDate,
        slots: Arc<Semaphore>,
        cancel: &CancellationToken,
    ) -> FullCandidateAnalysis {
        let started = Instant::now();
        let analyzer = self.analyzer.clone();
        let file_name = candidate.file_name.clone();

        // A timed-out task keeps running on the blocking pool, so it keeps its
        // slot until it actually returns.
        let permit = tokio::select! {
            permit = slots.acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(e) => {
                    return FullCandidateAnalysis::failed(file_name, &AnalysisError::TaskFailed(e.to_string()), 0)
                }
            },
            _ = cancel.cancelled() => {
                return FullCandidateAnalysis::failed(file_name, &AnalysisError::Cancelled, 0);
            }
        };
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            analyzer.analyze(&candidate.file_name, candidate.resume.as_ref(), &jd, as_of)
        });

        let error = match tokio::time::timeout(self.limits.candidate_timeout, task).await {
            Ok(Ok(analysis)) => return analysis,
            Ok(Err(join_error)) => AnalysisError::TaskFailed(join_error.to_string()),
            Err(_) => AnalysisError::Timeout,
        };
        warn!(file_name = %file_name, error = %error, "Candidate analysis did not complete");
        FullCandidateAnalysis::failed(file_name, &error, started.elapsed().as_millis() as u64)
    }
}
