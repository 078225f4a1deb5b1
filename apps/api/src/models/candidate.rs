use serde::{Deserialize, Serialize};

use crate::analysis::ats::AtsScoreResult;
use crate::analysis::career::CareerProgression;
use crate::analysis::fit_scoring::FitScoreBreakdown;
use crate::analysis::insights::StrengthItem;
use crate::analysis::red_flags::RedFlagSet;
use crate::analysis::AnalysisError;
use crate::models::job::JobDescriptionData;
use crate::models::resume::ResumeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    StrongHire,
    GoodFit,
    PotentialFit,
    NeedsReview,
    NotRecommended,
}

impl RecommendationType {
    /// Threshold table applied to the combined score. A critical red flag caps the
    /// outcome at `NeedsReview`.
    pub fn from_score(overall_score: u32, has_critical_red_flags: bool) -> Self {
        match (overall_score, has_critical_red_flags) {
            (85.., false) => RecommendationType::StrongHire,
            (70.., false) => RecommendationType::GoodFit,
            (50.., false) => RecommendationType::PotentialFit,
            (50.., true) | (35..=49, _) => RecommendationType::NeedsReview,
            _ => RecommendationType::NotRecommended,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecommendationType::StrongHire => "Strong Hire",
            RecommendationType::GoodFit => "Good Fit",
            RecommendationType::PotentialFit => "Potential Fit",
            RecommendationType::NeedsReview => "Needs Review",
            RecommendationType::NotRecommended => "Not Recommended",
        }
    }
}

/// Qualitative fit of one candidate against one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFitResult {
    pub fit_score: u32,
    pub fit_score_breakdown: Option<FitScoreBreakdown>,
    pub recommendation: RecommendationType,
    pub recommendation_text: String,
    #[serde(default)]
    pub strengths: Vec<StrengthItem>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    /// Serialized as `red_flags`, `red_flag_count` and `has_critical_red_flags`.
    #[serde(flatten)]
    pub red_flags: RedFlagSet,
    pub career_progression: Option<CareerProgression>,
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub interview_questions: Vec<String>,
    pub suggested_level: Option<String>,
    #[serde(default)]
    pub analysis_confidence: f64,
}

/// The unit of work for one candidate, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullCandidateAnalysis {
    pub success: bool,
    pub file_name: String,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
    pub current_role: Option<String>,
    pub overall_score: u32,
    pub ats_score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub ats_details: Option<AtsScoreResult>,
    pub fit_analysis: Option<CandidateFitResult>,
    pub resume_data: Option<ResumeData>,
    pub jd_data: Option<JobDescriptionData>,
    pub processing_time_ms: u64,
    pub error: Option<String>,
}

impl FullCandidateAnalysis {
    pub fn failed(file_name: impl Into<String>, error: &AnalysisError, processing_time_ms: u64) -> Self {
        Self {
            success: false,
            file_name: file_name.into(),
            processing_time_ms,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn fit_score(&self) -> u32 {
        self.fit_analysis.as_ref().map_or(0, |f| f.fit_score)
    }

    pub fn red_flag_count(&self) -> usize {
        self.fit_analysis.as_ref().map_or(0, |f| f.red_flags.count())
    }

    pub fn has_critical_red_flags(&self) -> bool {
        self.fit_analysis
            .as_ref()
            .is_some_and(|f| f.red_flags.has_critical())
    }

    pub fn recommendation(&self) -> RecommendationType {
        self.fit_analysis
            .as_ref()
            .map_or(RecommendationType::NotRecommended, |f| f.recommendation)
    }
}
