//! Side-by-side comparison of two analysed candidates.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::candidate::{FullCandidateAnalysis, RecommendationType};

pub const TIE_BREAK_REASON: &str = "tie-break: first candidate";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("candidate {position} cannot be compared: {reason}")]
    Incomparable { position: u8, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateComparison {
    pub file_name_1: String,
    pub file_name_2: String,
    pub candidate_name_1: Option<String>,
    pub candidate_name_2: Option<String>,

    pub overall_score_1: u32,
    pub overall_score_2: u32,
    /// Candidate 1 minus candidate 2.
    pub overall_score_diff: i64,
    pub ats_score_1: u32,
    pub ats_score_2: u32,
    pub ats_score_diff: i64,
    pub fit_score_1: u32,
    pub fit_score_2: u32,
    pub fit_score_diff: i64,

    pub common_skills: Vec<String>,
    pub unique_skills_1: Vec<String>,
    pub unique_skills_2: Vec<String>,

    pub red_flags_1: usize,
    pub red_flags_2: usize,
    pub critical_flags_1: bool,
    pub critical_flags_2: bool,
    pub recommendation_1: RecommendationType,
    pub recommendation_2: RecommendationType,

    /// 1 or 2.
    pub winner: u8,
    pub winner_reason: String,
}

fn ensure_comparable(analysis: &FullCandidateAnalysis, position: u8) -> Result<(), ComparisonError> {
    if analysis.success {
        return Ok(());
    }
    Err(ComparisonError::Incomparable {
        position,
        reason: analysis
            .error
            .clone()
            .unwrap_or_else(|| "analysis did not succeed".to_string()),
    })
}

fn diff(a: u32, b: u32) -> i64 {
    i64::from(a) - i64::from(b)
}

/// Lower is better.
fn recommendation_rank(recommendation: RecommendationType) -> u8 {
    match recommendation {
        RecommendationType::StrongHire => 0,
        RecommendationType::GoodFit => 1,
        RecommendationType::PotentialFit => 2,
        RecommendationType::NeedsReview => 3,
        RecommendationType::NotRecommended => 4,
    }
}

/// Higher overall score wins, then fewer red flags, then the first candidate.
pub fn compare(
    analysis_1: &FullCandidateAnalysis,
    analysis_2: &FullCandidateAnalysis,
) -> Result<CandidateComparison, ComparisonError> {
    ensure_comparable(analysis_1, 1)?;
    ensure_comparable(analysis_2, 2)?;

    let skills_1: BTreeSet<&str> = analysis_1.matched_skills.iter().map(String::as_str).collect();
    let skills_2: BTreeSet<&str> = analysis_2.matched_skills.iter().map(String::as_str).collect();

    let (winner, winner_reason) = pick_winner(analysis_1, analysis_2);
    debug!(
        file_name_1 = %analysis_1.file_name,
        file_name_2 = %analysis_2.file_name,
        winner,
        "Candidates compared"
    );

    Ok(CandidateComparison {
        file_name_1: analysis_1.file_name.clone(),
        file_name_2: analysis_2.file_name.clone(),
        candidate_name_1: analysis_1.candidate_name.clone(),
        candidate_name_2: analysis_2.candidate_name.clone(),
        overall_score_1: analysis_1.overall_score,
        overall_score_2: analysis_2.overall_score,
        overall_score_diff: diff(analysis_1.overall_score, analysis_2.overall_score),
        ats_score_1: analysis_1.ats_score,
        ats_score_2: analysis_2.ats_score,
        ats_score_diff: diff(analysis_1.ats_score, analysis_2.ats_score),
        fit_score_1: analysis_1.fit_score(),
        fit_score_2: analysis_2.fit_score(),
        fit_score_diff: diff(analysis_1.fit_score(), analysis_2.fit_score()),
        common_skills: skills_1.intersection(&skills_2).map(|s| s.to_string()).collect(),
        unique_skills_1: skills_1.difference(&skills_2).map(|s| s.to_string()).collect(),
        unique_skills_2: skills_2.difference(&skills_1).map(|s| s.to_string()).collect(),
        red_flags_1: analysis_1.red_flag_count(),
        red_flags_2: analysis_2.red_flag_count(),
        critical_flags_1: analysis_1.has_critical_red_flags(),
        critical_flags_2: analysis_2.has_critical_red_flags(),
        recommendation_1: analysis_1.recommendation(),
        recommendation_2: analysis_2.recommendation(),
        winner,
        winner_reason,
    })
}

fn pick_winner(a: &FullCandidateAnalysis, b: &FullCandidateAnalysis) -> (u8, String) {
    let by_score = a.overall_score.cmp(&b.overall_score);
    // Fewer flags is better, so the comparison is reversed.
    let by_flags = b.red_flag_count().cmp(&a.red_flag_count());

    match by_score.then(by_flags) {
        Ordering::Equal => (1, TIE_BREAK_REASON.to_string()),
        Ordering::Greater => (1, explain(a, b, by_score == Ordering::Equal)),
        Ordering::Less => (2, explain(b, a, by_score == Ordering::Equal)),
    }
}

fn explain(winner: &FullCandidateAnalysis, loser: &FullCandidateAnalysis, decided_by_flags: bool) -> String {
    let mut reasons = Vec::new();
    let score_gap = winner.overall_score.abs_diff(loser.overall_score);

    if decided_by_flags {
        reasons.push(format!(
            "Equal overall score; fewer red flags ({} vs {})",
            winner.red_flag_count(),
            loser.red_flag_count()
        ));
    } else if score_gap >= 10 {
        reasons.push(format!("Significantly higher overall score (+{score_gap} points)"));
    } else {
        reasons.push(format!("Higher overall score (+{score_gap} points)"));
    }
    if winner.ats_score > loser.ats_score {
        reasons.push(format!(
            "Better ATS keyword match ({} vs {})",
            winner.ats_score, loser.ats_score
        ));
    }
    if !decided_by_flags && winner.red_flag_count() < loser.red_flag_count() {
        reasons.push(format!(
            "Fewer red flags ({} vs {})",
            winner.red_flag_count(),
            loser.red_flag_count()
        ));
    }
    if recommendation_rank(winner.recommendation()) < recommendation_rank(loser.recommendation()) {
        reasons.push(format!("Better recommendation: {}", winner.recommendation().label()));
    }
    format!("{}.", reasons.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisError;

    fn analysis(file_name: &str, overall: u32, ats: u32, skills: &[&str]) -> FullCandidateAnalysis {
        FullCandidateAnalysis {
            success: true,
            file_name: file_name.to_string(),
            overall_score: overall,
            ats_score: ats,
            matched_skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_analyses_tie_to_first() {
        let a = analysis("a.pdf", 75, 80, &["Rust"]);
        let mut b = a.clone();
        b.file_name = "b.pdf".into();
        let cmp = compare(&a, &b).unwrap();
        assert_eq!(cmp.winner, 1);
        assert_eq!(cmp.winner_reason, TIE_BREAK_REASON);
        assert_eq!(cmp.overall_score_diff, 0);
        assert_eq!(cmp.common_skills, vec!["Rust"]);
    }

    #[test]
    fn test_higher_score_wins_from_either_side() {
        let a = analysis("a.pdf", 60, 70, &["Rust", "Go"]);
        let b = analysis("b.pdf", 78, 72, &["Rust", "SQL"]);
        let cmp = compare(&a, &b).unwrap();
        assert_eq!(cmp.winner, 2);
        assert_eq!(cmp.overall_score_diff, -18);
        assert!(cmp.winner_reason.starts_with("Significantly higher overall score (+18 points)"));
        assert!(cmp.winner_reason.contains("Better ATS keyword match (72 vs 70)"));
        assert_eq!(cmp.common_skills, vec!["Rust"]);
        assert_eq!(cmp.unique_skills_1, vec!["Go"]);
        assert_eq!(cmp.unique_skills_2, vec!["SQL"]);

        let reversed = compare(&b, &a).unwrap();
        assert_eq!(reversed.winner, 1);
    }

    #[test]
    fn test_fewer_flags_break_score_tie() {
        use crate::analysis::red_flags::{RedFlag, RedFlagSet, RedFlagSeverity, RedFlagType};
        use crate::models::candidate::CandidateFitResult;

        let with_flags = |file_name: &str, flags: RedFlagSet| FullCandidateAnalysis {
            fit_analysis: Some(CandidateFitResult {
                fit_score: 70,
                fit_score_breakdown: None,
                recommendation: RecommendationType::GoodFit,
                recommendation_text: String::new(),
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                red_flags: flags,
                career_progression: None,
                executive_summary: String::new(),
                interview_questions: Vec::new(),
                suggested_level: None,
                analysis_confidence: 1.0,
            }),
            ..analysis(file_name, 72, 70, &[])
        };
        let flag = RedFlag {
            flag_type: RedFlagType::ShortTenure,
            severity: RedFlagSeverity::Medium,
            title: "Short tenure".into(),
            description: String::new(),
            evidence: None,
            suggestion: None,
        };
        let a = with_flags("a.pdf", vec![flag].into_iter().collect());
        let b = with_flags("b.pdf", RedFlagSet::default());

        let cmp = compare(&a, &b).unwrap();
        assert_eq!(cmp.winner, 2);
        assert_eq!((cmp.red_flags_1, cmp.red_flags_2), (1, 0));
        assert!(cmp.winner_reason.starts_with("Equal overall score; fewer red flags (0 vs 1)"));
    }

    #[test]
    fn test_failed_analysis_is_incomparable() {
        let ok = analysis("a.pdf", 60, 60, &[]);
        let failed = FullCandidateAnalysis::failed("b.pdf", &AnalysisError::Timeout, 0);
        assert_eq!(
            compare(&ok, &failed),
            Err(ComparisonError::Incomparable { position: 2, reason: "timeout".into() })
        );
        assert!(matches!(
            compare(&failed, &ok),
            Err(ComparisonError::Incomparable { position: 1, .. })
        ));
    }
}
