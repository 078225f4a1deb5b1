//! Fit scoring: measures one candidate against one parsed job description.
//!
//! Default: `WeightedFitScorer` (five fixed dimensions, deterministic, fully testable).
//!
//! `AppState` holds an `Arc<dyn FitScorer>`, built at startup from `ScoringConfig`.

use serde::{Deserialize, Serialize};

use crate::analysis::career::{CareerAnalysis, CareerTrajectory};
use crate::analysis::skills::SkillMatchReport;
use crate::models::job::JobDescriptionData;
use crate::models::resume::ResumeData;

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// Per-dimension fit, each in 0 – 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitScoreBreakdown {
    pub skills_alignment: f64,
    pub experience_match: f64,
    pub education_fit: f64,
    pub career_trajectory: f64,
    pub cultural_signals: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitScore {
    pub fit_score: u32, // 0 – 100
    pub breakdown: FitScoreBreakdown,
}

/// Dimension weights. Expected to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub trajectory: f64,
    pub cultural: f64,
}

impl Default for FitWeights {
    fn default() -> Self {
        Self {
            skills: 0.35,
            experience: 0.25,
            education: 0.10,
            trajectory: 0.15,
            cultural: 0.15,
        }
    }
}

impl FitWeights {
    pub fn total(&self) -> f64 {
        self.skills + self.experience + self.education + self.trajectory + self.cultural
    }
}

/// Everything a scorer may look at for one candidate.
pub struct FitInput<'a> {
    pub resume: &'a ResumeData,
    pub jd: &'a JobDescriptionData,
    pub career: &'a CareerAnalysis,
    pub skills: &'a SkillMatchReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Implement this to swap backends without touching
/// the analyzer, handler, or caller code.
///
/// Carried in `AppState` as `Arc<dyn FitScorer>`.
pub trait FitScorer: Send + Sync {
    fn score(&self, input: &FitInput<'_>) -> FitScore;

    /// Backend name, for logs.
    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedFitScorer
// ────────────────────────────────────────────────────────────────────────────

/// Five independent dimensions combined with fixed weights.
///
/// - skills: share of required skills matched (100 when none are required)
/// - experience: candidate years over required years, capped at 1
/// - education: 100 meets, 60 one tier below, 30 otherwise
/// - trajectory: 90 ascending, 70 lateral, 40 descending, 55 mixed
/// - cultural signals: configurable flat value
pub struct WeightedFitScorer {
    weights: FitWeights,
    cultural_signals: f64,
}

impl WeightedFitScorer {
    pub fn new(weights: FitWeights, cultural_signals: f64) -> Self {
        Self {
            weights,
            cultural_signals: cultural_signals.clamp(0.0, 100.0),
        }
    }
}

impl Default for WeightedFitScorer {
    fn default() -> Self {
        Self::new(FitWeights::default(), 70.0)
    }
}

impl FitScorer for WeightedFitScorer {
    fn score(&self, input: &FitInput<'_>) -> FitScore {
        let breakdown = FitScoreBreakdown {
            skills_alignment: skills_alignment(input.skills),
            experience_match: experience_match(candidate_years(input.resume, input.career), input.jd),
            education_fit: education_fit(input.resume, input.jd),
            career_trajectory: trajectory_score(input.career.progression.trajectory),
            cultural_signals: self.cultural_signals,
        };

        let w = &self.weights;
        let weighted = breakdown.skills_alignment * w.skills
            + breakdown.experience_match * w.experience
            + breakdown.education_fit * w.education
            + breakdown.career_trajectory * w.trajectory
            + breakdown.cultural_signals * w.cultural;

        FitScore {
            fit_score: weighted.round().clamp(0.0, 100.0) as u32,
            breakdown,
        }
    }

    fn name(&self) -> &'static str {
        "weighted"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dimensions
// ────────────────────────────────────────────────────────────────────────────

fn skills_alignment(skills: &SkillMatchReport) -> f64 {
    match skills.required_ratio() {
        Some(ratio) => round1((ratio * 100.0).min(100.0)),
        None => 100.0,
    }
}

fn experience_match(candidate_years: f64, jd: &JobDescriptionData) -> f64 {
    let required = jd.required_years();
    if required <= 0.0 {
        return 100.0;
    }
    round1(100.0 * (candidate_years / required).min(1.0))
}

fn education_fit(resume: &ResumeData, jd: &JobDescriptionData) -> f64 {
    let Some(required) = jd.required_education.as_deref().and_then(DegreeLevel::minimum_in_text)
    else {
        return 100.0;
    };
    let held = highest_degree(resume).map_or(0, DegreeLevel::rank);
    match required.rank() - held {
        d if d <= 0 => 100.0,
        1 => 60.0,
        _ => 30.0,
    }
}

fn trajectory_score(trajectory: CareerTrajectory) -> f64 {
    match trajectory {
        CareerTrajectory::Ascending => 90.0,
        CareerTrajectory::Lateral => 70.0,
        CareerTrajectory::Descending => 40.0,
        CareerTrajectory::Mixed => 55.0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Stated years of experience, or the sum of dated tenures when not stated.
pub fn candidate_years(resume: &ResumeData, career: &CareerAnalysis) -> f64 {
    resume
        .total_experience_years
        .unwrap_or_else(|| career.total_months as f64 / 12.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Degree ladder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DegreeLevel {
    Certificate = 1,
    Associate = 2,
    Bachelor = 3,
    Master = 4,
    Doctorate = 5,
}

const DEGREE_KEYWORDS: &[(DegreeLevel, &[&str])] = &[
    (DegreeLevel::Doctorate, &["phd", "doctorate", "doctoral", "dphil"]),
    (
        DegreeLevel::Master,
        &["master", "masters", "msc", "mba", "ms", "ma", "meng", "mtech", "mca"],
    ),
    (
        DegreeLevel::Bachelor,
        &["bachelor", "bachelors", "bsc", "ba", "bs", "beng", "btech", "bca", "undergraduate"],
    ),
    (DegreeLevel::Associate, &["associate", "associates"]),
    (DegreeLevel::Certificate, &["diploma", "certificate", "certification"]),
];

impl DegreeLevel {
    /// Highest level named in free text such as "Bachelor's in CS" or "M.Sc.".
    pub fn from_text(text: &str) -> Option<Self> {
        Self::all_in_text(text).into_iter().max()
    }

    /// Lowest level named, so "Bachelor's or Master's" requires a bachelor's.
    pub fn minimum_in_text(text: &str) -> Option<Self> {
        Self::all_in_text(text).into_iter().min()
    }

    fn all_in_text(text: &str) -> Vec<Self> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| *c != '.' && *c != '\'')
            .collect();
        let tokens: Vec<&str> = cleaned
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        DEGREE_KEYWORDS
            .iter()
            .filter(|(_, keywords)| tokens.iter().any(|t| keywords.contains(t)))
            .map(|(level, _)| *level)
            .collect()
    }

    pub fn rank(self) -> i32 {
        self as i32
    }
}

/// Highest degree across the resume's education entries.
pub fn highest_degree(resume: &ResumeData) -> Option<DegreeLevel> {
    resume
        .education
        .iter()
        .filter_map(|e| e.degree.as_deref())
        .filter_map(DegreeLevel::from_text)
        .max()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::career::CareerProgressionAnalyzer;
    use crate::models::resume::{EducationItem, ExperienceItem};
    use chrono::NaiveDate;

    fn career_for(resume: &ResumeData) -> CareerAnalysis {
        CareerProgressionAnalyzer::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .analyze(&resume.experience)
    }

    fn resume_with(skills: &[&str], degree: Option<&str>, years: Option<f64>) -> ResumeData {
        ResumeData {
            candidate_name: Some("Test".into()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            education: degree
                .map(|d| {
                    vec![EducationItem {
                        degree: Some(d.to_string()),
                        ..Default::default()
                    }]
                })
                .unwrap_or_default(),
            total_experience_years: years,
            ..Default::default()
        }
    }

    fn jd(required: &[&str], years: Option<f64>, education: Option<&str>) -> JobDescriptionData {
        JobDescriptionData {
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            experience_years_min: years,
            required_education: education.map(str::to_string),
            ..Default::default()
        }
    }

    fn score(resume: &ResumeData, jd: &JobDescriptionData) -> FitScore {
        let career = career_for(resume);
        let skills = SkillMatchReport::build(resume, jd);
        WeightedFitScorer::default().score(&FitInput {
            resume,
            jd,
            career: &career,
            skills: &skills,
        })
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((FitWeights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_candidate() {
        let resume = resume_with(&["Rust", "SQL"], Some("Master of Science"), Some(8.0));
        let jd = jd(&["Rust", "SQL"], Some(5.0), Some("Bachelor's degree"));
        let result = score(&resume, &jd);
        assert_eq!(result.breakdown.skills_alignment, 100.0);
        assert_eq!(result.breakdown.experience_match, 100.0);
        assert_eq!(result.breakdown.education_fit, 100.0);
        // No work history → lateral (70), cultural default 70.
        assert_eq!(result.breakdown.career_trajectory, 70.0);
        // 35 + 25 + 10 + 10.5 + 10.5 = 91
        assert_eq!(result.fit_score, 91);
    }

    #[test]
    fn test_partial_skills_and_experience() {
        let resume = resume_with(&["Rust"], None, Some(2.0));
        let jd = jd(&["Rust", "Go", "SQL", "Kafka"], Some(4.0), None);
        let result = score(&resume, &jd);
        assert_eq!(result.breakdown.skills_alignment, 25.0);
        assert_eq!(result.breakdown.experience_match, 50.0);
        assert_eq!(result.breakdown.education_fit, 100.0);
    }

    #[test]
    fn test_no_required_skills_is_full_alignment() {
        let resume = resume_with(&[], None, None);
        let result = score(&resume, &jd(&[], None, None));
        assert_eq!(result.breakdown.skills_alignment, 100.0);
        assert_eq!(result.breakdown.experience_match, 100.0);
    }

    #[test]
    fn test_education_tiers() {
        let jd_master = jd(&[], None, Some("Master's in Computer Science"));
        assert_eq!(score(&resume_with(&[], Some("PhD"), None), &jd_master).breakdown.education_fit, 100.0);
        assert_eq!(score(&resume_with(&[], Some("B.Sc. Physics"), None), &jd_master).breakdown.education_fit, 60.0);
        assert_eq!(score(&resume_with(&[], Some("Diploma"), None), &jd_master).breakdown.education_fit, 30.0);
        assert_eq!(score(&resume_with(&[], None, None), &jd_master).breakdown.education_fit, 30.0);
    }

    #[test]
    fn test_years_fall_back_to_dated_tenure() {
        let resume = ResumeData {
            candidate_name: Some("Test".into()),
            experience: vec![ExperienceItem {
                company: Some("Acme".into()),
                title: Some("Engineer".into()),
                start_date: Some("2021-06".into()),
                end_date: Some("2024-06".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let career = career_for(&resume);
        assert_eq!(candidate_years(&resume, &career), 3.0);
        let result = score(&resume, &jd(&[], Some(6.0), None));
        assert_eq!(result.breakdown.experience_match, 50.0);
    }

    #[test]
    fn test_degree_level_from_text() {
        assert_eq!(DegreeLevel::from_text("Ph.D. in Physics"), Some(DegreeLevel::Doctorate));
        assert_eq!(DegreeLevel::from_text("MBA"), Some(DegreeLevel::Master));
        assert_eq!(DegreeLevel::from_text("Bachelor's in CS"), Some(DegreeLevel::Bachelor));
        assert_eq!(DegreeLevel::from_text("BS Computer Science"), Some(DegreeLevel::Bachelor));
        assert_eq!(DegreeLevel::from_text("High school"), None);
        assert_eq!(
            DegreeLevel::minimum_in_text("Bachelor's or Master's degree"),
            Some(DegreeLevel::Bachelor)
        );
    }

    #[test]
    fn test_cultural_signals_configurable() {
        let scorer = WeightedFitScorer::new(FitWeights::default(), 40.0);
        let resume = resume_with(&[], None, None);
        let jd = jd(&[], None, None);
        let career = career_for(&resume);
        let skills = SkillMatchReport::build(&resume, &jd);
        let result = scorer.score(&FitInput {
            resume: &resume,
            jd: &jd,
            career: &career,
            skills: &skills,
        });
        assert_eq!(result.breakdown.cultural_signals, 40.0);
    }
}
