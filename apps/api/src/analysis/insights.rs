//! Narrative fields of a fit result: strengths, weaknesses, questions and summaries.

use serde::{Deserialize, Serialize};

use crate::analysis::career::{CareerAnalysis, SeniorityTier};
use crate::analysis::fit_scoring::FitScoreBreakdown;
use crate::analysis::red_flags::{RedFlagSet, RedFlagSeverity};
use crate::analysis::skills::SkillMatchReport;
use crate::models::candidate::RecommendationType;
use crate::models::resume::ResumeData;

const MAX_INTERVIEW_QUESTIONS: usize = 6;
const MAX_WEAKNESS_SKILLS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthItem {
    pub category: String,
    pub title: String,
    pub description: String,
    pub relevance_score: u32,
}

impl StrengthItem {
    fn new(category: &str, title: &str, description: String, relevance_score: f64) -> Self {
        Self {
            category: category.to_string(),
            title: title.to_string(),
            description,
            relevance_score: relevance_score.round().clamp(0.0, 100.0) as u32,
        }
    }
}

pub fn strengths(
    breakdown: &FitScoreBreakdown,
    career: &CareerAnalysis,
    skills: &SkillMatchReport,
) -> Vec<StrengthItem> {
    let mut out = Vec::new();

    if breakdown.skills_alignment >= 80.0 && skills.required_total > 0 {
        let shown: Vec<&str> = skills.matched_required.iter().take(5).map(String::as_str).collect();
        out.push(StrengthItem::new(
            "skills",
            "Strong skill alignment",
            format!(
                "Covers {} of {} required skills ({})",
                skills.matched_required.len(),
                skills.required_total,
                shown.join(", ")
            ),
            breakdown.skills_alignment,
        ));
    }
    if breakdown.experience_match >= 100.0 {
        out.push(StrengthItem::new(
            "experience",
            "Meets experience requirement",
            "Years of experience meet or exceed what the role asks for".to_string(),
            90.0,
        ));
    }
    if breakdown.education_fit >= 100.0 {
        out.push(StrengthItem::new(
            "education",
            "Education fits the role",
            "Highest degree meets the stated requirement".to_string(),
            70.0,
        ));
    }
    if career.progression.has_leadership_progression {
        out.push(StrengthItem::new(
            "career",
            "Leadership progression",
            career.progression.progression_summary.clone(),
            85.0,
        ));
    }
    if career.progression.longest_tenure_months >= 36 {
        out.push(StrengthItem::new(
            "career",
            "Long-term commitment",
            format!(
                "Stayed {} months in a single role",
                career.progression.longest_tenure_months
            ),
            75.0,
        ));
    }
    out
}

pub fn weaknesses(breakdown: &FitScoreBreakdown, skills: &SkillMatchReport) -> Vec<String> {
    let mut out = Vec::new();
    if breakdown.skills_alignment < 60.0 {
        out.push(format!(
            "Low skill alignment ({:.0}% of required skills)",
            breakdown.skills_alignment
        ));
    }
    if breakdown.experience_match < 60.0 {
        out.push("Experience below the role's requirement".to_string());
    }
    if breakdown.education_fit < 60.0 {
        out.push("Education below the stated requirement".to_string());
    }
    if breakdown.career_trajectory < 60.0 {
        out.push("Career trajectory is not clearly progressing".to_string());
    }
    for skill in skills.missing_required.iter().take(MAX_WEAKNESS_SKILLS) {
        out.push(format!("Missing required skill: {skill}"));
    }
    out
}

/// Questions prompted by red flags, in flag order, without repeats.
pub fn interview_questions(flags: &RedFlagSet, skills: &SkillMatchReport) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for suggestion in flags.iter().filter_map(|f| f.suggestion.as_deref()) {
        if out.len() == MAX_INTERVIEW_QUESTIONS {
            break;
        }
        if !out.iter().any(|q| q == suggestion) {
            out.push(suggestion.to_string());
        }
    }
    if out.is_empty() {
        if let Some(skill) = skills.matched_required.first() {
            out.push(format!("Describe the most complex problem you solved using {skill}."));
        }
    }
    out
}

/// Level the candidate would slot in at: their latest title's tier, or their years when
/// no title is known.
pub fn suggested_level(career: &CareerAnalysis, years: f64) -> Option<String> {
    if let Some(tier) = career.final_tier {
        return Some(tier.label().to_string());
    }
    if years <= 0.0 {
        return None;
    }
    let tier = match years {
        y if y < 2.0 => SeniorityTier::Associate,
        y if y < 5.0 => SeniorityTier::Mid,
        y if y < 8.0 => SeniorityTier::Senior,
        _ => SeniorityTier::Lead,
    };
    Some(tier.label().to_string())
}

pub fn recommendation_text(recommendation: RecommendationType, overall_score: u32, flags: &RedFlagSet) -> String {
    let base = match recommendation {
        RecommendationType::StrongHire => "Strong hire: exceeds the bar on most dimensions.",
        RecommendationType::GoodFit => "Good fit: meets the core requirements.",
        RecommendationType::PotentialFit => "Potential fit: worth a screening call to explore gaps.",
        RecommendationType::NeedsReview => "Needs review: concerns should be resolved before proceeding.",
        RecommendationType::NotRecommended => "Not recommended for this role.",
    };
    if flags.has_critical() {
        let critical: Vec<&str> = flags
            .iter()
            .filter(|f| f.severity == RedFlagSeverity::High)
            .map(|f| f.title.as_str())
            .collect();
        format!("{base} Score {overall_score}/100; critical: {}.", critical.join(", "))
    } else {
        format!("{base} Score {overall_score}/100.")
    }
}

pub fn executive_summary(
    resume: &ResumeData,
    years: f64,
    overall_score: u32,
    strengths: &[StrengthItem],
    flags: &RedFlagSet,
) -> String {
    let name = resume.candidate_name.as_deref().unwrap_or("The candidate");
    let role = match (&resume.current_role, &resume.current_company) {
        (Some(role), Some(company)) => format!(", currently {role} at {company},"),
        (Some(role), None) => format!(", currently {role},"),
        _ => String::new(),
    };
    let strength = strengths
        .first()
        .map(|s| format!(" Key strength: {}.", s.title.to_lowercase()))
        .unwrap_or_default();
    let concerns = match flags.count() {
        0 => " No red flags detected.".to_string(),
        1 => " 1 red flag to review.".to_string(),
        n => format!(" {n} red flags to review."),
    };
    format!(
        "{name}{role} brings {years:.1} years of experience and scores {overall_score}/100 overall.{strength}{concerns}"
    )
}

/// How much of the input the analysis could actually use, in [0, 1].
pub fn analysis_confidence(resume: &ResumeData, career: &CareerAnalysis) -> f64 {
    let dated_share = if career.spans.is_empty() {
        0.0
    } else {
        career.spans.iter().filter(|s| s.tenure_months.is_some()).count() as f64
            / career.spans.len() as f64
    };
    let mut confidence = 0.4 * dated_share;
    if !resume.skill_pool().is_empty() {
        confidence += 0.2;
    }
    if !resume.education.is_empty() {
        confidence += 0.2;
    }
    if resume.total_experience_years.is_some() {
        confidence += 0.2;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::career::CareerProgressionAnalyzer;
    use crate::analysis::red_flags::{RedFlag, RedFlagType};
    use crate::models::resume::{EducationItem, ExperienceItem};
    use chrono::NaiveDate;

    fn career(entries: &[ExperienceItem]) -> CareerAnalysis {
        CareerProgressionAnalyzer::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).analyze(entries)
    }

    fn flag(flag_type: RedFlagType, severity: RedFlagSeverity, suggestion: &str) -> RedFlag {
        RedFlag {
            flag_type,
            severity,
            title: format!("{flag_type:?}"),
            description: String::new(),
            evidence: None,
            suggestion: Some(suggestion.to_string()),
        }
    }

    #[test]
    fn test_interview_questions_dedup_and_cap() {
        let flags: RedFlagSet = vec![
            flag(RedFlagType::ShortTenure, RedFlagSeverity::Medium, "Why leave?"),
            flag(RedFlagType::EmploymentGap, RedFlagSeverity::Medium, "Why leave?"),
            flag(RedFlagType::Underqualified, RedFlagSeverity::High, "Q3"),
            flag(RedFlagType::FrequentJobChanges, RedFlagSeverity::Medium, "Q4"),
            flag(RedFlagType::CareerRegression, RedFlagSeverity::Medium, "Q5"),
            flag(RedFlagType::OverlappingJobs, RedFlagSeverity::High, "Q6"),
            flag(RedFlagType::NoProgression, RedFlagSeverity::Low, "Q7"),
            flag(RedFlagType::SkillGaps, RedFlagSeverity::High, "Q8"),
        ]
        .into_iter()
        .collect();
        let questions = interview_questions(&flags, &SkillMatchReport::default());
        assert_eq!(questions, vec!["Why leave?", "Q3", "Q4", "Q5", "Q6", "Q7"]);
    }

    #[test]
    fn test_interview_question_fallback_uses_matched_skill() {
        let skills = SkillMatchReport {
            matched_required: vec!["Rust".into()],
            required_total: 1,
            ..Default::default()
        };
        let questions = interview_questions(&RedFlagSet::default(), &skills);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].contains("Rust"));
    }

    #[test]
    fn test_suggested_level() {
        let empty = career(&[]);
        assert_eq!(suggested_level(&empty, 0.0), None);
        assert_eq!(suggested_level(&empty, 6.0).as_deref(), Some("Senior"));
        let managed = career(&[ExperienceItem {
            title: Some("Engineering Manager".into()),
            ..Default::default()
        }]);
        assert_eq!(suggested_level(&managed, 2.0).as_deref(), Some("Manager"));
    }

    #[test]
    fn test_analysis_confidence_reflects_completeness() {
        let sparse = ResumeData {
            candidate_name: Some("X".into()),
            ..Default::default()
        };
        assert_eq!(analysis_confidence(&sparse, &career(&[])), 0.0);

        let entries = vec![ExperienceItem {
            title: Some("Engineer".into()),
            start_date: Some("2020-01".into()),
            end_date: Some("2022-01".into()),
            ..Default::default()
        }];
        let full = ResumeData {
            skills: vec!["Rust".into()],
            education: vec![EducationItem::default()],
            total_experience_years: Some(2.0),
            experience: entries.clone(),
            ..Default::default()
        };
        assert_eq!(analysis_confidence(&full, &career(&entries)), 1.0);
    }

    #[test]
    fn test_recommendation_text_names_critical_flags() {
        let flags: RedFlagSet = vec![flag(RedFlagType::OverlappingJobs, RedFlagSeverity::High, "q")]
            .into_iter()
            .collect();
        let text = recommendation_text(RecommendationType::NeedsReview, 72, &flags);
        assert!(text.starts_with("Needs review"));
        assert!(text.contains("OverlappingJobs"));
    }

    #[test]
    fn test_weaknesses_list_missing_skills() {
        let breakdown = FitScoreBreakdown {
            skills_alignment: 25.0,
            experience_match: 100.0,
            education_fit: 100.0,
            career_trajectory: 90.0,
            cultural_signals: 70.0,
        };
        let skills = SkillMatchReport {
            matched_required: vec!["Rust".into()],
            missing_required: vec!["Go".into(), "SQL".into(), "Kafka".into(), "Redis".into()],
            required_total: 5,
            ..Default::default()
        };
        let weak = weaknesses(&breakdown, &skills);
        assert_eq!(weak.len(), 1 + MAX_WEAKNESS_SKILLS);
        assert!(weak[0].starts_with("Low skill alignment"));
    }
}
