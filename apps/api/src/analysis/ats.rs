//! ATS-style score: keyword and requirement coverage, independent of qualitative fit.

use serde::{Deserialize, Serialize};

use crate::analysis::fit_scoring::{highest_degree, DegreeLevel};
use crate::analysis::skills::{normalize_skill, variations, SkillMatchReport};
use crate::models::job::JobDescriptionData;
use crate::models::resume::ResumeData;

const MAX_SUGGESTIONS: usize = 7;
const MAX_MISSING_KEYWORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsScoreResult {
    pub ats_score: u32,
    pub skills_match_score: u32,
    pub keyword_match_score: u32,
    pub experience_match_score: u32,
    pub education_match_score: u32,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub summary: String,
}

/// Scores a resume the way a keyword-driven screening system would.
///
/// Weights: skills 40%, keywords 25%, experience 25%, education 10%.
pub fn score_ats(
    resume: &ResumeData,
    jd: &JobDescriptionData,
    skills: &SkillMatchReport,
    candidate_years: f64,
) -> AtsScoreResult {
    let required_part = skills.required_ratio().map_or(70.0, |r| r * 70.0);
    let preferred_part = skills.preferred_ratio().map_or(30.0, |r| r * 30.0);
    let skills_match_score = (required_part + preferred_part).round() as u32;

    let (matched_keywords, missing_keywords) = keyword_coverage(resume, jd);
    let keyword_total = matched_keywords.len() + missing_keywords.len();
    let keyword_match_score = if keyword_total == 0 {
        100
    } else {
        (matched_keywords.len() as f64 / keyword_total as f64 * 100.0).round() as u32
    };

    let experience_match_score = experience_score(candidate_years, jd);
    let education_match_score = education_score(resume, jd);

    let ats_score = (skills_match_score as f64 * 0.40
        + keyword_match_score as f64 * 0.25
        + experience_match_score as f64 * 0.25
        + education_match_score as f64 * 0.10)
        .round()
        .clamp(0.0, 100.0) as u32;

    let suggestions = suggestions(
        resume,
        jd,
        skills,
        &missing_keywords,
        experience_match_score,
        education_match_score,
    );
    let summary = summary(ats_score, skills);

    AtsScoreResult {
        ats_score,
        skills_match_score,
        keyword_match_score,
        experience_match_score,
        education_match_score,
        matched_keywords,
        missing_keywords: missing_keywords.into_iter().take(MAX_MISSING_KEYWORDS).collect(),
        suggestions,
        summary,
    }
}

fn keyword_coverage(resume: &ResumeData, jd: &JobDescriptionData) -> (Vec<String>, Vec<String>) {
    let text = resume.searchable_text().replace(['-', '_'], " ");
    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for keyword in jd.keywords.iter().map(|k| normalize_skill(k)).filter(|k| !k.is_empty()) {
        if matched.contains(&keyword) || missing.contains(&keyword) {
            continue;
        }
        if variations(&keyword).iter().any(|v| text.contains(v.as_str())) {
            matched.push(keyword);
        } else {
            missing.push(keyword);
        }
    }
    (matched, missing)
}

fn experience_score(years: f64, jd: &JobDescriptionData) -> u32 {
    let (min, max) = match (jd.experience_years_min, jd.experience_years_max) {
        (None, None) => return 100,
        (min, max) => {
            let min = min.unwrap_or(0.0).max(0.0);
            (min, max.unwrap_or(min + 10.0))
        }
    };

    if years >= min {
        if years <= max {
            100
        } else {
            let over = years - max;
            (100.0 - over * 5.0).max(60.0).round() as u32
        }
    } else {
        let under = min - years;
        if under <= 1.0 {
            70
        } else if under <= 2.0 {
            50
        } else {
            (50.0 - under * 10.0).max(20.0).round() as u32
        }
    }
}

fn education_score(resume: &ResumeData, jd: &JobDescriptionData) -> u32 {
    let Some(required) = jd.required_education.as_deref().and_then(DegreeLevel::minimum_in_text)
    else {
        return 100;
    };
    let held = highest_degree(resume).map_or(0, DegreeLevel::rank);
    match required.rank() - held {
        d if d <= 0 => 100,
        1 => 70,
        _ => 40,
    }
}

fn suggestions(
    resume: &ResumeData,
    jd: &JobDescriptionData,
    skills: &SkillMatchReport,
    missing_keywords: &[String],
    experience_score: u32,
    education_score: u32,
) -> Vec<String> {
    let mut out = Vec::new();

    if !skills.missing_required.is_empty() {
        let top: Vec<&str> = skills.missing_required.iter().take(5).map(String::as_str).collect();
        out.push(format!(
            "Add these required skills if you have experience: {}",
            top.join(", ")
        ));
    }

    let preferred: Vec<&str> = skills
        .missing_preferred
        .iter()
        .take(3)
        .map(String::as_str)
        .collect();
    if !preferred.is_empty() {
        out.push(format!(
            "Consider highlighting these preferred skills: {}",
            preferred.join(", ")
        ));
    }

    let already_named = |k: &str| {
        skills
            .missing_required
            .iter()
            .chain(skills.missing_preferred.iter())
            .any(|s| normalize_skill(s) == k)
    };
    let keywords: Vec<&str> = missing_keywords
        .iter()
        .map(String::as_str)
        .filter(|k| !already_named(k))
        .take(5)
        .collect();
    if !keywords.is_empty() {
        out.push(format!(
            "Include these keywords in your resume: {}",
            keywords.join(", ")
        ));
    }

    if experience_score < 70 {
        out.push("Highlight relevant projects or freelance work to bridge the experience gap".to_string());
    }
    if education_score < 70 {
        out.push("List relevant certifications or courses to strengthen the education section".to_string());
    }
    if resume.summary.as_deref().map_or(true, |s| s.trim().is_empty()) {
        out.push("Add a professional summary highlighting fit for this role".to_string());
    }

    let wanted_certs: Vec<&str> = jd
        .required_certifications
        .iter()
        .chain(jd.preferred_certifications.iter())
        .take(3)
        .map(String::as_str)
        .collect();
    if !wanted_certs.is_empty() && resume.certifications.is_empty() {
        out.push(format!(
            "Consider obtaining relevant certifications: {}",
            wanted_certs.join(", ")
        ));
    }

    out.truncate(MAX_SUGGESTIONS);
    out
}

fn summary(ats_score: u32, skills: &SkillMatchReport) -> String {
    let (grade, detail) = match ats_score {
        90.. => ("Excellent", "Highly optimized for this job posting."),
        75..=89 => ("Good", "Strong match with room for minor improvements."),
        60..=74 => ("Fair", "Moderate match; consider adding missing keywords."),
        40..=59 => ("Needs Work", "Significant gaps in required skills or keywords."),
        _ => ("Poor Match", "Major mismatch; this role may not be a good fit."),
    };
    let skill_info = if skills.required_total > 0 {
        format!(
            " Matched {}/{} required skills.",
            skills.matched_required.len(),
            skills.required_total
        )
    } else {
        String::new()
    };
    format!("{grade} ({ats_score}/100). {detail}{skill_info}")
}
