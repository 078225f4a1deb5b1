//! One candidate, one job description, one `FullCandidateAnalysis`.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::analysis::ats::{score_ats, AtsScoreResult};
use crate::analysis::career::CareerProgressionAnalyzer;
use crate::analysis::fit_scoring::{candidate_years, FitInput, FitScorer, WeightedFitScorer};
use crate::analysis::insights;
use crate::analysis::red_flags::{detect_red_flags, FlagContext};
use crate::analysis::skills::SkillMatchReport;
use crate::analysis::AnalysisError;
use crate::models::candidate::{CandidateFitResult, FullCandidateAnalysis, RecommendationType};
use crate::models::job::JobDescriptionData;
use crate::models::resume::ResumeData;

/// Stateless orchestrator; cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct CandidateAnalyzer {
    fit_scorer: Arc<dyn FitScorer>,
    /// Share of `ats_score` in `overall_score`; fit gets the rest.
    ats_weight: f64,
}

impl Default for CandidateAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(WeightedFitScorer::default()), 0.5)
    }
}

impl CandidateAnalyzer {
    pub fn new(fit_scorer: Arc<dyn FitScorer>, ats_weight: f64) -> Self {
        Self {
            fit_scorer,
            ats_weight: ats_weight.clamp(0.0, 1.0),
        }
    }

    /// Never fails: parse problems become `success: false` with the error recorded.
    pub fn analyze(
        &self,
        file_name: &str,
        resume: Option<&Value>,
        jd: &JobDescriptionData,
        as_of: NaiveDate,
    ) -> FullCandidateAnalysis {
        let started = Instant::now();
        match self.try_analyze(file_name, resume, jd, as_of) {
            Ok(mut analysis) => {
                analysis.processing_time_ms = started.elapsed().as_millis() as u64;
                debug!(
                    file_name,
                    overall_score = analysis.overall_score,
                    ats_score = analysis.ats_score,
                    fit_score = analysis.fit_score(),
                    red_flags = analysis.red_flag_count(),
                    "Candidate analysed"
                );
                analysis
            }
            Err(e) => {
                warn!(file_name, error = %e, "Candidate analysis failed");
                FullCandidateAnalysis::failed(file_name, &e, started.elapsed().as_millis() as u64)
            }
        }
    }

    pub fn try_analyze(
        &self,
        file_name: &str,
        resume: Option<&Value>,
        jd: &JobDescriptionData,
        as_of: NaiveDate,
    ) -> Result<FullCandidateAnalysis, AnalysisError> {
        if jd.is_empty() {
            return Err(AnalysisError::MissingJobDescription);
        }
        let resume = ResumeData::from_extracted(resume)?;

        let career = CareerProgressionAnalyzer::new(as_of).analyze(&resume.experience);
        let skills = SkillMatchReport::build(&resume, jd);
        let years = candidate_years(&resume, &career);

        let fit = self.fit_scorer.score(&FitInput {
            resume: &resume,
            jd,
            career: &career,
            skills: &skills,
        });
        let ats: AtsScoreResult = score_ats(&resume, jd, &skills, years);

        let red_flags = detect_red_flags(&FlagContext {
            jd,
            career: &career,
            skills: &skills,
            breakdown: &fit.breakdown,
            candidate_years: years,
            as_of,
        });

        let overall_score = self.overall_score(ats.ats_score, fit.fit_score);
        let recommendation = RecommendationType::from_score(overall_score, red_flags.has_critical());

        let strengths = insights::strengths(&fit.breakdown, &career, &skills);
        let fit_analysis = CandidateFitResult {
            fit_score: fit.fit_score,
            fit_score_breakdown: Some(fit.breakdown),
            recommendation,
            recommendation_text: insights::recommendation_text(recommendation, overall_score, &red_flags),
            weaknesses: insights::weaknesses(&fit.breakdown, &skills),
            executive_summary: insights::executive_summary(&resume, years, overall_score, &strengths, &red_flags),
            interview_questions: insights::interview_questions(&red_flags, &skills),
            suggested_level: insights::suggested_level(&career, years),
            analysis_confidence: insights::analysis_confidence(&resume, &career),
            career_progression: Some(career.progression),
            strengths,
            red_flags,
        };

        Ok(FullCandidateAnalysis {
            success: true,
            file_name: file_name.to_string(),
            candidate_name: resume.candidate_name.clone(),
            candidate_email: resume.email.clone(),
            current_role: resume.current_role.clone(),
            overall_score,
            ats_score: ats.ats_score,
            matched_skills: skills.matched_skills(),
            missing_skills: skills.missing_skills(),
            ats_details: Some(ats),
            fit_analysis: Some(fit_analysis),
            resume_data: Some(resume),
            jd_data: Some(jd.clone()),
            processing_time_ms: 0,
            error: None,
        })
    }

    pub fn overall_score(&self, ats_score: u32, fit_score: u32) -> u32 {
        let combined = self.ats_weight * ats_score as f64 + (1.0 - self.ats_weight) * fit_score as f64;
        combined.round().clamp(0.0, 100.0) as u32
    }

    pub fn scorer_name(&self) -> &'static str {
        self.fit_scorer.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::red_flags::RedFlagType;
    use serde_json::json;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn jd() -> JobDescriptionData {
        serde_json::from_value(json!({
            "job_title": "Senior Backend Engineer",
            "required_skills": ["Rust", "PostgreSQL", "Kubernetes"],
            "preferred_skills": ["Kafka"],
            "keywords": ["distributed systems"],
            "experience_years_min": 5,
            "required_education": "Bachelor's degree"
        }))
        .unwrap()
    }

    fn strong_resume() -> Value {
        json!({
            "candidate_name": "Dana Reyes",
            "email": "dana@example.com",
            "summary": "Engineer focused on distributed systems",
            "total_experience_years": 8,
            "skills": ["Rust", "Postgres", "k8s", "Kafka"],
            "education": [{"degree": "BSc Computer Science"}],
            "experience": [
                {"company": "Acme", "title": "Staff Engineer", "start_date": "2021-01", "is_current": true},
                {"company": "Initech", "title": "Senior Engineer", "start_date": "2018-01", "end_date": "2020-12"},
                {"company": "Globex", "title": "Engineer", "start_date": "2016-01", "end_date": "2017-12"}
            ]
        })
    }

    #[test]
    fn test_strong_candidate() {
        let analysis = CandidateAnalyzer::default().analyze("dana.pdf", Some(&strong_resume()), &jd(), as_of());
        assert!(analysis.success, "{:?}", analysis.error);
        assert_eq!(analysis.ats_score, 100);
        let fit = analysis.fit_analysis.as_ref().unwrap();
        // 35 + 25 + 10 + 13.5 + 10.5
        assert_eq!(fit.fit_score, 94);
        assert_eq!(analysis.overall_score, 97);
        assert_eq!(fit.recommendation, RecommendationType::StrongHire);
        assert!(fit.red_flags.is_empty());
        assert_eq!(analysis.matched_skills, vec!["Rust", "PostgreSQL", "Kubernetes", "Kafka"]);
        assert!(analysis.missing_skills.is_empty());
        assert_eq!(fit.suggested_level.as_deref(), Some("Lead"));
        assert_eq!(analysis.current_role.as_deref(), Some("Staff Engineer"));
        assert!(fit.career_progression.as_ref().unwrap().has_leadership_progression);
    }

    #[test]
    fn test_critical_flag_caps_recommendation() {
        let mut resume = strong_resume();
        resume["skills"] = json!(["Rust"]);
        let analysis = CandidateAnalyzer::default().analyze("x.pdf", Some(&resume), &jd(), as_of());
        let fit = analysis.fit_analysis.as_ref().unwrap();
        assert!(fit.red_flags.contains(RedFlagType::SkillGaps));
        assert!(fit.red_flags.has_critical());
        assert!(matches!(
            fit.recommendation,
            RecommendationType::NeedsReview | RecommendationType::NotRecommended
        ));
    }

    #[test]
    fn test_failures_are_data() {
        let analyzer = CandidateAnalyzer::default();
        let missing = analyzer.analyze("a.pdf", None, &jd(), as_of());
        assert!(!missing.success);
        assert_eq!(missing.file_name, "a.pdf");
        assert!(missing.error.unwrap().contains("missing"));

        let malformed = analyzer.analyze("b.pdf", Some(&json!("just text")), &jd(), as_of());
        assert!(!malformed.success);

        let no_jd = analyzer.analyze("c.pdf", Some(&strong_resume()), &JobDescriptionData::default(), as_of());
        assert_eq!(no_jd.error.as_deref(), Some("job description is missing"));
    }

    #[test]
    fn test_overall_score_weighting() {
        let analyzer = CandidateAnalyzer::new(Arc::new(WeightedFitScorer::default()), 0.25);
        assert_eq!(analyzer.overall_score(80, 60), 65);
        assert_eq!(CandidateAnalyzer::default().overall_score(81, 60), 71);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = CandidateAnalyzer::default();
        let mut a = analyzer.analyze("d.pdf", Some(&strong_resume()), &jd(), as_of());
        let mut b = analyzer.analyze("d.pdf", Some(&strong_resume()), &jd(), as_of());
        a.processing_time_ms = 0;
        b.processing_time_ms = 0;
        assert_eq!(a, b);
    }
}
