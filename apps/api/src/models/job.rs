use serde::{Deserialize, Serialize};

use crate::models::resume::string_or_list;

/// Typed job-description record produced by the upstream parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDescriptionData {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_years_min: Option<f64>,
    pub experience_years_max: Option<f64>,
    #[serde(deserialize_with = "string_or_list")]
    pub required_skills: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub preferred_skills: Vec<String>,
    /// Free text such as "Bachelor's in Computer Science".
    pub required_education: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub required_certifications: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub preferred_certifications: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub keywords: Vec<String>,
    pub responsibilities: Vec<String>,
    /// Explicit level when the posting states one ("Senior", "Lead"); falls back to the title.
    pub seniority_level: Option<String>,
}

impl JobDescriptionData {
    /// Minimum years of experience, treating absent or non-positive values as no requirement.
    pub fn required_years(&self) -> f64 {
        self.experience_years_min
            .filter(|y| y.is_finite() && *y > 0.0)
            .unwrap_or(0.0)
    }

    /// Text used to place the role on the seniority ladder.
    pub fn seniority_text(&self) -> Option<&str> {
        self.seniority_level
            .as_deref()
            .or(self.job_title.as_deref())
    }

    /// A posting with no title, requirements or keywords cannot anchor an analysis.
    pub fn is_empty(&self) -> bool {
        self.job_title.is_none()
            && self.required_skills.is_empty()
            && self.preferred_skills.is_empty()
            && self.keywords.is_empty()
            && self.experience_years_min.is_none()
            && self.required_education.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_years_ignores_non_positive() {
        let mut jd = JobDescriptionData::default();
        assert_eq!(jd.required_years(), 0.0);
        jd.experience_years_min = Some(-1.0);
        assert_eq!(jd.required_years(), 0.0);
        jd.experience_years_min = Some(5.0);
        assert_eq!(jd.required_years(), 5.0);
    }

    #[test]
    fn test_deserializes_comma_separated_skills() {
        let jd: JobDescriptionData = serde_json::from_value(json!({
            "job_title": "Senior Backend Engineer",
            "required_skills": "Rust, PostgreSQL, Kubernetes",
            "experience_years_min": 5
        }))
        .unwrap();
        assert_eq!(jd.required_skills.len(), 3);
        assert_eq!(jd.seniority_text(), Some("Senior Backend Engineer"));
        assert!(!jd.is_empty());
    }

    #[test]
    fn test_empty_posting() {
        assert!(JobDescriptionData::default().is_empty());
    }
}
