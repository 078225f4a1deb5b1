use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::analysis::AnalysisError;

/// A single work-history entry as produced by the resume parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub company: Option<String>,
    #[serde(alias = "role")]
    pub title: Option<String>,
    pub start_date: Option<String>,
    /// `None` or a "Present" marker for open-ended roles.
    pub end_date: Option<String>,
    pub duration_months: Option<u32>,
    pub is_current: bool,
    pub location: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub technologies: Vec<String>,
}

/// Typed resume record. Every field is optional because extraction is partial by nature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    pub candidate_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub current_role: Option<String>,
    pub current_company: Option<String>,
    pub summary: Option<String>,
    pub total_experience_years: Option<f64>,
    #[serde(deserialize_with = "string_or_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub technical_skills: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub soft_skills: Vec<String>,
    /// Most recent first, as resumes are conventionally written.
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    #[serde(deserialize_with = "string_or_list")]
    pub certifications: Vec<String>,
    pub projects: Vec<ProjectItem>,
    #[serde(deserialize_with = "string_or_list")]
    pub languages: Vec<String>,
}

impl ResumeData {
    /// Converts the parser's JSON output into a typed record.
    ///
    /// Fails when the payload is absent, not an object, structurally malformed, or
    /// carries none of the fields analysis depends on.
    pub fn from_extracted(value: Option<&Value>) -> Result<Self, AnalysisError> {
        let value = match value {
            Some(Value::Null) | None => return Err(AnalysisError::MissingResume),
            Some(value) => value,
        };
        if !value.is_object() {
            return Err(AnalysisError::MalformedResume(
                "resume payload must be a JSON object".to_string(),
            ));
        }

        let mut resume: ResumeData = serde_json::from_value(value.clone())
            .map_err(|e| AnalysisError::MalformedResume(e.to_string()))?;

        if let Some(years) = resume.total_experience_years {
            if !years.is_finite() || years < 0.0 {
                return Err(AnalysisError::MalformedResume(format!(
                    "total_experience_years must be a non-negative number, got {years}"
                )));
            }
        }

        if resume.is_empty() {
            return Err(AnalysisError::EmptyResume);
        }

        resume.infer_current_position();
        Ok(resume)
    }

    fn is_empty(&self) -> bool {
        self.candidate_name.is_none()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.technical_skills.is_empty()
            && self.summary.is_none()
    }

    /// Fills `current_role`/`current_company` from the most recent entry when missing.
    fn infer_current_position(&mut self) {
        if let Some(latest) = self.experience.first() {
            if self.current_role.is_none() {
                self.current_role = latest.title.clone();
            }
            if self.current_company.is_none() {
                self.current_company = latest.company.clone();
            }
        }
    }

    /// All distinct skills the candidate lists, including project technologies.
    pub fn skill_pool(&self) -> Vec<String> {
        let mut pool: Vec<String> = Vec::new();
        let project_tech = self.projects.iter().flat_map(|p| p.technologies.iter());
        for skill in self
            .skills
            .iter()
            .chain(self.technical_skills.iter())
            .chain(project_tech)
        {
            let trimmed = skill.trim();
            if !trimmed.is_empty() && !pool.iter().any(|s| s.eq_ignore_ascii_case(trimmed)) {
                pool.push(trimmed.to_string());
            }
        }
        pool
    }

    /// Concatenated free text used for keyword search.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.summary.as_deref());
        parts.extend(self.skills.iter().map(String::as_str));
        parts.extend(self.technical_skills.iter().map(String::as_str));
        for exp in &self.experience {
            parts.extend(exp.title.as_deref());
            parts.extend(exp.company.as_deref());
            parts.extend(exp.highlights.iter().map(String::as_str));
        }
        for edu in &self.education {
            parts.extend(edu.degree.as_deref());
            parts.extend(edu.field_of_study.as_deref());
            parts.extend(edu.institution.as_deref());
        }
        parts.extend(self.certifications.iter().map(String::as_str));
        for project in &self.projects {
            parts.extend(project.name.as_deref());
            parts.extend(project.description.as_deref());
            parts.extend(project.technologies.iter().map(String::as_str));
        }
        parts.join(" ").to_lowercase()
    }
}

/// Accepts either a JSON list of strings or a single delimited string ("a, b; c").
pub fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        List(Vec<Option<String>>),
        Text(String),
        Null(()),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::List(items) => items
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        StringOrList::Text(text) => text
            .split([',', ';', '|'])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        StringOrList::Null(()) => Vec::new(),
    })
}
