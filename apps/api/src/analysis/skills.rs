//! Skill normalisation and matching between a resume's skill pool and a job's lists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::job::JobDescriptionData;
use crate::models::resume::ResumeData;

/// Canonical skill name → accepted variants.
const SKILL_SYNONYMS: &[(&str, &[&str])] = &[
    ("javascript", &["js", "ecmascript", "es6", "es2015"]),
    ("typescript", &["ts"]),
    ("python", &["py", "python3"]),
    ("kubernetes", &["k8s", "kube"]),
    ("postgresql", &["postgres", "psql", "pgsql"]),
    ("mongodb", &["mongo"]),
    ("elasticsearch", &["elastic"]),
    ("amazon web services", &["aws"]),
    ("google cloud platform", &["gcp", "google cloud"]),
    ("microsoft azure", &["azure"]),
    ("machine learning", &["ml"]),
    ("artificial intelligence", &["ai"]),
    ("natural language processing", &["nlp"]),
    ("ci/cd", &["cicd", "ci cd", "continuous integration"]),
    ("react", &["reactjs", "react.js"]),
    ("node", &["nodejs", "node.js"]),
    ("vue", &["vuejs", "vue.js"]),
    ("angular", &["angularjs", "angular.js"]),
    ("dotnet", &[".net", "dot net", "asp.net"]),
    ("csharp", &["c#", "c sharp"]),
    ("cpp", &["c++", "cplusplus"]),
    ("sql server", &["mssql", "microsoft sql server"]),
    ("restful", &["rest", "rest api", "restful api"]),
    ("graphql", &["gql"]),
    ("terraform", &["infrastructure as code", "iac"]),
    ("agile", &["scrum", "kanban"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Partial,
    Synonym,
}

pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase().replace(['-', '_'], " ")
}

/// Canonical group a normalised skill belongs to, if any.
fn synonym_group(normalized: &str) -> Option<&'static str> {
    SKILL_SYNONYMS
        .iter()
        .find(|(canonical, variants)| *canonical == normalized || variants.contains(&normalized))
        .map(|(canonical, _)| *canonical)
}

/// How two skills match, if they do. Containment only counts when both sides have at
/// least two characters so "c" does not match everything.
pub fn skills_match(a: &str, b: &str) -> Option<MatchKind> {
    let a = normalize_skill(a);
    let b = normalize_skill(b);
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(MatchKind::Exact);
    }
    if a.len() >= 2 && b.len() >= 2 && (a.contains(&b) || b.contains(&a)) {
        return Some(MatchKind::Partial);
    }
    match (synonym_group(&a), synonym_group(&b)) {
        (Some(ga), Some(gb)) if ga == gb => Some(MatchKind::Synonym),
        _ => None,
    }
}

/// All spellings a keyword may appear as in free text.
pub fn variations(skill: &str) -> Vec<String> {
    let normalized = normalize_skill(skill);
    let mut out = vec![normalized.clone()];
    if let Some(group) = synonym_group(&normalized) {
        if let Some((canonical, variants)) = SKILL_SYNONYMS.iter().find(|(c, _)| *c == group) {
            out.push(canonical.to_string());
            out.extend(variants.iter().map(|v| v.to_string()));
        }
    }
    out.sort();
    out.dedup();
    out
}

/// One job skill and the resume evidence for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: String,
    pub found_in_resume: bool,
    pub match_kind: Option<MatchKind>,
    pub resume_evidence: Option<String>,
}

/// Job skills partitioned by whether the resume covers them, in job order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchReport {
    pub matched_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub matched_preferred: Vec<String>,
    pub missing_preferred: Vec<String>,
    pub details: Vec<SkillMatch>,
    pub required_total: usize,
}

impl SkillMatchReport {
    pub fn build(resume: &ResumeData, jd: &JobDescriptionData) -> Self {
        let pool = resume.skill_pool();
        let mut report = SkillMatchReport::default();

        for skill in distinct(&jd.required_skills) {
            let found = best_match(&skill, &pool);
            report.details.push(SkillMatch {
                skill: skill.clone(),
                found_in_resume: found.is_some(),
                match_kind: found.as_ref().map(|(k, _)| *k),
                resume_evidence: found.map(|(_, e)| e),
            });
            if report.details.last().is_some_and(|m| m.found_in_resume) {
                report.matched_required.push(skill);
            } else {
                report.missing_required.push(skill);
            }
        }
        report.required_total = report.matched_required.len() + report.missing_required.len();

        for skill in distinct(&jd.preferred_skills) {
            if best_match(&skill, &pool).is_some() {
                report.matched_preferred.push(skill);
            } else {
                report.missing_preferred.push(skill);
            }
        }
        report
    }

    pub fn matched_skills(&self) -> Vec<String> {
        self.matched_required
            .iter()
            .chain(self.matched_preferred.iter())
            .cloned()
            .collect()
    }

    pub fn missing_skills(&self) -> Vec<String> {
        self.missing_required.clone()
    }

    /// Share of required skills matched, or `None` when the job lists none.
    pub fn required_ratio(&self) -> Option<f64> {
        (self.required_total > 0)
            .then(|| self.matched_required.len() as f64 / self.required_total as f64)
    }

    pub fn preferred_ratio(&self) -> Option<f64> {
        let total = self.matched_preferred.len() + self.missing_preferred.len();
        (total > 0).then(|| self.matched_preferred.len() as f64 / total as f64)
    }
}

/// Strongest match for `skill` in the pool, exact before partial before synonym.
fn best_match(skill: &str, pool: &[String]) -> Option<(MatchKind, String)> {
    pool.iter()
        .filter_map(|candidate| skills_match(skill, candidate).map(|k| (k, candidate.clone())))
        .min_by_key(|(kind, _)| *kind)
}

/// Trimmed, non-empty skills with case-insensitive duplicates removed, order kept.
fn distinct(skills: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(normalize_skill(s)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume(skills: &[&str]) -> ResumeData {
        ResumeData {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn jd(required: &[&str], preferred: &[&str]) -> JobDescriptionData {
        JobDescriptionData {
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_match_kinds() {
        assert_eq!(skills_match("Rust", "rust"), Some(MatchKind::Exact));
        assert_eq!(skills_match("React", "React Native"), Some(MatchKind::Partial));
        assert_eq!(skills_match("k8s", "Kubernetes"), Some(MatchKind::Synonym));
        assert_eq!(skills_match("Postgres", "PostgreSQL"), Some(MatchKind::Partial));
        assert_eq!(skills_match("psql", "PostgreSQL"), Some(MatchKind::Synonym));
        assert_eq!(skills_match("AWS", "Amazon Web Services"), Some(MatchKind::Synonym));
        assert_eq!(skills_match("C", "Scala"), None);
        assert_eq!(skills_match("Go", "Rust"), None);
    }

    #[test]
    fn test_normalize_skill() {
        assert_eq!(normalize_skill("  CI-CD "), "ci cd");
        assert_eq!(normalize_skill("machine_learning"), "machine learning");
    }

    #[test]
    fn test_report_partitions_in_job_order() {
        let report = SkillMatchReport::build(
            &resume(&["Rust", "JS", "Docker"]),
            &jd(&["Kubernetes", "Rust", "JavaScript"], &["Docker", "Terraform"]),
        );
        assert_eq!(report.matched_required, vec!["Rust", "JavaScript"]);
        assert_eq!(report.missing_required, vec!["Kubernetes"]);
        assert_eq!(report.matched_preferred, vec!["Docker"]);
        assert_eq!(report.missing_preferred, vec!["Terraform"]);
        assert_eq!(report.matched_skills(), vec!["Rust", "JavaScript", "Docker"]);
        assert_eq!(report.missing_skills(), vec!["Kubernetes"]);
        assert_eq!(report.details[2].match_kind, Some(MatchKind::Synonym));
    }

    #[test]
    fn test_duplicate_requirements_counted_once() {
        let report = SkillMatchReport::build(&resume(&["Rust"]), &jd(&["Rust", "rust", " RUST "], &[]));
        assert_eq!(report.required_total, 1);
        assert_eq!(report.required_ratio(), Some(1.0));
    }

    #[test]
    fn test_empty_requirements_have_no_ratio() {
        let report = SkillMatchReport::build(&resume(&["Rust"]), &jd(&[], &[]));
        assert_eq!(report.required_ratio(), None);
        assert_eq!(report.preferred_ratio(), None);
        assert!(report.missing_skills().is_empty());
    }

    #[test]
    fn test_variations_include_synonyms() {
        let v = variations("k8s");
        assert!(v.contains(&"kubernetes".to_string()));
        assert!(v.contains(&"kube".to_string()));
        assert_eq!(variations("rust"), vec!["rust"]);
    }
}
