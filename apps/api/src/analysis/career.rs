//! Career progression: tenure statistics and seniority trajectory from work history.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::resume::ExperienceItem;
use crate::parsing::{is_present_marker, months_between, normalize_name, parse_date};

/// Seniority ladder used to compare titles. Ordering is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityTier {
    Intern,
    Associate,
    Mid,
    Senior,
    Lead,
    Manager,
    Director,
    Executive,
}

/// Keyword ladder, checked from the top down so "Senior Manager" lands on Manager.
const TIER_KEYWORDS: &[(SeniorityTier, &[&str])] = &[
    (
        SeniorityTier::Executive,
        &[
            "chief", "vp", "svp", "evp", "vice president", "president", "ceo", "cto", "cfo",
            "coo", "cio", "cpo",
        ],
    ),
    (SeniorityTier::Director, &["director", "head of", "head"]),
    (SeniorityTier::Manager, &["manager", "mgr"]),
    (SeniorityTier::Lead, &["lead", "principal", "staff", "architect"]),
    (SeniorityTier::Senior, &["senior", "sr"]),
    (
        SeniorityTier::Associate,
        &["junior", "jr", "associate", "assistant", "entry", "graduate"],
    ),
    (
        SeniorityTier::Intern,
        &["intern", "internship", "trainee", "apprentice", "co op"],
    ),
];

impl SeniorityTier {
    /// Places a title on the ladder. Titles without a level keyword are `Mid`.
    pub fn from_title(title: &str) -> Option<Self> {
        let tokens: Vec<String> = title
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            return None;
        }
        let joined = format!(" {} ", tokens.join(" "));

        for (tier, keywords) in TIER_KEYWORDS {
            let hit = keywords.iter().any(|kw| {
                if kw.contains(' ') {
                    joined.contains(&format!(" {kw} "))
                } else {
                    tokens.iter().any(|t| t == kw)
                }
            });
            if hit {
                return Some(*tier);
            }
        }
        Some(SeniorityTier::Mid)
    }

    pub fn rank(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            SeniorityTier::Intern => "Intern",
            SeniorityTier::Associate => "Junior",
            SeniorityTier::Mid => "Mid",
            SeniorityTier::Senior => "Senior",
            SeniorityTier::Lead => "Lead",
            SeniorityTier::Manager => "Manager",
            SeniorityTier::Director => "Director",
            SeniorityTier::Executive => "Executive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerTrajectory {
    #[serde(alias = "upward")]
    Ascending,
    Lateral,
    #[serde(alias = "downward")]
    Descending,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerProgression {
    pub trajectory: CareerTrajectory,
    pub avg_tenure_months: f64,
    pub longest_tenure_months: u32,
    pub total_companies: usize,
    pub has_leadership_progression: bool,
    pub progression_summary: String,
}

/// One work-history entry with its dates resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSpan {
    pub company: Option<String>,
    pub company_key: Option<String>,
    pub title: Option<String>,
    pub tier: Option<SeniorityTier>,
    pub start: Option<NaiveDate>,
    /// Resolved end; open roles end at the analysis date.
    pub end: Option<NaiveDate>,
    pub is_open: bool,
    pub tenure_months: Option<u32>,
}

impl RoleSpan {
    pub fn display_name(&self) -> String {
        match (&self.title, &self.company) {
            (Some(title), Some(company)) => format!("{title} at {company}"),
            (Some(title), None) => title.clone(),
            (None, Some(company)) => company.clone(),
            (None, None) => "Unnamed role".to_string(),
        }
    }
}

/// Everything downstream scorers need from the work history.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerAnalysis {
    pub progression: CareerProgression,
    /// Oldest first.
    pub spans: Vec<RoleSpan>,
    /// Sum of resolvable tenures.
    pub total_months: u32,
    pub final_tier: Option<SeniorityTier>,
}

impl CareerAnalysis {
    pub fn has_open_role(&self) -> bool {
        self.spans.iter().any(|s| s.is_open)
    }

    /// Most recent resolvable end date among closed roles.
    pub fn latest_end(&self) -> Option<NaiveDate> {
        self.spans
            .iter()
            .filter(|s| !s.is_open)
            .filter_map(|s| s.end)
            .max()
    }
}

pub struct CareerProgressionAnalyzer {
    as_of: NaiveDate,
}

impl CareerProgressionAnalyzer {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    pub fn analyze(&self, entries: &[ExperienceItem]) -> CareerAnalysis {
        let spans = self.chronological_spans(entries);

        let tenures: Vec<u32> = spans.iter().filter_map(|s| s.tenure_months).collect();
        let total_months: u32 = tenures.iter().sum();
        let avg_tenure_months = if tenures.is_empty() {
            0.0
        } else {
            let avg = total_months as f64 / tenures.len() as f64;
            (avg * 10.0).round() / 10.0
        };
        let longest_tenure_months = tenures.iter().copied().max().unwrap_or(0);

        let total_companies = spans
            .iter()
            .filter_map(|s| s.company_key.as_deref())
            .collect::<HashSet<_>>()
            .len();

        let tiers: Vec<SeniorityTier> = spans.iter().filter_map(|s| s.tier).collect();
        let trajectory = classify_trajectory(&tiers);
        let final_tier = tiers.last().copied();
        let has_leadership_progression = trajectory == CareerTrajectory::Ascending
            && final_tier.is_some_and(|t| t >= SeniorityTier::Lead);

        let progression_summary =
            summarize(&spans, trajectory, total_companies, avg_tenure_months);

        CareerAnalysis {
            progression: CareerProgression {
                trajectory,
                avg_tenure_months,
                longest_tenure_months,
                total_companies,
                has_leadership_progression,
                progression_summary,
            },
            spans,
            total_months,
            final_tier,
        }
    }

    /// Resolves every entry and orders them oldest first. When every entry has a start
    /// date the order is by start; otherwise the resume's most-recent-first order is
    /// reversed.
    fn chronological_spans(&self, entries: &[ExperienceItem]) -> Vec<RoleSpan> {
        let mut spans: Vec<RoleSpan> = entries.iter().rev().map(|e| self.resolve(e)).collect();
        if spans.iter().all(|s| s.start.is_some()) {
            spans.sort_by_key(|s| s.start);
        }
        spans
    }

    fn resolve(&self, entry: &ExperienceItem) -> RoleSpan {
        let start = entry.start_date.as_deref().and_then(parse_date);
        let end_marker_open = entry.end_date.as_deref().is_some_and(is_present_marker);
        let is_open = entry.is_current || end_marker_open;

        let end = if is_open {
            Some(self.as_of)
        } else {
            entry.end_date.as_deref().and_then(parse_date)
        };

        let tenure_months = match (start, end) {
            (Some(start), Some(end)) if end >= start => Some(months_between(start, end)),
            _ => entry.duration_months,
        };

        let company = entry
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let title = entry
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        RoleSpan {
            company_key: company.as_deref().map(normalize_name),
            tier: title.as_deref().and_then(SeniorityTier::from_title),
            company,
            title,
            start,
            end,
            is_open,
            tenure_months,
        }
    }
}

/// Direction of successive seniority changes. Equal steps are ignored; a career with
/// steps in both directions is `Mixed` even when it ends where it started.
pub fn classify_trajectory(tiers: &[SeniorityTier]) -> CareerTrajectory {
    let mut ups = 0;
    let mut downs = 0;
    for pair in tiers.windows(2) {
        match pair[1].rank() - pair[0].rank() {
            d if d > 0 => ups += 1,
            d if d < 0 => downs += 1,
            _ => {}
        }
    }
    match (ups, downs) {
        (0, 0) => CareerTrajectory::Lateral,
        (_, 0) => CareerTrajectory::Ascending,
        (0, _) => CareerTrajectory::Descending,
        _ => CareerTrajectory::Mixed,
    }
}

fn summarize(
    spans: &[RoleSpan],
    trajectory: CareerTrajectory,
    total_companies: usize,
    avg_tenure_months: f64,
) -> String {
    let titled: Vec<&str> = spans.iter().filter_map(|s| s.title.as_deref()).collect();
    let (first, last) = match (titled.first(), titled.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return "No work history with titles provided".to_string(),
    };
    let companies = if total_companies == 1 {
        "1 company".to_string()
    } else {
        format!("{total_companies} companies")
    };

    let path = match trajectory {
        CareerTrajectory::Ascending => format!("Progressed from {first} to {last}"),
        CareerTrajectory::Descending => format!("Moved from {first} down to {last}"),
        CareerTrajectory::Lateral if titled.len() == 1 => format!("Single role as {first}"),
        CareerTrajectory::Lateral => format!("Lateral moves at the {last} level"),
        CareerTrajectory::Mixed => format!("Mixed path from {first} to {last}"),
    };
    format!("{path} across {companies} (average tenure {avg_tenure_months:.0} months)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn job(company: &str, title: &str, start: &str, end: Option<&str>) -> ExperienceItem {
        ExperienceItem {
            company: Some(company.to_string()),
            title: Some(title.to_string()),
            start_date: Some(start.to_string()),
            end_date: end.map(str::to_string),
            is_current: end.is_none(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tier_from_title() {
        assert_eq!(SeniorityTier::from_title("Software Intern"), Some(SeniorityTier::Intern));
        assert_eq!(SeniorityTier::from_title("Junior Developer"), Some(SeniorityTier::Associate));
        assert_eq!(SeniorityTier::from_title("Software Engineer"), Some(SeniorityTier::Mid));
        assert_eq!(SeniorityTier::from_title("Sr. Engineer"), Some(SeniorityTier::Senior));
        assert_eq!(SeniorityTier::from_title("Tech Lead"), Some(SeniorityTier::Lead));
        assert_eq!(SeniorityTier::from_title("Senior Engineering Manager"), Some(SeniorityTier::Manager));
        assert_eq!(SeniorityTier::from_title("Head of Data"), Some(SeniorityTier::Director));
        assert_eq!(SeniorityTier::from_title("VP Engineering"), Some(SeniorityTier::Executive));
        assert_eq!(SeniorityTier::from_title("Internal Auditor"), Some(SeniorityTier::Mid));
        assert_eq!(SeniorityTier::from_title("  "), None);
    }

    #[test]
    fn test_classify_trajectory() {
        use SeniorityTier::*;
        assert_eq!(classify_trajectory(&[Associate, Mid, Senior]), CareerTrajectory::Ascending);
        assert_eq!(classify_trajectory(&[Mid, Mid, Senior]), CareerTrajectory::Ascending);
        assert_eq!(classify_trajectory(&[Manager, Senior]), CareerTrajectory::Descending);
        assert_eq!(classify_trajectory(&[Mid, Mid, Mid]), CareerTrajectory::Lateral);
        assert_eq!(classify_trajectory(&[Mid]), CareerTrajectory::Lateral);
        assert_eq!(classify_trajectory(&[]), CareerTrajectory::Lateral);
        assert_eq!(classify_trajectory(&[Mid, Senior, Mid]), CareerTrajectory::Mixed);
    }

    #[test]
    fn test_ascending_career_with_leadership() {
        // Most recent first, as resumes list them.
        let entries = vec![
            job("Acme", "Engineering Manager", "2021-01", None),
            job("Initech", "Senior Engineer", "2018-01", Some("2020-12")),
            job("Globex", "Junior Developer", "2016-01", Some("2017-12")),
        ];
        let analysis = CareerProgressionAnalyzer::new(as_of()).analyze(&entries);
        let p = &analysis.progression;

        assert_eq!(p.trajectory, CareerTrajectory::Ascending);
        assert!(p.has_leadership_progression);
        assert_eq!(p.total_companies, 3);
        // 41 (open, to 2024-06) + 35 + 23
        assert_eq!(p.longest_tenure_months, 41);
        assert!((p.avg_tenure_months - 33.0).abs() < 0.01);
        assert_eq!(analysis.spans[0].company.as_deref(), Some("Globex"));
        assert!(p.progression_summary.contains("Junior Developer"));
        assert!(p.progression_summary.contains("Engineering Manager"));
    }

    #[test]
    fn test_unresolvable_entries_excluded_from_tenure() {
        let entries = vec![
            job("Acme", "Engineer", "2022-01", Some("2024-01")),
            ExperienceItem {
                company: Some("Mystery Co".into()),
                title: Some("Engineer".into()),
                start_date: Some("a while ago".into()),
                end_date: Some("later".into()),
                ..Default::default()
            },
        ];
        let p = CareerProgressionAnalyzer::new(as_of()).analyze(&entries).progression;
        assert_eq!(p.avg_tenure_months, 24.0);
        assert_eq!(p.longest_tenure_months, 24);
        assert_eq!(p.total_companies, 2);
    }

    #[test]
    fn test_duration_months_used_when_dates_missing() {
        let entries = vec![ExperienceItem {
            company: Some("Acme".into()),
            title: Some("Analyst".into()),
            duration_months: Some(18),
            ..Default::default()
        }];
        let analysis = CareerProgressionAnalyzer::new(as_of()).analyze(&entries);
        assert_eq!(analysis.progression.longest_tenure_months, 18);
        assert_eq!(analysis.total_months, 18);
    }

    #[test]
    fn test_company_names_normalized() {
        let entries = vec![
            job("ACME  Corp", "Senior Engineer", "2022-01", None),
            job("acme corp", "Engineer", "2019-01", Some("2021-12")),
        ];
        let p = CareerProgressionAnalyzer::new(as_of()).analyze(&entries).progression;
        assert_eq!(p.total_companies, 1);
        assert_eq!(p.trajectory, CareerTrajectory::Ascending);
        // Final tier is Senior, below Lead.
        assert!(!p.has_leadership_progression);
    }

    #[test]
    fn test_present_marker_treated_as_open() {
        let entries = vec![ExperienceItem {
            company: Some("Acme".into()),
            title: Some("Engineer".into()),
            start_date: Some("2023-06".into()),
            end_date: Some("Present".into()),
            ..Default::default()
        }];
        let analysis = CareerProgressionAnalyzer::new(as_of()).analyze(&entries);
        assert!(analysis.has_open_role());
        assert_eq!(analysis.progression.longest_tenure_months, 12);
    }

    #[test]
    fn test_empty_history() {
        let analysis = CareerProgressionAnalyzer::new(as_of()).analyze(&[]);
        assert_eq!(analysis.progression.trajectory, CareerTrajectory::Lateral);
        assert_eq!(analysis.progression.avg_tenure_months, 0.0);
        assert_eq!(analysis.progression.total_companies, 0);
        assert!(analysis.spans.is_empty());
    }
}
