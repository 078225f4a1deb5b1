//! Rule-based red-flag detection.
//!
//! Rules run in a fixed order and each emits at most one flag, so identical inputs
//! always yield the same list. A rule sees the whole context and never depends on the
//! output of another rule.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::career::{CareerAnalysis, CareerTrajectory, RoleSpan, SeniorityTier};
use crate::analysis::fit_scoring::FitScoreBreakdown;
use crate::analysis::skills::SkillMatchReport;
use crate::models::job::JobDescriptionData;
use crate::parsing::months_between;

const SHORT_TENURE_MONTHS: u32 = 6;
const GAP_MONTHS: u32 = 3;
const LONG_GAP_MONTHS: u32 = 12;
const FREQUENT_CHANGE_AVG_MONTHS: f64 = 12.0;
const FREQUENT_CHANGE_MIN_COMPANIES: usize = 3;
const OVERLAP_MONTHS: u32 = 1;
const STALE_EXPERIENCE_MONTHS: u32 = 24;
const NO_PROGRESSION_MIN_COMPANIES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlagType {
    ShortTenure,
    EmploymentGap,
    Overqualified,
    Underqualified,
    FrequentJobChanges,
    CareerRegression,
    OverlappingJobs,
    MissingRecentExperience,
    NoProgression,
    EducationMismatch,
    SkillGaps,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlagSeverity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub flag_type: RedFlagType,
    pub severity: RedFlagSeverity,
    pub title: String,
    pub description: String,
    pub evidence: Option<String>,
    pub suggestion: Option<String>,
}

impl RedFlag {
    fn new(flag_type: RedFlagType, severity: RedFlagSeverity, title: &str, description: String) -> Self {
        Self {
            flag_type,
            severity,
            title: title.to_string(),
            description,
            evidence: None,
            suggestion: None,
        }
    }

    fn evidence(mut self, evidence: String) -> Self {
        self.evidence = Some(evidence);
        self
    }

    fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RedFlagSet
// ────────────────────────────────────────────────────────────────────────────

/// Ordered flags with at most one per type. Count and criticality are derived from the
/// list; they are serialized alongside it but never read back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedFlagSet {
    flags: Vec<RedFlag>,
}

impl RedFlagSet {
    /// Adds the flag unless one of the same type is already present.
    pub fn push(&mut self, flag: RedFlag) -> bool {
        if self.contains(flag.flag_type) {
            return false;
        }
        self.flags.push(flag);
        true
    }

    pub fn contains(&self, flag_type: RedFlagType) -> bool {
        self.flags.iter().any(|f| f.flag_type == flag_type)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RedFlag> {
        self.flags.iter()
    }

    pub fn count(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn has_critical(&self) -> bool {
        self.flags.iter().any(|f| f.severity == RedFlagSeverity::High)
    }

    pub fn types(&self) -> Vec<RedFlagType> {
        self.flags.iter().map(|f| f.flag_type).collect()
    }
}

impl FromIterator<RedFlag> for RedFlagSet {
    fn from_iter<I: IntoIterator<Item = RedFlag>>(iter: I) -> Self {
        let mut set = RedFlagSet::default();
        for flag in iter {
            set.push(flag);
        }
        set
    }
}

impl Serialize for RedFlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            red_flags: &'a [RedFlag],
            red_flag_count: usize,
            has_critical_red_flags: bool,
        }
        Repr {
            red_flags: &self.flags,
            red_flag_count: self.count(),
            has_critical_red_flags: self.has_critical(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RedFlagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default)]
            red_flags: Vec<RedFlag>,
        }
        let repr = Repr::deserialize(deserializer)?;
        Ok(repr.red_flags.into_iter().collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Detector
// ────────────────────────────────────────────────────────────────────────────

/// Inputs shared by every rule.
pub struct FlagContext<'a> {
    pub jd: &'a JobDescriptionData,
    pub career: &'a CareerAnalysis,
    pub skills: &'a SkillMatchReport,
    pub breakdown: &'a FitScoreBreakdown,
    pub candidate_years: f64,
    pub as_of: NaiveDate,
}

type Rule = fn(&FlagContext<'_>) -> Option<RedFlag>;

/// Detection order. Changing it changes output order.
const RULES: &[Rule] = &[
    short_tenure,
    employment_gap,
    overqualified,
    underqualified,
    frequent_job_changes,
    career_regression,
    overlapping_jobs,
    missing_recent_experience,
    no_progression,
    education_mismatch,
    skill_gaps,
];

pub fn detect_red_flags(ctx: &FlagContext<'_>) -> RedFlagSet {
    RULES.iter().filter_map(|rule| rule(ctx)).collect()
}

fn short_tenure(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let short: Vec<(&RoleSpan, u32)> = ctx
        .career
        .spans
        .iter()
        .filter(|s| !s.is_open)
        .filter_map(|s| s.tenure_months.map(|t| (s, t)))
        .filter(|(_, t)| *t < SHORT_TENURE_MONTHS)
        .collect();
    let (first, months) = short.first()?;

    let evidence = short
        .iter()
        .map(|(s, t)| format!("{} ({t} months)", s.display_name()))
        .collect::<Vec<_>>()
        .join("; ");
    Some(
        RedFlag::new(
            RedFlagType::ShortTenure,
            RedFlagSeverity::Medium,
            "Short tenure",
            format!("{} completed role(s) lasted under {SHORT_TENURE_MONTHS} months", short.len()),
        )
        .evidence(evidence)
        .suggestion(format!(
            "What led to leaving {} after {months} months?",
            first.display_name()
        )),
    )
}

fn employment_gap(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let mut dated: Vec<&RoleSpan> = ctx.career.spans.iter().filter(|s| s.start.is_some()).collect();
    dated.sort_by_key(|s| s.start);

    let mut covered_until: Option<NaiveDate> = None;
    let mut worst: Option<(u32, NaiveDate, NaiveDate)> = None;
    for span in dated {
        let Some(start) = span.start else { continue };
        if let Some(until) = covered_until {
            if start > until {
                let gap = months_between(until, start);
                if gap > GAP_MONTHS && worst.map_or(true, |(g, _, _)| gap > g) {
                    worst = Some((gap, until, start));
                }
            }
        }
        if let Some(end) = span.end {
            covered_until = Some(covered_until.map_or(end, |u| u.max(end)));
        }
    }

    let (gap, from, to) = worst?;
    let severity = if gap > LONG_GAP_MONTHS {
        RedFlagSeverity::High
    } else {
        RedFlagSeverity::Medium
    };
    Some(
        RedFlag::new(
            RedFlagType::EmploymentGap,
            severity,
            "Employment gap",
            format!("{gap}-month gap in employment history"),
        )
        .evidence(format!("No role between {} and {}", from.format("%Y-%m"), to.format("%Y-%m")))
        .suggestion(format!(
            "Can you walk through what you focused on between {} and {}?",
            from.format("%b %Y"),
            to.format("%b %Y")
        )),
    )
}

fn overqualified(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let required = ctx.jd.required_years();
    if required <= 0.0 || ctx.candidate_years <= required * 2.0 {
        return None;
    }
    let role_tier = ctx.jd.seniority_text().and_then(SeniorityTier::from_title)?;
    let candidate_tier = ctx.career.final_tier?;
    if candidate_tier.rank() - role_tier.rank() < 2 {
        return None;
    }
    Some(
        RedFlag::new(
            RedFlagType::Overqualified,
            RedFlagSeverity::Low,
            "Potentially overqualified",
            format!(
                "{:.1} years of experience against {required:.0} required, currently at {} level for a {} role",
                ctx.candidate_years,
                candidate_tier.label(),
                role_tier.label()
            ),
        )
        .suggestion("What draws you to a role at this level, and how do you see it growing?"),
    )
}

fn underqualified(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let required = ctx.jd.required_years();
    if required <= 0.0 || ctx.candidate_years >= required * 0.5 {
        return None;
    }
    Some(
        RedFlag::new(
            RedFlagType::Underqualified,
            RedFlagSeverity::High,
            "Underqualified",
            format!(
                "{:.1} years of experience against {required:.0} required",
                ctx.candidate_years
            ),
        )
        .suggestion("Which projects best demonstrate readiness for the responsibilities of this role?"),
    )
}

fn frequent_job_changes(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let p = &ctx.career.progression;
    if p.total_companies < FREQUENT_CHANGE_MIN_COMPANIES
        || p.avg_tenure_months <= 0.0
        || p.avg_tenure_months >= FREQUENT_CHANGE_AVG_MONTHS
    {
        return None;
    }
    Some(
        RedFlag::new(
            RedFlagType::FrequentJobChanges,
            RedFlagSeverity::Medium,
            "Frequent job changes",
            format!(
                "Average tenure of {:.1} months across {} companies",
                p.avg_tenure_months, p.total_companies
            ),
        )
        .suggestion("What are you looking for in your next role that would make you stay long term?"),
    )
}

fn career_regression(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    if ctx.career.progression.trajectory != CareerTrajectory::Descending {
        return None;
    }
    Some(
        RedFlag::new(
            RedFlagType::CareerRegression,
            RedFlagSeverity::Medium,
            "Career regression",
            "Seniority has declined across successive roles".to_string(),
        )
        .evidence(ctx.career.progression.progression_summary.clone())
        .suggestion("Can you explain the move to a less senior position?"),
    )
}

fn overlapping_jobs(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let dated: Vec<&RoleSpan> = ctx
        .career
        .spans
        .iter()
        .filter(|s| s.start.is_some() && s.end.is_some())
        .collect();

    for (i, a) in dated.iter().enumerate() {
        for b in &dated[i + 1..] {
            let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) = (a.start, a.end, b.start, b.end)
            else {
                continue;
            };
            let overlap = months_between(a_start.max(b_start), a_end.min(b_end));
            if overlap > OVERLAP_MONTHS {
                return Some(
                    RedFlag::new(
                        RedFlagType::OverlappingJobs,
                        RedFlagSeverity::High,
                        "Overlapping employment",
                        format!("Two roles overlap by {overlap} months"),
                    )
                    .evidence(format!("{} and {}", a.display_name(), b.display_name()))
                    .suggestion("Were these roles held concurrently, and how was time split between them?"),
                );
            }
        }
    }
    None
}

fn missing_recent_experience(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    if ctx.career.has_open_role() {
        return None;
    }
    let latest = ctx.career.latest_end()?;
    let idle = months_between(latest, ctx.as_of);
    if idle <= STALE_EXPERIENCE_MONTHS {
        return None;
    }
    Some(
        RedFlag::new(
            RedFlagType::MissingRecentExperience,
            RedFlagSeverity::Medium,
            "No recent experience",
            format!("Most recent role ended {idle} months ago"),
        )
        .evidence(format!("Last end date {}", latest.format("%Y-%m")))
        .suggestion("How have you kept your skills current since your last role?"),
    )
}

fn no_progression(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let p = &ctx.career.progression;
    // Short average tenure is reported as frequent job changes instead.
    if p.trajectory != CareerTrajectory::Lateral
        || p.total_companies < NO_PROGRESSION_MIN_COMPANIES
        || p.avg_tenure_months < FREQUENT_CHANGE_AVG_MONTHS
    {
        return None;
    }
    Some(
        RedFlag::new(
            RedFlagType::NoProgression,
            RedFlagSeverity::Low,
            "No career progression",
            format!("Same seniority level across {} companies", p.total_companies),
        )
        .suggestion("What kind of growth are you looking for in your next role?"),
    )
}

fn education_mismatch(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    if ctx.breakdown.education_fit >= 60.0 {
        return None;
    }
    let required = ctx.jd.required_education.clone().unwrap_or_default();
    Some(
        RedFlag::new(
            RedFlagType::EducationMismatch,
            RedFlagSeverity::Medium,
            "Education below requirement",
            "Highest listed degree is more than one level below the requirement".to_string(),
        )
        .evidence(format!("Required: {required}"))
        .suggestion("Is there equivalent training or experience that covers the education requirement?"),
    )
}

fn skill_gaps(ctx: &FlagContext<'_>) -> Option<RedFlag> {
    let missing = &ctx.skills.missing_required;
    if missing.is_empty() {
        return None;
    }
    let severity = if missing.len() * 2 >= ctx.skills.required_total {
        RedFlagSeverity::High
    } else {
        RedFlagSeverity::Medium
    };
    let top: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();
    Some(
        RedFlag::new(
            RedFlagType::SkillGaps,
            severity,
            "Missing required skills",
            format!(
                "Missing {} of {} required skills",
                missing.len(),
                ctx.skills.required_total
            ),
        )
        .evidence(missing.join(", "))
        .suggestion(format!("How would you get up to speed with {}?", top.join(", "))),
    )
}
