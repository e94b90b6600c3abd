use std::{fmt::Display, str::FromStr};

use colored::{ColoredString, Colorize as _};
use serde::{Deserialize, Serialize};

use crate::{normalized, salary::extract_min_salary};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// A normalized job listing, either scraped from a job board or synthesized.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// The board's own ID for the listing, or a synthetic one.
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// The URL to the job page, or empty if none could be found.
    pub link: String,
    /// Either an RFC 3339 timestamp or the board's own text ("Posted 3 days ago").
    pub posted_at: String,
    /// Free text, e.g. "$120,000 - $150,000" or "Competitive".
    pub salary_range: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    /// Canonical skill names, at most [`crate::MAX_SKILLS`].
    pub skills: Vec<String>,
}

impl Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.title)
    }
}

impl Job {
    /// The fields two listings must share to be considered the same posting.
    pub fn dedup_key(&self) -> (&str, &str, &str) {
        (&self.title, &self.company, &self.location)
    }

    pub fn is_same_posting(&self, other: &Job) -> bool {
        self.dedup_key() == other.dedup_key()
    }

    pub fn min_salary(&self) -> u64 {
        extract_min_salary(&self.salary_range)
    }

    /// A colored tag for junior and senior roles, empty otherwise.
    pub fn prefix(&self) -> ColoredString {
        match self.experience_level {
            ExperienceLevel::Junior => "[jr] ".bold().cyan(),
            ExperienceLevel::Senior | ExperienceLevel::Executive => "[sr] ".bold().yellow(),
            ExperienceLevel::MidLevel => "".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Freelance,
        JobType::Internship,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Freelance => "Freelance",
            JobType::Internship => "Internship",
        }
    }

    /// Recognizes a job-type label the way job boards tend to print it ("Full-time +1", "Contract").
    pub fn from_label(label: &str) -> Option<JobType> {
        re!(FULL_TIME_RE, r"\bfull time\b");
        re!(PART_TIME_RE, r"\bpart time\b");
        re!(CONTRACT_RE, r"\b(contract|contractor|temporary)\b");
        re!(FREELANCE_RE, r"\bfreelance\b");
        re!(INTERNSHIP_RE, r"\b(intern|internship)\b");

        let norm = normalized(label);
        if FULL_TIME_RE.is_match(&norm) {
            Some(JobType::FullTime)
        } else if PART_TIME_RE.is_match(&norm) {
            Some(JobType::PartTime)
        } else if CONTRACT_RE.is_match(&norm) {
            Some(JobType::Contract)
        } else if FREELANCE_RE.is_match(&norm) {
            Some(JobType::Freelance)
        } else if INTERNSHIP_RE.is_match(&norm) {
            Some(JobType::Internship)
        } else {
            None
        }
    }
}

impl Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = normalized(s);
        JobType::ALL
            .into_iter()
            .find(|x| normalized(x.as_str()) == norm)
            .ok_or_else(|| format!("unknown job type: {s}"))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExperienceLevel {
    Junior,
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Junior,
        ExperienceLevel::MidLevel,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

impl Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = normalized(s);
        ExperienceLevel::ALL
            .into_iter()
            .find(|x| normalized(x.as_str()) == norm)
            .ok_or_else(|| format!("unknown experience level: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_enum_names() {
        assert_eq!("full-time".parse(), Ok(JobType::FullTime));
        assert_eq!("Part time".parse(), Ok(JobType::PartTime));
        assert_eq!("INTERNSHIP".parse(), Ok(JobType::Internship));
        assert!("gig".parse::<JobType>().is_err());
        assert_eq!("mid level".parse(), Ok(ExperienceLevel::MidLevel));
        assert_eq!("Executive".parse(), Ok(ExperienceLevel::Executive));
    }

    #[test]
    fn job_type_labels() {
        for (label, job_type) in [
            ("Full-time", Some(JobType::FullTime)),
            ("Full-time +1", Some(JobType::FullTime)),
            ("Part-time", Some(JobType::PartTime)),
            ("Temporary", Some(JobType::Contract)),
            ("Contract", Some(JobType::Contract)),
            ("Freelance", Some(JobType::Freelance)),
            ("Internship", Some(JobType::Internship)),
            ("Health insurance", None),
            ("", None),
        ] {
            assert_eq!(JobType::from_label(label), job_type, "{}", label);
        }
    }
}
