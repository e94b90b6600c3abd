use std::sync::LazyLock;

use rand::{seq::SliceRandom as _, Rng};
use regex::Regex;

use crate::{
    job::{ExperienceLevel, JobType},
    normalized,
};

/// The most skills a listing carries.
pub const MAX_SKILLS: usize = 5;

pub fn classify_job_type(text: &str) -> JobType {
    re!(PART_TIME_RE, r"\bpart time\b");
    re!(CONTRACT_RE, r"\b(contract|contractor)\b");
    re!(FREELANCE_RE, r"\b(freelance|freelancer)\b");
    re!(INTERNSHIP_RE, r"\b(intern|internship)\b");

    let norm = normalized(text);
    if PART_TIME_RE.is_match(&norm) {
        JobType::PartTime
    } else if CONTRACT_RE.is_match(&norm) {
        JobType::Contract
    } else if FREELANCE_RE.is_match(&norm) {
        JobType::Freelance
    } else if INTERNSHIP_RE.is_match(&norm) {
        JobType::Internship
    } else {
        JobType::FullTime
    }
}

/// Junior terms are checked before senior terms, so "Senior Graduate Recruiter" is Junior.
pub fn classify_experience_level(text: &str) -> ExperienceLevel {
    re!(
        JUNIOR_RE,
        r"\b(intern|internship|graduate|entry level|junior|jr)\b",
    );
    re!(SENIOR_RE, r"\b(senior|sr|lead|principal|staff)\b");
    re!(
        EXECUTIVE_RE,
        r"\b(manager|director|head|chief|vp|vice president|executive)\b",
    );

    let norm = normalized(text);
    if JUNIOR_RE.is_match(&norm) {
        ExperienceLevel::Junior
    } else if SENIOR_RE.is_match(&norm) {
        ExperienceLevel::Senior
    } else if EXECUTIVE_RE.is_match(&norm) {
        ExperienceLevel::Executive
    } else {
        ExperienceLevel::MidLevel
    }
}

/// Keyword to canonical skill name, in match order.
const SKILL_TABLE: [(&str, &str); 35] = [
    ("python", "Python"),
    ("javascript", "JavaScript"),
    ("js", "JavaScript"),
    ("react", "React"),
    ("node", "Node.js"),
    ("node.js", "Node.js"),
    ("angular", "Angular"),
    ("vue", "Vue.js"),
    ("java", "Java"),
    ("c#", "C#"),
    (".net", ".NET"),
    ("sql", "SQL"),
    ("nosql", "NoSQL"),
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("google cloud", "Google Cloud"),
    ("gcp", "Google Cloud"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("k8s", "Kubernetes"),
    ("php", "PHP"),
    ("ruby", "Ruby"),
    ("rails", "Ruby on Rails"),
    ("golang", "Go"),
    ("typescript", "TypeScript"),
    ("ts", "TypeScript"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("ui", "UI Design"),
    ("ux", "UX Design"),
    ("seo", "SEO"),
    ("devops", "DevOps"),
    ("machine learning", "Machine Learning"),
    ("ml", "Machine Learning"),
    ("ai", "AI"),
];

// Keywords like "c#" and ".net" start or end in punctuation, so `\b` can't delimit them.
static SKILL_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SKILL_TABLE
        .iter()
        .map(|&(keyword, skill)| {
            let pattern = format!(
                r"(?:^|[^a-z0-9_]){}(?:[^a-z0-9_]|$)",
                regex::escape(keyword),
            );
            (Regex::new(&pattern).unwrap(), skill)
        })
        .collect()
});

const SOFTWARE_SKILLS: [&str; 4] = ["JavaScript", "Python", "SQL", "Git"];
const DATA_SKILLS: [&str; 4] = ["SQL", "Python", "Excel", "Tableau"];
const DESIGN_SKILLS: [&str; 4] = ["Figma", "Sketch", "UI Design", "UX Research"];
const MARKETING_SKILLS: [&str; 4] = ["SEO", "Content Strategy", "Social Media", "Analytics"];
const GENERIC_SKILLS: [&str; 4] = [
    "Communication",
    "Project Management",
    "Microsoft Office",
    "Team Leadership",
];

/// Finds known skills in `text`, or guesses a few from the text's field if there are none.
///
/// The result is never longer than `max`, and never empty unless `max` is 0.
pub fn extract_skills<R: Rng>(text: &str, max: usize, rng: &mut R) -> Vec<String> {
    let text = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut skills: Vec<String> = vec![];
    for (re, skill) in SKILL_RES.iter() {
        if skills.len() >= max {
            break;
        }
        if re.is_match(&text) && !skills.iter().any(|x| x == skill) {
            skills.push(skill.to_string());
        }
    }
    if !skills.is_empty() {
        return skills;
    }

    let pool = fallback_skill_pool(&normalized(&text));
    let amount = rng.gen_range(3..=4).min(max);
    pool.choose_multiple(rng, amount)
        .map(|x| x.to_string())
        .collect()
}

fn fallback_skill_pool(norm: &str) -> &'static [&'static str] {
    re!(SOFTWARE_RE, r"\b(software|develop)");
    re!(DATA_RE, r"\bdata\b");
    re!(DESIGN_RE, r"\bdesign");
    re!(MARKETING_RE, r"\bmarketing\b");

    if SOFTWARE_RE.is_match(norm) {
        &SOFTWARE_SKILLS
    } else if DATA_RE.is_match(norm) {
        &DATA_SKILLS
    } else if DESIGN_RE.is_match(norm) {
        &DESIGN_SKILLS
    } else if MARKETING_RE.is_match(norm) {
        &MARKETING_SKILLS
    } else {
        &GENERIC_SKILLS
    }
}
