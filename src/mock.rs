use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::{seq::SliceRandom as _, Rng};

use crate::{
    classify::{classify_experience_level, classify_job_type, extract_skills, MAX_SKILLS},
    job::Job,
    salary::estimate_salary_range,
};

const COMPANIES: [&str; 20] = [
    "TechNova",
    "DataWave",
    "CloudSphere",
    "CodeCraft",
    "QuantumLogic",
    "NexaAI",
    "ByteForge",
    "DigitalDynamics",
    "InnovateSoft",
    "PixelPerfect",
    "AgileStack",
    "CyberShield",
    "FusionTech",
    "LogicLeap",
    "MindMeld",
    "NetworX",
    "OptimizeIQ",
    "ProtonWorks",
    "QuantumQuill",
    "RoboticsEdge",
];

const LOCATIONS: [&str; 14] = [
    "San Francisco, CA",
    "New York, NY",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Chicago, IL",
    "Remote",
    "Los Angeles, CA",
    "Denver, CO",
    "Portland, OR",
    "Atlanta, GA",
    "Miami, FL",
    "Nashville, TN",
    "Remote USA",
];

const ROLES: [&str; 7] = [
    "Developer",
    "Engineer",
    "Designer",
    "Analyst",
    "Manager",
    "Specialist",
    "Consultant",
];
const LEVELS: [&str; 6] = ["Junior", "Mid-level", "Senior", "Lead", "Principal", "Staff"];
const SPECIALTIES: [&str; 10] = [
    "Frontend",
    "Backend",
    "Full Stack",
    "Mobile",
    "Cloud",
    "DevOps",
    "Data",
    "UI/UX",
    "AI/ML",
    "Product",
];
const TECHS: [&str; 7] = [
    "Python",
    "JavaScript",
    "React",
    "Node.js",
    "AWS",
    "Docker",
    "Kubernetes",
];

const RESPONSIBILITIES: [&str; 8] = [
    "Design and implement new features and functionality.",
    "Collaborate with cross-functional teams to define and implement innovative solutions.",
    "Write clean, maintainable code with comprehensive test coverage.",
    "Participate in code reviews and contribute to technical documentation.",
    "Troubleshoot and resolve complex technical issues.",
    "Mentor junior team members and contribute to team growth.",
    "Optimize applications for maximum speed and scalability.",
    "Stay up-to-date with emerging technologies and industry trends.",
];
const REQUIREMENTS: [&str; 7] = [
    "Strong problem-solving abilities and attention to detail.",
    "Excellent communication and collaboration skills.",
    "Ability to work independently and as part of a team.",
    "Strong understanding of software development methodologies.",
    "Bachelor's degree in Computer Science or related field, or equivalent experience.",
    "Passion for learning and applying new technologies.",
    "Experience with agile development methodologies.",
];

/// Synthesizes `count` plausible job listings shaped by `search_terms`.
///
/// The output depends only on the RNG state, the arguments and `now`.
pub fn generate_mock_jobs<R: Rng>(
    search_terms: &[String],
    location: Option<&str>,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Job> {
    let locations = match location.map(str::trim).filter(|x| !x.is_empty()) {
        Some(location) => vec![
            location.to_string(),
            format!("{location} Area"),
            format!("Remote - {location}"),
            "Remote".to_string(),
        ],
        None => LOCATIONS.iter().map(|x| x.to_string()).collect(),
    };

    (1..=count)
        .map(|i| {
            let company = pick(&COMPANIES, rng);
            let location = locations.choose(rng).cloned().unwrap_or_default();
            let title = generate_title(search_terms, rng);
            let description = generate_description(&title, company, rng);

            Job {
                id: format!("mock-{i}"),
                salary_range: estimate_salary_range(&title),
                job_type: classify_job_type(&title),
                experience_level: classify_experience_level(&title),
                skills: extract_skills(&title, MAX_SKILLS, rng),
                title,
                company: company.to_string(),
                location,
                description,
                link: format!("https://example.com/jobs/{i}"),
                posted_at: generate_posted_at(now, rng),
            }
        })
        .collect()
}

fn pick<R: Rng>(options: &[&'static str], rng: &mut R) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn match_role(term: &str) -> Option<&'static str> {
    if term.contains("develop") || term.contains("coder") || term.contains("programmer") {
        Some("Developer")
    } else if term.contains("engineer") {
        Some("Engineer")
    } else if term.contains("design") || term.contains("ui") || term.contains("ux") {
        Some("Designer")
    } else if term.contains("analy") || term.contains("data") {
        Some("Analyst")
    } else if term.contains("manage") || term.contains("director") || term.contains("head") {
        Some("Manager")
    } else {
        None
    }
}

fn match_level(term: &str) -> Option<&'static str> {
    if term.contains("junior") || term.contains("entry") {
        Some("Junior")
    } else if term.contains("senior") || term == "sr" {
        Some("Senior")
    } else if term.contains("lead") {
        Some("Lead")
    } else if term.contains("principal") {
        Some("Principal")
    } else {
        None
    }
}

fn match_specialty(term: &str) -> Option<&'static str> {
    if term.contains("front") {
        Some("Frontend")
    } else if term.contains("back") {
        Some("Backend")
    } else if term.contains("full") {
        Some("Full Stack")
    } else if term.contains("mobile") || term.contains("android") || term.contains("ios") {
        Some("Mobile")
    } else if term.contains("cloud") || term.contains("aws") || term.contains("azure") {
        Some("Cloud")
    } else if term.contains("devops") {
        Some("DevOps")
    } else if term.contains("data") {
        Some("Data")
    } else if term.contains("ui") || term.contains("ux") || term.contains("user") {
        Some("UI/UX")
    } else if term == "ai" || term == "ml" || term.contains("machine") {
        Some("AI/ML")
    } else if term.contains("product") {
        Some("Product")
    } else {
        None
    }
}

/// Fills a title pattern with the first role, level and specialty the search terms suggest.
fn generate_title<R: Rng>(search_terms: &[String], rng: &mut R) -> String {
    let terms = search_terms
        .iter()
        .map(|x| x.trim().to_lowercase())
        .collect::<Vec<_>>();
    let role = terms
        .iter()
        .find_map(|x| match_role(x))
        .unwrap_or_else(|| pick(&ROLES, rng));
    let level = terms
        .iter()
        .find_map(|x| match_level(x))
        .unwrap_or_else(|| pick(&LEVELS, rng));
    let specialty = terms
        .iter()
        .find_map(|x| match_specialty(x))
        .unwrap_or_else(|| pick(&SPECIALTIES, rng));

    let mut title = match rng.gen_range(0..6) {
        0 => format!("{role} {level}"),
        1 => format!("{level} {role}"),
        2 => format!("{role} ({level})"),
        3 => format!("{level} {role} - {specialty}"),
        4 => format!("{specialty} {role}"),
        _ => format!("{role} {specialty} {level}"),
    };

    let joined = terms.join(" ");
    if let Some(tech) = TECHS.iter().find(|x| joined.contains(&x.to_lowercase())) {
        if rng.gen_bool(0.5) {
            title = format!("{title} ({tech})");
        }
    }

    title
}

fn generate_description<R: Rng>(title: &str, company: &str, rng: &mut R) -> String {
    let intro = match rng.gen_range(0..5) {
        0 => format!("{company} is seeking a talented {title} to join our growing team."),
        1 => format!(
            "Join {company} as a {title} and help us build the next generation of products."
        ),
        2 => format!("Exciting opportunity for a {title} to make an impact at {company}."),
        3 => format!("{company} is looking for an experienced {title} to join our innovative team."),
        _ => format!("Are you a passionate {title}? {company} wants to hear from you!"),
    };

    let mut description = format!("{intro}\n\nResponsibilities:\n");
    for _ in 0..rng.gen_range(3..=5) {
        description += &format!("• {}\n", pick(&RESPONSIBILITIES, rng));
    }
    description += "\nRequirements:\n";
    for _ in 0..rng.gen_range(3..=5) {
        description += &format!("• {}\n", pick(&REQUIREMENTS, rng));
    }

    description
}

/// A timestamp up to 6 days and 23 hours before `now`.
fn generate_posted_at<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let ago = Duration::days(rng.gen_range(0..=6)) + Duration::hours(rng.gen_range(0..=23));
    (now - ago).to_rfc3339_opts(SecondsFormat::Secs, true)
}
