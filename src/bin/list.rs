use chrono::{DateTime, Utc};
use colored::{Color, Colorize as _};
use job_scout::{init_logger, Config, JobFilter, JobStore as _, RonStore};
use tiny_bail::prelude::*;

fn main() {
    init_logger(log::LevelFilter::Info);
    let config = r!(Config::load());
    let store = r!(RonStore::open(&config.jobs_path));

    let now = Utc::now();
    for job in store.get_jobs(&JobFilter::default()) {
        let age = DateTime::parse_from_rfc3339(&job.posted_at)
            .map(|x| (now - x.with_timezone(&Utc)).num_days().max(0))
            .ok();
        let age_str = match age {
            Some(age) => format!("{:>2} days ago", age.to_string().bold()),
            None => format!("{:>11}", "?"),
        };
        // Ugly code makes pretty colors.
        println!(
            "{} {} {} {}",
            age_str.color(match age {
                Some(0) => Color::Cyan,
                Some(age) if age < 7 => Color::TrueColor {
                    r: 200,
                    g: 150,
                    b: 60,
                },
                _ => Color::Red,
            }),
            format!("{:12}", job.company.chars().take(12).collect::<String>()),
            format!(
                "{}{:64}",
                job.prefix(),
                job.to_string().chars().take(64).collect::<String>(),
            ),
            format!("({})", job.link).italic().black(),
        );
    }
}
