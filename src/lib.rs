macro_rules! re {
    ($name:ident, $($e:expr),* $(,)?) => {
        static $name: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(
            || regex::Regex::new(concat!($($e),*)).unwrap(),
        );
    };
}

mod card;
mod category;
mod classify;
mod config;
mod fetch;
mod job;
mod job_board;
mod mock;
mod salary;
mod search;
mod store;

pub use card::{CardError, CardParser};
pub use category::{category_terms, expand_categories, list_categories};
pub use classify::{classify_experience_level, classify_job_type, extract_skills, MAX_SKILLS};
pub use config::{Config, ConfigError, ScraperSettings};
pub use fetch::{FetchError, HttpFetcher, PageFetcher, Throttle};
pub use job::{ExperienceLevel, Job, JobType};
pub use job_board::{CardFields, Extract, JobBoard};
pub use mock::generate_mock_jobs;
pub use salary::{coarse_salary_range, estimate_salary_range, extract_min_salary};
pub use search::{Scraper, SearchRequest, MAX_MOCK_JOBS};
pub use store::{JobFilter, JobId, JobStore, MemoryStore, RonStore, StoreError, StoredJob};

pub fn init_logger(default_level: log::LevelFilter) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}

/// Lowercases `s` and collapses every run of non-alphanumeric characters into a single space.
pub(crate) fn normalized(s: impl AsRef<str>) -> String {
    s.as_ref()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric(), " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
