use std::{cmp::Reverse, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::{ExperienceLevel, Job, JobType};

pub type JobId = u64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access job store: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse job store: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize job store: {0}")]
    Serialize(#[from] ron::Error),
}

/// A persisted job listing.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct StoredJob {
    pub id: JobId,
    /// When the posting was first stored.
    pub saved_at: DateTime<Utc>,
    pub job: Job,
}

/// Where scraped jobs are kept between searches.
pub trait JobStore {
    /// Stores `job`, replacing any stored listing of the same posting.
    ///
    /// Returns the posting's ID, which stays the same across repeated upserts, or `None` if
    /// the job could not be stored.
    fn upsert_job(&mut self, job: &Job) -> Option<JobId>;

    /// The stored jobs matching `filter`, newest first.
    fn get_jobs(&self, filter: &JobFilter) -> Vec<Job>;
}

impl<S: JobStore + ?Sized> JobStore for &mut S {
    fn upsert_job(&mut self, job: &Job) -> Option<JobId> {
        (**self).upsert_job(job)
    }

    fn get_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        (**self).get_jobs(filter)
    }
}

#[derive(Default, Debug)]
pub struct MemoryStore {
    jobs: Vec<StoredJob>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn stored(&self) -> impl Iterator<Item = &StoredJob> {
        self.jobs.iter()
    }

    fn next_id(&self) -> JobId {
        self.jobs.iter().map(|x| x.id).max().unwrap_or_default() + 1
    }
}

impl JobStore for MemoryStore {
    fn upsert_job(&mut self, job: &Job) -> Option<JobId> {
        if let Some(stored) = self.jobs.iter_mut().find(|x| x.job.is_same_posting(job)) {
            stored.job = job.clone();
            return Some(stored.id);
        }

        let id = self.next_id();
        self.jobs.push(StoredJob {
            id,
            saved_at: Utc::now(),
            job: job.clone(),
        });
        Some(id)
    }

    fn get_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        let mut jobs = self
            .jobs
            .iter()
            .map(|x| &x.job)
            .filter(|x| filter.matches(x))
            .cloned()
            .collect::<Vec<_>>();
        // Board text like "Posted 3 days ago" has no timestamp and sorts last.
        jobs.sort_by_key(|x| Reverse(DateTime::parse_from_rfc3339(&x.posted_at).ok()));
        jobs
    }
}

/// A [`MemoryStore`] backed by a RON file.
#[derive(Debug)]
pub struct RonStore {
    path: PathBuf,
    jobs: MemoryStore,
}

impl RonStore {
    /// Opens the store at `path`, starting empty if the file doesn't exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let jobs = if path.exists() {
            let jobs_str = std::fs::read_to_string(&path)?;
            MemoryStore {
                jobs: ron::from_str(&jobs_str)?,
            }
        } else {
            log::info!("No job store at {}, starting empty", path.display());
            MemoryStore::new()
        };

        Ok(Self { path, jobs })
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".backup");
        path.into()
    }

    pub fn stored(&self) -> impl Iterator<Item = &StoredJob> {
        self.jobs.stored()
    }

    /// Writes the store back to its file, first copying the previous file to
    /// [`RonStore::backup_path`].
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|x| !x.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        if self.path.exists() {
            std::fs::copy(&self.path, self.backup_path())?;
        }
        let jobs_str = ron::to_string(&self.jobs.jobs)?;
        std::fs::write(&self.path, jobs_str)?;
        log::info!("Saved {} jobs to {}", self.jobs.len(), self.path.display());
        Ok(())
    }
}

impl JobStore for RonStore {
    fn upsert_job(&mut self, job: &Job) -> Option<JobId> {
        self.jobs.upsert_job(job)
    }

    fn get_jobs(&self, filter: &JobFilter) -> Vec<Job> {
        self.jobs.get_jobs(filter)
    }
}

/// Criteria for narrowing down a set of jobs. Empty criteria match everything.
#[derive(Clone, Default, Debug)]
pub struct JobFilter {
    /// Matched case-insensitively against the title, the description and each skill.
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    /// Minimum salary in thousands. Only applied above 10.
    pub min_salary_k: Option<u64>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(keywords) = nonempty_lowercase(&self.keywords) {
            if !job.title.to_lowercase().contains(&keywords)
                && !job.description.to_lowercase().contains(&keywords)
                && !job
                    .skills
                    .iter()
                    .any(|x| x.to_lowercase().contains(&keywords))
            {
                return false;
            }
        }

        if let Some(location) = nonempty_lowercase(&self.location) {
            if !job.location.to_lowercase().contains(&location) {
                return false;
            }
        }

        if self.job_type.is_some_and(|x| x != job.job_type) {
            return false;
        }

        if self
            .experience_level
            .is_some_and(|x| x != job.experience_level)
        {
            return false;
        }

        if let Some(min_salary_k) = self.min_salary_k.filter(|&x| x > 10) {
            if job.salary_range.trim().is_empty()
                || job.min_salary() < min_salary_k.saturating_mul(1000)
            {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        jobs.into_iter().filter(|x| self.matches(x)).collect()
    }
}

fn nonempty_lowercase(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_lowercase)
}
