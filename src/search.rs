use std::{thread, time::Duration};

use chrono::Utc;
use rand::{rngs::StdRng, seq::SliceRandom as _, Rng as _};
use tiny_bail::prelude::*;

use crate::{
    card::CardParser,
    category::{category_terms, expand_categories},
    config::{ConfigError, ScraperSettings},
    fetch::PageFetcher,
    job::Job,
    job_board::JobBoard,
    mock::generate_mock_jobs,
    store::JobStore,
};

/// The most mock jobs a single search generates.
pub const MAX_MOCK_JOBS: usize = 1000;

/// What to search for.
#[derive(Clone, Default, Debug)]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    pub location: Option<String>,
    /// Category tags, see [`crate::list_categories`].
    pub categories: Vec<String>,
    pub limit: usize,
}

/// A scraping session against one job board.
pub struct Scraper<F: PageFetcher, S: JobStore> {
    board: JobBoard,
    parser: CardParser,
    settings: ScraperSettings,
    fetcher: F,
    store: S,
    rng: StdRng,
}

impl<F: PageFetcher, S: JobStore> Scraper<F, S> {
    pub fn new(
        board: JobBoard,
        settings: ScraperSettings,
        fetcher: F,
        store: S,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            parser: CardParser::new(&board)?,
            rng: settings.rng(),
            board,
            settings,
            fetcher,
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Searches the board for up to `request.limit` jobs.
    ///
    /// Never fails: if the board can't be reached or yields nothing, the result is made up of
    /// mock jobs instead. Scraped jobs are persisted as they are found.
    pub fn search(&mut self, request: &SearchRequest) -> Vec<Job> {
        let limit = request.limit;
        if limit == 0 {
            return vec![];
        }
        let location = request
            .location
            .as_deref()
            .map(str::trim)
            .filter(|x| !x.is_empty());

        let mut terms = request
            .keywords
            .iter()
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        if self.settings.use_mock_data {
            terms.extend(expand_categories(&request.categories, 2..=5, &mut self.rng));
            if terms.is_empty() {
                terms.extend(
                    category_terms("tech")
                        .unwrap_or_default()
                        .choose_multiple(&mut self.rng, 3)
                        .map(|x| x.to_string()),
                );
            }
            let count = limit.min(MAX_MOCK_JOBS);
            log::info!("[{}] Mock mode: generating {} jobs", self.board, count);
            return generate_mock_jobs(&terms, location, count, Utc::now(), &mut self.rng);
        }

        terms.extend(expand_categories(&request.categories, 1..=3, &mut self.rng));
        let query = if terms.is_empty() {
            "jobs".to_string()
        } else {
            terms.join(" ")
        };
        log::info!("[{}] Searching for {:?} in {:?}", self.board, query, location);

        let mut jobs = self.scrape(&query, location, limit);
        if jobs.is_empty() {
            let count = limit.min(MAX_MOCK_JOBS);
            log::warn!(
                "[{}] No jobs scraped, falling back to {} mock jobs",
                self.board,
                count,
            );
            let terms = query
                .split_whitespace()
                .map(String::from)
                .collect::<Vec<_>>();
            jobs = generate_mock_jobs(&terms, location, count, Utc::now(), &mut self.rng);
        }
        jobs.truncate(limit);
        jobs
    }

    fn scrape(&mut self, query: &str, location: Option<&str>, limit: usize) -> Vec<Job> {
        let mut jobs: Vec<Job> = vec![];
        let mut offset = 0;
        let mut page = 1;

        while jobs.len() < limit {
            let url = self.board.page_url(query, location, offset);
            let html = match self.fetcher.fetch(&url) {
                Ok(html) => html,
                Err(e) => {
                    log::error!("[{}] Page {}: {}", self.board, page, e);
                    break;
                }
            };

            let cards = self.parser.parse_page(&html, &mut self.rng);
            if cards.is_empty() {
                log::warn!("[{}] Page {}: No job cards found", self.board, page);
                break;
            }

            let card_count = cards.len();
            let mut new_count = 0;
            for card in cards {
                let job = match card {
                    Ok(job) => job,
                    Err(e) => {
                        log::warn!("[{}] Page {}: Skipping card: {}", self.board, page, e);
                        continue;
                    }
                };
                cq!(!jobs.iter().any(|x| x.is_same_posting(&job)));

                if self.store.upsert_job(&job).is_none() {
                    log::warn!("[{}] Failed to store: {}", self.board, job);
                }
                log::debug!("{}[{}] New: {} ({})", job.prefix(), job.company, job, job.link);
                jobs.push(job);
                new_count += 1;
                if jobs.len() >= limit {
                    break;
                }
            }
            log::info!(
                "[{}] Page {}: {} cards, {} new jobs",
                self.board,
                page,
                card_count,
                new_count,
            );

            // The board repeats its last page past the end of the results.
            if new_count == 0 {
                break;
            }
            offset += card_count;
            page += 1;
            if jobs.len() < limit {
                self.pause();
            }
        }

        jobs
    }

    fn pause(&mut self) {
        let (min, max) = self.settings.page_delay_ms;
        let delay = self.rng.gen_range(min..=max.max(min));
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::{
        fetch::FetchError,
        job::{UNKNOWN_COMPANY, UNKNOWN_LOCATION, UNKNOWN_TITLE},
        store::{JobFilter, MemoryStore},
    };

    struct FailingFetcher;

    impl PageFetcher for FailingFetcher {
        fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
            Err(FetchError::Status {
                url: url.clone(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        }
    }

    /// Serves the given pages in order, then empty pages.
    #[derive(Default)]
    struct StaticFetcher {
        pages: Vec<String>,
        requested: Vec<Url>,
    }

    impl StaticFetcher {
        fn new(pages: impl IntoIterator<Item = String>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                requested: vec![],
            }
        }
    }

    impl PageFetcher for StaticFetcher {
        fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
            let page = self
                .pages
                .get(self.requested.len())
                .cloned()
                .unwrap_or_else(|| "<html><body></body></html>".to_string());
            self.requested.push(url.clone());
            Ok(page)
        }
    }

    fn results_page(titles: &[&str]) -> String {
        let cards = titles
            .iter()
            .map(|title| {
                format!(
                    r#"<div class="job_seen_beacon" data-jk="{id}">
  <h2 class="jobTitle"><a class="jcs-JobTitle" href="/viewjob?jk={id}"><span>{title}</span></a></h2>
  <span class="companyName">Initech</span>
  <div class="companyLocation">Austin, TX</div>
</div>"#,
                    id = title.to_lowercase().replace(' ', "-"),
                )
            })
            .collect::<String>();
        format!("<html><body>{cards}</body></html>")
    }

    fn settings() -> ScraperSettings {
        ScraperSettings {
            min_request_interval_ms: 0,
            page_delay_ms: (0, 0),
            seed: Some(5),
            ..Default::default()
        }
    }

    fn request(keywords: &[&str], limit: usize) -> SearchRequest {
        SearchRequest {
            keywords: keywords.iter().map(|x| x.to_string()).collect(),
            limit,
            ..Default::default()
        }
    }

    fn titles(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|x| x.title.as_str()).collect()
    }

    #[test]
    fn unreachable_board_falls_back_to_mock_jobs() {
        let mut scraper = Scraper::new(
            JobBoard::indeed(),
            settings(),
            FailingFetcher,
            MemoryStore::new(),
        )
        .unwrap();
        let jobs = scraper.search(&SearchRequest {
            location: Some("Remote".to_string()),
            ..request(&["python", "developer"], 3)
        });

        assert_eq!(jobs.len(), 3);
        for job in &jobs {
            assert_ne!(job.title, UNKNOWN_TITLE);
            assert_ne!(job.company, UNKNOWN_COMPANY);
            assert_ne!(job.location, UNKNOWN_LOCATION);
            assert!(!job.id.is_empty());
            assert!(!job.description.is_empty());
            assert!(!job.link.is_empty());
            assert!(!job.salary_range.is_empty());
            assert!((1..=5).contains(&job.skills.len()));
            assert!(job.location.contains("Remote"), "{}", job.location);
        }
        assert!(scraper.store().is_empty());
    }

    #[test]
    fn zero_limit_fetches_nothing() {
        let mut fetcher = StaticFetcher::new([results_page(&["Data Engineer"])]);
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                .unwrap();

        assert!(scraper.search(&request(&["data"], 0)).is_empty());
        drop(scraper);
        assert!(fetcher.requested.is_empty());
    }

    #[test]
    fn pages_until_the_board_runs_out() {
        let mut fetcher = StaticFetcher::new([
            results_page(&["Data Engineer", "Data Analyst", "Data Scientist"]),
            results_page(&["Junior Data Analyst", "Senior Data Engineer"]),
        ]);
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                .unwrap();

        let jobs = scraper.search(&request(&["data"], 10));
        assert_eq!(
            titles(&jobs),
            [
                "Data Engineer",
                "Data Analyst",
                "Data Scientist",
                "Junior Data Analyst",
                "Senior Data Engineer",
            ],
        );
        assert_eq!(jobs[0].link, "https://www.indeed.com/viewjob?jk=data-engineer");
        let store = scraper.into_store();
        assert_eq!(store.len(), 5);

        assert_eq!(fetcher.requested.len(), 3);
        let offsets = fetcher
            .requested
            .iter()
            .map(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "start")
                    .map(|(_, value)| value.into_owned())
            })
            .collect::<Vec<_>>();
        assert_eq!(offsets, [None, Some("3".to_string()), Some("5".to_string())]);
    }

    #[test]
    fn stops_at_the_limit() {
        let mut fetcher = StaticFetcher::new([
            results_page(&["Data Engineer", "Data Analyst", "Data Scientist"]),
            results_page(&["Junior Data Analyst"]),
        ]);
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                .unwrap();

        let jobs = scraper.search(&request(&["data"], 2));
        assert_eq!(titles(&jobs), ["Data Engineer", "Data Analyst"]);
        assert_eq!(scraper.store().len(), 2);
        drop(scraper);
        assert_eq!(fetcher.requested.len(), 1);
    }

    #[test]
    fn huge_limits_take_what_the_board_has() {
        let mut fetcher = StaticFetcher::new([results_page(&["Data Engineer"])]);
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                .unwrap();

        let jobs = scraper.search(&request(&["data"], usize::MAX));
        assert_eq!(titles(&jobs), ["Data Engineer"]);
        drop(scraper);
        assert_eq!(fetcher.requested.len(), 2);
    }

    #[test]
    fn huge_limits_cap_mock_jobs() {
        let mut scraper = Scraper::new(
            JobBoard::indeed(),
            settings(),
            FailingFetcher,
            MemoryStore::new(),
        )
        .unwrap();
        assert_eq!(
            scraper.search(&request(&["data"], usize::MAX)).len(),
            MAX_MOCK_JOBS,
        );
    }

    #[test]
    fn repeated_postings_are_kept_once() {
        let page = results_page(&["Data Engineer", "Data Analyst"]);
        let mut fetcher = StaticFetcher::new([
            page.clone(),
            results_page(&["Data Analyst", "Data Scientist"]),
            page,
        ]);
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                .unwrap();

        let jobs = scraper.search(&request(&["data"], 10));
        assert_eq!(
            titles(&jobs),
            ["Data Engineer", "Data Analyst", "Data Scientist"],
        );
        let stored = scraper.store().get_jobs(&JobFilter::default());
        assert_eq!(stored.len(), 3);
        drop(scraper);
        // The third page had nothing new, so the search stopped there.
        assert_eq!(fetcher.requested.len(), 3);
    }

    #[test]
    fn query_is_built_from_keywords_and_categories() {
        let query_of = |request: &SearchRequest| {
            let mut fetcher = StaticFetcher::default();
            let mut scraper =
                Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                    .unwrap();
            scraper.search(request);
            drop(scraper);
            fetcher.requested[0]
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
                .unwrap()
        };

        assert_eq!(query_of(&request(&[" rust ", "", "developer"], 5)), "rust developer");
        assert_eq!(query_of(&request(&[], 5)), "jobs");

        let query = query_of(&SearchRequest {
            categories: vec!["finance".to_string()],
            ..request(&["remote"], 5)
        });
        let finance = category_terms("finance").unwrap();
        let extra = query.strip_prefix("remote ").unwrap();
        let extra = extra.split(' ').collect::<Vec<_>>();
        assert!((1..=3).contains(&extra.len()), "{extra:?}");
        assert!(extra.iter().all(|x| finance.contains(x)), "{extra:?}");
    }

    #[test]
    fn empty_board_falls_back_to_mock_jobs_from_the_query() {
        let mut fetcher = StaticFetcher::default();
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings(), &mut fetcher, MemoryStore::new())
                .unwrap();

        let jobs = scraper.search(&request(&["designer"], 4));
        assert_eq!(jobs.len(), 4);
        assert!(jobs.iter().all(|x| x.id.starts_with("mock-")));
        assert!(jobs.iter().all(|x| x.title.contains("Designer")), "{jobs:?}");
        assert!(scraper.store().is_empty());
    }

    #[test]
    fn mock_mode_never_fetches() {
        let mut fetcher = StaticFetcher::new([results_page(&["Data Engineer"])]);
        let settings = ScraperSettings {
            use_mock_data: true,
            ..settings()
        };
        let mut scraper =
            Scraper::new(JobBoard::indeed(), settings, &mut fetcher, MemoryStore::new()).unwrap();

        let jobs = scraper.search(&request(&[], 6));
        assert_eq!(jobs.len(), 6);
        let jobs = scraper.search(&SearchRequest {
            categories: vec!["healthcare".to_string()],
            ..request(&[], 2)
        });
        assert_eq!(jobs.len(), 2);
        assert!(scraper.store().is_empty());
        drop(scraper);
        assert!(fetcher.requested.is_empty());
    }
}
