use chrono::{SecondsFormat, Utc};
use rand::Rng;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use crate::{
    classify::{classify_experience_level, classify_job_type, extract_skills, MAX_SKILLS},
    config::ConfigError,
    job::{Job, JobType, UNKNOWN_COMPANY, UNKNOWN_LOCATION, UNKNOWN_TITLE},
    job_board::{Extract, JobBoard},
    salary::coarse_salary_range,
};

#[derive(Debug, Error)]
pub enum CardError {
    #[error("card has neither a title nor a link")]
    Unidentifiable,
}

enum Extractor {
    Text(Selector),
    ShortText(Selector, usize),
    Attr(Selector, String),
    OwnAttr(String),
}

fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

impl Extractor {
    fn compile(extract: &Extract) -> Result<Self, ConfigError> {
        Ok(match extract {
            Extract::Text(css) => Extractor::Text(compile_selector(css)?),
            Extract::ShortText(css, max_len) => {
                Extractor::ShortText(compile_selector(css)?, *max_len)
            }
            Extract::Attr(css, attr) => Extractor::Attr(compile_selector(css)?, attr.clone()),
            Extract::OwnAttr(attr) => Extractor::OwnAttr(attr.clone()),
        })
    }

    fn compile_all(extracts: &[Extract]) -> Result<Vec<Self>, ConfigError> {
        extracts.iter().map(Self::compile).collect()
    }

    fn extract(&self, card: ElementRef) -> Option<String> {
        let value = match self {
            Extractor::Text(selector) => card.select(selector).next().map(text_of)?,
            Extractor::ShortText(selector, max_len) => card
                .select(selector)
                .map(text_of)
                .find(|x| !x.is_empty() && x.chars().count() < *max_len)?,
            Extractor::Attr(selector, attr) => {
                clean_text(card.select(selector).next()?.value().attr(attr)?)
            }
            Extractor::OwnAttr(attr) => clean_text(card.value().attr(attr)?),
        };
        Some(value).filter(|x| !x.is_empty())
    }
}

// The HTML parser has already decoded entities.
fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_of(element: ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

fn first(extractors: &[Extractor], card: ElementRef) -> Option<String> {
    extractors.iter().find_map(|x| x.extract(card))
}

/// Turns listing cards from a job board's results page into [`Job`]s.
pub struct CardParser {
    board: JobBoard,
    card: Selector,
    id: Vec<Extractor>,
    title: Vec<Extractor>,
    company: Vec<Extractor>,
    location: Vec<Extractor>,
    description: Vec<Extractor>,
    posted_at: Vec<Extractor>,
    link: Vec<Extractor>,
    salary: Vec<Extractor>,
    job_type: Vec<Extractor>,
}

impl CardParser {
    pub fn new(board: &JobBoard) -> Result<Self, ConfigError> {
        let fields = &board.fields;
        Ok(Self {
            board: board.clone(),
            card: compile_selector(&board.card)?,
            id: Extractor::compile_all(&fields.id)?,
            title: Extractor::compile_all(&fields.title)?,
            company: Extractor::compile_all(&fields.company)?,
            location: Extractor::compile_all(&fields.location)?,
            description: Extractor::compile_all(&fields.description)?,
            posted_at: Extractor::compile_all(&fields.posted_at)?,
            link: Extractor::compile_all(&fields.link)?,
            salary: Extractor::compile_all(&fields.salary)?,
            job_type: Extractor::compile_all(&fields.job_type)?,
        })
    }

    /// Parses every card on a results page, in page order.
    ///
    /// The result has one entry per card, so its length is the page's card count.
    pub fn parse_page<R: Rng>(&self, page_html: &str, rng: &mut R) -> Vec<Result<Job, CardError>> {
        let page = Html::parse_document(page_html);
        page.select(&self.card)
            .map(|card| self.parse_card(card, rng))
            .collect()
    }

    pub fn parse_card<R: Rng>(&self, card: ElementRef, rng: &mut R) -> Result<Job, CardError> {
        let title = first(&self.title, card);
        let href = first(&self.link, card);
        if title.is_none() && href.is_none() {
            return Err(CardError::Unidentifiable);
        }

        let title = title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let (company, location) = split_absorbed_location(
            first(&self.company, card).unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            first(&self.location, card).unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        );
        let description = first(&self.description, card).unwrap_or_default();

        let id = first(&self.id, card)
            .map(|id| match &self.board.id_prefix {
                Some(prefix) => id.strip_prefix(prefix.as_str()).unwrap_or(&id).to_string(),
                None => id,
            })
            .filter(|x| !x.is_empty());
        let link = href
            .and_then(|x| self.board.url.join(&x).ok())
            .map(String::from)
            .or_else(|| id.as_deref().and_then(|id| self.board.view_link(id)))
            .unwrap_or_default();
        let id = id.unwrap_or_else(|| synthetic_id(&title, &company, &location));

        let posted_at = first(&self.posted_at, card)
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        let salary_range =
            first(&self.salary, card).unwrap_or_else(|| coarse_salary_range(&title).to_string());

        let text = format!("{title} {description}");
        let job_type = first(&self.job_type, card)
            .and_then(|x| JobType::from_label(&x))
            .unwrap_or_else(|| classify_job_type(&text));

        Ok(Job {
            experience_level: classify_experience_level(&text),
            skills: extract_skills(&text, MAX_SKILLS, rng),
            id,
            title,
            company,
            location,
            description,
            link,
            posted_at,
            salary_range,
            job_type,
        })
    }
}

/// Splits a trailing location ("Remote", "Austin, TX") out of a company name that absorbed it.
fn split_absorbed_location(company: String, location: String) -> (String, String) {
    re!(
        ABSORBED_LOCATION_RE,
        r"^(.*?)\s*(Remote\b.*|[A-Z][a-z]+, [A-Z]{2}\b.*)$",
    );

    let Some(captures) = ABSORBED_LOCATION_RE.captures(&company) else {
        return (company, location);
    };
    let head = captures[1].trim();
    let tail = captures[2].trim();
    if head.is_empty() || tail.is_empty() {
        return (company, location);
    }
    (head.to_string(), tail.to_string())
}

/// A stable ID for a card without one, from the fields that identify a posting.
fn synthetic_id(title: &str, company: &str, location: &str) -> String {
    let mut hasher = Sha256::new();
    for field in [title, company, location] {
        hasher.update(field.as_bytes());
        hasher.update([0_u8]);
    }
    let mut hex = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>();
    hex.truncate(16);
    hex
}
