use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::Url;

/// How to read one field out of a listing card.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum Extract {
    /// The text of the first element matching a CSS selector.
    Text(String),
    /// The text of the first matching element that is non-empty and shorter than a limit.
    ShortText(String, usize),
    /// An attribute of the first element matching a CSS selector.
    Attr(String, String),
    /// An attribute of the card element itself.
    OwnAttr(String),
}

/// Extraction strategies for each listing field, tried in order until one yields a value.
#[derive(Serialize, Deserialize, Clone, Default, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct CardFields {
    pub id: Vec<Extract>,
    pub title: Vec<Extract>,
    pub company: Vec<Extract>,
    pub location: Vec<Extract>,
    pub description: Vec<Extract>,
    pub posted_at: Vec<Extract>,
    pub link: Vec<Extract>,
    pub salary: Vec<Extract>,
    pub job_type: Vec<Extract>,
}

/// A job board's search page and the markup of its results.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct JobBoard {
    pub name: String,
    /// The search results page, without a query.
    pub url: Url,
    /// A template for a listing's page, with `{id}` standing in for its ID.
    #[serde(default)]
    pub view_url: Option<String>,
    pub query_param: String,
    pub location_param: String,
    /// The parameter holding how many results to skip. Omitted on the first page.
    pub offset_param: String,
    /// Fixed parameters sent with every search.
    #[serde(default)]
    pub extra_params: Vec<(String, String)>,
    /// A CSS selector matching each listing card.
    pub card: String,
    /// An optional prefix to strip from extracted IDs.
    #[serde(default)]
    pub id_prefix: Option<String>,
    #[serde(default)]
    pub fields: CardFields,
}

impl Display for JobBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.name)
    }
}

impl Default for JobBoard {
    fn default() -> Self {
        Self::indeed()
    }
}

fn text(selector: &str) -> Extract {
    Extract::Text(selector.to_string())
}

fn attr(selector: &str, attr: &str) -> Extract {
    Extract::Attr(selector.to_string(), attr.to_string())
}

impl JobBoard {
    pub fn indeed() -> Self {
        Self {
            name: "Indeed".to_string(),
            url: Url::parse("https://www.indeed.com/jobs").unwrap(),
            view_url: Some("https://www.indeed.com/viewjob?jk={id}".to_string()),
            query_param: "q".to_string(),
            location_param: "l".to_string(),
            offset_param: "start".to_string(),
            extra_params: vec![
                ("sort".to_string(), "date".to_string()),
                ("fromage".to_string(), "1".to_string()),
            ],
            card: "div.job_seen_beacon".to_string(),
            id_prefix: Some("job_".to_string()),
            fields: CardFields {
                id: vec![
                    Extract::OwnAttr("data-jk".to_string()),
                    attr("a.jcs-JobTitle", "data-jk"),
                    attr("a.jcs-JobTitle", "id"),
                    attr("a[data-jk]", "data-jk"),
                ],
                title: vec![text("h2.jobTitle span"), text("h2.jobTitle")],
                company: vec![
                    Extract::ShortText(
                        r#"table.mainContentTable div[class*="company"]"#.to_string(),
                        100,
                    ),
                    text("span.companyName"),
                    text(r#"[data-testid="company-name"]"#),
                ],
                location: vec![
                    text("table.mainContentTable div.companyLocation"),
                    text("div.companyLocation"),
                    text(r#"[data-testid="text-location"]"#),
                ],
                description: vec![
                    text("div.job-snippet"),
                    text(r#"div[data-testid="job-snippet"]"#),
                ],
                posted_at: vec![
                    text("span.date"),
                    text(r#"span[data-testid="myJobsStateDate"]"#),
                ],
                link: vec![attr("a.jcs-JobTitle", "href"), attr("a[data-jk]", "href")],
                salary: vec![
                    text("div.salary-snippet-container"),
                    text(r#"span[data-testid="salary-snippet"]"#),
                ],
                job_type: vec![text(r#"div[data-testid="attribute_snippet_testid"]"#)],
            },
        }
    }

    /// Builds the URL of the results page starting at `offset`.
    pub fn page_url(&self, query: &str, location: Option<&str>, offset: usize) -> Url {
        let mut url = self.url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(&self.query_param, query);
            pairs.append_pair(&self.location_param, location.unwrap_or_default());
            for (key, value) in &self.extra_params {
                pairs.append_pair(key, value);
            }
            if offset > 0 {
                pairs.append_pair(&self.offset_param, &offset.to_string());
            }
        }
        url
    }

    /// The page of the listing with the given ID, if the board has a template for it.
    pub fn view_link(&self, id: &str) -> Option<String> {
        if id.is_empty() {
            return None;
        }
        self.view_url.as_ref().map(|x| x.replace("{id}", id))
    }
}
