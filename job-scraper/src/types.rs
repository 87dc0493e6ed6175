use serde::{Deserialize, Serialize};
use std::fmt::Display;
use url::Url;

/// Seniority class of a retained posting, derived from the first
/// seniority keyword that matched
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelLabel {
    Junior,
    Entry,
    Intern,
    Trainee,
    Tier1,
    Unclassified,
}

impl From<&str> for LevelLabel {
    fn from(term: &str) -> Self {
        match term.trim().to_lowercase().as_str() {
            "junior" | "jr" | "jr." => LevelLabel::Junior,
            "entry" | "entry-level" | "entry level" => LevelLabel::Entry,
            "intern" | "internship" => LevelLabel::Intern,
            "trainee" => LevelLabel::Trainee,
            "level 1" | "tier 1" | "tier1" => LevelLabel::Tier1,
            _ => LevelLabel::Unclassified,
        }
    }
}

impl Display for LevelLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LevelLabel::Junior => "junior",
            LevelLabel::Entry => "entry",
            LevelLabel::Intern => "intern",
            LevelLabel::Trainee => "trainee",
            LevelLabel::Tier1 => "tier 1",
            LevelLabel::Unclassified => "unclassified",
        };
        f.write_str(label)
    }
}

/// A job listing that passed the keyword filter
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub title: String,
    pub url: Url,
    pub level_label: LevelLabel,
    /// search-result page the posting was found on
    pub source_page: Url,
}

/// A search-result page to scrape.
/// `url` may contain a `{query}` placeholder, replaced by the url-encoded `query`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// CSS selector for the listing anchors, defaults to every `a[href]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// open every listing's own page and filter on its title and description
    #[serde(default)]
    pub follow_links: bool,
}

impl Source {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_owned(),
            url: url.to_owned(),
            query: None,
            selector: None,
            follow_links: false,
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_owned());
        self
    }

    pub fn with_selector(mut self, selector: &str) -> Self {
        self.selector = Some(selector.to_owned());
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn resolve_url(&self) -> Result<Url, url::ParseError> {
        let url = match &self.query {
            Some(query) => self.url.replace("{query}", &urlencoding::encode(query)),
            None => self.url.clone(),
        };
        Url::parse(&url)
    }
}
