use std::collections::HashSet;
use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::extract::{Candidate, Detail, ParseError, ParsedPage};
use crate::keywords::{first_match, Keywords};
use crate::types::{LevelLabel, Posting};

lazy_static! {
    static ref EXPERIENCE: Regex =
        Regex::new(r"\b(\d{1,2})\s*\+?\s*(?:years?|yrs?|anos?)\b").unwrap();
}

const REJECTED_EXTENSIONS: [&str; 7] = [".pdf", ".png", ".jpg", ".jpeg", ".svg", ".zip", ".csv"];

/// Why a candidate did not qualify
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Excluded(String),
    NoSeniority,
    NoRole,
    NotRemote,
    TooMuchExperience(u32),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Excluded(term) => write!(f, "excluded title term '{}'", term),
            Rejection::NoSeniority => f.write_str("no seniority keyword"),
            Rejection::NoRole => f.write_str("no role keyword"),
            Rejection::NotRemote => f.write_str("no remote indicator"),
            Rejection::TooMuchExperience(years) => write!(f, "asks for {}+ years", years),
        }
    }
}

fn required_experience(text: &str) -> Option<u32> {
    EXPERIENCE
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .max()
}

fn excluded(title_lower: &str, keywords: &Keywords) -> Result<(), Rejection> {
    match first_match(&format!("{} ", title_lower), &keywords.exclude) {
        Some(term) => Err(Rejection::Excluded(term.to_owned())),
        None => Ok(()),
    }
}

/// Match a listing's title and nearby text against `keywords`.
/// All comparisons are case-insensitive substring tests.
pub fn classify(title: &str, context: &str, keywords: &Keywords) -> Result<LevelLabel, Rejection> {
    let title_lower = title.to_lowercase();
    excluded(&title_lower, keywords)?;
    let text = format!("{} {}", title_lower, context.to_lowercase());
    let level = first_match(&text, &keywords.seniority).ok_or(Rejection::NoSeniority)?;
    first_match(&text, &keywords.role).ok_or(Rejection::NoRole)?;
    if let Some(remote) = &keywords.remote {
        first_match(&text, remote).ok_or(Rejection::NotRemote)?;
    }
    if let Some(max_years) = keywords.max_experience_years {
        match required_experience(&text) {
            Some(years) if years >= max_years => return Err(Rejection::TooMuchExperience(years)),
            _ => {}
        }
    }
    Ok(LevelLabel::from(level))
}

/// Base url relative links resolve against: the page url, joined with `<base href>`
pub fn page_base(page_url: &Url, base_href: Option<&str>) -> Url {
    base_href
        .and_then(|href| page_url.join(href).ok())
        .unwrap_or_else(|| page_url.clone())
}

/// Resolve `href` to an absolute http(s) link to a job page
pub fn resolve_link(href: &str, base: &Url) -> Result<Url, ParseError> {
    let href = href.trim();
    let lower = href.to_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
    {
        return Err(ParseError::UnsupportedLink(href.to_owned()));
    }
    let url = base.join(href).map_err(|e| ParseError::InvalidLink {
        href: href.to_owned(),
        source: e,
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ParseError::UnsupportedLink(url.to_string()));
    }
    let path = url.path().to_lowercase();
    if REJECTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Err(ParseError::UnsupportedLink(url.to_string()));
    }
    Ok(url)
}

/// Strip tracking parameters, the fragment and a trailing slash
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);

    let total = url.query_pairs().count();
    let kept = url
        .query_pairs()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            !key.starts_with("utm") && key != "fbclid"
        })
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();
    if kept.is_empty() {
        normalized.set_query(None);
    } else if kept.len() != total {
        normalized.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = normalized.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        normalized.set_path(path.trim_end_matches('/'));
    }
    normalized
}

fn candidate_url(candidate: &Candidate, base: &Url) -> Result<Url, ParseError> {
    if candidate.title.is_empty() {
        return Err(ParseError::EmptyTitle(
            candidate.href.clone().unwrap_or_default(),
        ));
    }
    let href = candidate
        .href
        .as_deref()
        .ok_or_else(|| ParseError::MissingLink(candidate.title.clone()))?;
    resolve_link(href, base).map(|url| normalize_url(&url))
}

/// Qualifying postings of one page, in discovery order.
/// A repeated (title, link) pair is kept once.
pub fn postings_from_page(page: &ParsedPage, page_url: &Url, keywords: &Keywords) -> Vec<Posting> {
    let base = page_base(page_url, page.base_href.as_deref());
    let mut seen = HashSet::new();
    page.candidates
        .iter()
        .filter_map(|candidate| {
            let level_label = match classify(&candidate.title, &candidate.context, keywords) {
                Ok(level) => level,
                Err(reason) => {
                    log::debug!("rejected '{}': {}", candidate.title, reason);
                    return None;
                }
            };
            let url = match candidate_url(candidate, &base) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("dropping candidate from {}: {}", page_url, e);
                    return None;
                }
            };
            if !seen.insert((candidate.title.to_lowercase(), url.clone())) {
                log::debug!("duplicate on page: '{}' {}", candidate.title, url);
                return None;
            }
            Some(Posting {
                title: candidate.title.clone(),
                url,
                level_label,
                source_page: page_url.clone(),
            })
        })
        .collect()
}

/// Candidates of a page worth opening, with their resolved links.
/// Titles may be empty here. A title that is already excluded is not
/// followed, and each link is kept once.
pub fn detail_links(
    page: &ParsedPage,
    page_url: &Url,
    keywords: &Keywords,
) -> Vec<(Candidate, Url)> {
    let base = page_base(page_url, page.base_href.as_deref());
    let mut seen = HashSet::new();
    page.candidates
        .iter()
        .filter_map(|candidate| {
            if let Err(reason) = excluded(&candidate.title.to_lowercase(), keywords) {
                log::debug!("rejected '{}': {}", candidate.title, reason);
                return None;
            }
            let href = match candidate.href.as_deref() {
                Some(href) => href,
                None => {
                    log::warn!(
                        "dropping candidate from {}: {}",
                        page_url,
                        ParseError::MissingLink(candidate.title.clone())
                    );
                    return None;
                }
            };
            let url = match resolve_link(href, &base) {
                Ok(url) => normalize_url(&url),
                Err(e) => {
                    log::warn!("dropping candidate from {}: {}", page_url, e);
                    return None;
                }
            };
            seen.insert(url.clone()).then(|| (candidate.clone(), url))
        })
        .collect()
}

/// Classify a followed candidate on its listing text plus its own page.
/// The listing title wins, the page title fills in when it is empty.
pub fn posting_from_detail(
    candidate: &Candidate,
    url: Url,
    detail: &Detail,
    page_url: &Url,
    keywords: &Keywords,
) -> Option<Posting> {
    let title = if candidate.title.is_empty() {
        detail.title.clone()
    } else {
        candidate.title.clone()
    };
    if title.is_empty() {
        log::warn!(
            "dropping candidate from {}: {}",
            page_url,
            ParseError::EmptyTitle(url.to_string())
        );
        return None;
    }
    let context = format!("{} {}", candidate.context, detail.description);
    match classify(&title, &context, keywords) {
        Ok(level_label) => Some(Posting {
            title,
            url,
            level_label,
            source_page: page_url.clone(),
        }),
        Err(reason) => {
            log::debug!("rejected '{}' ({}): {}", title, url, reason);
            None
        }
    }
}
