use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
    static ref BASE: Selector = Selector::parse("base[href]").unwrap();
    static ref META_DESCRIPTION: Selector =
        Selector::parse(r#"meta[name="description"][content]"#).unwrap();
    static ref ARTICLE: Selector = Selector::parse("article").unwrap();
    static ref BLOCK: Selector = Selector::parse("div[class], section[class]").unwrap();
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref DESCRIPTION_CLASS: Regex =
        Regex::new(r"(?i)description|job|posting|content|details").unwrap();
}

/// Elements considered to wrap a single listing
const CONTAINERS: [&str; 5] = ["li", "article", "tr", "div", "section"];
/// Longer container text is page furniture, not a listing description
const MAX_CONTEXT_CHARS: usize = 400;
/// Shorter article or block text is taken for a teaser and skipped
const MIN_DESCRIPTION_CHARS: usize = 40;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Candidate '{0}' has no link")]
    MissingLink(String),
    #[error("Candidate has no title, link: '{0}'")]
    EmptyTitle(String),
    #[error("Invalid link '{href}': {source}")]
    InvalidLink {
        href: String,
        source: url::ParseError,
    },
    #[error("Unsupported link: '{0}'")]
    UnsupportedLink(String),
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// An element that plausibly represents a job listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    /// raw `href` value, possibly relative
    pub href: Option<String>,
    /// short text of the enclosing listing container, empty if none
    pub context: String,
}

#[derive(Debug, Default)]
pub struct ParsedPage {
    /// value of the document's `<base href>`
    pub base_href: Option<String>,
    pub candidates: Vec<Candidate>,
}

/// What a posting's own page says about it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Detail {
    /// document `<title>`, else the first `<h1>`; empty if neither has text
    pub title: String,
    pub description: String,
}

/// Turns a page's markup into listing candidates
pub trait PageParser {
    fn parse(&self, html: &str) -> ParsedPage;

    /// Read title and description from a single posting's page
    fn parse_detail(&self, html: &str) -> Detail;
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `PageParser` backed by the `scraper` crate
#[derive(Debug, Clone)]
pub struct HtmlParser {
    selector: Selector,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self {
            selector: ANCHOR.clone(),
        }
    }
}

impl HtmlParser {
    /// Parser picking listings with a CSS selector, every `a[href]` when `None`
    pub fn new(selector: Option<&str>) -> Result<Self, ParseError> {
        match selector {
            Some(selector) => {
                let parsed =
                    Selector::parse(selector).map_err(|e| ParseError::InvalidSelector {
                        selector: selector.to_owned(),
                        reason: format!("{:?}", e),
                    })?;
                Ok(Self { selector: parsed })
            }
            None => Ok(Self::default()),
        }
    }

    fn title(el: &ElementRef) -> String {
        let text = collapse_whitespace(el.text());
        if !text.is_empty() {
            return text;
        }
        el.value()
            .attr("title")
            .or_else(|| el.value().attr("aria-label"))
            .map(|attr| collapse_whitespace(std::iter::once(attr)))
            .unwrap_or_default()
    }

    /// The element's own href, else a nested anchor's, else the enclosing anchor's
    fn href(el: &ElementRef) -> Option<String> {
        if let Some(href) = el.value().attr("href") {
            return Some(href.to_owned());
        }
        if let Some(nested) = el.select(&ANCHOR).next() {
            return nested.value().attr("href").map(String::from);
        }
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "a")
            .and_then(|a| a.value().attr("href").map(String::from))
    }

    fn context(&self, el: &ElementRef) -> String {
        let container = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| CONTAINERS.contains(&a.value().name()));
        match container {
            // a container holding several listings describes none of them
            Some(container) if container.select(&self.selector).count() <= 1 => {
                let text = collapse_whitespace(container.text());
                if text.chars().count() <= MAX_CONTEXT_CHARS {
                    text
                } else {
                    String::new()
                }
            }
            _ => String::new(),
        }
    }
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|el| collapse_whitespace(el.text()))
        .find(|text| !text.is_empty())
}

/// Meta description, then a long enough `<article>`, then a block whose
/// class looks like a job description, then the whole body
fn description(doc: &Html) -> String {
    let meta = doc
        .select(&META_DESCRIPTION)
        .filter_map(|el| el.value().attr("content"))
        .map(|content| collapse_whitespace(std::iter::once(content)))
        .find(|content| !content.is_empty());
    if let Some(meta) = meta {
        return meta;
    }
    let long_enough = |el: ElementRef| {
        let text = collapse_whitespace(el.text());
        (text.chars().count() > MIN_DESCRIPTION_CHARS).then_some(text)
    };
    if let Some(article) = doc.select(&ARTICLE).next().and_then(long_enough) {
        return article;
    }
    let block = doc
        .select(&BLOCK)
        .filter(|el| {
            el.value()
                .attr("class")
                .map_or(false, |class| DESCRIPTION_CLASS.is_match(class))
        })
        .find_map(long_enough);
    if let Some(block) = block {
        return block;
    }
    doc.select(&BODY)
        .next()
        .map(|body| collapse_whitespace(body.text()))
        .unwrap_or_default()
}

impl PageParser for HtmlParser {
    fn parse(&self, html: &str) -> ParsedPage {
        let doc = Html::parse_document(html);
        let base_href = doc
            .select(&BASE)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| href.trim().to_owned())
            .filter(|href| !href.is_empty());
        let candidates = doc
            .select(&self.selector)
            .map(|el| Candidate {
                title: Self::title(&el),
                href: Self::href(&el),
                context: self.context(&el),
            })
            .collect();
        ParsedPage {
            base_href,
            candidates,
        }
    }

    fn parse_detail(&self, html: &str) -> Detail {
        let doc = Html::parse_document(html);
        Detail {
            title: first_text(&doc, &TITLE)
                .or_else(|| first_text(&doc, &H1))
                .unwrap_or_default(),
            description: description(&doc),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_anchor_candidates() {
        let html = r#"
            <html><head><base href="https://jobs.example.org/board/"></head><body>
            <ul>
              <li><a href="/job/1">  Junior   IT Support </a> <span>Remote</span></li>
              <li><a href="job/2" title="Help Desk Trainee"></a></li>
            </ul>
            </body></html>
        "#;
        let page = HtmlParser::default().parse(html);
        assert_eq!(page.base_href.as_deref(), Some("https://jobs.example.org/board/"));
        assert_eq!(page.candidates.len(), 2);
        assert_eq!(page.candidates[0].title, "Junior IT Support");
        assert_eq!(page.candidates[0].href.as_deref(), Some("/job/1"));
        assert_eq!(page.candidates[0].context, "Junior IT Support Remote");
        assert_eq!(page.candidates[1].title, "Help Desk Trainee");
    }

    #[test]
    fn test_context_ignores_shared_container() {
        let html = r#"
            <div>
              <a href="/a">IT Support Intern - Remote</a>
              <a href="/b">Senior Network Engineer</a>
            </div>
        "#;
        let page = HtmlParser::default().parse(html);
        assert!(page.candidates.iter().all(|c| c.context.is_empty()));
    }

    #[test]
    fn test_context_too_long_is_dropped() {
        let filler = "lorem ipsum ".repeat(60);
        let html = format!(r#"<article><a href="/a">Tier 1 NOC</a><p>{}</p></article>"#, filler);
        let page = HtmlParser::default().parse(&html);
        assert_eq!(page.candidates.len(), 1);
        assert!(page.candidates[0].context.is_empty());
    }

    #[test]
    fn test_custom_selector_finds_href() {
        let html = r#"
            <table>
              <tr class="job"><td><a class="preventLink" href="/remote-jobs/1"><h2>Jr Sysadmin</h2></a></td></tr>
              <tr class="job"><td><h2>No link here</h2></td></tr>
            </table>
        "#;
        let parser = HtmlParser::new(Some("tr.job h2")).expect("valid selector");
        let page = parser.parse(html);
        assert_eq!(page.candidates.len(), 2);
        assert_eq!(page.candidates[0].title, "Jr Sysadmin");
        assert_eq!(page.candidates[0].href.as_deref(), Some("/remote-jobs/1"));
        assert_eq!(page.candidates[1].href, None);
    }

    #[test]
    fn test_detail_prefers_meta_description() {
        let html = r#"
            <html><head>
              <title> Help Desk Analyst | Board </title>
              <meta name="description" content="Remote help desk role, 5+ years required">
            </head><body><article>Some long article text that is not the summary at all.</article></body></html>
        "#;
        let detail = HtmlParser::default().parse_detail(html);
        assert_eq!(detail.title, "Help Desk Analyst | Board");
        assert_eq!(detail.description, "Remote help desk role, 5+ years required");
    }

    #[test]
    fn test_detail_falls_back_to_article_then_block() {
        let article = r#"<html><body><h1>NOC Trainee</h1>
            <article>Fully remote NOC trainee position, no experience needed.</article></body></html>"#;
        let detail = HtmlParser::default().parse_detail(article);
        assert_eq!(detail.title, "NOC Trainee");
        assert_eq!(
            detail.description,
            "Fully remote NOC trainee position, no experience needed."
        );

        let block = r#"<html><body><article>Short</article>
            <div class="nav">Home Jobs About us and a long list of navigation links</div>
            <section class="Job-Description">Work from home desktop support, training provided.</section>
            </body></html>"#;
        let detail = HtmlParser::default().parse_detail(block);
        assert_eq!(detail.title, "");
        assert_eq!(
            detail.description,
            "Work from home desktop support, training provided."
        );
    }

    #[test]
    fn test_detail_falls_back_to_body() {
        let detail = HtmlParser::default().parse_detail("<html><body><p>Remote</p> <p>jr</p></body></html>");
        assert_eq!(detail.description, "Remote jr");
    }

    #[test]
    fn test_invalid_selector() {
        let err = HtmlParser::new(Some("a[[")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidSelector { .. }));
    }
}
