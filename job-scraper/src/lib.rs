pub mod extract;
pub mod fetch;
pub mod filter;
pub mod keywords;
pub mod sources;
pub mod types;

use std::collections::HashSet;

use futures::StreamExt;
use url::Url;

pub use extract::{Detail, HtmlParser, PageParser, ParseError, ParsedPage};
pub use fetch::{FetchConfig, FetchError, Fetcher};
pub use keywords::Keywords;
pub use types::{LevelLabel, Posting, Source};

/// A source paired with the parser for its pages
pub struct Target<P = HtmlParser> {
    pub source: Source,
    pub parser: P,
}

impl Target<HtmlParser> {
    pub fn new(source: Source) -> Result<Self, ParseError> {
        let parser = HtmlParser::new(source.selector.as_deref())?;
        Ok(Self { source, parser })
    }
}

/// Build targets for every source, failing on the first invalid selector
pub fn targets(sources: Vec<Source>) -> Result<Vec<Target>, ParseError> {
    sources.into_iter().map(Target::new).collect()
}

#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// retained postings in discovery order
    pub postings: Vec<Posting>,
    pub fetched: usize,
    pub failed: usize,
}

impl ScrapeOutcome {
    pub fn all_failed(&self) -> bool {
        self.fetched == 0 && self.failed > 0
    }
}

/// Open each listing of a followed page and classify it on its own page.
/// Links retained from an earlier source are not fetched again.
async fn postings_from_details<P: PageParser>(
    fetcher: &Fetcher,
    parser: &P,
    page: &ParsedPage,
    page_url: &Url,
    keywords: &Keywords,
    seen_links: &HashSet<Url>,
) -> Vec<Posting> {
    let mut postings = Vec::new();
    for (candidate, url) in filter::detail_links(page, page_url, keywords) {
        if seen_links.contains(&url) {
            continue;
        }
        fetcher.pause().await;
        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("skipping listing {}: {}", url, e);
                continue;
            }
        };
        let detail = parser.parse_detail(&body);
        postings.extend(filter::posting_from_detail(
            &candidate, url, &detail, page_url, keywords,
        ));
    }
    postings
}

/// Fetch every target page in order, extract and filter its listings.
/// Failing sources are logged and skipped. A link already retained from
/// an earlier page is not repeated.
pub async fn scrape<P: PageParser>(
    fetcher: &Fetcher,
    targets: &[Target<P>],
    keywords: &Keywords,
) -> ScrapeOutcome {
    let mut outcome = ScrapeOutcome::default();
    let mut seen_links = HashSet::new();
    let pages = fetcher.fetch_pages(targets.iter().map(|t| &t.source));
    tokio::pin!(pages);
    let mut parsers = targets.iter().map(|t| &t.parser);
    while let Some(fetched) = pages.next().await {
        let parser = match parsers.next() {
            Some(parser) => parser,
            None => break,
        };
        let page = match fetched.result {
            Ok(page) => page,
            Err(e) => {
                log::error!("skipping source {}: {}", fetched.source.name, e);
                outcome.failed += 1;
                continue;
            }
        };
        outcome.fetched += 1;
        let parsed = parser.parse(&page.body);
        let found = parsed.candidates.len();
        let postings = if fetched.source.follow_links {
            postings_from_details(fetcher, parser, &parsed, &page.url, keywords, &seen_links)
                .await
        } else {
            filter::postings_from_page(&parsed, &page.url, keywords)
        };
        let before = outcome.postings.len();
        outcome.postings.extend(
            postings
                .into_iter()
                .filter(|posting| seen_links.insert(posting.url.clone())),
        );
        log::info!(
            "{}: {} candidates, {} postings retained",
            fetched.source.name,
            found,
            outcome.postings.len() - before
        );
    }
    if outcome.all_failed() {
        log::warn!("no source could be fetched");
    }
    outcome
}
