use crate::types::Source;

/// (name, url template, query, listing selector, follow listing links)
const DEFAULT_SOURCES: [(&str, &str, Option<&str>, Option<&str>, bool); 6] = [
    (
        "Remotive",
        "https://remotive.com/remote-jobs/search?search={query}",
        Some("it support"),
        Some("a.job-tile-title"),
        true,
    ),
    (
        "RemoteOK",
        "https://remoteok.com/remote-support-jobs",
        None,
        Some("tr.job a.preventLink"),
        true,
    ),
    (
        "WeWorkRemotely",
        "https://weworkremotely.com/categories/remote-customer-support-jobs",
        None,
        Some("section.jobs li > a"),
        true,
    ),
    (
        "Remote.co",
        "https://remote.co/remote-jobs/customer-service/",
        None,
        Some("div.job-listing a"),
        true,
    ),
    (
        "JustRemote",
        "https://justremote.co/remote-jobs?category={query}",
        Some("Customer Support"),
        Some("a.job-link"),
        true,
    ),
    (
        "LinkedIn",
        "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search?keywords={query}&location=Worldwide&f_WT=2&f_E=1%2C2&start=0",
        Some("IT Support OR Help Desk OR Technical Support OR NOC OR SOC"),
        Some(".base-card__full-link"),
        false,
    ),
];

pub fn default_sources() -> Vec<Source> {
    DEFAULT_SOURCES
        .into_iter()
        .map(|(name, url, query, selector, follow_links)| Source {
            name: name.to_owned(),
            url: url.to_owned(),
            query: query.map(String::from),
            selector: selector.map(String::from),
            follow_links,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::extract::HtmlParser;

    #[test]
    fn test_default_sources_are_valid() {
        let sources = default_sources();
        assert_eq!(sources.len(), DEFAULT_SOURCES.len());
        for source in &sources {
            let url = source.resolve_url().expect("default source url parses");
            assert_eq!(url.scheme(), "https");
            assert!(!url.as_str().contains("{query}"));
            HtmlParser::new(source.selector.as_deref()).expect("default selector parses");
        }
        let linkedin = sources.iter().find(|s| s.name == "LinkedIn").unwrap();
        assert!(!linkedin.follow_links);
        assert_eq!(sources.iter().filter(|s| s.follow_links).count(), 5);
    }
}
