mod config;
mod scrape;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use job_scraper::FetchConfig;

/// Search public job boards for entry-level IT support postings and
/// write them to a DOCX document of links
#[derive(Parser, Debug)]
#[command(name = "jobfinder", author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file with the list of search pages to scrape, replaces the built-in list
    #[arg(long, env = "JOBFINDER_SOURCES")]
    sources: Option<PathBuf>,

    /// JSON file overriding the keyword sets
    #[arg(long, env = "JOBFINDER_KEYWORDS")]
    keywords: Option<PathBuf>,

    /// Directory the document is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Timeout of a single HTTP request, in seconds
    #[arg(long, env = "JOBFINDER_TIMEOUT_SECS", default_value_t = 18)]
    timeout_secs: u64,

    /// Retries for transport errors, 429 and 5xx responses
    #[arg(long, env = "JOBFINDER_RETRIES", default_value_t = 3)]
    retries: u32,

    /// Pause between two source pages, in milliseconds
    #[arg(long, env = "JOBFINDER_DELAY_MS", default_value_t = 120)]
    delay_ms: u64,

    #[arg(long, env = "JOBFINDER_USER_AGENT")]
    user_agent: Option<String>,

    /// Keep postings without a remote indicator
    #[arg(long)]
    include_non_remote: bool,

    /// Filter on listing text only, never open the postings' own pages
    #[arg(long)]
    no_follow_links: bool,

    /// Also write the postings as JSON next to the document
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            retries: self.retries,
            delay: Duration::from_millis(self.delay_ms),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = Cli::parse();
    if let Err(e) = scrape::run(args).await {
        log::error!("{}", e);
        eprintln!("jobfinder: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_arguments_required() {
        let args = Cli::try_parse_from(["jobfinder"]).expect("parses without arguments");
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert!(!args.include_non_remote);
        assert!(!args.json);
        assert!(!args.no_follow_links);
    }

    #[test]
    fn test_fetch_config_from_args() {
        let args = Cli::try_parse_from([
            "jobfinder",
            "--timeout-secs",
            "5",
            "--retries",
            "1",
            "--delay-ms",
            "0",
            "--user-agent",
            "jobbot/1.0",
        ])
        .unwrap();
        let config = args.fetch_config();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retries, 1);
        assert!(config.delay.is_zero());
        assert_eq!(config.user_agent, "jobbot/1.0");
        assert_eq!(config.retry_backoff, FetchConfig::default().retry_backoff);
    }
}
