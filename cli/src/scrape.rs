use chrono::Local;
use job_scraper::Fetcher;

use crate::config::{self, Error};
use crate::Cli;

/// Fetch, filter and write the report. Only setup and write failures are errors.
pub async fn run(args: Cli) -> Result<(), Error> {
    let mut sources = config::load_sources(args.sources.as_deref())?;
    if args.no_follow_links {
        sources.iter_mut().for_each(|source| source.follow_links = false);
    }
    let mut keywords = config::load_keywords(args.keywords.as_deref())?;
    if args.include_non_remote {
        keywords = keywords.without_remote_filter();
    }
    let targets = job_scraper::targets(sources)?;
    let fetcher = Fetcher::new(args.fetch_config())?;

    log::info!("scraping {} sources", targets.len());
    let outcome = job_scraper::scrape(&fetcher, &targets, &keywords).await;
    if outcome.all_failed() {
        println!("Nenhuma fonte pôde ser consultada.");
    }
    println!("Total final: {} vagas filtradas", outcome.postings.len());

    let generated_at = Local::now().naive_local();
    let path = report::write_report(&outcome.postings, &args.output_dir, generated_at)?;
    println!("Arquivo salvo: {}", path.display());
    if args.json {
        let path = report::write_json(&outcome.postings, &args.output_dir, generated_at)?;
        println!("JSON salvo: {}", path.display());
    }
    Ok(())
}
