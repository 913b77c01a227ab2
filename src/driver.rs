use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::metadata::ItemRecord;
use crate::relevance;
use crate::sources::diseases::DiseaseSite;
use crate::sources::{researchgate, scielo, Candidate, Source, SourceKind};
use crate::store::Store;

/// Delay bounds between consecutive image downloads of one disease item.
const IMAGE_DELAY_RANGE: (f64, f64) = (0.5, 1.5);

/// Crawl one listing URL for one source: discover candidates, process each in
/// discovery order, append one record per kept item. Returns the number of
/// records appended. A failed listing fetch makes the whole crawl a no-op.
pub fn crawl(
    source: &dyn Source,
    listing_url: &str,
    cap: usize,
    fetcher: &Fetcher,
    store: &Store,
    config: &Config,
    records: &mut Vec<ItemRecord>,
) -> usize {
    let listing = match Url::parse(listing_url) {
        Ok(url) => url,
        Err(e) => {
            warn!("invalid listing URL {listing_url}: {e}");
            return 0;
        }
    };
    let Some(html) = fetcher.fetch_page(listing_url, source.needs_render()) else {
        return 0;
    };

    let mut candidates = source.discover(&html, &listing);
    info!(
        "{}: found {} items at {listing_url}",
        source.name(),
        candidates.len()
    );
    if cap > 0 && candidates.len() > cap {
        candidates.truncate(cap);
    }

    let total = candidates.len();
    let progress = progress_bar(total);
    let mut appended = 0;

    for (i, candidate) in candidates.iter().enumerate() {
        info!("[{}/{total}] {}", i + 1, candidate.url);
        if process_item(source, candidate, fetcher, store, config, records) {
            appended += 1;
        }
        progress.inc(1);
        if i + 1 < total {
            sleep_between(delay_range(source.kind(), config));
        }
    }

    progress.finish_and_clear();
    appended
}

/// Fetch, extract, filter, persist one candidate. True when a record was
/// appended; false means the item was skipped (fetch failure or filtered
/// out). Individual asset failures never fail the item.
fn process_item(
    source: &dyn Source,
    candidate: &Candidate,
    fetcher: &Fetcher,
    store: &Store,
    config: &Config,
    records: &mut Vec<ItemRecord>,
) -> bool {
    let Some(html) = fetcher.fetch_page(candidate.url.as_str(), source.needs_render()) else {
        return false;
    };

    let detail = source.extract(&html, &candidate.url);
    let name = detail
        .title
        .clone()
        .unwrap_or_else(|| candidate.label.clone());

    let research = source.kind() == SourceKind::Research;
    if research && !relevance::is_relevant(&name, &detail.body) {
        info!("not relevant to ornamental plant diseases, skipping: {name}");
        return false;
    }

    let mut image_files = Vec::new();
    let image_count = detail.image_urls.len();
    for (i, img) in detail.image_urls.iter().enumerate() {
        let hint = match source.kind() {
            SourceKind::DiseaseList => format!("{name}_{i}"),
            SourceKind::Research => format!("{name}_img{}", i + 1),
        };
        if let Some(file) = store.download_image(img, &hint, research) {
            image_files.push(file);
        }
        if source.kind() == SourceKind::DiseaseList && i + 1 < image_count {
            sleep_between(IMAGE_DELAY_RANGE);
        }
    }

    let pdf_file = detail
        .document_url
        .as_ref()
        .and_then(|url| store.download_pdf(url, &name));

    let description_file = match source.kind() {
        SourceKind::DiseaseList => {
            if detail.body.is_empty() {
                None
            } else {
                store.save_description(&detail.body, &name, config.text_naming)
            }
        }
        SourceKind::Research => {
            let fields = article_fields(&name, &detail.authors, &detail.body, &candidate.url, &image_files, pdf_file.as_deref());
            store.save_article_details(&fields, &name)
        }
    };

    records.push(ItemRecord {
        name,
        url: candidate.url.to_string(),
        authors: detail.authors,
        description: detail.body,
        image_files,
        pdf_file,
        description_file,
        source: source.name(),
    });
    true
}

/// Key/value block saved alongside each research article, mirroring the
/// metadata row.
fn article_fields(
    title: &str,
    authors: &[String],
    body: &str,
    url: &Url,
    image_files: &[String],
    pdf_file: Option<&str>,
) -> Vec<(&'static str, String)> {
    vec![
        ("Title", title.to_string()),
        ("Authors", authors.join(", ")),
        ("Abstract", body.to_string()),
        ("URL", url.to_string()),
        (
            "Images",
            if image_files.is_empty() {
                "No images found".to_string()
            } else {
                image_files.join(", ")
            },
        ),
        (
            "PDF",
            pdf_file.unwrap_or("No PDF available").to_string(),
        ),
    ]
}

// ── Pipelines ──

/// Crawl the disease listing site. Every discovered item is accepted.
pub fn run_diseases(
    config: &Config,
    fetcher: &Fetcher,
    store: &Store,
    records: &mut Vec<ItemRecord>,
    limit: Option<usize>,
) -> usize {
    let cap = limit.unwrap_or(config.max_items);
    crawl(
        &DiseaseSite,
        &config.disease_list_url,
        cap,
        fetcher,
        store,
        config,
        records,
    )
}

/// Search both academic sites for each configured plant term, crawling every
/// results page through the relevance filter.
pub fn run_research(
    config: &Config,
    fetcher: &Fetcher,
    store: &Store,
    records: &mut Vec<ItemRecord>,
    limit: Option<usize>,
) -> usize {
    let cap = limit.unwrap_or(config.max_articles_per_search);
    let researchgate_source = researchgate::ResearchGate;
    let scielo_source = scielo::Scielo;
    let mut total = 0;

    for plant in relevance::ORNAMENTAL_PLANTS
        .iter()
        .take(config.max_searches)
    {
        let query = format!("{plant} disease");
        info!("searching for: {query}");

        let searches: [(&dyn Source, anyhow::Result<Url>); 2] = [
            (
                &researchgate_source,
                researchgate::search_url(&config.researchgate_base_url, &query),
            ),
            (
                &scielo_source,
                scielo::search_url(&config.scielo_base_url, &query),
            ),
        ];
        for (source, listing) in searches {
            match listing {
                Ok(url) => {
                    total += crawl(source, url.as_str(), cap, fetcher, store, config, records);
                }
                Err(e) => warn!("bad search URL for {}: {e:#}", source.name()),
            }
        }
    }
    total
}

// ── Helpers ──

fn delay_range(kind: SourceKind, config: &Config) -> (f64, f64) {
    match kind {
        SourceKind::DiseaseList => (config.delay_min, config.delay_max),
        SourceKind::Research => (config.research_delay_min, config.research_delay_max),
    }
}

fn sleep_between((min, max): (f64, f64)) {
    let secs = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    if secs > 0.0 {
        thread::sleep(Duration::from_secs_f64(secs));
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

// ── Tests ──
