//! ResearchGate publication pages. Search results and article pages are
//! built client-side, so both go through the rendering fetch path.

use std::sync::LazyLock;

use anyhow::Result;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, Candidate, Detail, Source, SourceKind};

static ARTICLE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.publication-title").unwrap());
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.research-detail-header-section__title").unwrap());
static AUTHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.research-detail-author-list__item-text a").unwrap());
static ABSTRACT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.research-detail-middle-section__abstract").unwrap());
static FIGURES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.research-detail-middle-section figure img").unwrap());
static PDF_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[data-testid="publication-read-link"]"#).unwrap());

/// Publication search endpoint for one query.
pub fn search_url(base: &str, query: &str) -> Result<Url> {
    let mut url = Url::parse(base)?.join("search/publication")?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url)
}

pub struct ResearchGate;

impl Source for ResearchGate {
    fn name(&self) -> &'static str {
        "ResearchGate"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Research
    }

    fn needs_render(&self) -> bool {
        true
    }

    fn discover(&self, html: &str, page_url: &Url) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        document
            .select(&ARTICLE_LINKS)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                if !href.contains("/publication/") {
                    return None;
                }
                let url = page_url.join(href).ok()?;
                Some(Candidate {
                    label: element_text(link),
                    url,
                })
            })
            .collect()
    }

    fn extract(&self, html: &str, page_url: &Url) -> Detail {
        let document = Html::parse_document(html);

        let title = document
            .select(&TITLE)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "Untitled".to_string());

        let authors = document.select(&AUTHORS).map(element_text).collect();

        let body = document
            .select(&ABSTRACT)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let image_urls = document
            .select(&FIGURES)
            .filter_map(|img| {
                let src = img.value().attr("src")?;
                page_url.join(src).ok()
            })
            .collect();

        let document_url = document
            .select(&PDF_LINK)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| page_url.join(href).ok());

        Detail {
            title: Some(title),
            authors,
            body,
            image_urls,
            document_url,
        }
    }
}

// ── Tests ──
