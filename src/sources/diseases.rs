//! The plant-disease listing site: an index page of disease links, each
//! leading to a page with a description block and a gallery of symptom
//! photos. No authors, no documents, no filtering.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::{element_text, Candidate, Detail, Source, SourceKind};

static LIST_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.disease-list li a").unwrap());
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.disease-description").unwrap());
static IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.disease-images img").unwrap());

pub struct DiseaseSite;

impl Source for DiseaseSite {
    fn name(&self) -> &'static str {
        "DiseaseLibrary"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::DiseaseList
    }

    fn discover(&self, html: &str, page_url: &Url) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        document
            .select(&LIST_LINKS)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
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

        let body = document
            .select(&DESCRIPTION)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let image_urls = document
            .select(&IMAGES)
            .filter_map(|img| {
                let src = img.value().attr("src")?;
                page_url.join(src).ok()
            })
            .collect();

        Detail {
            title: None,
            body,
            image_urls,
            ..Detail::default()
        }
    }
}

// ── Tests ──
