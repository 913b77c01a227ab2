//! SciELO article pages. Server-rendered, so the plain fetch path is enough.

use std::sync::LazyLock;

use anyhow::Result;
use scraper::{Html, Selector};
use url::Url;

use super::{element_text, Candidate, Detail, Source, SourceKind};

static RESULT_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.results a.showTooltip").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1.article-title").unwrap());
static AUTHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.author-name").unwrap());
static ABSTRACT_PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.abstract p").unwrap());
static IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.modal-body img, figure img").unwrap());
static PDF_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.pdf").unwrap());

/// Search endpoint for one query.
pub fn search_url(base: &str, query: &str) -> Result<Url> {
    let mut url = Url::parse(base)?.join("en/index.php")?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url)
}

pub struct Scielo;

impl Source for Scielo {
    fn name(&self) -> &'static str {
        "SciELO"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Research
    }

    fn discover(&self, html: &str, page_url: &Url) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        document
            .select(&RESULT_LINKS)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                if !href.contains("scielo") {
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
            .select(&ABSTRACT_PARAGRAPHS)
            .map(element_text)
            .collect::<Vec<_>>()
            .join(" ");

        let image_urls = document
            .select(&IMAGES)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{name}.html")).unwrap()
    }

    #[test]
    fn search_url_encodes_query() {
        let url = search_url("https://search.scielo.org", "Tulipa sp disease").unwrap();
        assert_eq!(
            url.as_str(),
            "https://search.scielo.org/en/index.php?q=Tulipa+sp+disease"
        );
    }

    #[test]
    fn discover_keeps_scielo_links_only() {
        let base = Url::parse("https://search.scielo.org/en/index.php?q=rosa").unwrap();
        let candidates = Scielo.discover(&fixture("scielo_search"), &base);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].url.as_str(),
            "https://search.scielo.org/scielo/articles/rose-blight"
        );
        assert_eq!(candidates[1].label, "Soil chemistry of coastal plains");
    }

    #[test]
    fn extracts_article_fields() {
        let page = Url::parse("https://search.scielo.org/scielo/articles/rose-blight").unwrap();
        let detail = Scielo.extract(&fixture("scielo_article"), &page);
        assert_eq!(
            detail.title.as_deref(),
            Some("Blight of Rosa sp in commercial greenhouses")
        );
        assert_eq!(detail.authors, vec!["A. Silva", "B. Costa"]);
        assert!(detail.body.starts_with("We surveyed blight incidence"));
        assert!(detail.body.contains("culture morphology"));
        assert_eq!(detail.image_urls.len(), 1);
        assert_eq!(
            detail.document_url.as_ref().map(|u| u.as_str()),
            Some("https://search.scielo.org/scielo/pdfs/rose-blight.pdf")
        );
    }

    #[test]
    fn abstract_paragraphs_join_into_one_body() {
        let page = Url::parse("https://search.scielo.org/scielo/articles/x").unwrap();
        let html = r#"<html><body><div class="abstract">
            <p>First part.</p><p>Second part.</p>
        </div></body></html>"#;
        let detail = Scielo.extract(html, &page);
        assert_eq!(detail.body, "First part. Second part.");
    }
}
