pub mod diseases;
pub mod researchgate;
pub mod scielo;

use scraper::ElementRef;
use url::Url;

/// Which pipeline a source belongs to. Research sources write into the
/// `research/` subtrees and are gated by the relevance filter; the disease
/// list accepts every discovered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    DiseaseList,
    Research,
}

/// One entry discovered on a listing page.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Link text, used as the item name when the detail page has no title.
    pub label: String,
    pub url: Url,
}

/// Fields extracted from one detail page. Absence of any field is normal;
/// only a failed fetch aborts an item.
#[derive(Debug, Clone, Default)]
pub struct Detail {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub body: String,
    pub image_urls: Vec<Url>,
    pub document_url: Option<Url>,
}

/// Site-specific extraction behind one interface: the crawl driver only
/// depends on this trait.
pub trait Source {
    fn name(&self) -> &'static str;
    fn kind(&self) -> SourceKind;
    fn needs_render(&self) -> bool {
        false
    }
    /// Map a listing page to candidates, in document order. A page with zero
    /// matches yields an empty vector, not an error.
    fn discover(&self, html: &str, page_url: &Url) -> Vec<Candidate>;
    /// Map a fetched detail page to its extracted fields.
    fn extract(&self, html: &str, page_url: &Url) -> Detail;
}

/// Whitespace-normalized text content of an element.
pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
