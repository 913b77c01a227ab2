use std::env;
use std::path::PathBuf;

/// How disease description files are named on disk.
///
/// `Overwrite` keeps one file per sanitized disease name, so a re-run with the
/// same names replaces earlier text. `Uniquify` appends a millisecond
/// timestamp so every save gets its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextNaming {
    Overwrite,
    Uniquify,
}

/// Static run configuration. All crawl parameters come from here; nothing is
/// negotiated at runtime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the dataset written by a run.
    pub output_dir: PathBuf,
    /// Index page enumerating links to individual disease pages.
    pub disease_list_url: String,
    pub researchgate_base_url: String,
    pub scielo_base_url: String,
    /// Inter-item delay bounds for the disease pipeline, in seconds.
    pub delay_min: f64,
    pub delay_max: f64,
    /// Inter-article delay bounds for the research pipeline, in seconds.
    pub research_delay_min: f64,
    pub research_delay_max: f64,
    /// Cap on disease items processed per run. 0 = unlimited.
    pub max_items: usize,
    /// How many plant terms from the subject vocabulary get searched per run.
    pub max_searches: usize,
    /// Cap on articles processed per search-results page.
    pub max_articles_per_search: usize,
    pub text_naming: TextNaming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dataset"),
            disease_list_url: "https://www.example-plant-site.com/plant-diseases".into(),
            researchgate_base_url: "https://www.researchgate.net".into(),
            scielo_base_url: "https://search.scielo.org".into(),
            delay_min: 1.0,
            delay_max: 3.0,
            research_delay_min: 2.0,
            research_delay_max: 5.0,
            max_items: 0,
            max_searches: 5,
            max_articles_per_search: 5,
            text_naming: TextNaming::Overwrite,
        }
    }
}

impl Config {
    /// Static defaults, with the output directory optionally overridden by
    /// the DATASET_DIR environment variable.
    pub fn load() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var("DATASET_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        config
    }
}
