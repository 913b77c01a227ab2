use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use base64::prelude::BASE64_STANDARD;
use base64::Engine as _;
use chrono::Utc;
use regex::Regex;
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use crate::config::TextNaming;

pub const RESEARCH_SUBDIR: &str = "research";

static DATA_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:[^,;]+;base64,(.+)$").unwrap());

/// Writes downloaded assets and extracted text under the dataset directory.
///
/// Layout: `images/` (+ `images/research/`), `descriptions/`
/// (+ `descriptions/research/`), `pdfs/`. Every save is independent; a failed
/// asset is logged and dropped without affecting the rest of its item.
pub struct Store {
    client: Client,
    image_dir: PathBuf,
    description_dir: PathBuf,
    pdf_dir: PathBuf,
}

impl Store {
    pub fn new(output_dir: &Path, client: Client) -> Result<Self> {
        let image_dir = output_dir.join("images");
        let description_dir = output_dir.join("descriptions");
        let pdf_dir = output_dir.join("pdfs");
        for dir in [
            image_dir.join(RESEARCH_SUBDIR),
            description_dir.join(RESEARCH_SUBDIR),
            pdf_dir.clone(),
        ] {
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(Self {
            client,
            image_dir,
            description_dir,
            pdf_dir,
        })
    }

    /// Download one image, returning the saved filename. `data:` URLs are
    /// decoded inline without a network call.
    pub fn download_image(&self, src: &Url, name_hint: &str, research: bool) -> Option<String> {
        let dir = if research {
            self.image_dir.join(RESEARCH_SUBDIR)
        } else {
            self.image_dir.clone()
        };
        let filename = asset_filename(name_hint, src.as_str(), "jpg");
        match self.write_asset(src, &dir.join(&filename)) {
            Ok(()) => Some(filename),
            Err(e) => {
                warn!("failed to download image {src}: {e:#}");
                None
            }
        }
    }

    /// Download one linked document, returning the saved filename.
    pub fn download_pdf(&self, src: &Url, name_hint: &str) -> Option<String> {
        let filename = asset_filename(name_hint, src.as_str(), "pdf");
        match self.write_asset(src, &self.pdf_dir.join(&filename)) {
            Ok(()) => Some(filename),
            Err(e) => {
                warn!("failed to download document {src}: {e:#}");
                None
            }
        }
    }

    fn write_asset(&self, src: &Url, path: &Path) -> Result<()> {
        if src.scheme() == "data" {
            let bytes = decode_data_url(src.as_str())?;
            fs::write(path, bytes)?;
            return Ok(());
        }
        let mut response = self
            .client
            .get(src.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {src}"))?;
        let mut file = File::create(path)?;
        io::copy(&mut response, &mut file)?;
        Ok(())
    }

    /// Save a plain description text, UTF-8. Naming is a configuration
    /// choice: one file per sanitized name, or timestamp-suffixed files.
    pub fn save_description(
        &self,
        content: &str,
        name_hint: &str,
        naming: TextNaming,
    ) -> Option<String> {
        let base = sanitize(name_hint);
        let filename = match naming {
            TextNaming::Overwrite => format!("{base}.txt"),
            TextNaming::Uniquify => format!("{base}_{}.txt", Utc::now().timestamp_millis()),
        };
        self.write_text(&self.description_dir.join(&filename), content)
            .map(|_| filename)
    }

    /// Save an article's details as an ordered key/value block, always
    /// timestamp-suffixed, under `descriptions/research/`.
    pub fn save_article_details(
        &self,
        fields: &[(&str, String)],
        name_hint: &str,
    ) -> Option<String> {
        let filename = format!(
            "{}_{}.txt",
            sanitize(name_hint),
            Utc::now().timestamp_millis()
        );
        let mut text = String::new();
        for (key, value) in fields {
            text.push_str(key);
            text.push_str(": ");
            text.push_str(value);
            text.push_str("\n\n");
        }
        self.write_text(
            &self.description_dir.join(RESEARCH_SUBDIR).join(&filename),
            &text,
        )
        .map(|_| filename)
    }

    fn write_text(&self, path: &Path, content: &str) -> Option<()> {
        match fs::write(path, content) {
            Ok(()) => Some(()),
            Err(e) => {
                warn!("failed to save {}: {e}", path.display());
                None
            }
        }
    }
}

/// Replace everything outside `[A-Za-z0-9]` with underscores.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Collision-resistant local filename: sanitized hint plus a short digest of
/// the source URL.
pub fn asset_filename(name_hint: &str, url: &str, ext: &str) -> String {
    format!("{}_{}.{ext}", sanitize(name_hint), short_hash(url))
}

fn short_hash(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..4])
}

fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = DATA_URL_RE
        .captures(url)
        .map(|c| c[1].to_string())
        .ok_or_else(|| anyhow!("unsupported data URL"))?;
    Ok(BASE64_STANDARD.decode(payload.trim())?)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn test_store(dir: &Path) -> Store {
        Store::new(dir, Client::new()).unwrap()
    }

    #[test]
    fn sanitize_keeps_only_word_characters() {
        let cleaned = sanitize("Míldio do tomateiro (Phytophthora infestans)!");
        assert!(cleaned.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(cleaned.starts_with("M_ldio_do_tomateiro"));
    }

    #[test]
    fn filenames_differ_per_url() {
        let a = asset_filename("leaf spot", "https://a.example/x.jpg", "jpg");
        let b = asset_filename("leaf spot", "https://b.example/x.jpg", "jpg");
        let c = asset_filename("leaf spot", "https://a.example/x.jpg?size=large", "jpg");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
        assert!(a.starts_with("leaf_spot_"));
    }

    #[test]
    fn data_url_image_is_decoded_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let src = Url::parse("data:image/png;base64,aGVsbG8=").unwrap();

        let filename = store.download_image(&src, "rose", false).unwrap();
        let bytes = fs::read(dir.path().join("images").join(&filename)).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn malformed_data_url_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let src = Url::parse("data:image/png,not-base64").unwrap();
        assert!(store.download_image(&src, "rose", false).is_none());
    }

    #[test]
    fn research_images_land_in_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        let src = Url::parse("data:image/jpeg;base64,Zm9v").unwrap();

        let filename = store.download_image(&src, "fig", true).unwrap();
        assert!(dir
            .path()
            .join("images")
            .join(RESEARCH_SUBDIR)
            .join(&filename)
            .exists());
    }

    #[test]
    fn overwrite_naming_reuses_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let first = store
            .save_description("first", "Leaf Spot", TextNaming::Overwrite)
            .unwrap();
        let second = store
            .save_description("second", "Leaf Spot", TextNaming::Overwrite)
            .unwrap();
        assert_eq!(first, second);

        let content = fs::read_to_string(dir.path().join("descriptions").join(&second)).unwrap();
        assert_eq!(content, "second");
    }

    #[test]
    fn uniquify_naming_keeps_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let first = store
            .save_description("first", "Leaf Spot", TextNaming::Uniquify)
            .unwrap();
        thread::sleep(Duration::from_millis(5));
        let second = store
            .save_description("second", "Leaf Spot", TextNaming::Uniquify)
            .unwrap();
        assert_ne!(first, second);
        assert!(dir.path().join("descriptions").join(&first).exists());
        assert!(dir.path().join("descriptions").join(&second).exists());
    }

    #[test]
    fn description_text_preserves_accents() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let text = "Ferrugem é uma doença fúngica comum em roseiras.";
        let filename = store
            .save_description(text, "Ferrugem", TextNaming::Overwrite)
            .unwrap();
        let read = fs::read_to_string(dir.path().join("descriptions").join(&filename)).unwrap();
        assert_eq!(read, text);
    }

    #[test]
    fn article_details_render_as_key_value_block() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let fields = vec![
            ("Title", "Blight of Rosa sp".to_string()),
            ("Authors", "A. Silva, B. Costa".to_string()),
        ];
        let filename = store.save_article_details(&fields, "Blight of Rosa sp").unwrap();
        let text = fs::read_to_string(
            dir.path()
                .join("descriptions")
                .join(RESEARCH_SUBDIR)
                .join(&filename),
        )
        .unwrap();
        assert!(text.starts_with("Title: Blight of Rosa sp\n\n"));
        assert!(text.contains("Authors: A. Silva, B. Costa\n\n"));
    }
}
