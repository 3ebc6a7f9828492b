// Site bootstrap - the fixed set of published pages a fresh site starts with

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{error, info};

use crate::error::AppResult;
use crate::models::{Page, PageStatus, StoredDocument};
use crate::pages::PageRepository;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("valid regex"));

const SITE_OWNER: &str = "Dr. Harish Chandra";

const HOME_TITLE: &str = r#"Dr. Harish <br /> <span class="text-[#913c07]">Chandra</span>"#;

const HOME_CONTENT: &str = r#"
  <p>
    <span class="font-semibold text-gray-800">Dr. Harish Chandra</span> is an accomplished academician serving as an Assistant Professor of Mathematics in the Department of Mathematics and Scientific Computing at Madan Mohan Malaviya University of Technology (MMMUT), Gorakhpur.
  </p>
  <p>
    With nearly two decades of experience in teaching, research, and academic administration, he has made significant contributions to higher education. He earned his Ph.D. in Mathematics from the University of Lucknow and is a UGC-NET qualified scholar (JRF & SRF).
  </p>
"#;

/// (id, title, content); the slug is the id.
const SEED_PAGES: [(&str, &str, &str); 7] = [
    ("home", HOME_TITLE, HOME_CONTENT),
    ("profile", "Profile", "<p>Welcome to the Profile page.</p>"),
    ("teaching", "Teaching", "<p>Information about courses taught.</p>"),
    ("research", "Research", "<p>Details about research publications and interests.</p>"),
    ("administration", "Administration", "<p>Administrative roles and responsibilities.</p>"),
    ("gallery", "Gallery", "<p>Photo gallery.</p>"),
    ("contact", "Contact", "<p>Contact information.</p>"),
];

/// Ids printed by the page check.
pub const CHECKED_PAGE_IDS: [&str; 6] = ["home", "gallery", "profile", "teaching", "research", "contact"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

/// The seed page for `id`, with SEO fields filled in.
pub fn seed_page(id: &str, title: &str, content: &str) -> Page {
    Page {
        id: None,
        slug: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        status: PageStatus::Published,
        seo_title: format!("{} - {}", strip_tags(title), SITE_OWNER),
        seo_description: format!("Official {} page", id),
        seo_keywords: format!("Harish Chandra, {}", id),
        ..Page::default()
    }
}

/// Create each seed page that does not exist yet. Existing pages are never
/// overwritten; a failure on one page does not stop the rest.
pub async fn seed_pages(repository: &PageRepository) -> SeedReport {
    let mut report = SeedReport::default();

    for (id, title, content) in SEED_PAGES {
        let result: AppResult<bool> = async {
            if repository.exists(id).await? {
                return Ok(false);
            }
            repository.insert(id, &seed_page(id, title, content)).await?;
            Ok(true)
        }
        .await;

        match result {
            Ok(true) => {
                info!("Creating page: {}", id);
                report.created.push(id.to_string());
            }
            Ok(false) => {
                info!("Skipping existing page: {}", id);
                report.skipped.push(id.to_string());
            }
            Err(e) => {
                error!("Error processing {}: {}", id, e);
                report.failed.push(id.to_string());
            }
        }
    }

    info!("Seeding complete.");
    report
}

/// Pretty-printed stored fields of each checked page, `None` where missing.
pub async fn check_pages(repository: &PageRepository) -> AppResult<Vec<(String, Option<String>)>> {
    let mut found = Vec::with_capacity(CHECKED_PAGE_IDS.len());
    for id in CHECKED_PAGE_IDS {
        let dump = match repository.get(id).await? {
            Some(page) => Some(serde_json::to_string_pretty(&Value::Object(page.to_fields()?))?),
            None => None,
        };
        found.push((id.to_string(), dump));
    }
    Ok(found)
}
