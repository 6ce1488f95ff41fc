//! News items consumed by the pipeline and the assets it hands to review.

use std::path::PathBuf;

use xxhash_rust::xxh3::xxh3_64;

/// Editorial category assigned by the collector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    #[default]
    #[serde(alias = "news")]
    News,
    #[serde(alias = "breaking")]
    Breaking,
    #[serde(alias = "result")]
    Result,
    #[serde(alias = "official")]
    Official,
    #[serde(alias = "rumour")]
    Rumour,
    #[serde(alias = "analysis")]
    Analysis,
}

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Result, &["result", "qualifying", "practice", "winner"]),
    (Category::Official, &["transfer", "sign", "contract"]),
    (Category::Rumour, &["rumour", "report", "suggests", "could"]),
    (Category::Breaking, &["breaking"]),
    (Category::Analysis, &["analysis", "tech"]),
];

impl Category {
    /// Keyword heuristic over a headline. Groups are checked in order; first hit wins.
    pub fn classify(title: &str) -> Category {
        let lower = title.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(cat, _)| *cat)
            .unwrap_or(Category::News)
    }
}

/// One story from the upstream collector. Read-only for the pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NewsItem {
    pub id: String,
    #[serde(alias = "headline_en")]
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, alias = "type")]
    pub category: Category,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl NewsItem {
    pub fn new(id: impl Into<String>, headline: impl Into<String>) -> Self {
        let headline = headline.into();
        Self {
            id: id.into(),
            category: Category::classify(&headline),
            headline,
            summary: String::new(),
            image_url: None,
            link: None,
            source: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Text read aloud for this item in a digest.
    pub fn narration_text(&self) -> String {
        if self.summary.trim().is_empty() {
            return self.headline.clone();
        }
        format!("{}. {}", self.headline, self.summary)
    }

    /// File-name-safe stem derived from the id.
    ///
    /// Collector ids are often URLs, so unsafe characters are replaced and a hash of the full
    /// id keeps distinct ids from colliding after sanitizing.
    pub fn file_stem(&self) -> String {
        let mut safe: String = self
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        safe.truncate(48);
        let trimmed = safe.trim_matches('_');
        format!("{trimmed}_{:016x}", xxh3_64(self.id.as_bytes()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

/// What an asset was generated from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AssetSource {
    Item(NewsItem),
    /// A digest covering several items.
    Digest { title: String, item_ids: Vec<String> },
}

impl AssetSource {
    pub fn digest(items: &[NewsItem]) -> Self {
        AssetSource::Digest {
            title: "Top Stories".to_string(),
            item_ids: items.iter().map(|i| i.id.clone()).collect(),
        }
    }

    pub fn headline(&self) -> &str {
        match self {
            AssetSource::Item(item) => &item.headline,
            AssetSource::Digest { title, .. } => title,
        }
    }
}

/// An image or video waiting for review and publishing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeneratedAsset {
    /// Stable identifier used by review; never a list position.
    pub id: String,
    pub kind: AssetKind,
    pub paths: Vec<PathBuf>,
    pub source: AssetSource,
    pub approved: bool,
    pub caption: Option<String>,
}

impl GeneratedAsset {
    pub fn image(path: PathBuf, item: NewsItem) -> Self {
        Self {
            id: format!("image:{}", item.id),
            kind: AssetKind::Image,
            paths: vec![path],
            source: AssetSource::Item(item),
            approved: false,
            caption: None,
        }
    }

    pub fn video(path: PathBuf, source: AssetSource) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: format!("video:{stem}"),
            kind: AssetKind::Video,
            paths: vec![path],
            source,
            approved: false,
            caption: None,
        }
    }
}
