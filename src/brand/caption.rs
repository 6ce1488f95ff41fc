//! Publishing captions offered to reviewers before they edit them.

use crate::news::{AssetSource, Category, GeneratedAsset, NewsItem};

pub const REEL_CAPTION: &str = "Top Racing Stories! 🏎️🔥 #RacingTamizhan #Reels";
pub const CALL_TO_ACTION: &str = "Follow @racing.tamizhan for more updates!";

const BASE_TAGS: &[&str] = &["#RacingTamizhan", "#Motorsport", "#News"];

/// Extra hashtags keyed on headline mentions. Matching is case-sensitive; every hit adds
/// its tags, in table order.
const TAG_RULES: &[(&[&str], &[&str])] = &[
    (&["F1", "Formula 1"], &["#F1", "#Formula1"]),
    (&["MotoGP"], &["#MotoGP", "#BikeRacing"]),
    (&["Red Bull"], &["#RedBullRacing"]),
    (&["Ferrari"], &["#ScuderiaFerrari"]),
    (&["Hamilton"], &["#LewisHamilton"]),
    (&["Verstappen"], &["#MaxVerstappen"]),
];

pub fn category_prefix(category: Category) -> &'static str {
    match category {
        Category::Breaking => "🚨 BREAKING:",
        Category::Result => "🏆 RESULT:",
        Category::Rumour => "👀 RUMOUR:",
        Category::Official => "📝 OFFICIAL:",
        Category::Analysis => "🧠 ANALYSIS:",
        Category::News => "📰 NEWS:",
    }
}

pub fn hashtags(headline: &str) -> Vec<&'static str> {
    let mut tags = BASE_TAGS.to_vec();
    for (needles, extra) in TAG_RULES {
        if needles.iter().any(|n| headline.contains(n)) {
            tags.extend_from_slice(extra);
        }
    }
    tags
}

/// Category prefix and headline, the summary when there is one, the call to action, then
/// hashtags.
pub fn item_caption(item: &NewsItem) -> String {
    let mut out = format!("{} {}", category_prefix(item.category), item.headline);
    let summary = item.summary.trim();
    if !summary.is_empty() {
        out.push_str("\n\n");
        out.push_str(summary);
    }
    out.push_str("\n\n");
    out.push_str(CALL_TO_ACTION);
    out.push_str("\n\n");
    out.push_str(&hashtags(&item.headline).join(" "));
    out
}

/// Default caption for an asset, used until a reviewer edits it.
pub fn default_caption(asset: &GeneratedAsset) -> String {
    match &asset.source {
        AssetSource::Item(item) => item_caption(item),
        AssetSource::Digest { .. } => REEL_CAPTION.to_string(),
    }
}
