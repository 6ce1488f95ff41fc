//! Pending assets awaiting a human decision.
//!
//! Every operation addresses assets by [`GeneratedAsset::id`]; positions in the queue are
//! never used as handles, so removals cannot shift a later decision onto the wrong asset.

use crate::{
    brand::caption,
    foundation::error::{StudioError, StudioResult},
    news::GeneratedAsset,
};

#[derive(Clone, Debug, Default)]
pub struct ReviewQueue {
    assets: Vec<GeneratedAsset>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedAsset> {
        self.assets.iter()
    }

    pub fn get(&self, id: &str) -> Option<&GeneratedAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> StudioResult<&mut GeneratedAsset> {
        self.assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StudioError::validation(format!("no pending asset '{id}'")))
    }

    /// Queue `asset`, filling in its default caption. An asset with the same id is replaced.
    pub fn push(&mut self, mut asset: GeneratedAsset) {
        if asset.caption.is_none() {
            asset.caption = Some(caption::default_caption(&asset));
        }
        match self.assets.iter_mut().find(|a| a.id == asset.id) {
            Some(slot) => *slot = asset,
            None => self.assets.push(asset),
        }
    }

    pub fn approve(&mut self, id: &str) -> StudioResult<()> {
        self.get_mut(id)?.approved = true;
        Ok(())
    }

    /// Drop the asset from the queue. Its files stay on disk.
    pub fn reject(&mut self, id: &str) -> StudioResult<GeneratedAsset> {
        let pos = self
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StudioError::validation(format!("no pending asset '{id}'")))?;
        Ok(self.assets.remove(pos))
    }

    pub fn set_caption(&mut self, id: &str, text: impl Into<String>) -> StudioResult<()> {
        self.get_mut(id)?.caption = Some(text.into());
        Ok(())
    }

    /// Remove and return every approved asset; the rest stay queued in order.
    pub fn take_approved(&mut self) -> Vec<GeneratedAsset> {
        let (approved, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.assets).into_iter().partition(|a| a.approved);
        self.assets = pending;
        approved
    }

    /// Forget a published asset and delete its files. Missing files are not an error.
    pub fn discard_published(&mut self, id: &str) -> StudioResult<GeneratedAsset> {
        let asset = self.reject(id)?;
        for path in &asset.paths {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(asset = %asset.id, stage = "review", path = %path.display(), error = %err, "could not delete published file");
                }
            }
        }
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::news::{AssetSource, NewsItem};

    fn image(id: &str, path: PathBuf) -> GeneratedAsset {
        GeneratedAsset::image(path, NewsItem::new(id, format!("Headline {id}")))
    }

    #[test]
    fn push_fills_default_caption_and_dedups_by_id() {
        let mut q = ReviewQueue::new();
        q.push(image("a", PathBuf::from("a.png")));
        q.push(image("a", PathBuf::from("a2.png")));
        assert_eq!(q.len(), 1);
        let a = q.get("image:a").unwrap();
        assert_eq!(a.paths, vec![PathBuf::from("a2.png")]);
        assert!(a.caption.as_deref().unwrap().contains("Headline a"));
    }

    #[test]
    fn decisions_follow_ids_after_removals() {
        let mut q = ReviewQueue::new();
        for id in ["a", "b", "c"] {
            q.push(image(id, PathBuf::from(format!("{id}.png"))));
        }
        q.reject("image:a").unwrap();
        // "c" moved to position 1; approving by id still hits "c".
        q.approve("image:c").unwrap();
        q.set_caption("image:b", "edited").unwrap();

        let approved = q.take_approved();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, "image:c");
        assert_eq!(q.len(), 1);
        assert_eq!(q.get("image:b").unwrap().caption.as_deref(), Some("edited"));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut q = ReviewQueue::new();
        assert!(q.approve("nope").is_err());
        assert!(q.set_caption("nope", "x").is_err());
        assert!(q.reject("nope").is_err());
        assert!(q.discard_published("nope").is_err());
    }

    #[test]
    fn discard_published_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        let reel = dir.path().join("reel_20250101_120000.mp4");
        std::fs::write(&reel, b"mp4").unwrap();
        let mut q = ReviewQueue::new();
        q.push(GeneratedAsset::video(reel.clone(), AssetSource::digest(&[])));
        q.push(image("gone", dir.path().join("missing.png")));

        let asset = q.discard_published("video:reel_20250101_120000").unwrap();
        assert_eq!(asset.caption.as_deref(), Some(caption::REEL_CAPTION));
        assert!(!reel.exists());
        q.discard_published("image:gone").unwrap();
        assert!(q.is_empty());
    }
}
