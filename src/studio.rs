//! Wiring of the pipeline from a [`StudioConfig`].

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    assets::logo::Logo,
    audio::voice::{EdgeTtsCommand, HttpSpeech, SpeechEngine, VoiceoverSynthesizer},
    config::{RenderSpec, StudioConfig},
    foundation::error::StudioResult,
    news::{AssetSource, GeneratedAsset, NewsItem},
    render::{
        canvas::CanvasComposer,
        photo::{HttpPhotoSource, PhotoSource},
    },
    review::ReviewQueue,
    text::{font::BrandFont, shape::TextEngine},
    video::digest::{DigestSettings, VideoCompositor},
};

/// Fewest items worth a digest reel.
pub const MIN_DIGEST_ITEMS: usize = 3;

/// Request limit for HTTP speech when no synthesis timeout is configured.
const HTTP_SPEECH_TIMEOUT: Duration = Duration::from_secs(60);

/// Overrides for the parts [`Studio`] would otherwise build from its config.
#[derive(Default)]
pub struct StudioBuilder {
    spec: Option<RenderSpec>,
    photos: Option<Arc<dyn PhotoSource>>,
    speech: Option<Arc<dyn SpeechEngine>>,
    bar_seed: Option<u64>,
}

impl StudioBuilder {
    pub fn render_spec(mut self, spec: RenderSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn photo_source(mut self, photos: Arc<dyn PhotoSource>) -> Self {
        self.photos = Some(photos);
        self
    }

    pub fn speech_engine(mut self, engine: Arc<dyn SpeechEngine>) -> Self {
        self.speech = Some(engine);
        self
    }

    pub fn bar_seed(mut self, seed: u64) -> Self {
        self.bar_seed = Some(seed);
        self
    }

    pub fn build(self, config: StudioConfig) -> StudioResult<Studio> {
        config.validate()?;
        let spec = self.spec.unwrap_or(RenderSpec::STANDARD);
        spec.validate()?;
        let settings = DigestSettings::from_config(&config)?;

        let font = BrandFont::load_or_fallback(&config.font_bold_path());
        let text = match font.as_ref().map(TextEngine::new) {
            Some(Ok(engine)) => Some(engine),
            Some(Err(err)) => {
                tracing::warn!(stage = "font", error = %err, "font unusable; cards will have no text");
                None
            }
            None => {
                tracing::warn!(stage = "font", "no font available; cards will have no text");
                None
            }
        };
        let logo = Logo::first_available(&config.logo_paths(), spec.logo_px);

        let photos = self
            .photos
            .unwrap_or_else(|| Arc::new(HttpPhotoSource::new(config.photo_timeout())));
        let mut composer = CanvasComposer::new(
            spec,
            config.brand_tag.clone(),
            config.output_dir.clone(),
            text,
            logo,
            photos,
        );
        if let Some(seed) = self.bar_seed {
            composer = composer.with_bar_seed(seed);
        }

        let engine: Arc<dyn SpeechEngine> = match (self.speech, &config.tts_endpoint) {
            (Some(engine), _) => engine,
            (None, Some(endpoint)) => Arc::new(HttpSpeech::new(
                endpoint.clone(),
                config.synthesis_timeout().unwrap_or(HTTP_SPEECH_TIMEOUT),
            )),
            (None, None) => Arc::new(EdgeTtsCommand::new(config.tts_command.clone())),
        };
        let synth = VoiceoverSynthesizer::new(engine).with_timeout(config.synthesis_timeout());
        tracing::debug!(engine = synth.engine_name(), "studio ready");

        Ok(Studio {
            config,
            composer,
            synth,
            settings,
            review: ReviewQueue::new(),
        })
    }
}

/// Cards, digests and the review queue behind one handle.
pub struct Studio {
    config: StudioConfig,
    composer: CanvasComposer,
    synth: VoiceoverSynthesizer,
    settings: DigestSettings,
    review: ReviewQueue,
}

impl Studio {
    pub fn new(config: StudioConfig) -> StudioResult<Self> {
        Self::builder().build(config)
    }

    pub fn builder() -> StudioBuilder {
        StudioBuilder::default()
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn composer(&mut self) -> &mut CanvasComposer {
        &mut self.composer
    }

    pub fn synthesizer(&self) -> &VoiceoverSynthesizer {
        &self.synth
    }

    /// A compositor borrowing this studio's composer and synthesizer.
    pub fn compositor(&mut self) -> VideoCompositor<'_> {
        VideoCompositor::new(&mut self.composer, &self.synth, &self.settings)
    }

    pub fn compose(&mut self, item: &NewsItem) -> StudioResult<PathBuf> {
        self.composer.compose(item)
    }

    pub fn compose_digest(&mut self, items: &[NewsItem]) -> Option<PathBuf> {
        self.compositor().compose_digest(items)
    }

    pub fn review(&self) -> &ReviewQueue {
        &self.review
    }

    pub fn review_mut(&mut self) -> &mut ReviewQueue {
        &mut self.review
    }

    /// Compose a card per item and queue each for review. Returns how many were queued.
    pub fn queue_cards(&mut self, items: &[NewsItem]) -> usize {
        let mut queued = 0;
        for item in items {
            match self.composer.compose(item) {
                Ok(path) => {
                    self.review.push(GeneratedAsset::image(path, item.clone()));
                    queued += 1;
                }
                Err(err) => {
                    tracing::warn!(item = %item.id, stage = "canvas", error = %err, "card not queued");
                }
            }
        }
        queued
    }

    /// Build a digest over `items` and queue it. Below [`MIN_DIGEST_ITEMS`] nothing is built
    /// unless `force` is set.
    pub fn queue_digest(&mut self, items: &[NewsItem], force: bool) -> Option<&GeneratedAsset> {
        if items.len() < MIN_DIGEST_ITEMS && !force {
            tracing::info!(items = items.len(), min = MIN_DIGEST_ITEMS, "too few items for a digest");
            return None;
        }
        let path = self.compose_digest(items)?;
        let asset = GeneratedAsset::video(path, AssetSource::digest(items));
        let id = asset.id.clone();
        self.review.push(asset);
        self.review.get(&id)
    }
}
