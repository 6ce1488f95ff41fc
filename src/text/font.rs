//! Font loading with a system fallback.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::foundation::error::{StudioError, StudioResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    Branding(PathBuf),
    /// Fallback face found through the system font database.
    System(String),
}

/// Raw bytes of a font file that parsed as at least one face.
#[derive(Clone, Debug)]
pub struct BrandFont {
    bytes: Arc<Vec<u8>>,
    origin: FontOrigin,
}

impl BrandFont {
    pub fn from_bytes(bytes: Vec<u8>, origin: FontOrigin) -> StudioResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes.clone());
        if db.is_empty() {
            return Err(StudioError::validation(format!(
                "no font faces found in {origin:?}"
            )));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            origin,
        })
    }

    pub fn from_file(path: &Path) -> StudioResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes, FontOrigin::Branding(path.to_path_buf()))
    }

    /// First bold sans-serif system face, or any system face at all.
    pub fn system_default() -> StudioResult<Self> {
        use usvg::fontdb;

        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            weight: fontdb::Weight::BOLD,
            ..Default::default()
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| StudioError::validation("no system fonts available"))?;
        let family = db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        let bytes = db
            .with_face_data(id, |data, _index| data.to_vec())
            .ok_or_else(|| StudioError::validation("system font data is unavailable"))?;
        Self::from_bytes(bytes, FontOrigin::System(family))
    }

    /// Branding font at `path`, else the system default. `None` only when neither loads.
    pub fn load_or_fallback(path: &Path) -> Option<Self> {
        match Self::from_file(path) {
            Ok(font) => Some(font),
            Err(err) => {
                tracing::warn!(
                    stage = "font",
                    path = %path.display(),
                    error = %err,
                    "branding font unavailable, falling back to system font"
                );
                match Self::system_default() {
                    Ok(font) => Some(font),
                    Err(err) => {
                        tracing::warn!(stage = "font", error = %err, "no fallback font; text is skipped");
                        None
                    }
                }
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.origin
    }

    /// Font handle for `vello_cpu` glyph runs.
    pub fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(self.bytes.to_vec()), 0)
    }
}
