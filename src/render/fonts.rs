use std::{borrow::Cow, path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    foundation::core::Rgba8,
    foundation::error::{RsvpError, RsvpResult},
    render::layout::TextMeasure,
    settings::{FontFamily, FontWeight},
};

/// Font bytes resolved for one family/weight choice.
#[derive(Clone)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Family name as stored in the font (diagnostics only).
    pub family_name: String,
    pub weight: FontWeight,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("family_name", &self.family_name)
            .field("weight", &self.weight)
            .finish()
    }
}

impl FontFace {
    /// Load a face from a font file on disk.
    pub fn from_file(path: &Path, weight: FontWeight) -> RsvpResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Ok(Self {
            bytes: Arc::new(bytes),
            index: 0,
            family_name: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("custom")
                .to_string(),
            weight,
        })
    }

    /// Resolve a system font for `family` and `weight`.
    ///
    /// Falls back to any installed face when the generic family has no match.
    pub fn system(family: FontFamily, weight: FontWeight) -> RsvpResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let generic = match family {
            FontFamily::Mono => usvg::fontdb::Family::Monospace,
            FontFamily::Sans => usvg::fontdb::Family::SansSerif,
            FontFamily::Serif => usvg::fontdb::Family::Serif,
        };
        let families = [
            generic,
            usvg::fontdb::Family::SansSerif,
            usvg::fontdb::Family::Monospace,
        ];
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight(weight.value()),
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };

        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| RsvpError::render("no system fonts found"))?;
        let family_name = db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| RsvpError::render(format!("failed to read font data for '{family_name}'")))?;

        tracing::debug!(%family_name, ?family, ?weight, "resolved system font");
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
            family_name,
            weight,
        })
    }
}

/// Parley brush color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper that shapes single lines with one registered face.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    weight: FontWeight,
    size_px: f32,
}

impl TextLayoutEngine {
    /// Register `face` and shape at `size_px`.
    pub fn new(face: &FontFace, size_px: f32) -> RsvpResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(RsvpError::render("font size must be finite and > 0"));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| RsvpError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RsvpError::render("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            weight: face.weight,
            size_px,
        })
    }

    /// Shape `text` on a single unbroken line.
    pub fn layout_line(
        &mut self,
        text: &str,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let weight = match self.weight {
            FontWeight::Normal => parley::style::FontWeight::NORMAL,
            FontWeight::Bold => parley::style::FontWeight::BOLD,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMeasure for TextLayoutEngine {
    fn advance(&mut self, text: &str) -> f64 {
        f64::from(self.layout_line(text, TextBrushRgba8::default()).width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
