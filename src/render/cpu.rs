use crate::{
    foundation::core::{Canvas, FrameRGBA, Rect, Rgba8},
    foundation::error::{RsvpError, RsvpResult},
    render::fonts::{FontFace, TextBrushRgba8, TextLayoutEngine},
    render::layout::{FrameStyle, PartWidths, guide_geometry, progress_geometry, word_geometry},
    text::segment::{WordUnit, split_word},
};

/// Text drawn when there is nothing to read.
pub const PLACEHOLDER_TEXT: &str = "No content";

/// Colors of a word frame. None of these affect geometry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameTheme {
    pub background: Rgba8,
    pub focal: Rgba8,
    pub side: Rgba8,
    pub progress_track: Rgba8,
    pub progress_fill: Rgba8,
    pub guide: Rgba8,
    pub placeholder: Rgba8,
}

impl Default for FrameTheme {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(0, 0, 0),
            focal: Rgba8::opaque(0xef, 0x44, 0x44),
            side: Rgba8::opaque(0xff, 0xff, 0xff),
            progress_track: Rgba8::opaque(0x27, 0x27, 0x2a),
            progress_fill: Rgba8::opaque(0xef, 0x44, 0x44),
            guide: Rgba8::opaque(0x3f, 0x3f, 0x46),
            placeholder: Rgba8::opaque(0x52, 0x52, 0x5b),
        }
    }
}

/// Off-screen CPU drawing target.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    pub fn new(canvas: Canvas) -> RsvpResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| RsvpError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| RsvpError::render("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(RsvpError::render("surface width/height must be non-zero"));
        }
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    /// Copy the pixels out as premultiplied RGBA8.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

/// Draws word frames with `vello_cpu`, shaping through Parley.
///
/// Live display and export construct this with the same face and style, so both produce
/// the same pixels for the same word and progress.
pub struct CpuFrameRenderer {
    style: FrameStyle,
    theme: FrameTheme,
    side_opacity: f32,
    engine: TextLayoutEngine,
    placeholder_engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

impl CpuFrameRenderer {
    pub fn new(
        face: &FontFace,
        style: FrameStyle,
        theme: FrameTheme,
        side_opacity: f32,
    ) -> RsvpResult<Self> {
        let engine = TextLayoutEngine::new(face, style.font_size_px)?;
        let placeholder_engine = TextLayoutEngine::new(face, style.font_size_px * 0.4)?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
            face.index,
        );
        Ok(Self {
            style,
            theme,
            side_opacity: side_opacity.clamp(0.0, 1.0),
            engine,
            placeholder_engine,
            font,
        })
    }

    pub fn style(&self) -> &FrameStyle {
        &self.style
    }

    /// Draw one frame into `surface`.
    ///
    /// `None` draws the placeholder. `progress` is clamped to `[0, 1]`.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        word: Option<&WordUnit>,
        progress: f64,
    ) -> RsvpResult<()> {
        if surface.canvas() != self.style.canvas {
            return Err(RsvpError::render(format!(
                "surface is {}x{}, style expects {}x{}",
                surface.width, surface.height, self.style.canvas.width, self.style.canvas.height
            )));
        }

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        let full = Rect::new(
            0.0,
            0.0,
            f64::from(surface.width),
            f64::from(surface.height),
        );
        fill_rect(&mut ctx, full, self.theme.background);

        let center = self.style.canvas.center();
        match word {
            None => {
                let layout = self
                    .placeholder_engine
                    .layout_line(PLACEHOLDER_TEXT, self.theme.placeholder.into());
                let x = center.x - f64::from(layout.width()) / 2.0;
                let top = center.y - f64::from(layout.height()) / 2.0;
                self.draw_layout(&mut ctx, &layout, x, top, 1.0);
            }
            Some(unit) => {
                let parts = split_word(unit);
                let prefix = self.engine.layout_line(parts.prefix, self.theme.side.into());
                let focal = self.engine.layout_line(parts.focal, self.theme.focal.into());
                let suffix = self.engine.layout_line(parts.suffix, self.theme.side.into());

                let widths = PartWidths {
                    prefix: f64::from(prefix.width()),
                    focal: f64::from(focal.width()),
                    suffix: f64::from(suffix.width()),
                };
                let geometry = word_geometry(center.x, widths, self.style.focal_gap_px);
                let text_height = f64::from(focal.height().max(prefix.height()));
                let top = center.y - text_height / 2.0;

                if self.style.show_guides {
                    for tick in guide_geometry(&self.style, center.x, text_height) {
                        fill_rect(&mut ctx, tick, self.theme.guide);
                    }
                }
                self.draw_layout(&mut ctx, &prefix, geometry.prefix_x, top, self.side_opacity);
                self.draw_layout(&mut ctx, &focal, geometry.slot_left, top, 1.0);
                self.draw_layout(&mut ctx, &suffix, geometry.suffix_x, top, self.side_opacity);
            }
        }

        let bar = progress_geometry(&self.style, progress);
        let bar_opacity = if self.style.zen { 0.2 } else { 1.0 };
        fill_rect(
            &mut ctx,
            bar.track,
            self.theme.progress_track.with_opacity(bar_opacity),
        );
        if bar.fill.width() > 0.0 {
            fill_rect(
                &mut ctx,
                bar.fill,
                self.theme.progress_fill.with_opacity(bar_opacity),
            );
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);
        Ok(())
    }

    /// Render into a fresh surface and read it back.
    pub fn render_frame(&mut self, word: Option<&WordUnit>, progress: f64) -> RsvpResult<FrameRGBA> {
        let mut surface = Surface::new(self.style.canvas)?;
        self.render(&mut surface, word, progress)?;
        Ok(surface.to_frame())
    }

    fn draw_layout(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &parley::Layout<TextBrushRgba8>,
        x: f64,
        top: f64,
        opacity: f32,
    ) {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, top)));

        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Absolute pen positions; `run.glyphs()` only carries per-glyph offsets.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, rect: Rect, color: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
