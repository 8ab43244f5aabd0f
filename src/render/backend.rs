use crate::{
    foundation::core::{Canvas, FrameRGBA},
    foundation::error::RsvpResult,
    render::cpu::{CpuFrameRenderer, FrameTheme},
    render::fonts::FontFace,
    render::layout::FrameStyle,
    text::segment::WordUnit,
};

/// A renderer that turns a word and a progress fraction into a [`FrameRGBA`].
///
/// Frames are premultiplied RGBA8 of [`FrameBackend::canvas`] size.
pub trait FrameBackend {
    fn canvas(&self) -> Canvas;

    /// Render one frame. `None` draws the empty-sequence placeholder.
    fn render_word(&mut self, word: Option<&WordUnit>, progress: f64) -> RsvpResult<FrameRGBA>;
}

impl FrameBackend for CpuFrameRenderer {
    fn canvas(&self) -> Canvas {
        self.style().canvas
    }

    fn render_word(&mut self, word: Option<&WordUnit>, progress: f64) -> RsvpResult<FrameRGBA> {
        self.render_frame(word, progress)
    }
}

/// Settings required to construct equivalent backends on worker threads.
#[derive(Clone, Debug)]
pub struct BackendSpec {
    pub style: FrameStyle,
    pub side_opacity: f32,
}

/// Builds one backend per rendering thread.
pub trait BackendFactory: Send + Sync {
    fn create(&self, spec: &BackendSpec) -> RsvpResult<Box<dyn FrameBackend>>;
}

/// Factory for [`CpuFrameRenderer`] backends sharing one font face.
#[derive(Clone, Debug)]
pub struct CpuBackendFactory {
    pub face: FontFace,
    pub theme: FrameTheme,
}

impl BackendFactory for CpuBackendFactory {
    fn create(&self, spec: &BackendSpec) -> RsvpResult<Box<dyn FrameBackend>> {
        Ok(Box::new(CpuFrameRenderer::new(
            &self.face,
            spec.style.clone(),
            self.theme,
            spec.side_opacity,
        )?))
    }
}
