use crate::foundation::error::DialResult;
use crate::raster::surface::Surface;
use crate::raster::text::TextEngine;
use crate::scene::context::DrawContext;
use crate::scene::pool::{LayerPool, LayerPoolOpts, LayerPoolStats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererOpts {
    pub pool: LayerPoolOpts,
}

/// State threaded through every nested render call.
pub(crate) struct Resources<'r> {
    pub(crate) pool: &'r mut LayerPool,
    pub(crate) text: &'r mut TextEngine,
}

/// Long-lived render state: the layer buffer pool and registered fonts.
///
/// Build one per output and reuse it across frames; scenes are built fresh for each frame.
pub struct Renderer {
    pool: LayerPool,
    text: TextEngine,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            pool: LayerPool::new(LayerPoolOpts::default()),
            text: TextEngine::new(),
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("pool", &self.pool.stats())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(opts: RendererOpts) -> DialResult<Self> {
        opts.pool.validate()?;
        Ok(Self {
            pool: LayerPool::new(opts.pool),
            text: TextEngine::new(),
        })
    }

    /// Make a font available to text shapes; returns its family name.
    pub fn register_font(&mut self, font_bytes: impl Into<Vec<u8>>) -> DialResult<String> {
        self.text.register_font(font_bytes.into())
    }

    pub fn has_fonts(&self) -> bool {
        self.text.has_fonts()
    }

    pub fn pool_stats(&self) -> LayerPoolStats {
        self.pool.stats()
    }

    /// Render `scene` onto `surface`. Surface state is balanced on return, even on error.
    #[tracing::instrument(skip_all, fields(shapes = scene.len()))]
    pub fn render(&mut self, scene: DrawContext<'_>, surface: &mut Surface) -> DialResult<()> {
        let mut res = Resources {
            pool: &mut self.pool,
            text: &mut self.text,
        };
        scene.render_at(surface, &mut res, 0)
    }
}
