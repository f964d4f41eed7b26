use crate::foundation::error::{DialError, DialResult};
use crate::raster::surface::Surface;

/// Pool configuration for layer buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPoolOpts {
    /// Deepest layer nesting the pool will serve; deeper renders fail.
    pub max_depth: usize,
}

impl Default for LayerPoolOpts {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

impl LayerPoolOpts {
    pub(crate) fn validate(&self) -> DialResult<()> {
        if self.max_depth == 0 {
            return Err(DialError::validation("layer pool max_depth must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerPoolStats {
    pub retained_surfaces: usize,
    pub alloc_surfaces: u64,
    pub reused_surfaces: u64,
    pub dropped_on_release: u64,
}

/// Offscreen buffers for nested layers, one slot per nesting depth.
///
/// A buffer is taken out of its slot while its layer renders and put back afterwards, so two
/// open layers never share a buffer. Buffers persist across frames.
#[derive(Debug)]
pub(crate) struct LayerPool {
    opts: LayerPoolOpts,
    stats: LayerPoolStats,
    slots: Vec<Option<Surface>>,
}

impl LayerPool {
    pub(crate) fn new(opts: LayerPoolOpts) -> Self {
        Self {
            opts,
            stats: LayerPoolStats::default(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn stats(&self) -> LayerPoolStats {
        self.stats
    }

    /// Take the cleared buffer for `depth`, allocating when the slot is empty or sized
    /// differently.
    pub(crate) fn acquire(&mut self, depth: usize, width: u32, height: u32) -> DialResult<Surface> {
        if depth >= self.opts.max_depth {
            return Err(DialError::render(format!(
                "layer nesting depth {} exceeds max_depth {}",
                depth + 1,
                self.opts.max_depth
            )));
        }
        if self.slots.len() <= depth {
            self.slots.resize_with(depth + 1, || None);
        }

        if let Some(mut surface) = self.slots[depth].take() {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            if surface.width() == width && surface.height() == height {
                surface.reset();
                self.stats.reused_surfaces = self.stats.reused_surfaces.saturating_add(1);
                return Ok(surface);
            }
        }

        tracing::debug!(depth, width, height, "allocating layer buffer");
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        Surface::new(width, height)
    }

    pub(crate) fn release(&mut self, depth: usize, mut surface: Surface) {
        surface.set_backdrop(None);
        match self.slots.get_mut(depth) {
            Some(slot @ None) => {
                *slot = Some(surface);
                self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
            }
            _ => {
                self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            }
        }
    }
}
