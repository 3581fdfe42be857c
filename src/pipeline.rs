//! The frame driver: image notifications, layout and paint, in that order.

use crate::error::{Error, Result};
use crate::events::PointerEvent;
use crate::geometry::Offset;
use crate::hit_test::HitTestResult;
use crate::image::{ImageLifecycle, ImageLoader};
use crate::layout::{BoxConstraints, Size};
use crate::painting::{DrawingSurface, PaintingContext};
use crate::stats::FrameStats;
use crate::tree::{NodeId, Tree};

/// Settings for a [`RenderPipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// The root is laid out with constraints tight to this size.
    pub viewport: Size,
    /// Stroke every painted node's bounds.
    pub debug_paint: bool,
    /// Paint a stripe along the edge of overflowing flex containers.
    pub paint_overflow_indicator: bool,
    /// Run image providers on worker threads instead of inline.
    pub background_image_loading: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(800.0, 600.0),
            debug_paint: false,
            paint_overflow_indicator: false,
            background_image_loading: false,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Size::new(width, height);
        self
    }

    pub fn debug_paint(mut self, enabled: bool) -> Self {
        self.debug_paint = enabled;
        self
    }

    pub fn paint_overflow_indicator(mut self, enabled: bool) -> Self {
        self.paint_overflow_indicator = enabled;
        self
    }

    pub fn background_image_loading(mut self, enabled: bool) -> Self {
        self.background_image_loading = enabled;
        self
    }
}

fn check_viewport(viewport: Size) -> Result<()> {
    if viewport.is_finite() && viewport.width >= 0.0 && viewport.height >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "viewport must be finite and non-negative, got {viewport:?}"
        )))
    }
}

/// Owns the render tree and drives it through frames.
pub struct RenderPipeline {
    config: RenderConfig,
    tree: Tree,
    images: ImageLoader,
    lifecycle: Option<Box<dyn ImageLifecycle>>,
    frame: u64,
}

impl RenderPipeline {
    pub fn new(config: RenderConfig) -> Self {
        let images = ImageLoader::new(config.background_image_loading);
        Self {
            config,
            tree: Tree::new(),
            images,
            lifecycle: None,
            frame: 0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    /// Attach `id` as the root; it is laid out on the next flush.
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.tree.set_root(id)
    }

    pub fn set_viewport(&mut self, viewport: Size) -> Result<()> {
        check_viewport(viewport)?;
        if viewport == self.config.viewport {
            return Ok(());
        }
        self.config.viewport = viewport;
        if let Some(root) = self.tree.root() {
            self.tree.mark_needs_layout(root);
        }
        Ok(())
    }

    pub fn set_image_lifecycle(&mut self, lifecycle: impl ImageLifecycle + 'static) {
        self.lifecycle = Some(Box::new(lifecycle));
    }

    /// Frames drawn so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn images(&self) -> &ImageLoader {
        &self.images
    }

    fn root_constraints(&self) -> BoxConstraints {
        BoxConstraints::tight(self.config.viewport)
    }

    /// Apply every queued image notification. Returns how many reached a
    /// live node.
    pub fn flush_images(&mut self) -> usize {
        let mut applied = 0;
        for notification in self.images.drain() {
            if let Some(lifecycle) = self.lifecycle.as_mut() {
                lifecycle.on_event(notification.ticket, &notification.event);
            }
            if self.tree.deliver_image_event(notification.ticket, notification.event) {
                applied += 1;
            }
        }
        applied
    }

    /// Lay out every dirty relayout boundary, then start the image loads
    /// that layout asked for.
    pub fn flush_layout(&mut self) -> Result<()> {
        let constraints = self.root_constraints();
        let result = self.tree.flush_layout(constraints);
        if let Err(error) = &result {
            log::error!("layout failed: {error}");
        }
        for request in self.tree.take_image_requests() {
            self.images.submit(request);
        }
        result
    }

    /// Paint the tree onto `surface` if anything in it needs paint.
    /// Returns whether a paint pass ran.
    pub fn flush_paint(&mut self, surface: &mut dyn DrawingSurface) -> Result<bool> {
        let root = self.tree.root().ok_or(Error::NoRoot)?;
        if !self.tree.needs_paint(root) {
            return Ok(false);
        }

        let mut ctx = PaintingContext::new(surface)
            .debug_paint(self.config.debug_paint)
            .paint_overflow_indicator(self.config.paint_overflow_indicator);
        self.tree.paint_node(root, &mut ctx, Offset::ZERO)?;
        let painted = ctx.take_painted();
        drop(ctx);

        self.tree.complete_paint(&painted);
        Ok(true)
    }

    /// Run one frame: pending image notifications, then layout, then paint.
    pub fn draw_frame(&mut self, surface: &mut dyn DrawingSurface) -> Result<FrameStats> {
        self.frame += 1;
        self.tree.take_stats();
        log::debug!("frame {} start", self.frame);

        self.flush_images();
        self.flush_layout()?;
        self.flush_paint(surface)?;

        let stats = self.tree.stats();
        log::debug!(
            "frame {} done: {} layouts ({} skipped), {} nodes painted",
            self.frame,
            stats.layouts_executed,
            stats.layouts_skipped,
            stats.nodes_painted
        );
        Ok(stats)
    }

    /// Hit test at `position` in root coordinates.
    pub fn hit_test(&self, position: Offset) -> Result<HitTestResult> {
        let root = self.tree.root().ok_or(Error::NoRoot)?;
        let mut result = HitTestResult::new();
        self.tree.hit_test(root, &mut result, position)?;
        Ok(result)
    }

    /// Hit test the event's position and hand the event to every hit node,
    /// innermost first, at the node's local position. Returns how many
    /// nodes handled it.
    pub fn dispatch_pointer_event(&mut self, event: PointerEvent) -> Result<usize> {
        let result = self.hit_test(event.position)?;
        let mut handled = 0;
        for entry in result.iter() {
            if self.tree.dispatch_to(entry.node, &event.at(entry.local_position))? {
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Block until every background image load has finished. Their
    /// notifications are applied on the next frame.
    pub fn wait_for_images(&mut self) {
        self.images.wait_idle();
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("config", &self.config)
            .field("root", &self.tree.root())
            .field("frame", &self.frame)
            .finish()
    }
}
