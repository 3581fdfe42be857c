use std::sync::Arc;

use super::RenderBox;
use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::geometry::{Offset, Rect};
use crate::hit_test::HitTestResult;
use crate::image::{
    apply_box_fit, BoxFit, ImageError, ImageEvent, ImageLoadPayload, ImageProvider, ImageRequest,
    ImageTicket,
};
use crate::layout::{BoxConstraints, Size};
use crate::painting::PaintingContext;
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Where an image node is in its load.
#[derive(Debug, Clone, Default)]
pub enum ImageStatus {
    #[default]
    Idle,
    Loading {
        loaded: u64,
        total: Option<u64>,
    },
    Loaded,
    Failed(Arc<ImageError>),
}

/// Paints an image from an [`ImageProvider`], showing its child as a
/// placeholder until the image has loaded.
///
/// The load is requested during layout and completes through
/// [`Tree::deliver_image_event`]; every request is tagged with the node's
/// current generation, so answers to superseded requests are ignored.
#[derive(Debug)]
pub struct ImageBox {
    provider: Option<Arc<dyn ImageProvider>>,
    width: Option<f32>,
    height: Option<f32>,
    fit: BoxFit,
    alignment: Alignment,
    generation: u64,
    requested: bool,
    status: ImageStatus,
    image: Option<ImageLoadPayload>,
}

fn check_extent(extent: Option<f32>) -> Result<()> {
    match extent {
        Some(e) if !(e >= 0.0) => Err(Error::InvalidArgument(format!(
            "image extents must be non-negative, got {e}"
        ))),
        _ => Ok(()),
    }
}

impl ImageBox {
    pub fn new(provider: impl ImageProvider + 'static) -> Self {
        Self {
            provider: Some(Arc::new(provider)),
            ..Self::empty()
        }
    }

    /// An image node with nothing to load yet.
    pub fn empty() -> Self {
        Self {
            provider: None,
            width: None,
            height: None,
            fit: BoxFit::default(),
            alignment: Alignment::CENTER,
            generation: 0,
            requested: false,
            status: ImageStatus::Idle,
            image: None,
        }
    }

    pub fn with_size(mut self, width: Option<f32>, height: Option<f32>) -> Result<Self> {
        check_extent(width)?;
        check_extent(height)?;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    pub fn with_fit(mut self, fit: BoxFit) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn status(&self) -> &ImageStatus {
        &self.status
    }

    pub fn image(&self) -> Option<&ImageLoadPayload> {
        self.image.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap the provider. Any load in flight for the old one is superseded;
    /// the last good image stays until the new one arrives.
    pub fn set_provider(&mut self, provider: impl ImageProvider + 'static) -> DirtyFlags {
        self.provider = Some(Arc::new(provider));
        self.generation += 1;
        self.requested = false;
        self.status = ImageStatus::Idle;
        DirtyFlags::NEEDS_LAYOUT
    }

    /// Forget an unfinished request so the next layout issues a fresh one.
    /// Notifications for the old request no longer match the generation.
    pub(crate) fn rearm(&mut self) {
        if !self.requested || matches!(self.status, ImageStatus::Loaded) {
            return;
        }
        self.generation += 1;
        self.requested = false;
        self.status = ImageStatus::Idle;
    }

    pub fn set_size(&mut self, width: Option<f32>, height: Option<f32>) -> Result<DirtyFlags> {
        check_extent(width)?;
        check_extent(height)?;
        if (width, height) == (self.width, self.height) {
            return Ok(DirtyFlags::empty());
        }
        self.width = width;
        self.height = height;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn set_fit(&mut self, fit: BoxFit) -> DirtyFlags {
        if fit == self.fit {
            return DirtyFlags::empty();
        }
        self.fit = fit;
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> DirtyFlags {
        if alignment == self.alignment {
            return DirtyFlags::empty();
        }
        self.alignment = alignment;
        DirtyFlags::NEEDS_PAINT
    }

    /// Apply a load notification. `None` means it answers a superseded
    /// request and was ignored.
    pub(crate) fn apply_event(&mut self, generation: u64, event: ImageEvent) -> Option<DirtyFlags> {
        if generation != self.generation {
            return None;
        }
        let flags = match event {
            ImageEvent::Started => {
                self.status = ImageStatus::Loading {
                    loaded: 0,
                    total: None,
                };
                DirtyFlags::empty()
            }
            ImageEvent::Progress { loaded, total } => {
                self.status = ImageStatus::Loading { loaded, total };
                DirtyFlags::empty()
            }
            ImageEvent::Loaded(payload) => {
                self.status = ImageStatus::Loaded;
                self.image = Some(payload);
                DirtyFlags::NEEDS_LAYOUT
            }
            // The placeholder or the last good image stays
            ImageEvent::Failed(error) => {
                self.status = ImageStatus::Failed(error);
                DirtyFlags::empty()
            }
        };
        Some(flags)
    }

    fn resolve_size(&self, constraints: BoxConstraints, placeholder: Option<Size>) -> Size {
        let constraints = BoxConstraints::tight_for(self.width, self.height).enforce(constraints);
        match (&self.image, placeholder) {
            (Some(image), _) => constraints.constrain_size_and_attempt_to_preserve_aspect_ratio(image.size),
            (None, Some(placeholder)) => constraints.constrain(placeholder),
            (None, None) => constraints.smallest(),
        }
    }

    fn placeholder_constraints(&self, constraints: BoxConstraints) -> BoxConstraints {
        BoxConstraints::tight_for(self.width, self.height).enforce(constraints)
    }
}

impl RenderBox for ImageBox {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        if !self.requested {
            if let Some(provider) = &self.provider {
                tree.request_image(ImageRequest {
                    ticket: ImageTicket {
                        node: id,
                        generation: self.generation,
                    },
                    provider: Arc::clone(provider),
                });
                self.requested = true;
            }
        }

        // The placeholder stays laid out so it can take over again
        let placeholder = match tree.first_child(id)? {
            Some(child) => Some(tree.layout(child, self.placeholder_constraints(constraints), true)?),
            None => None,
        };
        Ok(self.resolve_size(constraints, placeholder))
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let placeholder = match tree.first_child(id)? {
            Some(child) => Some(tree.dry_layout(child, self.placeholder_constraints(constraints))?),
            None => None,
        };
        Ok(self.resolve_size(constraints, placeholder))
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let Some(image) = &self.image else {
            return tree.paint_children(id, ctx, offset);
        };

        let size = tree.size(id)?;
        let fitted = apply_box_fit(self.fit, image.size, size);
        if fitted.destination.is_empty() {
            return Ok(());
        }
        let src = self.alignment.inscribe(fitted.source, Rect::from_size(image.size));
        let dst = self
            .alignment
            .inscribe(fitted.destination, Rect::from_offset_size(offset, size));
        ctx.surface().draw_image(&image.handle, src, dst);
        Ok(())
    }

    fn hit_test(&self, tree: &Tree, id: NodeId, result: &mut HitTestResult, position: Offset) -> Result<bool> {
        let size = tree.size(id)?;
        if !size.contains(position) {
            return Ok(false);
        }
        // The placeholder only takes hits while it is shown
        if self.image.is_none() {
            tree.hit_test_children(id, result, position)?;
        }
        result.add(id, position);
        Ok(true)
    }
}
