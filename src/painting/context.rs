use std::ops::{Deref, DerefMut};

use super::{Border, BorderRadius, Clip, Color, DrawingSurface, Fill, Path, RRect};
use crate::error::Result;
use crate::geometry::{Offset, Rect};
use crate::layout::Size;
use crate::transform::Transform;
use crate::tree::NodeId;

/// Scoped wrapper around a [`DrawingSurface`] for one paint pass.
///
/// Every clip, transform and opacity scope is entered with a surface
/// `save` and left with the matching `restore`, also when the paint
/// callback fails or unwinds.
pub struct PaintingContext<'a> {
    surface: &'a mut dyn DrawingSurface,
    alpha: f32,
    debug_paint: bool,
    paint_overflow_indicator: bool,
    painted: Vec<NodeId>,
}

impl<'a> PaintingContext<'a> {
    pub fn new(surface: &'a mut dyn DrawingSurface) -> Self {
        Self {
            surface,
            alpha: 1.0,
            debug_paint: false,
            paint_overflow_indicator: false,
            painted: Vec::new(),
        }
    }

    pub fn debug_paint(mut self, enabled: bool) -> Self {
        self.debug_paint = enabled;
        self
    }

    pub fn paint_overflow_indicator(mut self, enabled: bool) -> Self {
        self.paint_overflow_indicator = enabled;
        self
    }

    pub fn surface(&mut self) -> &mut dyn DrawingSurface {
        &mut *self.surface
    }

    /// Accumulated opacity of the enclosing scopes.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(crate) fn record_painted(&mut self, id: NodeId) {
        self.painted.push(id);
    }

    pub(crate) fn take_painted(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.painted)
    }

    /// Open a save/restore scope. The restore is issued when the returned
    /// guard is dropped.
    fn scope(&mut self) -> Scope<'_, 'a> {
        self.surface.save();
        let saved_alpha = self.alpha;
        Scope {
            ctx: self,
            saved_alpha,
        }
    }

    /// Run `paint` with the surface clipped to `rect`. With [`Clip::None`]
    /// the scope is still saved and restored but nothing is clipped.
    pub fn clip_rect_and_paint(
        &mut self,
        clip: Clip,
        rect: Rect,
        paint: impl FnOnce(&mut PaintingContext<'a>) -> Result<()>,
    ) -> Result<()> {
        let mut scope = self.scope();
        if !clip.is_none() {
            scope.surface.clip_rect(rect, clip.anti_alias());
        }
        paint(&mut *scope)
    }

    pub fn clip_rrect_and_paint(
        &mut self,
        clip: Clip,
        rrect: RRect,
        paint: impl FnOnce(&mut PaintingContext<'a>) -> Result<()>,
    ) -> Result<()> {
        let mut scope = self.scope();
        if !clip.is_none() {
            scope.surface.clip_rrect(rrect, clip.anti_alias());
        }
        paint(&mut *scope)
    }

    pub fn clip_path_and_paint(
        &mut self,
        clip: Clip,
        path: &Path,
        paint: impl FnOnce(&mut PaintingContext<'a>) -> Result<()>,
    ) -> Result<()> {
        let mut scope = self.scope();
        if !clip.is_none() {
            scope.surface.clip_path(path, clip.anti_alias());
        }
        paint(&mut *scope)
    }

    /// Run `paint` with `transform` applied around `offset`, so the child's
    /// top-left corner stays the pivot: `T(offset) * transform * T(-offset)`.
    pub fn push_transform(
        &mut self,
        offset: Offset,
        transform: &Transform,
        paint: impl FnOnce(&mut PaintingContext<'a>) -> Result<()>,
    ) -> Result<()> {
        let mut scope = self.scope();
        scope.surface.transform(&transform.about(offset));
        paint(&mut *scope)
    }

    /// Run `paint` with the opacity multiplied by `opacity`.
    pub fn push_opacity(
        &mut self,
        opacity: f32,
        paint: impl FnOnce(&mut PaintingContext<'a>) -> Result<()>,
    ) -> Result<()> {
        let mut scope = self.scope();
        scope.alpha *= opacity;
        let alpha = scope.alpha;
        scope.surface.set_global_alpha(alpha);
        paint(&mut *scope)
    }

    pub fn fill_rect(&mut self, rect: Rect, fill: impl Into<Fill>) {
        self.surface.fill_rect(rect, &fill.into());
    }

    /// Fill a rect, rounding its corners when `radius` is non-zero.
    pub fn fill_rounded(&mut self, rect: Rect, radius: BorderRadius, fill: impl Into<Fill>) {
        let fill = fill.into();
        if radius.is_zero() {
            self.surface.fill_rect(rect, &fill);
        } else {
            self.surface.fill_rrect(RRect::new(rect, radius), &fill);
        }
    }

    pub fn stroke_rounded(&mut self, rect: Rect, radius: BorderRadius, border: Border) {
        if radius.is_zero() {
            self.surface.stroke_rect(rect, border);
        } else {
            self.surface.stroke_rrect(RRect::new(rect, radius), border);
        }
    }

    /// Orange outline around a node, when debug painting is on.
    pub(crate) fn debug_boundary(&mut self, offset: Offset, size: Size) {
        if self.debug_paint {
            self.surface.stroke_rect(
                Rect::from_offset_size(offset, size),
                Border::new(1.0, Color::DEBUG_ORANGE),
            );
        }
    }

    /// Red/yellow stripe along the overflowing edge of a flex.
    pub(crate) fn overflow_indicator(&mut self, rect: Rect) {
        if self.paint_overflow_indicator {
            self.surface.fill_rect(rect, &Fill::Solid(Color::RED));
            self.surface.stroke_rect(rect, Border::new(1.0, Color::YELLOW));
        }
    }
}

/// Guard that restores the surface (and the context's alpha) on drop.
struct Scope<'c, 'a> {
    ctx: &'c mut PaintingContext<'a>,
    saved_alpha: f32,
}

impl<'a> Deref for Scope<'_, 'a> {
    type Target = PaintingContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'a> DerefMut for Scope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.ctx.alpha = self.saved_alpha;
        self.ctx.surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::painting::{DrawCommand, RecordingSurface};

    #[test]
    fn test_clip_none_still_saves_and_restores() {
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        ctx.clip_rect_and_paint(Clip::None, Rect::new(0.0, 0.0, 10.0, 10.0), |ctx| {
            ctx.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::RED);
            Ok(())
        })
        .unwrap();
        drop(ctx);

        assert_eq!(surface.commands().len(), 3);
        assert_eq!(surface.commands()[0], DrawCommand::Save);
        assert!(matches!(surface.commands()[1], DrawCommand::FillRect { .. }));
        assert_eq!(surface.commands()[2], DrawCommand::Restore);
    }

    #[test]
    fn test_restore_runs_when_paint_fails() {
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        let result = ctx.clip_rect_and_paint(Clip::HardEdge, Rect::new(0.0, 0.0, 10.0, 10.0), |_| {
            Err(Error::InvalidArgument("boom".into()))
        });
        assert!(result.is_err());
        drop(ctx);

        assert_eq!(surface.depth(), 0);
        assert!(matches!(surface.commands()[1], DrawCommand::ClipRect { anti_alias: false, .. }));
        assert_eq!(surface.commands().last(), Some(&DrawCommand::Restore));
    }

    #[test]
    fn test_nested_opacity_multiplies_and_restores() {
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        ctx.push_opacity(0.5, |ctx| {
            ctx.push_opacity(0.5, |ctx| {
                assert!((ctx.alpha() - 0.25).abs() < 1e-6);
                Ok(())
            })?;
            assert!((ctx.alpha() - 0.5).abs() < 1e-6);
            Ok(())
        })
        .unwrap();
        assert_eq!(ctx.alpha(), 1.0);
        drop(ctx);
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn test_push_transform_pivots_on_offset() {
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        ctx.push_transform(Offset::new(10.0, 10.0), &Transform::scale(2.0), |_| Ok(()))
            .unwrap();
        drop(ctx);

        let DrawCommand::Transform(t) = surface.commands()[1] else {
            panic!("expected a transform, got {:?}", surface.commands()[1]);
        };
        let p = t.transform_point(Offset::new(10.0, 10.0));
        assert!((p.x - 10.0).abs() < 1e-5 && (p.y - 10.0).abs() < 1e-5);
    }
}
