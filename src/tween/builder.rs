use image::{ImageFormat, RgbaImage};
use kurbo::Affine;

use crate::bitmap::pipeline::LazyBitmapPipeline;
use crate::foundation::cancel::{CancelFlag, check_cancel};
use crate::foundation::core::{ColorTransform, FrameIndex};
use crate::foundation::error::{ShowError, ShowResult};
use crate::timeline::movie::{DefId, InstanceHandle, Movie};
use crate::timeline::shape::Definition;
use crate::tween::raster::rasterize;

/// Mutable state tween builders write into.
pub struct TweenCtx<'a> {
    /// Timeline being built.
    pub movie: &'a mut Movie,
    /// Pipeline receiving rasterized frames. Only the rasterizing builder needs one.
    pub pipeline: Option<&'a mut LazyBitmapPipeline>,
    /// Polled once per rasterized frame.
    pub cancel: Option<&'a CancelFlag>,
}

/// How the first frame of a placing tween reaches the display list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Place the definition as a new object.
    Add,
    /// Move the object already at the depth.
    Modify,
    /// Leave the first frame alone.
    Ignore,
}

/// Places and moves a definition at a fixed depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaceTween {
    /// Definition placed by [`Placement::Add`].
    pub def: DefId,
    /// Display list depth.
    pub depth: u16,
    /// First-frame behavior.
    pub placement: Placement,
    /// Clip depth set on the added object, turning it into a mask.
    pub clip_depth: Option<u16>,
}

/// Renders a photo into a fresh stage-sized bitmap on every frame.
#[derive(Clone, Debug)]
pub struct RasterTween {
    photo: RgbaImage,
    source: Option<ImageFormat>,
    depth: u16,
    anchor: Option<InstanceHandle>,
    live: Option<(DefId, DefId)>,
}

impl RasterTween {
    /// Rasterize `photo` at `depth`, retargeting `anchor` on the first frame.
    pub fn new(
        photo: RgbaImage,
        source: Option<ImageFormat>,
        depth: u16,
        anchor: InstanceHandle,
    ) -> Self {
        Self {
            photo,
            source,
            depth,
            anchor: Some(anchor),
            live: None,
        }
    }

    /// Shape and bitmap currently displayed, to be freed when the photo leaves the stage.
    pub fn live_definitions(&self) -> Option<(DefId, DefId)> {
        self.live
    }

    /// Rasterize, encode and define one frame. Returns the shape, or `None` if the photo is
    /// off stage.
    fn render(&mut self, ctx: &mut TweenCtx<'_>, matrix: Affine) -> ShowResult<Option<DefId>> {
        check_cancel(ctx.cancel)?;
        let stage = ctx.movie.stage();
        let Some(frame) = rasterize(&self.photo, matrix, stage)? else {
            return Ok(None);
        };
        let pipeline = ctx
            .pipeline
            .as_deref_mut()
            .ok_or_else(|| ShowError::state("rasterized tweens need a lazy bitmap pipeline"))?;
        let lazy = pipeline.encode(&frame, self.source)?;
        let bitmap = ctx.movie.define(Definition::Bitmap(lazy));
        let shape = ctx.movie.define(Definition::centered_bitmap_shape(
            bitmap,
            lazy.width(),
            lazy.height(),
        ));
        self.live = Some((shape, bitmap));
        Ok(Some(shape))
    }
}

/// Strategy that turns interpolated states into display list operations.
#[derive(Clone, Debug)]
pub enum TweenBuilder {
    /// Place then move a definition.
    Place(PlaceTween),
    /// Rewrite an existing instance once, then move it.
    Retarget {
        /// Depth of the instance.
        depth: u16,
        /// Instance rewritten by the first initial call.
        initial: Option<InstanceHandle>,
    },
    /// Render the photo into a new bitmap every frame.
    Rasterize(RasterTween),
}

impl TweenBuilder {
    /// Builder for a placing tween.
    pub fn place(def: DefId, depth: u16, placement: Placement) -> Self {
        Self::Place(PlaceTween {
            def,
            depth,
            placement,
            clip_depth: None,
        })
    }

    /// Builder for a mask placed at `depth` clipping the objects up to `clip_depth`.
    pub fn mask(def: DefId, depth: u16, clip_depth: u16, placement: Placement) -> Self {
        Self::Place(PlaceTween {
            def,
            depth,
            placement,
            clip_depth: Some(clip_depth),
        })
    }

    /// Builder retargeting `initial` on the first frame.
    pub fn retarget(initial: InstanceHandle, depth: u16) -> Self {
        Self::Retarget {
            depth,
            initial: Some(initial),
        }
    }

    /// `true` when placed instances carry a morph ratio.
    pub fn is_morph(&self, movie: &Movie) -> bool {
        match self {
            Self::Place(p) => movie.definition(p.def).is_some_and(Definition::is_morph),
            Self::Retarget { .. } | Self::Rasterize(_) => false,
        }
    }

    /// Create the instance for the first frame of a span.
    pub(crate) fn initial(
        &mut self,
        ctx: &mut TweenCtx<'_>,
        frame: FrameIndex,
        matrix: Option<Affine>,
        color: Option<ColorTransform>,
    ) -> ShowResult<Option<InstanceHandle>> {
        match self {
            Self::Place(p) => Ok(match p.placement {
                Placement::Add => {
                    let handle = ctx.movie.add_instance(frame, p.def, p.depth, matrix, color);
                    if let Some(place) = ctx.movie.instance_mut(handle) {
                        place.clip_depth = p.clip_depth;
                    }
                    Some(handle)
                }
                Placement::Modify => Some(ctx.movie.move_instance(frame, p.depth, matrix, color)),
                Placement::Ignore => None,
            }),
            Self::Retarget { initial, .. } => {
                let Some(handle) = initial.take() else {
                    return Ok(None);
                };
                let place = ctx
                    .movie
                    .instance_mut(handle)
                    .ok_or_else(|| ShowError::state("retarget handle does not name a placement"))?;
                if matrix.is_some() {
                    place.matrix = matrix;
                }
                if color.is_some() {
                    place.color = color;
                }
                Ok(Some(handle))
            }
            Self::Rasterize(raster) => {
                let Some(handle) = raster.anchor.take() else {
                    return Ok(None);
                };
                let Some(matrix) = matrix else {
                    return Ok(None);
                };
                let shape = raster.render(ctx, matrix)?;
                let stage_matrix = Affine::translate(ctx.movie.stage().center_twips().to_vec2());
                let place = ctx
                    .movie
                    .instance_mut(handle)
                    .ok_or_else(|| ShowError::state("raster anchor does not name a placement"))?;
                match shape {
                    Some(shape) => {
                        place.def = Some(shape);
                        place.matrix = Some(stage_matrix);
                    }
                    None => {
                        // Off stage: keep the photo but push it out of view.
                        place.matrix = Some(matrix);
                    }
                }
                if color.is_some() {
                    place.color = color;
                }
                Ok(Some(handle))
            }
        }
    }

    /// Create the instance for a later frame of a span.
    pub(crate) fn subsequent(
        &mut self,
        ctx: &mut TweenCtx<'_>,
        frame: FrameIndex,
        matrix: Option<Affine>,
        color: Option<ColorTransform>,
    ) -> ShowResult<Option<InstanceHandle>> {
        match self {
            Self::Place(PlaceTween { depth, .. }) | Self::Retarget { depth, .. } => {
                Ok(Some(ctx.movie.move_instance(frame, *depth, matrix, color)))
            }
            Self::Rasterize(raster) => {
                let Some(matrix) = matrix else {
                    return Ok(None);
                };
                let depth = raster.depth;
                let previous = raster.live.take();
                ctx.movie.remove_instance(frame, depth);
                if let Some((shape, bitmap)) = previous {
                    ctx.movie.free_character(frame, shape);
                    ctx.movie.free_character(frame, bitmap);
                }
                let Some(shape) = raster.render(ctx, matrix)? else {
                    return Ok(None);
                };
                let stage_matrix = Affine::translate(ctx.movie.stage().center_twips().to_vec2());
                Ok(Some(ctx.movie.add_instance(
                    frame,
                    shape,
                    depth,
                    Some(stage_matrix),
                    color,
                )))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tween/builder.rs"]
mod tests;
