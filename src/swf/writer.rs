use crate::bitmap::pipeline::LazyBitmapPipeline;
use crate::foundation::error::{ShowError, ShowResult};
use crate::swf::output::SwfOutput;
use crate::swf::records::write_rect;
use crate::swf::tags::{self, PlaceFields, code};
use crate::timeline::movie::{DefId, FrameItem, Movie};
use crate::timeline::shape::Definition;

/// Default container version for shows.
pub const DEFAULT_SWF_VERSION: u8 = 6;

/// Options for [`serialize_movie`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwfWriteOpts {
    /// Container version byte.
    pub version: u8,
}

impl Default for SwfWriteOpts {
    fn default() -> Self {
        Self {
            version: DEFAULT_SWF_VERSION,
        }
    }
}

/// Tracks which definitions have been written and the character ids they received.
struct DefinitionWriter<'a> {
    movie: &'a Movie,
    ids: Vec<Option<u16>>,
    next_id: u16,
    pipeline: Option<&'a mut LazyBitmapPipeline>,
}

impl DefinitionWriter<'_> {
    fn id_of(&self, def: DefId) -> Option<u16> {
        self.ids.get(def.0).copied().flatten()
    }

    /// Write `def` (and anything it references) unless it has been written already.
    fn ensure_defined(&mut self, out: &mut SwfOutput, def: DefId) -> ShowResult<u16> {
        if let Some(id) = self.id_of(def) {
            return Ok(id);
        }
        let movie = self.movie;
        let definition = movie
            .definition(def)
            .ok_or_else(|| ShowError::state(format!("unknown definition {}", def.0)))?;

        let bitmap_id = match definition {
            Definition::BitmapShape { bitmap, .. } => Some(self.ensure_defined(out, *bitmap)?),
            _ => None,
        };

        let id = self.next_id;
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| ShowError::state("ran out of character ids"))?;

        match definition {
            Definition::Bitmap(lazy) => {
                let pipeline = self.pipeline.as_deref_mut().ok_or_else(|| {
                    ShowError::state("bitmap definitions need a lazy bitmap pipeline")
                })?;
                // The pipeline splices the tag in here during assembly.
                pipeline.register(*lazy, id, out.pos())?;
            }
            Definition::BitmapShape { bounds, .. } => {
                let bitmap_id = bitmap_id
                    .ok_or_else(|| ShowError::state("bitmap shape without bitmap id"))?;
                tags::define_bitmap_shape(out, id, bitmap_id, *bounds)?;
            }
            Definition::SolidRect { color, bounds } => {
                tags::define_solid_shape(out, id, *color, *bounds)?;
            }
            Definition::RectMorph { color, start, end } => {
                tags::define_rect_morph(out, id, *color, *start, *end)?;
            }
        }
        self.ids[def.0] = Some(id);
        Ok(id)
    }
}

fn write_header(out: &mut SwfOutput, movie: &Movie, opts: &SwfWriteOpts) -> ShowResult<()> {
    let frame_count = u16::try_from(movie.frame_count().max(1)).map_err(|_| {
        ShowError::validation(format!(
            "{} frames do not fit in the container header",
            movie.frame_count()
        ))
    })?;
    out.write_bytes(b"FWS");
    out.write_u8(opts.version);
    // patched once the total size is known
    out.write_u32(0);
    write_rect(out, movie.stage().rect_twips());
    out.write_u16(movie.fps().to_fixed_8_8());
    out.write_u16(frame_count);
    Ok(())
}

/// Serialize the structural part of `movie`.
///
/// Definitions are written immediately before their first use and numbered from 1 in that
/// order. Bitmap definitions write no bytes: they are registered with `pipeline` at the current
/// offset and spliced in by [`LazyBitmapPipeline::assemble`]. The length field is left for the
/// final write step to patch.
#[tracing::instrument(skip(movie, pipeline), fields(frames = movie.frame_count()))]
pub fn serialize_movie(
    movie: &Movie,
    opts: &SwfWriteOpts,
    pipeline: Option<&mut LazyBitmapPipeline>,
) -> ShowResult<SwfOutput> {
    let mut out = SwfOutput::new();
    write_header(&mut out, movie, opts)?;
    tags::set_background_color(&mut out, movie.background())?;

    let mut defs = DefinitionWriter {
        movie,
        ids: vec![None; movie.definition_count()],
        next_id: 1,
        pipeline,
    };

    for frame in movie.frames() {
        for item in frame.items() {
            match item {
                FrameItem::Place(place) => {
                    let character = match place.def {
                        Some(def) => Some(defs.ensure_defined(&mut out, def)?),
                        None => None,
                    };
                    tags::place_object(
                        &mut out,
                        &PlaceFields {
                            depth: place.depth,
                            character,
                            matrix: place.matrix,
                            color: place.color,
                            ratio: place.ratio,
                            clip_depth: place.clip_depth,
                            is_move: place.is_move,
                        },
                    )?;
                }
                FrameItem::Remove { depth } => tags::remove_object(&mut out, *depth)?,
                FrameItem::Free(def) => {
                    if let Some(id) = defs.id_of(*def) {
                        tags::free_character(&mut out, id)?;
                    }
                }
                FrameItem::SoundHead(head) => {
                    out.write_tag(code::SOUND_STREAM_HEAD2, &head.to_bytes())?;
                }
                FrameItem::SoundBlock(block) => {
                    out.write_tag(code::SOUND_STREAM_BLOCK, &block.to_bytes())?;
                }
                FrameItem::Stop => tags::stop_action(&mut out)?,
            }
        }
        tags::show_frame(&mut out)?;
    }
    if movie.frames().is_empty() {
        tags::show_frame(&mut out)?;
    }
    tags::end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/swf/writer.rs"]
mod tests;
