use kurbo::Affine;

use crate::audio::mp3::{SoundStreamBlock, SoundStreamHead};
use crate::foundation::core::{ColorTransform, Fps, FrameIndex, Rgb, StageSize};
use crate::timeline::shape::Definition;

/// Index of a definition in a [`Movie`]'s arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefId(pub(crate) usize);

/// Place a new object at a depth or modify the object already there.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceObject {
    /// Display list depth.
    pub depth: u16,
    /// Definition to place; `None` when modifying.
    pub def: Option<DefId>,
    /// Transform in twips.
    pub matrix: Option<Affine>,
    /// Color transform.
    pub color: Option<ColorTransform>,
    /// Morph ratio.
    pub ratio: Option<u16>,
    /// Mask the objects up to this depth.
    pub clip_depth: Option<u16>,
    /// Modify the object at `depth`.
    pub is_move: bool,
}

/// One display list or control operation inside a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameItem {
    /// Place or move an object.
    Place(PlaceObject),
    /// Remove the object at a depth.
    Remove {
        /// Depth to clear.
        depth: u16,
    },
    /// Release a definition that will not be used again.
    Free(DefId),
    /// Stream sound header.
    SoundHead(SoundStreamHead),
    /// Stream sound data for this frame.
    SoundBlock(SoundStreamBlock),
    /// Stop the playhead.
    Stop,
}

/// Ordered operations executed when the playhead enters a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    items: Vec<FrameItem>,
}

impl Frame {
    /// Operations in execution order.
    pub fn items(&self) -> &[FrameItem] {
        &self.items
    }
}

/// Location of a place operation, used to adjust it after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceHandle {
    frame: FrameIndex,
    index: usize,
}

impl InstanceHandle {
    /// Frame holding the place operation.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }
}

/// Structural description of a show: definitions and per-frame display list operations.
#[derive(Clone, Debug)]
pub struct Movie {
    stage: StageSize,
    fps: Fps,
    background: Rgb,
    definitions: Vec<Definition>,
    frames: Vec<Frame>,
}

impl Movie {
    /// Create an empty movie.
    pub fn new(stage: StageSize, fps: Fps, background: Rgb) -> Self {
        Self {
            stage,
            fps,
            background,
            definitions: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Stage size in pixels.
    pub fn stage(&self) -> StageSize {
        self.stage
    }

    /// Frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Background color.
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Add a definition to the arena.
    pub fn define(&mut self, def: Definition) -> DefId {
        self.definitions.push(def);
        DefId(self.definitions.len() - 1)
    }

    /// Look up a definition.
    pub fn definition(&self, id: DefId) -> Option<&Definition> {
        self.definitions.get(id.0)
    }

    /// Number of definitions in the arena.
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Number of frames. At least one frame is always written.
    pub fn frame_count(&self) -> u32 {
        u32::try_from(self.frames.len()).unwrap_or(u32::MAX)
    }

    /// Frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Extend the timeline so it has at least `count` frames.
    pub fn ensure_frames(&mut self, count: u32) {
        let count = count as usize;
        if self.frames.len() < count {
            self.frames.resize_with(count, Frame::default);
        }
    }

    fn push(&mut self, frame: FrameIndex, item: FrameItem) -> InstanceHandle {
        self.ensure_frames(frame.0.saturating_add(1));
        let items = &mut self.frames[frame.0 as usize].items;
        items.push(item);
        InstanceHandle {
            frame,
            index: items.len() - 1,
        }
    }

    /// Place `def` at `depth` on `frame`.
    pub fn add_instance(
        &mut self,
        frame: FrameIndex,
        def: DefId,
        depth: u16,
        matrix: Option<Affine>,
        color: Option<ColorTransform>,
    ) -> InstanceHandle {
        self.push(
            frame,
            FrameItem::Place(PlaceObject {
                depth,
                def: Some(def),
                matrix,
                color,
                ratio: None,
                clip_depth: None,
                is_move: false,
            }),
        )
    }

    /// Modify the object at `depth` on `frame`.
    pub fn move_instance(
        &mut self,
        frame: FrameIndex,
        depth: u16,
        matrix: Option<Affine>,
        color: Option<ColorTransform>,
    ) -> InstanceHandle {
        self.push(
            frame,
            FrameItem::Place(PlaceObject {
                depth,
                def: None,
                matrix,
                color,
                ratio: None,
                clip_depth: None,
                is_move: true,
            }),
        )
    }

    /// Remove the object at `depth` on `frame`.
    pub fn remove_instance(&mut self, frame: FrameIndex, depth: u16) {
        self.push(frame, FrameItem::Remove { depth });
    }

    /// Release `def` on `frame`.
    pub fn free_character(&mut self, frame: FrameIndex, def: DefId) {
        self.push(frame, FrameItem::Free(def));
    }

    /// Stop the playhead on `frame`.
    pub fn add_stop(&mut self, frame: FrameIndex) {
        self.push(frame, FrameItem::Stop);
    }

    /// Stream sound header on `frame`.
    pub fn add_sound_head(&mut self, frame: FrameIndex, head: SoundStreamHead) {
        self.push(frame, FrameItem::SoundHead(head));
    }

    /// Stream sound block on `frame`.
    pub fn add_sound_block(&mut self, frame: FrameIndex, block: SoundStreamBlock) {
        self.push(frame, FrameItem::SoundBlock(block));
    }

    /// Place operation created earlier, for adjusting its fields.
    pub fn instance_mut(&mut self, handle: InstanceHandle) -> Option<&mut PlaceObject> {
        match self
            .frames
            .get_mut(handle.frame.0 as usize)?
            .items
            .get_mut(handle.index)?
        {
            FrameItem::Place(place) => Some(place),
            _ => None,
        }
    }

    /// Last place or move operation targeting `depth` on `frame`.
    pub fn last_instance_at(&self, frame: FrameIndex, depth: u16) -> Option<InstanceHandle> {
        let items = &self.frames.get(frame.0 as usize)?.items;
        items
            .iter()
            .rposition(|item| matches!(item, FrameItem::Place(p) if p.depth == depth))
            .map(|index| InstanceHandle { frame, index })
    }

    /// Place operation created earlier.
    pub fn instance(&self, handle: InstanceHandle) -> Option<&PlaceObject> {
        match self
            .frames
            .get(handle.frame.0 as usize)?
            .items
            .get(handle.index)?
        {
            FrameItem::Place(place) => Some(place),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/movie.rs"]
mod tests;
