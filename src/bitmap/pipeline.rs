use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::Context as _;
use byteorder::{LittleEndian, WriteBytesExt};
use image::{ImageFormat, RgbaImage};

use crate::bitmap::delegate::{BitmapDelegate, EncodedLayout};
use crate::bitmap::scratch::ScratchStore;
use crate::foundation::error::{ShowError, ShowResult};

/// Offset of the overall length field in a container header.
pub const LENGTH_FIELD_OFFSET: u64 = 4;

/// Descriptor of a bitmap whose encoded bytes live in a pipeline's scratch store.
///
/// Plain value: it carries no reference to the pipeline that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LazyBitmap {
    slot: usize,
    width: u16,
    height: u16,
}

impl LazyBitmap {
    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }
}

#[derive(Clone, Debug)]
struct EncodedBitmap {
    offset: u64,
    len: u64,
    width: u16,
    height: u16,
    layout: EncodedLayout,
}

/// One bitmap definition visited by the structural serializer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LazyBitmapRecord {
    /// Character id assigned by the serializer.
    pub id: u16,
    /// Offset in the structural bytes where the bitmap tag belongs.
    pub insert_at: usize,
    /// Bitmap to splice in.
    pub bitmap: LazyBitmap,
}

/// Totals reported by [`LazyBitmapPipeline::assemble`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Bytes written to the destination, including spliced bitmap tags.
    pub bytes_written: u64,
    /// Bitmap tags spliced in.
    pub bitmaps: usize,
    /// Size of the largest payload buffer held during assembly.
    pub peak_payload: usize,
}

/// Defers bitmap bytes out of memory until the container is written.
///
/// Bitmaps are encoded straight into a scratch file. The structural serializer registers where
/// each bitmap tag belongs, and [`LazyBitmapPipeline::assemble`] splices them back in one pass.
#[derive(Debug)]
pub struct LazyBitmapPipeline {
    scratch: ScratchStore,
    quality_mode: bool,
    encoded: Vec<EncodedBitmap>,
    records: Vec<LazyBitmapRecord>,
    assembled: bool,
}

impl LazyBitmapPipeline {
    /// Create a pipeline whose scratch file lives in `scratch_dir`.
    pub fn new(scratch_dir: &Path, quality_mode: bool) -> ShowResult<Self> {
        Ok(Self {
            scratch: ScratchStore::create_in(scratch_dir)?,
            quality_mode,
            encoded: Vec::new(),
            records: Vec::new(),
            assembled: false,
        })
    }

    /// Quality mode this pipeline selects delegates for.
    pub fn quality_mode(&self) -> bool {
        self.quality_mode
    }

    /// Number of bitmaps encoded so far.
    pub fn encoded_count(&self) -> usize {
        self.encoded.len()
    }

    /// Registered placeholders, in registration order.
    pub fn records(&self) -> &[LazyBitmapRecord] {
        &self.records
    }

    /// Encode `img` into scratch storage with the delegate chosen for `source`.
    #[tracing::instrument(skip(self, img), fields(width = img.width(), height = img.height()))]
    pub fn encode(
        &mut self,
        img: &RgbaImage,
        source: Option<ImageFormat>,
    ) -> ShowResult<LazyBitmap> {
        let delegate = BitmapDelegate::select(self.quality_mode, source);
        self.encode_with(img, delegate)
    }

    /// Encode `img` with an explicit delegate.
    pub fn encode_with(
        &mut self,
        img: &RgbaImage,
        delegate: BitmapDelegate,
    ) -> ShowResult<LazyBitmap> {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(ShowError::encoding("bitmap has no pixels"));
        }
        let (width, height) = match (u16::try_from(w), u16::try_from(h)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(ShowError::encoding(format!("bitmap {w}x{h} is too large"))),
        };

        let offset = self.scratch.len();
        let result = {
            let writer = self.scratch.writer()?;
            delegate.encode(img, writer)
        };
        let layout = match result {
            Ok(layout) => layout,
            Err(e) => {
                self.scratch.truncate(offset)?;
                return Err(e);
            }
        };
        let len = self.scratch.len() - offset;
        tracing::debug!(?delegate, bytes = len, "bitmap encoded");

        let slot = self.encoded.len();
        self.encoded.push(EncodedBitmap {
            offset,
            len,
            width,
            height,
            layout,
        });
        Ok(LazyBitmap {
            slot,
            width,
            height,
        })
    }

    /// Record that the bitmap tag for `bitmap` belongs at `insert_at` with character `id`.
    pub fn register(&mut self, bitmap: LazyBitmap, id: u16, insert_at: usize) -> ShowResult<()> {
        if self.encoded.get(bitmap.slot).is_none() {
            return Err(ShowError::state(format!(
                "bitmap {} was not encoded by this pipeline",
                bitmap.slot
            )));
        }
        if let Some(last) = self.records.last()
            && last.insert_at > insert_at
        {
            return Err(ShowError::state(
                "bitmap placeholders must be registered in output order",
            ));
        }
        self.records.push(LazyBitmapRecord {
            id,
            insert_at,
            bitmap,
        });
        Ok(())
    }

    /// Interleave `structural` bytes with the registered bitmap tags into `dest`, then patch the
    /// container length field.
    ///
    /// Only one payload is held in memory at a time. Registered records are consumed, so a
    /// pipeline assembles once. Assembling while encoded bitmaps have no registered placeholder
    /// is a state error.
    #[tracing::instrument(skip(self, structural, dest), fields(structural = structural.len()))]
    pub fn assemble<W: Write + Seek>(
        &mut self,
        structural: &[u8],
        dest: &mut W,
    ) -> ShowResult<AssemblyStats> {
        if self.scratch.is_released() {
            return Err(ShowError::state("assembly after the pipeline was released"));
        }
        if self.assembled {
            return Err(ShowError::state("pipeline was already assembled"));
        }
        if self.records.is_empty() && !self.encoded.is_empty() {
            return Err(ShowError::state(format!(
                "assembly requested before any of {} encoded bitmaps was registered",
                self.encoded.len()
            )));
        }
        self.assembled = true;
        let records = std::mem::take(&mut self.records);
        let begin = dest.stream_position().context("query output position")?;

        let mut stats = AssemblyStats::default();
        let mut payload = Vec::new();
        let mut cursor = 0usize;
        for record in &records {
            let bitmap = self
                .encoded
                .get(record.bitmap.slot)
                .ok_or_else(|| ShowError::state("registered bitmap is missing"))?;
            let chunk = structural.get(cursor..record.insert_at).ok_or_else(|| {
                ShowError::state(format!(
                    "placeholder offset {} is outside the structural bytes",
                    record.insert_at
                ))
            })?;
            dest.write_all(chunk).context("write structural bytes")?;
            cursor = record.insert_at;

            let len = usize::try_from(bitmap.len)
                .map_err(|_| ShowError::encoding("bitmap payload is too large"))?;
            payload.resize(len, 0);
            stats.peak_payload = stats.peak_payload.max(payload.len());
            self.scratch.read_at(bitmap.offset, &mut payload)?;
            bitmap
                .layout
                .write_tag(dest, record.id, bitmap.width, bitmap.height, &payload)?;
            stats.bitmaps += 1;
        }
        let rest = structural
            .get(cursor..)
            .ok_or_else(|| ShowError::state("structural cursor past end"))?;
        dest.write_all(rest).context("write structural bytes")?;

        stats.bytes_written = patch_length(dest, begin)?;
        tracing::info!(
            bytes = stats.bytes_written,
            bitmaps = stats.bitmaps,
            peak_payload = stats.peak_payload,
            "container assembled"
        );
        Ok(stats)
    }

    /// Close and delete the scratch store. A second call is a state error.
    pub fn release(&mut self) -> ShowResult<()> {
        self.scratch.release()
    }

    /// `true` once [`LazyBitmapPipeline::release`] has run.
    pub fn is_released(&self) -> bool {
        self.scratch.is_released()
    }
}

/// Overwrite the length field of the container that starts at `begin`, restoring the cursor to
/// the end of output. Returns the container length.
fn patch_length<W: Write + Seek>(dest: &mut W, begin: u64) -> ShowResult<u64> {
    let end = dest.stream_position().context("query output position")?;
    let total = end - begin;
    let field = u32::try_from(total)
        .map_err(|_| ShowError::encoding(format!("container of {total} bytes is too large")))?;
    dest.seek(SeekFrom::Start(begin + LENGTH_FIELD_OFFSET))
        .context("seek to length field")?;
    dest.write_u32::<LittleEndian>(field)
        .context("write length field")?;
    dest.seek(SeekFrom::Start(end))
        .context("restore output position")?;
    Ok(total)
}

/// Write a structural container to `dest`, through `pipeline` when bitmaps were deferred.
///
/// Without a pipeline the bytes are copied as-is and only the length field is patched.
pub fn write_output<W: Write + Seek>(
    pipeline: Option<&mut LazyBitmapPipeline>,
    structural: &[u8],
    dest: &mut W,
) -> ShowResult<AssemblyStats> {
    match pipeline {
        Some(pipeline) => pipeline.assemble(structural, dest),
        None => {
            let begin = dest.stream_position().context("query output position")?;
            dest.write_all(structural)
                .context("write structural bytes")?;
            let bytes_written = patch_length(dest, begin)?;
            Ok(AssemblyStats {
                bytes_written,
                ..AssemblyStats::default()
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/pipeline.rs"]
mod tests;
