//! MPEG audio layer III frame scanning and frame-rate aligned stream blocks.

use std::ops::Range;

use crate::foundation::core::Fps;
use crate::foundation::error::{ShowError, ShowResult};

const BITRATES_V1_L3: [u32; 15] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];
const BITRATES_V2_L3: [u32; 15] = [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

const SAMPLE_RATES_V1: [u32; 3] = [44100, 48000, 32000];
const SAMPLE_RATES_V2: [u32; 3] = [22050, 24000, 16000];
const SAMPLE_RATES_V25: [u32; 3] = [11025, 12000, 8000];

const ID3V2_HEADER_LEN: usize = 10;
const ID3V1_TAG_LEN: usize = 128;

/// Stream compression code for MP3 in the sound stream header.
const COMPRESSION_MP3: u8 = 2;

/// MPEG audio version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG-1.
    V1,
    /// MPEG-2 (LSF).
    V2,
    /// Unofficial MPEG-2.5.
    V25,
}

/// Decoded 4-byte layer III frame header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    /// MPEG version.
    pub version: MpegVersion,
    /// Bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Padding slot present.
    pub padding: bool,
    /// Single channel.
    pub mono: bool,
}

impl FrameHeader {
    /// Parse a frame header. Returns `None` for anything that is not a valid layer III header,
    /// including free-format and reserved bitrates.
    pub fn parse(b: [u8; 4]) -> Option<Self> {
        if b[0] != 0xff || (b[1] & 0xe0) != 0xe0 {
            return None;
        }
        let version = match (b[1] >> 3) & 0b11 {
            0b00 => MpegVersion::V25,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => return None,
        };
        if (b[1] >> 1) & 0b11 != 0b01 {
            return None;
        }
        let bitrate_idx = usize::from(b[2] >> 4);
        let rate_idx = usize::from((b[2] >> 2) & 0b11);
        if bitrate_idx == 0 || bitrate_idx == 15 || rate_idx == 3 {
            return None;
        }
        let (bitrates, rates) = match version {
            MpegVersion::V1 => (&BITRATES_V1_L3, &SAMPLE_RATES_V1),
            MpegVersion::V2 => (&BITRATES_V2_L3, &SAMPLE_RATES_V2),
            MpegVersion::V25 => (&BITRATES_V2_L3, &SAMPLE_RATES_V25),
        };
        Some(Self {
            version,
            bitrate_kbps: bitrates[bitrate_idx],
            sample_rate: rates[rate_idx],
            padding: (b[2] >> 1) & 1 == 1,
            mono: (b[3] >> 6) == 0b11,
        })
    }

    /// PCM samples per channel decoded from one frame.
    pub fn samples_per_frame(&self) -> u32 {
        match self.version {
            MpegVersion::V1 => 1152,
            MpegVersion::V2 | MpegVersion::V25 => 576,
        }
    }

    /// Total frame length in bytes, header included.
    pub fn frame_len(&self) -> usize {
        let coeff = match self.version {
            MpegVersion::V1 => 144,
            MpegVersion::V2 | MpegVersion::V25 => 72,
        };
        (coeff * self.bitrate_kbps * 1000 / self.sample_rate + u32::from(self.padding)) as usize
    }
}

/// Byte range of the audio data once ID3v2 (leading) and ID3v1 (trailing) tags are removed.
pub fn audio_payload_range(data: &[u8]) -> Range<usize> {
    let mut start = 0;
    if data.len() >= ID3V2_HEADER_LEN && &data[..3] == b"ID3" {
        let size = data[6..10]
            .iter()
            .fold(0usize, |acc, &b| (acc << 7) | usize::from(b & 0x7f));
        let footer = if data[5] & 0x10 != 0 { 10 } else { 0 };
        start = (ID3V2_HEADER_LEN + size + footer).min(data.len());
    }
    let mut end = data.len();
    if end >= start + ID3V1_TAG_LEN
        && &data[end - ID3V1_TAG_LEN..end - ID3V1_TAG_LEN + 3] == b"TAG"
    {
        end -= ID3V1_TAG_LEN;
    }
    start..end
}

/// Locate every complete layer III frame. Bytes that do not start a valid frame are skipped.
pub fn scan_frames(data: &[u8]) -> Vec<(FrameHeader, Range<usize>)> {
    let range = audio_payload_range(data);
    let mut frames = Vec::new();
    let mut pos = range.start;
    while pos + 4 <= range.end {
        let header = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
        match FrameHeader::parse(header) {
            Some(h) if h.frame_len() >= 4 && pos + h.frame_len() <= range.end => {
                frames.push((h, pos..pos + h.frame_len()));
                pos += h.frame_len();
            }
            _ => pos += 1,
        }
    }
    frames
}

/// Container code for a sample rate.
pub fn rate_code(sample_rate: u32) -> ShowResult<u8> {
    match sample_rate {
        5512 => Ok(0),
        11025 => Ok(1),
        22050 => Ok(2),
        44100 => Ok(3),
        other => Err(ShowError::format(format!(
            "unsupported MP3 sample rate {other}Hz (need 11025, 22050 or 44100)"
        ))),
    }
}

/// Declares the format of the stream blocks that follow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundStreamHead {
    /// Sample rate code (0 = 5.5kHz .. 3 = 44kHz).
    pub rate_code: u8,
    /// Two channels.
    pub stereo: bool,
    /// Average samples per block.
    pub samples_per_block: u16,
    /// Samples to skip at stream start.
    pub latency_seek: i16,
}

impl SoundStreamHead {
    /// Tag body bytes.
    pub fn to_bytes(&self) -> [u8; 6] {
        let format = (self.rate_code << 2) | 0b10 | u8::from(self.stereo);
        let [s0, s1] = self.samples_per_block.to_le_bytes();
        let [l0, l1] = self.latency_seek.to_le_bytes();
        [format, (COMPRESSION_MP3 << 4) | format, s0, s1, l0, l1]
    }
}

/// Compressed audio for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoundStreamBlock {
    /// Samples decoded from `data`.
    pub sample_count: u16,
    /// Samples to skip in the first frame of `data` to reach this frame's ideal start.
    pub seek_samples: i16,
    /// Whole MP3 frames.
    pub data: Vec<u8>,
}

impl SoundStreamBlock {
    /// Tag body bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.data.len());
        out.extend_from_slice(&self.sample_count.to_le_bytes());
        out.extend_from_slice(&self.seek_samples.to_le_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

/// One resource's stream header and its per-frame blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundStream {
    /// Stream header, emitted on the first frame.
    pub head: SoundStreamHead,
    /// One block per movie frame.
    pub blocks: Vec<SoundStreamBlock>,
}

impl SoundStream {
    /// Split MP3 bytes into blocks aligned to `fps`.
    ///
    /// Block `k` takes whole frames until the samples consumed reach the ideal end of movie
    /// frame `k`, so blocks may be empty when frames are longer than a movie frame.
    pub fn from_mp3(data: &[u8], fps: Fps) -> ShowResult<Self> {
        let frames = scan_frames(data);
        let Some(first) = frames.first().map(|(h, _)| *h) else {
            return Err(ShowError::format("no MP3 frames found"));
        };
        let code = rate_code(first.sample_rate)?;
        if let Some((h, _)) = frames.iter().find(|(h, _)| h.sample_rate != first.sample_rate) {
            return Err(ShowError::format(format!(
                "MP3 mixes sample rates {} and {}",
                first.sample_rate, h.sample_rate
            )));
        }

        let spf = f64::from(first.sample_rate) / fps.as_f64();
        let mut blocks = Vec::new();
        let mut consumed: u64 = 0;
        let mut next = 0;
        while next < frames.len() {
            let k = blocks.len() as f64;
            let ideal_start = (k * spf).round() as i64;
            let ideal_end = ((k + 1.0) * spf).round() as u64;
            let seek = (ideal_start - consumed as i64)
                .clamp(i64::from(i16::MIN), i64::from(i16::MAX));

            let mut block = SoundStreamBlock {
                seek_samples: seek as i16,
                ..SoundStreamBlock::default()
            };
            let mut samples: u32 = 0;
            while next < frames.len() && consumed < ideal_end {
                let (h, range) = &frames[next];
                block.data.extend_from_slice(&data[range.clone()]);
                samples += h.samples_per_frame();
                consumed += u64::from(h.samples_per_frame());
                next += 1;
            }
            block.sample_count = u16::try_from(samples).unwrap_or(u16::MAX);
            blocks.push(block);
        }

        Ok(Self {
            head: SoundStreamHead {
                rate_code: code,
                stereo: !first.mono,
                samples_per_block: spf.round().min(f64::from(u16::MAX)) as u16,
                latency_seek: 0,
            },
            blocks,
        })
    }

    /// Frames this stream occupies.
    pub fn frame_count(&self) -> u32 {
        u32::try_from(self.blocks.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mp3.rs"]
mod tests;
