/// Photo decoding and downscaling.
pub mod decode;
/// Truecolor/zlib and JPEG+alpha bitmap encoders.
pub mod delegate;
/// Deferred bitmap encoding and interleaved container assembly.
pub mod pipeline;
/// Scratch file backing the pipeline.
pub mod scratch;
/// Sepia and gray toning.
pub mod tone;
