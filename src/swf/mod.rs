/// Little-endian output buffer, record headers and bit packing.
pub mod output;
/// RECT, MATRIX, color transform and shape edge records.
pub mod records;
/// Tag codes and tag body writers.
pub mod tags;
/// Movie serialization.
pub mod writer;
