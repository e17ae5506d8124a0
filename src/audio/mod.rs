/// Layer III frame scanning and stream blocks.
pub mod mp3;
/// `.m3u` playlist resolution.
pub mod playlist;
/// Locators, pluggable openers and URI helpers.
pub mod source;
/// Audio tracks built from one or more resources.
pub mod track;
