// Helpers the pipeline stages build on.

// Splitting and rendering command lines.
pub mod command_line;
// Unpacking `.zip` and `.tar.gz` packages.
pub mod compression;
// The `Transport` trait and streaming downloads.
pub mod download;
// OS detection and manifest OS labels.
pub mod platform;
