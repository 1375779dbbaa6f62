//! Integration tests for the vfx sequence and movie crates.
//!
//! These tests write real PNG frames, discover them through the image
//! decoder and run whole shoot sessions against a recording encoder, so no
//! ffmpeg is needed.
