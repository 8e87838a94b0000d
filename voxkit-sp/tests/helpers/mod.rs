//! Shared test helpers
//
// Each integration test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

pub mod audio_generator;
