//! Unit tests for the annotation file format.
//!
//! These tests cover serialization details of the JSON layout and
//! save/load round trips through the filesystem.
