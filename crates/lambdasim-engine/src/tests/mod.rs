//! Tests for the lambdasim-engine crate.

mod helpers;
