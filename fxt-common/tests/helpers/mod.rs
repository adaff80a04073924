//! Shared helpers for fxt-common integration tests

#![allow(dead_code)]

pub mod log_capture;
