// src/lib.rs

//! Public-register crawler library.
//!
//! Walks a regulator's paginated register lists, follows each row to its
//! detail page, and writes per-record and aggregate JSON/CSV datasets.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
