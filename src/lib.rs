// src/lib.rs

//! Briefing RSS Library
//!
//! Fetches the briefing series page, extracts its entries and republishes
//! them as an RSS 2.0 feed.

pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
