// src/lib.rs

//! promowatch Library

pub mod archive;
pub mod error;
pub mod feed;
pub mod history;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod snapshot;
pub mod storage;
