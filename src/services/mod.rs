// src/services/mod.rs

//! External service clients.

pub mod promotions;

pub use promotions::PromotionsClient;
