// src/models/mod.rs

pub mod user;
pub mod token;
pub mod tag;
pub mod recipe;
pub mod price;
