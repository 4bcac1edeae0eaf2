// src/data_input/mod.rs

pub mod array_store;
pub mod columns;
pub mod members;

// src/data_input/mod.rs
