// src/plot_functions/mod.rs

pub mod plot_column;
pub mod plot_column_with_stages;

// src/plot_functions/mod.rs
