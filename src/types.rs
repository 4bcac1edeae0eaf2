// src/types.rs
// Type aliases shared across loaders and plotting

use indexmap::IndexMap;
use ndarray::Array2;

// Packet and state tables: rows are samples, columns follow a ColumnLayout.
pub type Table = Array2<f64>;

// Stage name -> event timestamp, in state layout order.
pub type StageTimestamps = IndexMap<String, f64>;

// Plot data: (x, y) points of one line series.
pub type SeriesPoints = Vec<(f64, f64)>;
