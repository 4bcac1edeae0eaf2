// src/constants.rs

// Import specific colors needed
use plotters::style::colors::full_palette::{
    AMBER, BLUE, BROWN, DEEPPURPLE, GREEN, GREY, ORANGE, PINK, RED, TEAL,
};
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;

// Font sizes.
pub const FONT_SIZE_CHART_TITLE: i32 = 28;
pub const FONT_SIZE_AXIS_LABEL: i32 = 16;
pub const FONT_SIZE_LEGEND: i32 = 16;
pub const FONT_SIZE_MESSAGE: i32 = 24;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;
pub const LINE_WIDTH_STAGE_MARKER: u32 = 2;

// --- Archive member naming ---
pub const PACKET_DATA_STEM: &str = "packet_data";
pub const STATE_DATA_STEM: &str = "state_data";
pub const CONFIG_FILE_SUFFIX: &str = ".config";
pub const NPY_EXTENSION: &str = "npy";
pub const CSV_EXTENSION: &str = "csv";
/// Upper bound on the buffer reserved up front for one archive member (64 MiB).
pub const MAX_MEMBER_PREALLOC: u64 = 1 << 26;

// State table row holding the stage-event timestamps.
pub const STAGE_SNAPSHOT_ROW: usize = 1;

// Axis label for the sample-index x-axis.
pub const X_AXIS_LABEL_INDEX: &str = "Index";

// --- Plot Color Assignments ---
// Stage markers cycle through this palette (marker i uses STAGE_MARKER_PALETTE[i % 8]).
pub const STAGE_MARKER_PALETTE: [RGBColor; 8] = [RED, GREEN, BLUE, ORANGE, DEEPPURPLE, BROWN, PINK, GREY];

// Line series colors, cycled in draw order.
pub const SERIES_PALETTE: [RGBColor; 4] = [BLUE, ORANGE, TEAL, AMBER];

// src/constants.rs
