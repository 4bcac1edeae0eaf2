// src/lib.rs - Library interface

//! Load decoded rocket flight logs and plot their telemetry columns.
//!
//! A [`FlightSession`] holds the packet table (high-rate samples), the state table (flight
//! state snapshots with stage-event timestamps), the flight computer's `.config` text and
//! the launch metadata. Tables come from `.npy`/`.csv` files, an unpacked directory, or a
//! zip archive; columns are addressed by name through a [`ColumnLayout`].
//!
//! ```rust,no_run
//! use flight_data_handler::{ChartCanvas, FlightSession, MemberFormat, RenderConfig};
//! use std::path::Path;
//!
//! let mut session = FlightSession::new(None, None);
//! let report = session.load_from_archive("flight.zip", Some("2024-06-22"), Some("v3"), MemberFormat::Npy);
//! if !report.is_complete() {
//!     eprintln!("partial load: {:?}", report.problems);
//! }
//! session.derive_stages();
//!
//! let mut canvas = ChartCanvas::new();
//! session.plot_column_with_stages(&mut canvas, "kf_position_m", None, None, None);
//! canvas.save_png(Path::new("kf_position.png"), &RenderConfig::default()).unwrap();
//! ```

pub mod constants;
pub mod data_input;
pub mod error;
pub mod font_config;
pub mod plot_framework;
pub mod plot_functions;
pub mod session;
pub mod types;

pub use data_input::columns::{ColumnLayout, PacketField, StateField};
pub use data_input::members::MemberFormat;
pub use error::{FlightDataError, MetadataField, Result, TableKind};
pub use plot_framework::{ChartCanvas, ChartRenderer, RenderConfig};
pub use session::{FlightSession, LoadReport, Outcome};
