// src/session.rs

//! [`FlightSession`]: the packet and state tables of one flight, plus the metadata and
//! column layouts needed to read them.
//!
//! Loaders replace whole tables. Readers and plotters only observe the session;
//! `derive_stages` is the one operation besides loading that changes it.

use std::fmt;
use std::io::{self, Read, Seek, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::constants::{CONFIG_FILE_SUFFIX, STAGE_SNAPSHOT_ROW};
use crate::data_input::array_store::{read_delimited_table, read_npy_bytes, read_table_file};
use crate::data_input::columns::ColumnLayout;
use crate::data_input::members::{find_config_member, DirectoryMembers, MemberFormat, MemberSource, ZipMembers};
use crate::error::{FlightDataError, MetadataField, Result, TableKind};
use crate::plot_framework::ChartRenderer;
use crate::plot_functions::{plot_column, plot_column_with_stages};
use crate::types::{StageTimestamps, Table};

/// Result of a read or plot operation that reports problems instead of failing.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    /// Nothing was drawn or changed.
    Skipped(FlightDataError),
}

impl<T> Outcome<T> {
    /// Log the reason and return `Skipped`.
    pub(crate) fn skipped(reason: FlightDataError) -> Self {
        warn!("{reason}");
        Outcome::Skipped(reason)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&FlightDataError> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Skipped(reason) => Some(reason),
        }
    }
}

/// What a load call did.
///
/// `warnings` holds omitted metadata. `problems` holds archive conditions that stopped a
/// member from loading (invalid container, missing or undecodable member); members that
/// were read are listed in `loaded` and stay applied.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub source: PathBuf,
    pub loaded: Vec<String>,
    pub warnings: Vec<FlightDataError>,
    pub problems: Vec<FlightDataError>,
}

impl LoadReport {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Self::default()
        }
    }

    fn warn(&mut self, warning: FlightDataError) {
        warn!("Warning. {warning}.");
        self.warnings.push(warning);
    }

    fn problem(&mut self, problem: FlightDataError) {
        warn!(source = %self.source.display(), "Error: {problem}");
        self.problems.push(problem);
    }

    /// No member was missing or unreadable.
    pub fn is_complete(&self) -> bool {
        self.problems.is_empty()
    }

    /// The first problem in member order.
    pub fn first_problem(&self) -> Option<&FlightDataError> {
        self.problems.first()
    }

    pub fn is_missing_metadata(&self, field: MetadataField) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, FlightDataError::MissingMetadata { field: f } if *f == field))
    }
}

#[derive(Debug, Clone)]
pub struct FlightSession {
    launch_date: Option<String>,
    board_version: Option<String>,
    packet_table: Option<Table>,
    state_table: Option<Table>,
    config: Option<String>,
    packet_columns: ColumnLayout,
    state_columns: ColumnLayout,
    stage_timestamps: Option<StageTimestamps>,
    source: Option<PathBuf>,
}

impl Default for FlightSession {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl FlightSession {
    /// Empty session with the default packet and state layouts.
    pub fn new(launch_date: Option<&str>, board_version: Option<&str>) -> Self {
        Self {
            launch_date: launch_date.map(str::to_string),
            board_version: board_version.map(str::to_string),
            packet_table: None,
            state_table: None,
            config: None,
            packet_columns: ColumnLayout::packet_default(),
            state_columns: ColumnLayout::state_default(),
            stage_timestamps: None,
            source: None,
        }
    }

    // --- Metadata ---

    pub fn launch_date(&self) -> Option<&str> {
        self.launch_date.as_deref()
    }

    pub fn board_version(&self) -> Option<&str> {
        self.board_version.as_deref()
    }

    pub fn set_launch_date(&mut self, launch_date: impl Into<String>) {
        self.launch_date = Some(launch_date.into());
    }

    pub fn set_board_version(&mut self, board_version: impl Into<String>) {
        self.board_version = Some(board_version.into());
    }

    /// Write the two-line metadata summary to `out`.
    pub fn describe<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", MetadataSummary(self))
    }

    /// Print the metadata summary to stdout.
    pub fn display_metadata(&self) {
        print!("{}", MetadataSummary(self));
    }

    // --- Tables and layouts ---

    pub fn packet_table(&self) -> Option<&Table> {
        self.packet_table.as_ref()
    }

    pub fn state_table(&self) -> Option<&Table> {
        self.state_table.as_ref()
    }

    /// Install an already decoded packet table, replacing the current one.
    pub fn replace_packet_table(&mut self, table: Table) {
        self.packet_table = Some(table);
    }

    /// Install an already decoded state table. Derived stages are left as they are.
    pub fn replace_state_table(&mut self, table: Table) {
        self.state_table = Some(table);
    }

    /// Decoded `.config` member of the last archive load.
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Path of the most recent load call.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn packet_columns(&self) -> &ColumnLayout {
        &self.packet_columns
    }

    pub fn state_columns(&self) -> &ColumnLayout {
        &self.state_columns
    }

    /// Replace the packet layout wholesale. No validation happens here.
    pub fn set_packet_columns(&mut self, layout: ColumnLayout) {
        debug!(columns = layout.len(), "Packet column layout replaced");
        self.packet_columns = layout;
    }

    /// Replace the state layout wholesale. No validation happens here.
    pub fn set_state_columns(&mut self, layout: ColumnLayout) {
        debug!(columns = layout.len(), "State column layout replaced");
        self.state_columns = layout;
    }

    /// Stage timestamps from the last successful [`derive_stages`](Self::derive_stages).
    pub fn stage_timestamps(&self) -> Option<&StageTimestamps> {
        self.stage_timestamps.as_ref()
    }

    /// Forget derived stages, e.g. after reloading the state table.
    pub fn invalidate_stages(&mut self) {
        self.stage_timestamps = None;
    }

    // --- Loading ---

    fn apply_metadata(&mut self, launch_date: Option<&str>, board_version: Option<&str>, report: &mut LoadReport) {
        self.launch_date = launch_date.map(str::to_string);
        if self.launch_date.is_none() {
            report.warn(FlightDataError::MissingMetadata {
                field: MetadataField::LaunchDate,
            });
        }
        self.board_version = board_version.map(str::to_string);
        if self.board_version.is_none() {
            report.warn(FlightDataError::MissingMetadata {
                field: MetadataField::BoardVersion,
            });
        }
    }

    /// Load one table from an array file, replacing the packet or state table.
    ///
    /// Omitted metadata only produces warnings. Read failures propagate.
    pub fn load_from_arrays(
        &mut self,
        path: impl AsRef<Path>,
        launch_date: Option<&str>,
        board_version: Option<&str>,
        table: TableKind,
    ) -> Result<LoadReport> {
        let path = path.as_ref();
        let mut report = LoadReport::new(path);
        self.apply_metadata(launch_date, board_version, &mut report);
        self.source = Some(path.to_path_buf());

        let data = read_table_file(path)?;
        info!(path = %path.display(), %table, rows = data.nrows(), columns = data.ncols(), "Loaded table");
        match table {
            TableKind::Packet => self.packet_table = Some(data),
            TableKind::State => self.state_table = Some(data),
        }
        report.loaded.push(path.display().to_string());
        Ok(report)
    }

    /// Load packet, state and config members from a zip archive.
    ///
    /// Problems are reported in the returned [`LoadReport`], never raised. Every member
    /// that can be read is applied, so a report with problems can leave the session
    /// partially loaded. An archive that cannot be opened leaves the tables untouched.
    pub fn load_from_archive(
        &mut self,
        path: impl AsRef<Path>,
        launch_date: Option<&str>,
        board_version: Option<&str>,
        format: MemberFormat,
    ) -> LoadReport {
        let path = path.as_ref();
        let mut report = LoadReport::new(path);
        self.apply_metadata(launch_date, board_version, &mut report);
        self.source = Some(path.to_path_buf());

        match ZipMembers::open(path) {
            Ok(mut members) => self.load_members(&mut members, format, &mut report),
            Err(e) => report.problem(e),
        }
        report
    }

    /// Same as [`load_from_archive`](Self::load_from_archive) for an archive already in
    /// memory or otherwise opened; `label` names it in reports.
    pub fn load_from_archive_reader<R: Read + Seek>(
        &mut self,
        reader: R,
        label: impl AsRef<Path>,
        launch_date: Option<&str>,
        board_version: Option<&str>,
        format: MemberFormat,
    ) -> LoadReport {
        let label = label.as_ref();
        let mut report = LoadReport::new(label);
        self.apply_metadata(launch_date, board_version, &mut report);
        self.source = Some(label.to_path_buf());

        match ZipMembers::new(reader, label) {
            Ok(mut members) => self.load_members(&mut members, format, &mut report),
            Err(e) => report.problem(e),
        }
        report
    }

    /// Load the same three members from an unpacked directory.
    pub fn load_from_directory(
        &mut self,
        dir: impl AsRef<Path>,
        launch_date: Option<&str>,
        board_version: Option<&str>,
        format: MemberFormat,
    ) -> LoadReport {
        let dir = dir.as_ref();
        let mut report = LoadReport::new(dir);
        self.apply_metadata(launch_date, board_version, &mut report);
        self.source = Some(dir.to_path_buf());

        self.load_members(&mut DirectoryMembers::new(dir), format, &mut report);
        report
    }

    fn load_members(&mut self, source: &mut dyn MemberSource, format: MemberFormat, report: &mut LoadReport) {
        let names = match source.member_names() {
            Ok(names) => names,
            Err(e) => {
                report.problem(e);
                return;
            }
        };
        debug!(location = %source.location().display(), members = ?names, "Listing members");

        for (table, member) in [
            (TableKind::Packet, format.packet_member()),
            (TableKind::State, format.state_member()),
        ] {
            if !names.contains(&member) {
                report.problem(FlightDataError::MissingMember { name: member });
                continue;
            }
            match read_table_member(source, &member, format) {
                Ok(data) => {
                    info!(member = %member, rows = data.nrows(), columns = data.ncols(), "Loaded table");
                    match table {
                        TableKind::Packet => self.packet_table = Some(data),
                        TableKind::State => self.state_table = Some(data),
                    }
                    report.loaded.push(member);
                }
                Err(e) => report.problem(e),
            }
        }

        let Some(config_name) = find_config_member(&names) else {
            report.problem(FlightDataError::MissingMember {
                name: format!("*{CONFIG_FILE_SUFFIX}"),
            });
            return;
        };
        let text = source.read_member(config_name).and_then(|bytes| {
            String::from_utf8(bytes).map_err(|e| FlightDataError::format(config_name, e))
        });
        match text {
            Ok(text) => {
                info!(member = config_name, bytes = text.len(), "Loaded config");
                self.config = Some(text);
                report.loaded.push(config_name.to_string());
            }
            Err(e) => report.problem(e),
        }
    }

    // --- Reading ---

    /// Values of a packet column over `[start, end)` together with the resolved range.
    pub(crate) fn column_slice(
        &self,
        column_name: &str,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<(Range<usize>, Vec<f64>)> {
        let Some(packets) = &self.packet_table else {
            return Err(FlightDataError::NoDataLoaded { table: TableKind::Packet });
        };
        let Some(index) = self.packet_columns.index_of(column_name) else {
            return Err(FlightDataError::ColumnNotFound {
                name: column_name.to_string(),
            });
        };
        if index >= packets.ncols() {
            return Err(FlightDataError::ColumnOutOfRange {
                name: column_name.to_string(),
                index,
                width: packets.ncols(),
                table: TableKind::Packet,
            });
        }
        let range = resolve_range(start, end, packets.nrows());
        let values = packets
            .column(index)
            .iter()
            .skip(range.start)
            .take(range.len())
            .copied()
            .collect();
        Ok((range, values))
    }

    /// Values of a packet column over `[start, end)`; the same slice `plot_column` draws.
    pub fn column(&self, column_name: &str, start: Option<usize>, end: Option<usize>) -> Outcome<Vec<f64>> {
        match self.column_slice(column_name, start, end) {
            Ok((_, values)) => Outcome::Completed(values),
            Err(e) => Outcome::skipped(e),
        }
    }

    /// Read every state column from the stage snapshot row into `stage_timestamps`.
    ///
    /// Returns the number of stages stored. Replaces any earlier mapping.
    pub fn derive_stages(&mut self) -> Outcome<usize> {
        let Some(states) = &self.state_table else {
            return Outcome::skipped(FlightDataError::NoDataLoaded { table: TableKind::State });
        };
        if states.nrows() <= STAGE_SNAPSHOT_ROW {
            return Outcome::skipped(FlightDataError::RowOutOfRange {
                row: STAGE_SNAPSHOT_ROW,
                rows: states.nrows(),
                table: TableKind::State,
            });
        }

        let snapshot = states.row(STAGE_SNAPSHOT_ROW);
        let mut stages = StageTimestamps::with_capacity(self.state_columns.len());
        for (name, index) in self.state_columns.iter() {
            let Some(&timestamp) = snapshot.get(index) else {
                return Outcome::skipped(FlightDataError::ColumnOutOfRange {
                    name: name.to_string(),
                    index,
                    width: states.ncols(),
                    table: TableKind::State,
                });
            };
            stages.insert(name.to_string(), timestamp);
        }

        let count = stages.len();
        debug!(stages = ?stages, "Derived stage timestamps");
        self.stage_timestamps = Some(stages);
        Outcome::Completed(count)
    }

    // --- Plotting ---

    /// Draw one packet column over `[start, end)` (defaults: whole table).
    pub fn plot_column<R: ChartRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        column_name: &str,
        title: Option<&str>,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Outcome<Range<usize>> {
        plot_column::plot_column(self, renderer, column_name, title, start, end)
    }

    /// Draw stage markers, then the column as in [`plot_column`](Self::plot_column).
    pub fn plot_column_with_stages<R: ChartRenderer + ?Sized>(
        &self,
        renderer: &mut R,
        column_name: &str,
        title: Option<&str>,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Outcome<Range<usize>> {
        plot_column_with_stages::plot_column_with_stages(self, renderer, column_name, title, start, end)
    }
}

/// Slice bounds with the defaults and clamping of `table[start:end]`.
pub fn resolve_range(start: Option<usize>, end: Option<usize>, rows: usize) -> Range<usize> {
    let end = end.unwrap_or(rows).min(rows);
    let start = start.unwrap_or(0).min(end);
    start..end
}

fn read_table_member(source: &mut dyn MemberSource, name: &str, format: MemberFormat) -> Result<Table> {
    let bytes = source.read_member(name)?;
    match format {
        MemberFormat::Npy => read_npy_bytes(&bytes, name),
        MemberFormat::Csv => read_delimited_table(bytes.as_slice(), true, name),
    }
}

struct MetadataSummary<'a>(&'a FlightSession);

impl fmt::Display for MetadataSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Launch Date: {}", self.0.launch_date().unwrap_or("None"))?;
        writeln!(f, "Board Version: {}", self.0.board_version().unwrap_or("None"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::columns::PacketField;
    use crate::plot_framework::ChartCanvas;
    use ndarray::Array2;

    fn packet_table(rows: usize) -> Table {
        Array2::from_shape_fn((rows, 29), |(r, c)| (r * 100 + c) as f64)
    }

    fn state_table() -> Table {
        Array2::from_shape_vec(
            (2, 7),
            vec![
                0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
                1.0, 7.0, 10.0, 42.0, 43.0, 80.0, 120.0,
            ],
        )
        .unwrap()
    }

    fn loaded_session() -> FlightSession {
        let mut session = FlightSession::new(Some("2024-06-22"), Some("v3"));
        session.packet_table = Some(packet_table(10));
        session.state_table = Some(state_table());
        session
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = FlightSession::new(None, None);
        assert!(session.packet_table().is_none());
        assert!(session.state_table().is_none());
        assert!(session.config().is_none());
        assert!(session.stage_timestamps().is_none());
        assert_eq!(session.packet_columns(), &ColumnLayout::packet_default());
        assert_eq!(session.state_columns(), &ColumnLayout::state_default());
    }

    #[test]
    fn test_describe() {
        let mut session = FlightSession::new(Some("2024-06-22"), None);
        let mut out = Vec::new();
        session.describe(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Launch Date: 2024-06-22\nBoard Version: None\n");

        session.set_board_version("v3");
        let mut out = Vec::new();
        session.describe(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("Board Version: v3\n"));
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(None, None, 10), 0..10);
        assert_eq!(resolve_range(Some(3), None, 10), 3..10);
        assert_eq!(resolve_range(None, Some(50), 10), 0..10);
        assert_eq!(resolve_range(Some(8), Some(4), 10), 4..4);
        assert_eq!(resolve_range(Some(20), None, 10), 10..10);
    }

    #[test]
    fn test_plot_column_covers_all_rows_by_default() {
        let session = loaded_session();
        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column(&mut canvas, "time_us", None, None, None);
        assert_eq!(outcome.completed(), Some(0..10));

        let series = &canvas.series()[0];
        assert_eq!(series.data.len(), 10);
        assert_eq!(series.data[3], (3.0, 302.0));
        assert_eq!(series.label, "time_us");
        assert_eq!(canvas.title(), "time_us over Time");
        assert_eq!(canvas.axis_labels(), ("Index", "time_us"));
        assert!(canvas.legend_visible());
        assert!(canvas.grid_visible());
    }

    #[test]
    fn test_plot_column_subrange_and_title() {
        let session = loaded_session();
        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column(&mut canvas, "kf_position_m", Some("Altitude"), Some(2), Some(5));
        assert_eq!(outcome.completed(), Some(2..5));
        assert_eq!(canvas.series()[0].data, vec![(2.0, 223.0), (3.0, 323.0), (4.0, 423.0)]);
        assert_eq!(canvas.title(), "Altitude");
    }

    #[test]
    fn test_plot_column_without_data_is_noop() {
        let session = FlightSession::new(None, None);
        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column(&mut canvas, "time_us", None, None, None);
        assert!(matches!(
            outcome.skip_reason(),
            Some(FlightDataError::NoDataLoaded { table: TableKind::Packet })
        ));
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_plot_unknown_column_is_noop() {
        let session = loaded_session();
        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column(&mut canvas, "nonexistent_field", None, None, None);
        assert!(matches!(outcome.skip_reason(), Some(FlightDataError::ColumnNotFound { .. })));
        assert!(canvas.is_empty());
        assert!(canvas.title().is_empty());
    }

    #[test]
    fn test_replaced_layout_hides_field() {
        let mut session = loaded_session();
        let mut layout = ColumnLayout::packet_default();
        layout.remove(PacketField::GpsHmslM.name());
        session.set_packet_columns(layout);

        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column(&mut canvas, "gps_hMSL_m", None, None, None);
        assert!(matches!(outcome.skip_reason(), Some(FlightDataError::ColumnNotFound { .. })));
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_layout_index_past_table_width_is_reported() {
        let mut session = loaded_session();
        session.set_packet_columns([("extra", 40)].into_iter().collect());
        let outcome = session.column("extra", None, None);
        assert!(matches!(
            outcome.skip_reason(),
            Some(FlightDataError::ColumnOutOfRange { index: 40, width: 29, .. })
        ));
    }

    #[test]
    fn test_derive_stages_reads_snapshot_row() {
        let mut session = loaded_session();
        assert_eq!(session.derive_stages().completed(), Some(7));
        let stages = session.stage_timestamps().unwrap();
        assert_eq!(stages["ts_apogee"], 42.0);
        assert_eq!(stages["ts_sus"], 120.0);
        let names: Vec<&str> = stages.keys().map(String::as_str).collect();
        assert_eq!(names[0], "magic");
        assert_eq!(names[6], "ts_sus");
    }

    #[test]
    fn test_derive_stages_is_idempotent() {
        let mut session = loaded_session();
        session.derive_stages();
        let first = session.stage_timestamps().cloned();
        session.derive_stages();
        assert_eq!(session.stage_timestamps().cloned(), first);
    }

    #[test]
    fn test_derive_stages_needs_state_rows() {
        let mut session = FlightSession::default();
        assert!(matches!(
            session.derive_stages().skip_reason(),
            Some(FlightDataError::NoDataLoaded { table: TableKind::State })
        ));

        session.state_table = Some(Array2::zeros((1, 7)));
        assert!(matches!(
            session.derive_stages().skip_reason(),
            Some(FlightDataError::RowOutOfRange { rows: 1, .. })
        ));
        assert!(session.stage_timestamps().is_none());
    }

    #[test]
    fn test_plot_with_stages_before_derive_is_noop() {
        let session = loaded_session();
        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column_with_stages(&mut canvas, "time_us", None, None, None);
        assert!(matches!(
            outcome.skip_reason(),
            Some(FlightDataError::NoDataLoaded { table: TableKind::State })
        ));
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_plot_with_stages_draws_markers_then_series() {
        let mut session = loaded_session();
        session.derive_stages();
        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column_with_stages(&mut canvas, "barometer_hMSL_m", None, None, None);
        assert!(outcome.is_completed());

        let markers = canvas.markers();
        assert_eq!(markers.len(), 7);
        assert_eq!(markers[3].label, "ts_apogee");
        assert_eq!(markers[3].x, 42.0);
        assert_eq!(markers[3].color, crate::constants::STAGE_MARKER_PALETTE[3]);
        assert_eq!(canvas.series().len(), 1);
        assert_eq!(canvas.title(), "barometer_hMSL_m over Time");
    }

    #[test]
    fn test_invalidate_stages() {
        let mut session = loaded_session();
        session.derive_stages();
        session.invalidate_stages();
        assert!(session.stage_timestamps().is_none());
    }
}

// src/session.rs
