// src/plot_functions/plot_column_with_stages.rs

use std::ops::Range;

use crate::constants::STAGE_MARKER_PALETTE;
use crate::error::{FlightDataError, TableKind};
use crate::plot_framework::ChartRenderer;
use crate::plot_functions::plot_column::draw_column_series;
use crate::session::{FlightSession, Outcome};

/// Draws a vertical marker per derived stage, then the packet column.
///
/// Without derived stages nothing is drawn at all, not even the column.
pub fn plot_column_with_stages<R: ChartRenderer + ?Sized>(
    session: &FlightSession,
    renderer: &mut R,
    column_name: &str,
    title: Option<&str>,
    start: Option<usize>,
    end: Option<usize>,
) -> Outcome<Range<usize>> {
    let (range, values) = match session.column_slice(column_name, start, end) {
        Ok(slice) => slice,
        Err(e) => return Outcome::skipped(e),
    };
    let stages = match session.stage_timestamps() {
        Some(stages) if !stages.is_empty() => stages,
        _ => return Outcome::skipped(FlightDataError::NoDataLoaded { table: TableKind::State }),
    };

    for (i, (stage, &timestamp)) in stages.iter().enumerate() {
        let color = STAGE_MARKER_PALETTE[i % STAGE_MARKER_PALETTE.len()];
        renderer.draw_vertical_marker(timestamp, color, stage);
    }
    draw_column_series(renderer, column_name, title, range.clone(), &values);
    Outcome::Completed(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::columns::ColumnLayout;
    use crate::plot_framework::ChartCanvas;
    use ndarray::Array2;

    #[test]
    fn test_marker_palette_cycles_after_eight_stages() {
        let mut session = FlightSession::new(None, None);
        session.replace_packet_table(Array2::zeros((4, 29)));
        session.replace_state_table(Array2::from_shape_fn((2, 10), |(r, c)| (r * c) as f64));
        session.set_state_columns((0..10).map(|i| (format!("event_{i}"), i)).collect::<ColumnLayout>());
        assert_eq!(session.derive_stages().completed(), Some(10));

        let mut canvas = ChartCanvas::new();
        assert!(session
            .plot_column_with_stages(&mut canvas, "status", None, None, None)
            .is_completed());

        let markers = canvas.markers();
        assert_eq!(markers.len(), 10);
        assert_eq!(markers[8].color, markers[0].color);
        assert_eq!(markers[9].color, markers[1].color);
        assert_ne!(markers[7].color, markers[0].color);
        assert_eq!(markers[9].x, 9.0);
    }

    #[test]
    fn test_unknown_column_draws_no_markers() {
        let mut session = FlightSession::new(None, None);
        session.replace_packet_table(Array2::zeros((4, 29)));
        session.replace_state_table(Array2::ones((2, 7)));
        session.derive_stages();

        let mut canvas = ChartCanvas::new();
        let outcome = session.plot_column_with_stages(&mut canvas, "altitude", None, None, None);
        assert!(matches!(outcome.skip_reason(), Some(FlightDataError::ColumnNotFound { .. })));
        assert!(canvas.markers().is_empty());
    }
}

// src/plot_functions/plot_column_with_stages.rs
