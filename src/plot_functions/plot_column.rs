// src/plot_functions/plot_column.rs

use std::ops::Range;

use crate::constants::X_AXIS_LABEL_INDEX;
use crate::plot_framework::ChartRenderer;
use crate::session::{FlightSession, Outcome};

/// Default chart title for a column plot.
pub fn default_title(column_name: &str) -> String {
    format!("{column_name} over Time")
}

/// Draws one packet column against row index over `[start, end)`.
///
/// Reports (and draws nothing) when no packet table is loaded or the column is unknown.
pub fn plot_column<R: ChartRenderer + ?Sized>(
    session: &FlightSession,
    renderer: &mut R,
    column_name: &str,
    title: Option<&str>,
    start: Option<usize>,
    end: Option<usize>,
) -> Outcome<Range<usize>> {
    match session.column_slice(column_name, start, end) {
        Ok((range, values)) => {
            draw_column_series(renderer, column_name, title, range.clone(), &values);
            Outcome::Completed(range)
        }
        Err(e) => Outcome::skipped(e),
    }
}

/// Line, title, axis labels, legend and grid of a column plot.
pub(crate) fn draw_column_series<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    column_name: &str,
    title: Option<&str>,
    range: Range<usize>,
    values: &[f64],
) {
    renderer.draw_line(range, values, column_name);
    match title.filter(|t| !t.is_empty()) {
        Some(title) => renderer.set_title(title),
        None => renderer.set_title(&default_title(column_name)),
    }
    renderer.set_axis_labels(X_AXIS_LABEL_INDEX, column_name);
    renderer.show_legend();
    renderer.show_grid(true);
}


// src/plot_functions/plot_column.rs
