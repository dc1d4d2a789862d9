//! Text renderings of an [`Aggregation`].
//!
//! Rows are axis dates, columns are series; absent points render as `-`.

use crate::aggregate::Aggregation;
use std::fmt::Write;

/// Placeholder for a date with no data.
const ABSENT: &str = "-";

/// Chart title for a suite.
pub fn chart_title(suite: &str) -> String {
    format!("Stone Ridge - {} Test", suite)
}

/// Generate a markdown table for an aggregation.
pub fn generate_markdown(suite: &str, aggregation: &Aggregation) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {}", chart_title(suite));
    let _ = writeln!(output);

    if aggregation.dates.is_empty() {
        let _ = writeln!(output, "No data for the selected filters.");
        return output;
    }

    let mut header = String::from("| Date |");
    let mut divider = String::from("|------|");
    for series in &aggregation.series {
        let _ = write!(header, " {} |", series.name);
        let _ = write!(divider, "{}|", "-".repeat(series.name.len() + 2));
    }
    let _ = writeln!(output, "{}", header);
    let _ = writeln!(output, "{}", divider);

    for (row, date) in aggregation.dates.dates().iter().enumerate() {
        let mut line = format!("| {} |", date);
        for series in &aggregation.series {
            let _ = write!(line, " {} |", cell(series.points[row]));
        }
        let _ = writeln!(output, "{}", line);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(
        output,
        "Series: {}, dates: {}",
        aggregation.series.len(),
        aggregation.dates.len()
    );

    output
}

/// Generate a plain, column-aligned table for terminals.
pub fn generate_table(aggregation: &Aggregation) -> String {
    let mut output = String::new();

    let widths: Vec<usize> = aggregation
        .series
        .iter()
        .map(|series| {
            series
                .points
                .iter()
                .map(|p| cell(*p).len())
                .chain(std::iter::once(series.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let _ = write!(output, "{:<8}", "date");
    for (series, width) in aggregation.series.iter().zip(&widths) {
        let _ = write!(output, "  {:>width$}", series.name, width = *width);
    }
    let _ = writeln!(output);

    for (row, date) in aggregation.dates.dates().iter().enumerate() {
        let _ = write!(output, "{:<8}", date);
        for (series, width) in aggregation.series.iter().zip(&widths) {
            let _ = write!(output, "  {:>width$}", cell(series.points[row]), width = *width);
        }
        let _ = writeln!(output);
    }

    output
}

fn cell(point: Option<f64>) -> String {
    point.map_or_else(|| ABSENT.to_string(), |value| value.to_string())
}
