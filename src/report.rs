//! Plain-text reports for the CLI.

use lotmap_analytics::{MapSummary, RankedLot};
use lotmap_core::{format_area, AreaUnit};
use std::fmt::Write;

pub fn summary_table(summary: &MapSummary) -> String {
    let rows = [
        ("Lots", summary.total_lots),
        ("  active", summary.active_lots),
        ("  inactive", summary.inactive_lots),
        ("Sublots", summary.total_sublots),
        ("With coordinates", summary.with_coordinates),
        ("Without coordinates", summary.without_coordinates),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:<20} {:>6}", label, value);
    }
    out
}

/// One line per ranked lot: position, name, area, status, crop types.
pub fn ranking_table(ranking: &[RankedLot], unit: AreaUnit) -> String {
    if ranking.is_empty() {
        return "No lots to rank\n".to_string();
    }

    let name_width = ranking
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    for (position, lot) in ranking.iter().enumerate() {
        let crops = lot
            .crop_types
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{:>2}. {:<width$}  {:>14}  {:<8}  {}",
            position + 1,
            lot.name,
            format_area(lot.area_m2, unit),
            if lot.active { "active" } else { "inactive" },
            crops,
            width = name_width
        );
    }
    out
}
