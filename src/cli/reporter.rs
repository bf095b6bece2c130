// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::analysis::{CollectionSummary, CollisionKind, Measurement};
use crate::report::{CollisionReport, MeasurementReport};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report area and volume of one object
    pub fn report_measurement(report: &MeasurementReport, watertight: bool) {
        println!("\n{} {}", "Object:".bold(), report.name.cyan());
        Self::print_value("Surface area", &format!("{:.2} {}²", report.surface_area, report.units));
        Self::print_value("Volume", &format!("{:.2} {}³", report.volume, report.units));
        Self::print_value(
            "Bounding box volume",
            &format!("{:.2} {}³", report.bounding_box_volume, report.units),
        );
        if !watertight {
            println!(
                "  {}",
                "Mesh is not closed; the volume figure is not meaningful".yellow()
            );
        }
    }

    /// Report collection totals
    pub fn report_summary(summary: &CollectionSummary, units: &str) {
        println!();
        Self::rule();
        println!("{}", "Collection summary".bold());
        Self::rule();
        Self::print_value(
            "Objects",
            &format!("{} ({} measured)", summary.count, summary.mesh_count),
        );
        Self::print_value("Total area", &format!("{:.2} {}²", summary.total_area, units));
        Self::print_value("Total volume", &format!("{:.2} {}³", summary.total_volume, units));
        Self::rule();
    }

    /// Report clash results
    pub fn report_collisions(report: &CollisionReport, units: &str, duration: Duration) {
        println!();
        Self::rule();
        if report.total_collisions == 0 {
            println!("{} {}", "✅".green(), "No collisions detected".green().bold());
        } else {
            println!(
                "{} {} ({} intersecting, {} near)",
                "❌".red(),
                format!("{} collision(s) detected", report.total_collisions).red().bold(),
                report.count_of(CollisionKind::Intersecting),
                report.count_of(CollisionKind::Near),
            );
        }
        Self::rule();

        for c in &report.collisions {
            let tag = match c.kind {
                CollisionKind::Intersecting => c.kind.as_str().red(),
                CollisionKind::Near => c.kind.as_str().yellow(),
            };
            println!(
                "  {} {:<14} {} {} {}",
                format!("#{}", c.id).bright_black(),
                tag,
                c.object1_name.cyan(),
                "<->".bright_black(),
                c.object2_name.cyan(),
            );
            println!(
                "      {} {:.3}{}  {} ({:.2}, {:.2}, {:.2})",
                "distance".bright_black(),
                c.distance,
                units,
                "at".bright_black(),
                c.position.x,
                c.position.y,
                c.position.z,
            );
        }

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        Self::rule();
    }

    /// Report a point-to-point measurement
    pub fn report_distance(measurement: &Measurement, units: &str) {
        Self::print_value("Distance", &measurement.label(units));
        let m = measurement.midpoint;
        Self::print_value("Midpoint", &format!("({:.2}, {:.2}, {:.2})", m.x, m.y, m.z));
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn print_value(name: &str, value: &str) {
        println!("  {} {}", format!("{}:", name).bright_black(), value.cyan());
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
