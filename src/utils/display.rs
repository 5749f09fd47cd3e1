//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::river::{Interpretation, RiverReport};
use crate::sweep::SweepSeries;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Format results for the console and for text files
pub struct ReportFormatter;

impl ReportFormatter {
    /// One line per time step
    pub fn format_plan(plan: &Interpretation) -> String {
        let mut output = String::new();
        for (step, state) in plan.steps.iter().enumerate() {
            output.push_str(&format!("Step {}: {}\n", step, state));
        }
        output
    }

    pub fn format_river_report(report: &RiverReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== River crossing, {} steps ===\n", report.num_steps));
        output.push_str(&format!(
            "Variables: {}, clauses: {}\n",
            report.variables, report.clauses
        ));
        output.push_str(&format!(
            "Solve Time: {:.3}s\n",
            report.solve_time.as_secs_f64()
        ));

        if report.solutions.is_empty() {
            output.push_str("No plan fits this horizon\n");
            return output;
        }

        for (i, solution) in report.solutions.iter().enumerate() {
            output.push_str(&format!("\nPlan {}:\n", i + 1));
            output.push_str(&Self::format_plan(&solution.plan));
            output.push_str(&format!("Check: {}\n", solution.report));
        }

        output
    }

    /// Table of the sweep series
    pub fn format_sweep_table(series: &SweepSeries) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Pigeonhole sweep ({:?} encoding, {:?} backend):\n",
            series.encoding, series.backend
        ));
        output.push_str("  n | Variables | Clauses | Result | Time(s)\n");
        output.push_str("----|-----------|---------|--------|---------\n");

        for point in &series.points {
            let clauses = point
                .clauses
                .map_or_else(|| "-".to_string(), |c| c.to_string());
            output.push_str(&format!(
                "{:3} | {:9} | {:>7} | {:6} | {:8.4}\n",
                point.pigeons,
                point.variables,
                clauses,
                if point.satisfiable { "SAT" } else { "UNSAT" },
                point.seconds
            ));
        }

        output.push_str(&format!("Total: {:.3}s\n", series.total_seconds()));
        output
    }
}

/// Write `value` to `output_dir/stem.{txt,json}` and return the path
pub fn save_report<T: Serialize>(
    value: &T,
    text: &str,
    output_dir: &Path,
    stem: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let (path, content) = match format {
        OutputFormat::Text => (output_dir.join(format!("{}.txt", stem)), text.to_string()),
        OutputFormat::Json => (
            output_dir.join(format!("{}.json", stem)),
            serde_json::to_string_pretty(value).context("Failed to serialize report")?,
        ),
    };

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, PigeonholeEncoding};
    use crate::river::{Entity, StepState};
    use crate::sweep::SweepPoint;
    use tempfile::tempdir;

    fn series() -> SweepSeries {
        SweepSeries {
            encoding: PigeonholeEncoding::OneHot,
            backend: Backend::Sat,
            points: vec![SweepPoint {
                pigeons: 4,
                seconds: 0.25,
                variables: 12,
                clauses: Some(22),
                satisfiable: false,
            }],
        }
    }

    #[test]
    fn test_plan_formatting() {
        let plan = Interpretation {
            steps: vec![StepState {
                west: vec![Entity::Wolf],
                east: vec![Entity::Goat],
            }],
        };
        assert_eq!(
            ReportFormatter::format_plan(&plan),
            "Step 0: West: [Wolf] | East: [Goat]\n"
        );
    }

    #[test]
    fn test_sweep_table() {
        let table = ReportFormatter::format_sweep_table(&series());
        assert!(table.contains("  4 |        12 |      22 | UNSAT"));
        assert!(table.contains("Total: 0.250s"));
    }

    #[test]
    fn test_save_report_formats() {
        let dir = tempdir().unwrap();
        let series = series();
        let text = ReportFormatter::format_sweep_table(&series);

        let txt = save_report(&series, &text, dir.path(), "sweep", OutputFormat::Text).unwrap();
        assert_eq!(txt, dir.path().join("sweep.txt"));
        assert_eq!(std::fs::read_to_string(&txt).unwrap(), text);

        let json = save_report(&series, &text, dir.path(), "sweep", OutputFormat::Json).unwrap();
        let loaded: SweepSeries =
            serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::success("OK").contains("OK"));
    }
}
