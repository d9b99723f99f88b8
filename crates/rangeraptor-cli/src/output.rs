//! Output formatting for search responses.
//!
//! Text renderers return a `String` so they can be tested without capturing
//! stdout; `render_json` writes straight to stdout.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use rangeraptor_lib::{JourneyRenderMode, ResponseSummary};

use crate::terminal::{supports_color, ColorPalette};

/// How journeys are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One block per journey with a line per leg.
    #[default]
    Text,
    /// One line per journey.
    Compact,
    /// Pretty-printed JSON of the whole response.
    Json,
}

/// Render the response as one block per journey.
pub fn render_text(summary: &ResponseSummary, palette: ColorPalette) -> String {
    let p = palette;
    let mut out = String::new();
    if summary.journeys.is_empty() {
        let _ = writeln!(out, "No journey found.");
    } else {
        let _ = writeln!(
            out,
            "{}Found {} journey(s){} {}({} iterations, {} rounds){}",
            p.white_bold,
            summary.journeys.len(),
            p.reset,
            p.gray,
            summary.iterations,
            summary.rounds,
            p.reset
        );
    }
    for (index, journey) in summary.journeys.iter().enumerate() {
        let _ = writeln!(out);
        let _ = write!(out, "{}#{}{} ", p.cyan, index + 1, p.reset);
        out.push_str(&journey.render(JourneyRenderMode::PlainText));
    }
    push_timeout_warning(&mut out, summary, palette);
    out
}

/// Render the response with the one-line notation per journey.
pub fn render_compact(summary: &ResponseSummary) -> String {
    let mut out = String::new();
    for journey in &summary.journeys {
        let _ = writeln!(out, "{}", journey.render(JourneyRenderMode::Compact));
    }
    push_timeout_warning(&mut out, summary, ColorPalette::plain());
    out
}

fn push_timeout_warning(out: &mut String, summary: &ResponseSummary, p: ColorPalette) {
    if summary.timed_out {
        let _ = writeln!(
            out,
            "{}warning: search deadline passed, results may be incomplete{}",
            p.yellow, p.reset
        );
    }
}

/// Render the response in JSON format.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json(summary: &ResponseSummary) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, summary).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Print a response in the requested format.
pub fn print_response(summary: &ResponseSummary, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(summary, ColorPalette::detect())),
        OutputFormat::Compact => print!("{}", render_compact(summary)),
        OutputFormat::Json => render_json(summary)?,
    }
    Ok(())
}

/// Print the footer with elapsed time.
pub fn print_footer(elapsed: std::time::Duration) {
    let (gray, reset) = if supports_color() {
        (crate::terminal::colors::GRAY, crate::terminal::colors::RESET)
    } else {
        ("", "")
    };
    let elapsed_ms = elapsed.as_millis();
    let time_str = if elapsed_ms < 1000 {
        format!("{}ms", elapsed_ms)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    };
    println!("\n{gray}Completed in {}{reset}", time_str);
}
