use std::collections::BTreeMap;

use clap::Parser;
use polars::prelude::*;

use crate::{
    commands::{
        report::{data, ProfileTimings},
        run::BenchRunner,
    },
    utils::md::MarkdownPrinter,
};

/// Width of the y-axis labels, in characters.
const LABEL_WIDTH: usize = 10;

/// Plot the median CPU time against the number count, one marker per build
#[derive(Parser)]
pub struct PlotArgs {
    /// The profile to plot.
    #[arg(long, default_value = "default")]
    pub profile: String,
    /// Plot width in characters.
    #[arg(long, default_value = "64")]
    pub width: usize,
    /// Plot height in lines.
    #[arg(long, default_value = "20")]
    pub height: usize,
}

/// (count, median ns) points of every build, from the output of [`data::median_over_trials`].
pub fn medians_by_build(per_count: &DataFrame) -> anyhow::Result<BTreeMap<String, Vec<(f64, f64)>>> {
    let builds = per_count.column("build")?.str()?;
    let counts = per_count.column("count")?.cast(&DataType::Float64)?;
    let medians = per_count.column("median")?.cast(&DataType::Float64)?;
    let mut points = BTreeMap::<String, Vec<(f64, f64)>>::new();
    for ((build, count), median) in builds.into_iter().zip(counts.f64()?).zip(medians.f64()?) {
        let (Some(build), Some(count), Some(median)) = (build, count, median) else {
            anyhow::bail!("Missing values in the per-count medians");
        };
        points
            .entry(build.to_owned())
            .or_default()
            .push((count, median));
    }
    Ok(points)
}

/// Position of `v` on an axis of `cells` cells spanning `lo..=hi`.
fn cell(v: f64, lo: f64, hi: f64, cells: usize) -> usize {
    if hi > lo {
        ((v - lo) / (hi - lo) * (cells - 1) as f64).round() as usize
    } else {
        0
    }
}

/// Render a text scatter plot. Build `i` is drawn with the same key letter the runner shows for it,
/// and cells hit by more than one build are drawn as `#`. Times are shown in milliseconds.
pub fn render_scatter(
    points: &BTreeMap<String, Vec<(f64, f64)>>,
    width: usize,
    height: usize,
) -> anyhow::Result<String> {
    if width < 2 || height < 2 {
        anyhow::bail!("The plot needs at least 2x2 cells");
    }
    let (mut x_lo, mut x_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_lo, mut y_hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points.values().flatten() {
        if !x.is_finite() || !y.is_finite() {
            anyhow::bail!("Cannot plot non-finite point ({}, {})", x, y);
        }
        (x_lo, x_hi) = (x_lo.min(x), x_hi.max(x));
        (y_lo, y_hi) = (y_lo.min(y), y_hi.max(y));
    }
    if x_lo > x_hi {
        anyhow::bail!("Nothing to plot");
    }
    let mut grid = vec![vec![' '; width]; height];
    for (index, series) in points.values().enumerate() {
        let Some(key) = BenchRunner::key(index) else {
            anyhow::bail!("Too many builds to plot");
        };
        for &(x, y) in series {
            let c = &mut grid[height - 1 - cell(y, y_lo, y_hi, height)][cell(x, x_lo, x_hi, width)];
            *c = if *c == ' ' || *c == key { key } else { '#' };
        }
    }
    let mut out = String::new();
    for (row, cells) in grid.iter().enumerate() {
        let label = match row {
            0 => format!("{:.1}", y_hi / 1e6),
            r if r == height - 1 => format!("{:.1}", y_lo / 1e6),
            _ => String::new(),
        };
        let cells = cells.iter().collect::<String>();
        out += &format!("{:>w$} |{}\n", label, cells.trim_end(), w = LABEL_WIDTH);
    }
    out += &format!("{:>w$} +{}\n", "", "-".repeat(width), w = LABEL_WIDTH);
    let (lo, hi) = (format!("{}", x_lo), format!("{}", x_hi));
    let gap = width.saturating_sub(lo.len() + hi.len());
    out += &format!("{:>w$}  {}{}{}\n", "", lo, " ".repeat(gap), hi, w = LABEL_WIDTH);
    for (index, build) in points.keys().enumerate() {
        let key = BenchRunner::key(index).unwrap_or('?');
        out += &format!("{:>w$}  {} = {}\n", "", key, build, w = LABEL_WIDTH);
    }
    Ok(out)
}

impl PlotArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let timings = ProfileTimings::load(&self.profile)?;
        let per_count = data::median_over_trials(&timings.raw)?;
        let points = medians_by_build(&per_count)?;
        let plot = render_scatter(&points, self.width, self.height)?;
        let mut printer = MarkdownPrinter::new();
        printer.add(format!(
            "# [{}] Median CPU Time (ms) vs. Number Count\n\n",
            timings.crate_info.name
        ));
        printer.add(format!("* Profile: `{}`\n", self.profile));
        printer.add(format!("* Trials per count: `{}`\n\n", timings.profile.trials));
        printer.add(format!("```\n{}```\n", plot));
        printer.dump();
        Ok(())
    }
}
