use std::path::Path;

use polars::prelude::*;

use crate::timings;

pub fn get_data(csv: &Path) -> anyhow::Result<DataFrame> {
    timings::read_csv(csv)
}

/// Concatenate the timings of several builds.
pub fn get_all_data(csvs: &[impl AsRef<Path>]) -> anyhow::Result<DataFrame> {
    let mut frames = csvs.iter().map(|p| get_data(p.as_ref()));
    let Some(first) = frames.next() else {
        anyhow::bail!("No timings to report");
    };
    let mut df = first?;
    for next in frames {
        df.vstack_mut(&next?)?;
    }
    Ok(df)
}

/// Median and inter-quartile range of the trials, grouped by [count, build]
pub fn median_over_trials(df: &DataFrame) -> anyhow::Result<DataFrame> {
    let time = || col("time").cast(DataType::Float64);
    Ok(df
        .clone()
        .lazy()
        .group_by(["count", "build"])
        .agg([
            len().alias("trials"),
            time().median().alias("median"),
            time()
                .quantile(lit(0.25), QuantileInterpolOptions::Linear)
                .alias("p25"),
            time()
                .quantile(lit(0.75), QuantileInterpolOptions::Linear)
                .alias("p75"),
        ])
        .sort_by_exprs([col("count"), col("build")], [false, false], false, true)
        .collect()?)
}

/// Mean and geomean of the per-count medians, grouped by build
pub fn summary_over_counts(df: &DataFrame) -> anyhow::Result<DataFrame> {
    Ok(df
        .clone()
        .lazy()
        .group_by(["build"])
        .agg([
            len().alias("counts"),
            col("median").min().alias("min"),
            col("median").max().alias("max"),
            col("median").mean().alias("mean"),
            // exp(mean(ln x)), the plain product of nanosecond medians overflows f64
            col("median")
                .log(std::f64::consts::E)
                .mean()
                .exp()
                .alias("geomean"),
        ])
        .sort_by_exprs([col("build")], [false], false, true)
        .collect()?)
}

/// Divide the summary statistics by the baseline build's.
pub fn normalize(df: &DataFrame, baseline: &str) -> anyhow::Result<DataFrame> {
    let Some(row_index) = df
        .column("build")?
        .iter()
        .position(|x| x.get_str() == Some(baseline))
    else {
        anyhow::bail!("Baseline `{}` has no timings", baseline);
    };
    let relative = |name: &str| col(name) / col(name).slice(row_index as i64, 1).first();
    Ok(df
        .clone()
        .lazy()
        .with_columns([
            relative("min"),
            relative("max"),
            relative("mean"),
            relative("geomean"),
        ])
        .collect()?)
}
