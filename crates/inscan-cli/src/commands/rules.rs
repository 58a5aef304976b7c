//! Rules command - show how each metric is read.

use clap::Args;
use console::style;

use inscan_core::scan::rules::{ladder_for, MetricLadder, LADDERS};
use inscan_core::MetricName;

use super::config::load_config;

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    /// Only show this metric (e.g. "body_fat_percentage")
    metric: Option<MetricName>,
}

pub async fn run(args: RulesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let ladders: Vec<&MetricLadder> = match args.metric {
        Some(metric) => vec![ladder_for(metric)],
        None => LADDERS.iter().collect(),
    };

    for (i, ladder) in ladders.iter().enumerate() {
        if i > 0 {
            println!();
        }

        let metric = ladder.metric;
        println!(
            "{} ({}, {} {})",
            style(metric.label()).bold(),
            metric,
            metric.plausible_range(),
            metric.unit()
        );

        for (n, step) in ladder.steps.iter().enumerate() {
            println!("  {}. {}", n + 1, style(step.stage()).cyan());
            for line in step.describe(metric, &config.extraction) {
                println!("       {}", line);
            }
        }
    }

    Ok(())
}
