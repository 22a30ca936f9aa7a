#![deny(warnings)]

//! Headless advisory CLI: selects a county, applies scenario flags, and
//! prints all five persona advisories plus the display-layer extras the
//! dashboard would render (keyword counts, nitrogen map lines).

use advisory_core::{build_context, ScenarioFlags};
use advisory_engine::Advisor;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    county: String,
    flags: ScenarioFlags,
    seed: u64,
    geo_path: String,
    agent: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        county: "Cork".to_string(),
        flags: ScenarioFlags::default(),
        seed: 42,
        geo_path: "assets/geo/ireland_counties.geojson".to_string(),
        agent: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--county" => {
                if let Some(v) = it.next() {
                    args.county = v;
                }
            }
            "--climate-shock" => args.flags.climate_shock = true,
            "--export-block" => args.flags.export_block = true,
            "--subsidy-cut" => args.flags.subsidy_cut = true,
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.seed),
            "--geo" => {
                if let Some(v) = it.next() {
                    args.geo_path = v;
                }
            }
            "--agent" => args.agent = it.next(),
            _ => {}
        }
    }
    args
}

/// Token frequency table for the word-cloud stand-in, descending by count.
fn keyword_counts(comment: &str) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for token in comment.split_whitespace() {
        *counts.entry(token.to_ascii_lowercase()).or_insert(0) += 1;
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

fn flag_summary(flags: ScenarioFlags) -> String {
    let mut active = Vec::new();
    if flags.climate_shock {
        active.push("climate-shock");
    }
    if flags.export_block {
        active.push("export-block");
    }
    if flags.subsidy_cut {
        active.push("subsidy-cut");
    }
    if active.is_empty() {
        "none".to_string()
    } else {
        active.join(", ")
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(
        git_sha = env!("GIT_SHA"),
        county = %args.county,
        seed = args.seed,
        "starting advisory CLI"
    );

    // Startup-scoped, fail-fast resource acquisition: reference table and
    // boundary geometry. The engine itself never touches the geometry.
    let dataset = county_data::builtin_dataset();
    let boundaries = county_data::load_boundaries(&args.geo_path)
        .with_context(|| format!("loading county boundaries from {}", args.geo_path))?;
    boundaries.ensure_covers(&dataset)?;

    let ctx = build_context(&args.county, args.flags, &dataset)?;
    let mut advisor = Advisor::seeded(args.seed);

    println!(
        "Advisories for {} | scenario: {}",
        args.county,
        flag_summary(args.flags)
    );
    if let Some(name) = &args.agent {
        let msg = advisor.evaluate_named(name, &ctx)?;
        println!("  {:>5}: {}", msg.agent.persona(), msg.text);
    } else {
        for msg in advisor.evaluate_all(&ctx) {
            println!("  {:>5}: {}", msg.agent.persona(), msg.text);
        }
    }

    println!("\nFarmer opinion keywords in {}:", args.county);
    for (word, count) in keyword_counts(&ctx.record.comment) {
        println!("  {count:>2}x {word}");
    }

    println!("\nNitrogen map ({} county boundaries loaded):", boundaries.len());
    for rec in dataset.records() {
        let marker = if rec.nitrogen_level > 70.0 { "!" } else { " " };
        println!(
            " {marker} {:<10} ({:5.1}, {:5.1})  N = {:.0}",
            rec.name, rec.latitude, rec.longitude, rec.nitrogen_level
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_counts_are_descending_then_alphabetical() {
        let counts = keyword_counts("dairy export dairy subsidy export dairy");
        assert_eq!(
            counts,
            vec![
                ("dairy".to_string(), 3),
                ("export".to_string(), 2),
                ("subsidy".to_string(), 1),
            ]
        );
    }

    #[test]
    fn keyword_counts_fold_case() {
        let counts = keyword_counts("CAP cap Cap");
        assert_eq!(counts, vec![("cap".to_string(), 3)]);
    }

    #[test]
    fn flag_summary_lists_active_flags() {
        assert_eq!(flag_summary(ScenarioFlags::default()), "none");
        let flags = ScenarioFlags {
            climate_shock: true,
            subsidy_cut: true,
            ..Default::default()
        };
        assert_eq!(flag_summary(flags), "climate-shock, subsidy-cut");
    }
}
