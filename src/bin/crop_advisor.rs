// Crop Advisor CLI
//
// Purpose: Build crop profiles from the historical dataset and query them
// Usage:
//   cargo run --bin crop_advisor -- report
//   cargo run --bin crop_advisor -- rank <N> <P> <K> <temperature> <humidity> <ph> <rainfall> [n]
//   cargo run --bin crop_advisor -- gold <N> <P> <K> <temperature> <humidity> <ph> <rainfall>
//
// CONFIG_PATH selects the config file (default: config/game.json).

use anyhow::{bail, Context};
use crop_advisor::attributes::ATTRIBUTE_COUNT;
use crop_advisor::{
    ClassificationReport, CropProfileStore, GameConfig, HistoricalDataset, SuitabilityEngine, TopN,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_advisor=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/game.json"));

    let config = GameConfig::load(&config_path)?;
    let gold = config.gold_scale()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(|s| s.as_str()).unwrap_or("report");

    match command {
        "report" => {
            let dataset = HistoricalDataset::load_csv(&config.dataset_path)?;
            let store = CropProfileStore::build(dataset.records(), &config.crops_used)?;
            let engine = SuitabilityEngine::new(&store, gold);

            let report = ClassificationReport::evaluate(&engine, dataset.records())?;
            println!("{}", report);
        }
        "rank" | "gold" => {
            let query = parse_query(&args[1..])?;
            let n = match args.get(1 + ATTRIBUTE_COUNT) {
                Some(raw) => raw.parse().with_context(|| format!("Invalid n: '{}'", raw))?,
                None => 3,
            };

            let store = config.build_profiles()?;
            let engine = SuitabilityEngine::new(&store, gold);
            let top = engine.top_n(n, &query, command == "gold")?;
            print_top(&top, command == "gold");
        }
        other => bail!("Unknown command '{}'. Expected report, rank or gold", other),
    }

    Ok(())
}

fn parse_query(args: &[String]) -> anyhow::Result<Vec<f64>> {
    if args.len() < ATTRIBUTE_COUNT {
        bail!(
            "Expected {} values (N P K temperature humidity ph rainfall), got {}",
            ATTRIBUTE_COUNT,
            args.len()
        );
    }

    args[..ATTRIBUTE_COUNT]
        .iter()
        .map(|raw| {
            raw.parse::<f64>()
                .with_context(|| format!("Invalid number: '{}'", raw))
        })
        .collect()
}

fn print_top(top: &TopN, gold: bool) {
    println!("Recommended: {}", top.labels.join(", "));
    println!();
    for score in &top.scores {
        if gold {
            println!("  {:<14} {:>10.1} gold", score.label, score.value);
        } else {
            println!("  {:<14} {:>10.3}", score.label, score.value);
        }
    }
}
