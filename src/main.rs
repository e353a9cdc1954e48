use std::{env, process, sync::Arc};

use anyhow::{bail, Context, Result};
use log::info;

use regression_dashboard::{
    Algorithm, DashboardConfig, DisplayState, Feature, HttpBackend, MetricsController,
    PredictionClient, PredictionInput,
};

const USAGE: &str = "Usage: regression-dashboard <command>

Commands:
  metrics <linear|tree>                          show metrics and sample predictions
  compare                                        select every algorithm in turn without waiting
  predict <linear|tree> [area bedrooms stories year]
                                                 price a single record
  train <linear|tree>                            retrain a model, then show its metrics

Environment:
  DASHBOARD_API_URL       backend url (default http://localhost:8000)
  DASHBOARD_TIMEOUT_SECS  per request timeout (default none)";

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let Some(command) = args.first() else {
        eprintln!("{USAGE}\n\nAlgorithms:");
        for algorithm in Algorithm::ALL {
            eprintln!("  {:<8} {}", algorithm.as_str(), algorithm.label());
        }
        process::exit(2);
    };

    let config = DashboardConfig::from_env()?;
    info!("using backend at {}", config.base_url());
    let backend = Arc::new(HttpBackend::new(&config)?);

    match command.as_str() {
        "metrics" => {
            let algorithm = parse_algorithm(args.get(1))?;
            let mut dashboard = MetricsController::new(Arc::clone(&backend));
            dashboard.select_algorithm(algorithm);
            dashboard.settle().await;
            print_dashboard(&dashboard);
        }
        "compare" => {
            let mut dashboard = MetricsController::new(Arc::clone(&backend));
            // Only the last selection is shown, whatever order the answers come in.
            for algorithm in Algorithm::ALL {
                dashboard.select_algorithm(algorithm);
            }
            dashboard.settle().await;
            print_dashboard(&dashboard);
        }
        "predict" => {
            let algorithm = parse_algorithm(args.get(1))?;
            let input = parse_input(&args[2.min(args.len())..])?;
            println!("{}", algorithm.label());
            for feature in Feature::ALL {
                println!("  {:<12} {}", feature.label(), input.get(feature));
            }

            let mut client = PredictionClient::new(Arc::clone(&backend));
            let prediction = client.predict(algorithm, &input).await?;
            println!("{}", prediction.display());
        }
        "train" => {
            let algorithm = parse_algorithm(args.get(1))?;
            let trained = backend
                .train(algorithm)
                .await
                .with_context(|| format!("training {algorithm} failed"))?;
            println!("{}", trained.message);

            let mut dashboard = MetricsController::new(Arc::clone(&backend));
            dashboard.select_algorithm(algorithm);
            dashboard.settle().await;
            print_dashboard(&dashboard);
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }

    Ok(())
}

fn parse_algorithm(arg: Option<&String>) -> Result<Algorithm> {
    match arg {
        Some(name) => Ok(name.parse()?),
        None => Ok(Algorithm::default()),
    }
}

/// Fills the form from positional values, keeping the default record for
/// any value not given.
fn parse_input(values: &[String]) -> Result<PredictionInput> {
    if values.len() > Feature::ALL.len() {
        bail!("expected at most {} feature values", Feature::ALL.len());
    }

    let mut input = PredictionInput::default();
    for (feature, raw) in Feature::ALL.into_iter().zip(values) {
        input.set_raw(feature, raw);
    }
    Ok(input)
}

fn print_dashboard<B: regression_dashboard::Backend>(dashboard: &MetricsController<B>) {
    println!("{}", dashboard.algorithm().label());

    match dashboard.state() {
        DisplayState::Error => {
            let reason = dashboard.last_error().unwrap_or("unknown error");
            println!("No data available ({reason}).");
            return;
        }
        DisplayState::Idle | DisplayState::Loading => {
            println!("Loading...");
            return;
        }
        DisplayState::Ready(_) | DisplayState::Empty => {}
    }

    for (title, value) in dashboard.cards() {
        let value = value.map_or_else(|| "n/a".to_string(), |v| v.to_string());
        println!("  {title:<20} {value}");
    }

    let chart = dashboard.chart();
    if chart.is_empty() {
        println!("No data available.");
        return;
    }

    if let Some((lo, hi)) = chart.y_bounds() {
        println!("  price range {lo:.2} .. {hi:.2}");
    }
    println!("  {:>5} {:>14} {:>14}", "index", "actual", "predicted");
    for point in chart.points() {
        println!(
            "  {:>5} {:>14.2} {:>14.2}",
            point.x, point.actual, point.predicted
        );
    }
}
