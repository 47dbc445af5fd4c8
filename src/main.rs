use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use marketing_allocation::config::PipelineConfig;
use marketing_allocation::forecast::regression::forecast_demand;
use marketing_allocation::io::demand::{generate_catalog, generate_sales_history};
use marketing_allocation::io::reporting::{write_csv_file, AllocationSummary};
use marketing_allocation::io::tables;
use marketing_allocation::pipeline::{rng_from_seed, run_pipeline};
use marketing_allocation::simulation::engine::InventorySimulation;
use marketing_allocation::strategy::engine::AllocationEngine;
use marketing_allocation::strategy::implementations::PolicyKind;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inventory-aware marketing resource allocation", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the simulator's random draws (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the demand model and export the latest prediction per product
    Forecast {
        #[arg(long, default_value = "data/sales_history.csv")]
        sales: PathBuf,
        #[arg(long, default_value = "data/demand_predictions.csv")]
        output: PathBuf,
    },
    /// Run the inventory simulation, rewriting the snapshot after every cycle
    Simulate {
        #[arg(long, default_value = "data/products.csv")]
        products: PathBuf,
        #[arg(long, default_value = "data/inventory_status.csv")]
        output: PathBuf,
        /// Number of update cycles (overrides the config file)
        #[arg(long)]
        cycles: Option<usize>,
        /// Pause between cycles in milliseconds (overrides the config file)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Join an inventory snapshot with demand predictions and allocate
    Allocate {
        #[arg(long, default_value = "data/inventory_status.csv")]
        inventory: PathBuf,
        #[arg(long, default_value = "data/demand_predictions.csv")]
        demand: PathBuf,
        #[arg(long, default_value = "data/marketing_allocation_output.csv")]
        output: PathBuf,
        #[arg(long, value_enum)]
        policy: Option<PolicyKind>,
        /// Restrict the printed summary to one product
        #[arg(long)]
        product: Option<String>,
    },
    /// Forecast, simulate and allocate in one go
    Run {
        #[arg(long, default_value = "data/products.csv")]
        products: PathBuf,
        #[arg(long, default_value = "data/sales_history.csv")]
        sales: PathBuf,
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
        #[arg(long, value_enum)]
        policy: Option<PolicyKind>,
    },
    /// Write a synthetic product catalog and sales history
    Generate {
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
        #[arg(long, default_value_t = 10)]
        products: usize,
        #[arg(long, default_value_t = 60)]
        days: usize,
        /// Average units sold per day
        #[arg(long, default_value_t = 40.0)]
        mean: f64,
        /// Day-to-day volatility of units sold
        #[arg(long, default_value_t = 8.0)]
        std_dev: f64,
        /// Leave the stock column out so the simulator seeds it
        #[arg(long)]
        without_stock: bool,
    },
}

fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    if let Err(e) = run(Cli::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if cli.seed.is_some() {
        config.random_seed = cli.seed;
    }

    match cli.command {
        Commands::Forecast { sales, output } => forecast(&config, &sales, &output),
        Commands::Simulate {
            products,
            output,
            cycles,
            interval_ms,
        } => {
            if let Some(cycles) = cycles {
                config.simulation.cycles = cycles;
            }
            if let Some(interval_ms) = interval_ms {
                config.simulation.cycle_interval_ms = interval_ms;
            }
            simulate(&config, &products, &output)
        }
        Commands::Allocate {
            inventory,
            demand,
            output,
            policy,
            product,
        } => {
            if let Some(policy) = policy {
                config.allocation.policy = policy;
            }
            allocate(&config, &inventory, &demand, &output, product.as_deref())
        }
        Commands::Run {
            products,
            sales,
            output_dir,
            policy,
        } => {
            if let Some(policy) = policy {
                config.allocation.policy = policy;
            }
            full_run(&config, &products, &sales, &output_dir)
        }
        Commands::Generate {
            output_dir,
            products,
            days,
            mean,
            std_dev,
            without_stock,
        } => generate(&config, &output_dir, products, days, mean, std_dev, without_stock),
    }
}

fn forecast(config: &PipelineConfig, sales: &Path, output: &Path) -> anyhow::Result<()> {
    let history = tables::load_sales(sales)?;
    let forecast = forecast_demand(&history, &config.forecast).context("demand forecast failed")?;

    println!("=== Demand Forecasting Model Performance ===");
    println!(
        "Train rows: {}, held-out rows: {}",
        forecast.metrics.train_rows, forecast.metrics.test_rows
    );
    println!("MAE: {:.2}", forecast.metrics.mae);
    println!("RMSE: {:.2}", forecast.metrics.rmse);

    write_csv_file(output, &forecast.predictions)?;
    println!("Demand predictions saved to {}", output.display());
    Ok(())
}

fn simulate(config: &PipelineConfig, products: &Path, output: &Path) -> anyhow::Result<()> {
    let catalog = tables::load_products(products)?;
    let rng = rng_from_seed(config.random_seed);
    let mut sim = InventorySimulation::from_catalog(config.simulation.clone(), &catalog, rng);
    let interval = Duration::from_millis(config.simulation.cycle_interval_ms);

    println!("Starting inventory simulation ({} cycles)", config.simulation.cycles);

    let mut write_failure = None;
    sim.run_with(|snapshot| {
        println!("--- Update Cycle {} ---", snapshot.cycle);
        for alert in &snapshot.alerts {
            println!("{}", alert);
        }
        for entry in &snapshot.stock {
            println!("{:>12} {:>6}", entry.product_id, entry.current_stock);
        }

        if let Err(e) = write_csv_file(output, &snapshot.stock) {
            write_failure = Some(e);
            return ControlFlow::Break(());
        }
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
        ControlFlow::Continue(())
    });

    if let Some(e) = write_failure {
        return Err(e).context("failed to persist inventory snapshot");
    }
    println!("Inventory snapshot saved to {}", output.display());
    Ok(())
}

fn allocate(
    config: &PipelineConfig,
    inventory: &Path,
    demand: &Path,
    output: &Path,
    product: Option<&str>,
) -> anyhow::Result<()> {
    let stock = tables::load_inventory_snapshot(inventory)?;
    let predictions = tables::load_demand_predictions(demand)?;

    let engine = AllocationEngine::from_kind(
        config.allocation.policy,
        config.allocation.low_stock_threshold,
    );
    let outcome = engine.evaluate(&stock, &predictions);

    write_csv_file(output, &outcome.decisions)?;

    println!("\n=== Marketing Allocation ({}) ===", engine.policy_name());
    print!("{}", AllocationSummary::for_product(&outcome.decisions, product));
    println!("Marketing allocation saved to {}", output.display());
    Ok(())
}

fn full_run(
    config: &PipelineConfig,
    products: &Path,
    sales: &Path,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let catalog = tables::load_products(products)?;
    let history = tables::load_sales(sales)?;
    let rng = rng_from_seed(config.random_seed);

    let output = run_pipeline(config, &catalog, &history, rng)?;

    write_csv_file(&output_dir.join("demand_predictions.csv"), &output.forecast.predictions)?;
    write_csv_file(&output_dir.join("inventory_status.csv"), &output.final_stock)?;
    write_csv_file(
        &output_dir.join("marketing_allocation_output.csv"),
        &output.allocation.decisions,
    )?;

    println!("\n=== Pipeline Summary ===");
    println!(
        "MAE: {:.2}, RMSE: {:.2}",
        output.forecast.metrics.mae, output.forecast.metrics.rmse
    );
    let alert_count: usize = output.history.iter().map(|s| s.alerts.len()).sum();
    println!(
        "Simulated {} cycles, {} low-stock alerts",
        output.history.len(),
        alert_count
    );
    print!("{}", output.summary);
    println!("Results written to {}", output_dir.display());
    Ok(())
}

fn generate(
    config: &PipelineConfig,
    output_dir: &Path,
    products: usize,
    days: usize,
    mean: f64,
    std_dev: f64,
    without_stock: bool,
) -> anyhow::Result<()> {
    let mut rng = rng_from_seed(config.random_seed);

    let catalog = generate_catalog(
        products,
        !without_stock,
        config.simulation.seed_stock_min,
        config.simulation.seed_stock_max,
        &mut rng,
    );
    let ids: Vec<String> = catalog.iter().map(|p| p.product_id.clone()).collect();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let history = generate_sales_history(&ids, start, days, mean, std_dev, &mut rng)?;

    if without_stock {
        let ids_only: Vec<IdOnly> = ids
            .into_iter()
            .map(|product_id| IdOnly { product_id })
            .collect();
        write_csv_file(&output_dir.join("products.csv"), &ids_only)?;
    } else {
        write_csv_file(&output_dir.join("products.csv"), &catalog)?;
    }
    write_csv_file(&output_dir.join("sales_history.csv"), &history)?;

    println!(
        "Generated {} products and {} sales records in {}",
        products,
        history.len(),
        output_dir.display()
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct IdOnly {
    product_id: String,
}
