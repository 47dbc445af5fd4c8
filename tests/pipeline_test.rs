use chrono::NaiveDate;
use marketing_allocation::config::PipelineConfig;
use marketing_allocation::io::demand::{generate_catalog, generate_sales_history};
use marketing_allocation::io::reporting::write_rows;
use marketing_allocation::io::tables::{
    read_demand_predictions, read_inventory_snapshot, read_sales,
};
use marketing_allocation::model::records::{ProductRecord, SalesRecord};
use marketing_allocation::pipeline::run_pipeline;
use marketing_allocation::strategy::engine::AllocationEngine;
use marketing_allocation::strategy::implementations::PolicyKind;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fixture(products: usize, with_stock: bool) -> (Vec<ProductRecord>, Vec<SalesRecord>) {
    let mut rng = StdRng::seed_from_u64(2024);
    let catalog = generate_catalog(products, with_stock, 20, 150, &mut rng);
    let ids: Vec<String> = catalog.iter().map(|p| p.product_id.clone()).collect();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let sales = generate_sales_history(&ids, start, 45, 50.0, 10.0, &mut rng).unwrap();
    (catalog, sales)
}

#[test]
fn test_full_pipeline_allocates_every_product() {
    let (catalog, sales) = fixture(8, true);
    let config = PipelineConfig::default();

    let output = run_pipeline(&config, &catalog, &sales, StdRng::seed_from_u64(1)).unwrap();

    assert_eq!(output.forecast.predictions.len(), 8);
    assert_eq!(output.history.len(), 5);
    assert_eq!(output.allocation.decisions.len(), 8);
    assert!(output.allocation.missing_demand.is_empty());
    assert!(output.allocation.missing_stock.is_empty());
    assert_eq!(output.summary.total_products, 8);

    // Final snapshot is what allocation saw
    for (decision, stock) in output.allocation.decisions.iter().zip(&output.final_stock) {
        assert_eq!(decision.product_id, stock.product_id);
        assert_eq!(decision.current_stock, stock.current_stock);
        if stock.current_stock <= 30 {
            assert_eq!(decision.promotion_percentage, 0);
        }
    }
}

#[test]
fn test_pipeline_is_reproducible_with_same_seed() {
    let (catalog, sales) = fixture(5, false);
    let config = PipelineConfig::default();

    let a = run_pipeline(&config, &catalog, &sales, StdRng::seed_from_u64(9)).unwrap();
    let b = run_pipeline(&config, &catalog, &sales, StdRng::seed_from_u64(9)).unwrap();

    assert_eq!(a.final_stock, b.final_stock);
    assert_eq!(a.allocation, b.allocation);
    assert_eq!(a.summary, b.summary);
}

#[test]
fn test_catalog_product_without_sales_is_dropped() {
    let (mut catalog, sales) = fixture(4, true);
    catalog.push(ProductRecord {
        product_id: "NEW".to_string(),
        current_stock: Some(500),
    });

    let config = PipelineConfig::default();
    let output = run_pipeline(&config, &catalog, &sales, StdRng::seed_from_u64(3)).unwrap();

    assert_eq!(output.allocation.decisions.len(), 4);
    assert_eq!(output.allocation.missing_demand, vec!["NEW".to_string()]);
}

#[test]
fn test_csv_tables_through_allocation() {
    let stock_csv = "product_id,current_stock\nA,25\nB,120\nC,80\n";
    let demand_csv = "product_id,predicted_demand\nA,90\nB,65\nC,50\n";
    let stock = read_inventory_snapshot(stock_csv.as_bytes()).unwrap();
    let demand = read_demand_predictions(demand_csv.as_bytes()).unwrap();

    let score_based = AllocationEngine::from_kind(PolicyKind::ScoreBased, 30);
    let threshold_matrix = AllocationEngine::from_kind(PolicyKind::ThresholdMatrix, 30);
    let score = score_based.evaluate(&stock, &demand);
    let matrix = threshold_matrix.evaluate(&stock, &demand);

    let promotions = |outcome: &marketing_allocation::strategy::engine::JoinOutcome| -> Vec<u8> {
        outcome.decisions.iter().map(|d| d.promotion_percentage).collect()
    };
    assert_eq!(promotions(&score), vec![0, 80, 60]);
    assert_eq!(promotions(&matrix), vec![0, 70, 20]);

    let mut buffer = Vec::new();
    write_rows(&mut buffer, &matrix.decisions).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.contains("B,120,65.0,70,3,\"Social Media, Online Ads\""));
}

#[test]
fn test_sales_csv_feeds_forecast() {
    let mut csv = String::from("product_id,date,units_sold,promotion\n");
    for day in 1..=20u32 {
        csv.push_str(&format!("A,2024-02-{:02},{},{}\n", day, 30 + (day * 7) % 11, day % 2));
        csv.push_str(&format!("B,2024-02-{:02},{},{}\n", day, 60 + (day * 5) % 13, (day + 1) % 2));
    }
    let sales = read_sales(csv.as_bytes()).unwrap();

    let forecast = marketing_allocation::forecast::regression::forecast_demand(
        &sales,
        &PipelineConfig::default().forecast,
    )
    .unwrap();

    assert_eq!(forecast.predictions.len(), 2);
    assert!(forecast.predictions.iter().all(|p| p.predicted_demand.is_finite()));
    assert_eq!(forecast.metrics.test_rows, 8);
}
