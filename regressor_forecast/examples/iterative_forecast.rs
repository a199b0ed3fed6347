use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regressor_forecast::{ForecasterConfig, PriceBar};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Regressor Forecast: Iterative Forecasting Example");
    println!("=================================================\n");

    let bars = create_sample_bars(250)?;
    println!(
        "Sample data created: {} business days ({} to {})\n",
        bars.len(),
        bars[0].date,
        bars[bars.len() - 1].date
    );

    let config = ForecasterConfig::default();
    let history = config.feature_table(&bars)?;
    println!("Regressors: {}", config.indicators.names().join(", "));
    println!(
        "Rows with every indicator populated: {}\n",
        history.complete_rows().count()
    );

    let mut forecaster = config.build_forecaster()?;
    forecaster.fit(&history)?;

    let table = forecaster.forecast_table(10)?;
    println!("Forecast for the next 10 business days:");
    for point in table.points() {
        println!(
            "  {} {:>8.2}  [{:>8.2}, {:>8.2}]",
            point.date, point.yhat, point.lower, point.upper
        );
    }

    let df = table.to_dataframe()?;
    println!("\nExtended table (last rows):\n{}", df.tail(Some(12)));

    Ok(())
}

/// Trending close prices with a weekly wobble on business days only
fn create_sample_bars(n: usize) -> Result<Vec<PriceBar>, Box<dyn std::error::Error>> {
    let mut bars = Vec::with_capacity(n);
    let mut date = NaiveDate::from_ymd_opt(2023, 1, 2).ok_or("invalid start date")?;
    let mut i = 0;

    while bars.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let t = i as f64;
            let close = 100.0 + 0.15 * t + 2.0 * (t * 0.3).sin() + 0.8 * (t * 1.7).cos();
            bars.push(PriceBar::from_close(date, close));
            i += 1;
        }
        date += Duration::days(1);
    }

    Ok(bars)
}
