use chrono::{Duration, NaiveDate};
use regressor_forecast::{holdout_evaluation, FeatureTable, ForecasterConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("Regressor Forecast: Hold-out Evaluation Example");
    println!("===============================================\n");

    // Calendar-day series, stepped the same way
    let config = ForecasterConfig::from_json_str(
        r#"{ "exclude_weekends": false, "model": { "interval_width": 0.95 } }"#,
    )?;
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).ok_or("invalid start date")?;
    let dates: Vec<NaiveDate> = (0..400).map(|i| start + Duration::days(i)).collect();
    let closes: Vec<f64> = (0..400)
        .map(|i| {
            let t = i as f64;
            50.0 + 0.05 * t + 3.0 * (t / 30.0).sin()
        })
        .collect();
    let history = FeatureTable::from_closes(&dates, &closes, config.indicators.clone())?;

    for test_len in [5, 10, 20] {
        let report = holdout_evaluation(
            config.build_model()?,
            config.step_policy(),
            &history,
            test_len,
        )?;

        println!("Hold-out of {} days", test_len);
        for (point, actual) in report.forecast.iter().zip(&report.actual).take(3) {
            println!(
                "  {} forecast {:.2} actual {:.2}",
                point.date, point.yhat, actual
            );
        }
        println!("{}", report.accuracy);
    }

    Ok(())
}
