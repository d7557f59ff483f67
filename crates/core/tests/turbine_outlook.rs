//! Turbine classification and forecast outlook across random conditions
use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use windfarm_weather_core::{
    assess_fleet, resolve_overall, scan_forecast, AnalysisConfig, FarmSnapshot,
    OperationalStatus, OutlookConfig, TurbineClassifier, WeatherSample, WindFarm,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_hour(rng: &mut StdRng, hour: i64) -> WeatherSample {
    let t0 = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
    WeatherSample::at(54.0, 2.0, t0 + Duration::hours(hour))
        .with_wind(rng.random_range(0.0..35.0), rng.random_range(0.0..360.0))
        .with_temperature(rng.random_range(-8.0..12.0))
        .with_humidity(rng.random_range(50.0..100.0))
}

#[test]
fn test_shutdown_dominates_every_other_condition() {
    let classifier = TurbineClassifier::default();
    let mut rng = StdRng::seed_from_u64(1);
    for hour in 0..500 {
        let sample = random_hour(&mut rng, hour);
        let speed = *sample.wind_speed.unwrap();
        let status = classifier.classify(&sample).unwrap();
        assert_eq!(speed >= 25.0, status == OperationalStatus::Shutdown, "{sample:?}");
    }
}

#[test]
fn test_icing_whenever_cold_and_humid_below_cut_out() {
    let classifier = TurbineClassifier::default();
    let mut rng = StdRng::seed_from_u64(2);
    for hour in 0..500 {
        let sample = random_hour(&mut rng, hour);
        let speed = *sample.wind_speed.unwrap();
        let cold_humid =
            *sample.temperature.unwrap() <= 0.0 && *sample.humidity.unwrap() >= 80.0;
        let status = classifier.classify(&sample).unwrap();
        if speed < 25.0 {
            assert_eq!(cold_humid, status == OperationalStatus::IcingRisk, "{sample:?}");
        }
    }
}

#[test]
fn test_capacity_factor_bounds() {
    let classifier = TurbineClassifier::default();
    let mut rng = StdRng::seed_from_u64(3);
    for hour in 0..500 {
        let assessment = classifier.assess(&random_hour(&mut rng, hour)).unwrap();
        assert!((0.0..=1.0).contains(&assessment.capacity_factor));
        match assessment.status {
            OperationalStatus::Normal => assert_eq!(assessment.capacity_factor, 1.0),
            OperationalStatus::Shutdown
            | OperationalStatus::IcingRisk
            | OperationalStatus::Idle => assert_eq!(assessment.capacity_factor, 0.0),
            OperationalStatus::SubOptimal => assert!(assessment.capacity_factor < 1.0),
        }
    }
}

#[test]
fn test_classification_is_repeatable() {
    let classifier = TurbineClassifier::default();
    let mut rng = StdRng::seed_from_u64(4);
    let sample = random_hour(&mut rng, 0);
    assert_eq!(classifier.assess(&sample), classifier.assess(&sample));
}

#[test]
fn test_scan_runs_cover_the_forecast() {
    let classifier = TurbineClassifier::default();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let forecast: Vec<_> = (0..72).map(|h| random_hour(&mut rng, h)).collect();
        let scan = scan_forecast(&forecast, &classifier);

        let total: u32 = scan.events.iter().map(|e| e.duration_hours).sum();
        assert_eq!(total, 72);
        assert_eq!(scan.events[0].previous, None);
        for pair in scan.events.windows(2) {
            assert_ne!(pair[0].status, pair[1].status);
            assert_eq!(pair[1].previous, Some(pair[0].status));
            assert_eq!(pair[0].onset_hour + pair[0].duration_hours, pair[1].onset_hour);
        }
        assert_eq!(scan.events.iter().filter(|e| e.ongoing).count(), 1);
    }
}

#[test]
fn test_overall_never_below_current() {
    let classifier = TurbineClassifier::default();
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..50 {
        let forecast: Vec<_> = (0..24).map(|h| random_hour(&mut rng, h)).collect();
        let current = classifier.assess(&forecast[0]).unwrap();
        let scan = scan_forecast(&forecast, &classifier);
        let overall = resolve_overall(&current, &scan, &OutlookConfig::default());

        assert!(overall.priority_status.priority() >= current.status.priority());
        if let Some(event) = &overall.priority_event {
            assert!(event.status.is_risk());
            assert_eq!(event.status, overall.priority_status);
        }
    }
}

#[test]
fn test_fleet_counts_every_farm() {
    let mut rng = StdRng::seed_from_u64(8);
    let snapshots: Vec<_> = (0..12)
        .map(|i| {
            let forecast: Vec<_> = (0..48).map(|h| random_hour(&mut rng, h)).collect();
            FarmSnapshot {
                farm: WindFarm {
                    name: format!("Farm {i}"),
                    capacity_mw: 100.0 * f64::from(i + 1),
                    latitude: 54.0,
                    longitude: 2.0,
                },
                current: forecast[0].clone(),
                forecast,
            }
        })
        .collect();

    let summary = assess_fleet(&snapshots, &AnalysisConfig::default());
    assert!(summary.failures.is_empty());
    assert_eq!(summary.status_counts.values().sum::<usize>(), 12);
    assert!(summary.estimated_output_mw <= summary.total_capacity_mw);
    let names: Vec<_> = summary.reports.iter().map(|r| r.farm.name.as_str()).collect();
    assert_eq!(names[0], "Farm 0");
    assert_eq!(names[11], "Farm 11");
}
