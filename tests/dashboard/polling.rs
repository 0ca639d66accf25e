use std::sync::Arc;

use tokio::time::{Duration, sleep};

use emergency_dashboard::{
    backend::{WeatherAlert, WeatherReport},
    error::{DashboardErrorKind, network_failure, parse_failure},
    notifications::NoopNotificationSource,
    status::EmergencyStatus,
    storage::{EMERGENCY_STATUS_KEY, LocalStorage},
    toast::ToastSeverity,
};

use crate::support::{CountingStorage, ScriptedBackend, harness, harness_with, scenarios};

fn flood_watch() -> WeatherReport {
    WeatherReport {
        alerts: vec![WeatherAlert {
            title: "Flood Watch".to_string(),
            severity: None,
            description: None,
        }],
        ..WeatherReport::default()
    }
}

#[tokio::test(start_paused = true)]
async fn critical_scenario_activates_and_persists_status() {
    let harness = harness();
    harness
        .backend
        .set_scenarios(Ok(scenarios(&["Critical", "High"])));

    let status = harness.controller.refresh_data().await.expect("refresh");

    assert_eq!(status, EmergencyStatus::Active);
    assert_eq!(harness.controller.status(), EmergencyStatus::Active);
    assert_eq!(
        harness.storage.writes_for(EMERGENCY_STATUS_KEY),
        vec!["active".to_string()]
    );

    let snapshots = harness.renderer.snapshots();
    let last = snapshots.last().expect("rendered snapshot");
    assert_eq!(last.summary.total, 2);
    assert_eq!(last.summary.critical, 1);
    assert!(last.last_data_refresh.is_some());
}

#[tokio::test(start_paused = true)]
async fn status_steps_down_as_scenarios_resolve() {
    let harness = harness();
    harness.backend.set_scenarios(Ok(scenarios(&["Critical"])));
    harness.controller.refresh_data().await.expect("refresh");

    harness
        .backend
        .set_scenarios(Ok(scenarios(&["critical", "Medium"])));
    let status = harness.controller.refresh_data().await.expect("refresh");
    assert_eq!(status, EmergencyStatus::Monitoring);

    harness.backend.set_scenarios(Ok(Vec::new()));
    let status = harness.controller.refresh_data().await.expect("refresh");
    assert_eq!(status, EmergencyStatus::Normal);

    assert_eq!(
        harness.storage.writes_for(EMERGENCY_STATUS_KEY),
        vec![
            "active".to_string(),
            "monitoring".to_string(),
            "normal".to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_status_and_raises_error_toast() {
    let harness = harness();
    harness.backend.set_scenarios(Ok(scenarios(&["Critical"])));
    harness.controller.refresh_data().await.expect("refresh");

    harness
        .backend
        .set_scenarios(Err(network_failure("backend returned 503")));
    let err = harness
        .controller
        .refresh_data()
        .await
        .expect_err("refresh should fail");

    assert_eq!(err.kind, DashboardErrorKind::Network);
    assert_eq!(harness.controller.status(), EmergencyStatus::Active);
    assert_eq!(harness.storage.writes_for(EMERGENCY_STATUS_KEY).len(), 1);

    let toasts = harness.controller.toasts().visible();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, ToastSeverity::Error);
    assert_eq!(toasts[0].message, "Failed to load dashboard data");
}

#[tokio::test(start_paused = true)]
async fn status_is_restored_from_storage_on_construction() {
    let storage = Arc::new(CountingStorage::default());
    storage
        .set_item(EMERGENCY_STATUS_KEY, "monitoring")
        .expect("seed status");

    let harness = harness_with(
        Arc::new(ScriptedBackend::default()),
        storage,
        Arc::new(NoopNotificationSource),
    );

    assert_eq!(harness.controller.status(), EmergencyStatus::Monitoring);
}

#[tokio::test(start_paused = true)]
async fn weather_alert_raises_single_long_warning_toast() {
    let harness = harness();
    harness.backend.set_weather(Ok(flood_watch()));

    harness.controller.refresh_weather().await.expect("weather");

    let toasts = harness.controller.toasts().visible();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, ToastSeverity::Warning);
    assert!(toasts[0].message.contains("Flood Watch"));
    assert_eq!(toasts[0].duration, Duration::from_millis(10_000));

    sleep(Duration::from_millis(9_999)).await;
    assert_eq!(harness.controller.toasts().len(), 1);
    sleep(Duration::from_millis(2)).await;
    assert!(harness.controller.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn weather_refresh_renders_view() {
    let harness = harness();
    harness.backend.set_weather(Ok(WeatherReport {
        temperature: Some(71.6),
        condition: Some("Partly Cloudy".to_string()),
        wind_speed: Some(8.5),
        visibility: Some("10 miles".to_string()),
        ..WeatherReport::default()
    }));

    harness.controller.refresh_weather().await.expect("weather");

    let snapshots = harness.renderer.snapshots();
    let view = snapshots
        .last()
        .and_then(|snapshot| snapshot.weather.clone())
        .expect("weather view");
    assert_eq!(view.temperature, "72°F");
    assert_eq!(view.wind, "8.5 mph");
    assert_eq!(view.icon, "cloud-sun");
    assert!(harness.controller.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn weather_failure_is_logged_without_toast() {
    let harness = harness();
    harness
        .backend
        .set_weather(Err(parse_failure("weather body was not JSON")));

    let err = harness
        .controller
        .refresh_weather()
        .await
        .expect_err("weather should fail");

    assert_eq!(err.kind, DashboardErrorKind::Parse);
    assert!(harness.controller.toasts().is_empty());
    assert!(harness.renderer.snapshots().is_empty());
}

#[tokio::test(start_paused = true)]
async fn periodic_tasks_fire_on_their_own_cadence() {
    let harness = harness();
    harness.controller.start();
    assert!(harness.controller.is_running());

    sleep(Duration::from_millis(1)).await;
    assert_eq!(harness.backend.scenario_calls(), 1);
    assert_eq!(harness.backend.weather_calls(), 1);

    sleep(Duration::from_millis(30_000)).await;
    assert_eq!(harness.backend.scenario_calls(), 2);
    assert_eq!(harness.backend.weather_calls(), 1);

    sleep(Duration::from_millis(270_000)).await;
    assert_eq!(harness.backend.scenario_calls(), 11);
    assert_eq!(harness.backend.weather_calls(), 2);

    harness.controller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failing_data_refresh_does_not_halt_other_tasks() {
    let harness = harness();
    harness
        .backend
        .set_scenarios(Err(network_failure("connection refused")));
    harness.controller.start();

    sleep(Duration::from_millis(60_001)).await;

    assert_eq!(harness.backend.scenario_calls(), 3);
    assert_eq!(harness.backend.weather_calls(), 1);
    assert_eq!(harness.controller.status(), EmergencyStatus::Normal);

    harness.controller.stop().await;
}
