use tokio::time::{Duration, sleep};

use emergency_dashboard::toast::ToastSeverity;

use crate::support::harness;

#[tokio::test(start_paused = true)]
async fn short_toast_expires_after_its_duration() {
    let harness = harness();

    let id = harness
        .controller
        .show_toast_for("x", ToastSeverity::Error, Duration::from_millis(100));

    let visible = harness.controller.toasts().visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, id);
    assert_eq!(visible[0].message, "x");

    sleep(Duration::from_millis(101)).await;
    assert!(harness.controller.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn default_toast_lasts_five_seconds() {
    let harness = harness();
    harness
        .controller
        .show_toast("Scenario saved", ToastSeverity::Success);

    sleep(Duration::from_millis(4_999)).await;
    assert_eq!(harness.controller.toasts().len(), 1);
    sleep(Duration::from_millis(2)).await;
    assert!(harness.controller.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_dismissal_is_idempotent() {
    let harness = harness();
    let first = harness.controller.show_toast("first", ToastSeverity::Info);
    let second = harness.controller.show_toast("second", ToastSeverity::Info);

    assert!(harness.controller.dismiss_toast(&first));
    assert!(!harness.controller.dismiss_toast(&first));

    let visible = harness.controller.toasts().visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, second);

    sleep(Duration::from_millis(5_001)).await;
    assert!(!harness.controller.dismiss_toast(&second));
}

#[tokio::test(start_paused = true)]
async fn renderer_observes_every_toast_change() {
    let harness = harness();
    harness
        .controller
        .show_toast_for("a", ToastSeverity::Info, Duration::from_millis(100));
    harness
        .controller
        .show_toast_for("b", ToastSeverity::Warning, Duration::from_millis(200));

    sleep(Duration::from_millis(250)).await;

    let frames: Vec<usize> = harness
        .renderer
        .toast_frames()
        .iter()
        .map(Vec::len)
        .collect();
    assert_eq!(frames, vec![1, 2, 1, 0]);
}
