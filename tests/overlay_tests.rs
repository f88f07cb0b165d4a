//! The loading overlay timeline and its fade curve.

use instant::Duration;
use showroom::{
    overlay::{Overlay, OverlayEvent, ease_out_quad},
    settings::OverlaySettings,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn nothing_happens_before_loading_completes() {
    let mut overlay = Overlay::new(OverlaySettings::default());
    assert!(overlay.update(ms(60_000)).is_empty());
    assert_eq!(overlay.alpha(), 1.0);
    assert!(overlay.is_visible());
}

#[test]
fn timeline_after_completion() {
    let mut overlay = Overlay::new(OverlaySettings::default());
    overlay.complete(ms(1_000));

    assert!(overlay.update(ms(1_499)).is_empty());
    assert_eq!(overlay.update(ms(1_500)), vec![OverlayEvent::FadeStarted]);
    assert_eq!(overlay.fade_started_at(), Some(ms(1_500)));
    assert_eq!(overlay.alpha(), 1.0);

    assert!(overlay.update(ms(2_499)).is_empty());
    // scene ready 1.5 s after completion, the tween starts at the same moment
    assert_eq!(overlay.update(ms(2_500)), vec![OverlayEvent::SceneReady]);
    assert_eq!(overlay.alpha(), 1.0);

    // half way through the 3 s tween
    assert!(overlay.update(ms(4_000)).is_empty());
    assert!((overlay.alpha() - (1.0 - ease_out_quad(0.5))).abs() < 1e-5);

    assert_eq!(overlay.update(ms(5_500)), vec![OverlayEvent::Removed]);
    assert_eq!(overlay.alpha(), 0.0);
    assert!(!overlay.is_visible());
    assert!(overlay.update(ms(9_000)).is_empty());
}

#[test]
fn late_frames_fire_every_due_timer_in_order() {
    let mut overlay = Overlay::new(OverlaySettings::default());
    overlay.complete(ms(0));
    assert_eq!(
        overlay.update(ms(10_000)),
        vec![
            OverlayEvent::FadeStarted,
            OverlayEvent::SceneReady,
            OverlayEvent::Removed
        ]
    );
    // anchored at the scheduled time, not at the late frame
    assert_eq!(overlay.fade_started_at(), Some(ms(500)));
}

#[test]
fn completing_twice_keeps_the_first_time() {
    let mut overlay = Overlay::new(OverlaySettings::default());
    overlay.complete(ms(100));
    overlay.complete(ms(5_000));
    assert_eq!(overlay.update(ms(600)), vec![OverlayEvent::FadeStarted]);
}

#[test]
fn ease_out_quad_is_clamped() {
    assert_eq!(ease_out_quad(-1.0), 0.0);
    assert_eq!(ease_out_quad(0.0), 0.0);
    assert_eq!(ease_out_quad(0.5), 0.75);
    assert_eq!(ease_out_quad(1.0), 1.0);
    assert_eq!(ease_out_quad(2.0), 1.0);
}
