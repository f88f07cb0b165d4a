//! Canvas sizing: logical size for the page, drawing buffer capped at 2x.

use showroom::{context::ViewportSize, settings::Settings};
use winit::dpi::PhysicalSize;

fn viewport(width: u32, height: u32, scale_factor: f64) -> ViewportSize {
    ViewportSize::new(
        PhysicalSize::new(width, height),
        scale_factor,
        Settings::default().max_pixel_ratio,
    )
}

#[test]
fn dense_screens_are_capped_at_twice_the_logical_size() {
    let size = viewport(2_400, 1_800, 3.0);
    assert_eq!(size.logical, (800, 600));
    assert_eq!(size.physical, (1_600, 1_200));
}

#[test]
fn ratios_below_the_cap_are_kept() {
    let size = viewport(1_200, 900, 1.5);
    assert_eq!(size.logical, (800, 600));
    assert_eq!(size.physical, (1_200, 900));

    let size = viewport(800, 600, 1.0);
    assert_eq!(size.logical, (800, 600));
    assert_eq!(size.physical, (800, 600));
}

#[test]
fn the_cap_is_exact_at_two() {
    let size = viewport(1_600, 1_200, 2.0);
    assert_eq!(size.logical, (800, 600));
    assert_eq!(size.physical, (1_600, 1_200));
}
