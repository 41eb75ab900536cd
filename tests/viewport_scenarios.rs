use rasterview::viewport::{SCALE_FACTOR, SCALE_MAX, Viewport};

fn close(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "{a} vs {b}");
}

fn wide_panorama() -> Viewport {
    // 800x600 container, 1600x400 image
    let mut vp = Viewport::new();
    vp.set_container(800, 600);
    vp.set_image(Some((1600, 400)));
    vp
}

#[test]
fn fit_scale_and_centering_for_wide_image() {
    let vp = wide_panorama();
    // scale_min = min(1, 800/1600, 600/400) = 0.5
    close(vp.scale_min(), 0.5, 1e-6);
    close(vp.scale(), 0.5, 1e-6);
    // offset = ((800 - 800) / 2, (600 - 200) / 2) = (0, 200)
    let (x, y) = vp.offset();
    close(x, 0.0, 1e-4);
    close(y, 200.0, 1e-4);
    assert!(vp.fitted());
}

#[test]
fn single_zoom_step_from_fit() {
    let mut vp = wide_panorama();
    assert!(vp.zoom_in());
    // 0.5 * 1.25 = 0.625, recentered, no longer fitted
    close(vp.scale(), 0.625, 1e-6);
    assert!(!vp.fitted());
    let (x, y) = vp.offset();
    close(x, (800.0 - 0.625 * 1600.0) / 2.0, 1e-3);
    close(y, (600.0 - 0.625 * 400.0) / 2.0, 1e-3);
}

#[test]
fn zoom_in_then_out_restores_scale() {
    let mut vp = wide_panorama();
    vp.set_scale(2.0);
    let before = vp.scale();

    assert!(vp.zoom_in());
    assert!(vp.zoom_out());
    close(vp.scale(), before, 1e-5);
}

#[test]
fn zoom_steps_clamp_at_the_ceiling() {
    let mut vp = wide_panorama();
    for _ in 0..64 {
        vp.zoom_in();
    }
    close(vp.scale(), SCALE_MAX, 1e-6);
    // one more step is a no-op
    assert!(!vp.zoom_in());
}

#[test]
fn scale_stays_inside_bounds_under_arbitrary_requests() {
    let mut vp = wide_panorama();
    // deterministic pseudo-random walk over wild scale targets
    let mut seed = 0x2545_F491u32;
    for _ in 0..200 {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        #[allow(clippy::cast_precision_loss)]
        let target = (f64::from(seed) / f64::from(u32::MAX) * 100.0 - 20.0) as f32;
        vp.set_scale(target);
        assert!(vp.scale() >= vp.scale_min(), "below min at {target}");
        assert!(vp.scale() <= vp.scale_max(), "above max at {target}");
        // clamping twice changes nothing
        let clamped = vp.scale();
        vp.set_scale(clamped);
        close(vp.scale(), clamped, 0.0);
    }
}

#[test]
fn translate_never_exposes_background_on_the_overflow_axis() {
    let mut vp = wide_panorama();
    vp.set_scale(1.0); // 1600x400 in 800x600: x overflows, y fits

    let steps = [
        (-250.0, 40.0),
        (-10_000.0, -10_000.0),
        (123.0, 5.0),
        (10_000.0, 10_000.0),
        (-1.0, 0.0),
    ];
    for (dx, dy) in steps {
        vp.translate(dx, dy);
        let (x, y) = vp.offset();
        assert!((-800.0..=0.0).contains(&x), "x out of range: {x}");
        // smaller axis is pinned to its centering value
        close(y, 100.0, 1e-4);
    }
}

#[test]
fn fitted_mode_survives_resizes() {
    let mut vp = wide_panorama();
    vp.set_container(400, 300);
    assert!(vp.fitted());
    close(vp.scale(), 0.25, 1e-6);

    vp.set_container(3200, 800);
    assert!(vp.fitted());
    // fit scale capped at 1 even with room to spare
    close(vp.scale(), 1.0, 1e-6);
}

#[test]
fn manual_zoom_exits_fit_until_zoomed_back_out() {
    let mut vp = wide_panorama();
    assert!(vp.zoom_in());
    assert!(!vp.fitted());

    // zooming out lands back on the minimum and re-enters fitted mode
    assert!(vp.zoom_out());
    assert!(vp.fitted());
    close(vp.scale(), vp.scale_min(), 1e-6);
}

#[test]
fn zoom_factor_is_a_single_constant() {
    let mut vp = wide_panorama();
    let before = vp.scale();
    vp.zoom_in();
    close(vp.scale(), before * SCALE_FACTOR, 1e-6);
}

#[test]
fn bounds_report_tracks_transitions() {
    let mut vp = wide_panorama();
    let fitted = vp.bounds();
    close(fitted.scale, 0.5, 1e-6);
    close(fitted.min, 0.5, 1e-6);
    close(fitted.max, SCALE_MAX, 1e-6);

    vp.zoom_in();
    let zoomed = vp.bounds();
    assert_ne!(fitted, zoomed);
    close(zoomed.min, fitted.min, 0.0);
}

#[test]
fn clearing_the_image_disables_zoom_and_pan() {
    let mut vp = wide_panorama();
    assert!(vp.set_image(None));
    assert!(!vp.zoom_in());
    assert!(!vp.translate(5.0, 5.0));
    assert!(!vp.fit());
}
