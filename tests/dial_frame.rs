use std::f64::consts::FRAC_PI_2;

use daydial::{ClockTime, Dial, DialConfig, Renderer, Surface, combined_to_angle};

fn render_at(config: &DialConfig, at: &str) -> daydial::FrameRGBA {
    let dial = Dial::new(config).unwrap();
    let mut renderer = Renderer::default();
    let mut surface = Surface::new(config.size, config.size).unwrap();
    dial.render_frame(&mut renderer, &mut surface, at.parse().unwrap())
        .unwrap();
    surface.frame().unwrap()
}

fn small() -> DialConfig {
    DialConfig {
        size: 128,
        ..DialConfig::default()
    }
}

#[test]
fn dial_frame_is_non_empty_and_deterministic() {
    let a = render_at(&small(), "10:30");
    let b = render_at(&small(), "10:30");

    assert_eq!((a.width, a.height), (128, 128));
    assert!(a.premultiplied);
    assert_eq!(a.data, b.data);
    assert!(a.data.chunks_exact(4).any(|px| px[3] > 0));
}

#[test]
fn face_is_clipped_to_the_outer_circle() {
    let frame = render_at(&small(), "13:00");
    // Corners lie outside the face and stay transparent without a background.
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(127, 127), Some([0, 0, 0, 0]));
    // Just inside the rim the sky or night wedge is opaque.
    assert_eq!(frame.pixel(64, 10).map(|px| px[3]), Some(255));
}

#[test]
fn background_fills_the_corners() {
    let config = DialConfig {
        background: Some("#102030".to_string()),
        ..small()
    };
    let frame = render_at(&config, "02:00");
    assert_eq!(frame.pixel(0, 0), Some([0x10, 0x20, 0x30, 255]));
}

#[test]
fn frames_differ_across_the_day() {
    assert_ne!(render_at(&small(), "03:00").data, render_at(&small(), "13:00").data);
}

#[test]
fn one_renderer_reuses_layer_buffers_across_frames() {
    let config = small();
    let dial = Dial::new(&config).unwrap();
    let mut renderer = Renderer::default();
    let mut surface = Surface::new(config.size, config.size).unwrap();

    let mut now: ClockTime = "06:00".parse().unwrap();
    dial.render_frame(&mut renderer, &mut surface, now).unwrap();
    let first = renderer.pool_stats().alloc_surfaces;
    assert!(first > 0);

    for _ in 0..3 {
        now = now.advance(config.step_secs);
        dial.render_frame(&mut renderer, &mut surface, now).unwrap();
    }
    assert_eq!(renderer.pool_stats().alloc_surfaces, first);
    assert_eq!(surface.save_depth(), 0);
}

#[test]
fn clock_math_matches_the_dial_orientation() {
    assert!((combined_to_angle(6.0) - FRAC_PI_2).abs() < 1e-12);
    let t: ClockTime = "23:59:30".parse().unwrap();
    assert_eq!(t.advance(45).to_string(), "00:00");
    assert_eq!(daydial::format_time("00:05".parse().unwrap()), "12:05");
}
