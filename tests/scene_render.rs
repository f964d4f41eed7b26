use std::cell::RefCell;
use std::f64::consts::PI;

use daydial::{
    DialError, DrawContext, FrameRGBA, LayerPoolOpts, Paintable, Renderer, RendererOpts, Rgba,
    Styled, Surface,
};

const RED: Rgba = Rgba::rgb8(255, 0, 0);

fn render(
    size: u32,
    background: Option<Rgba>,
    build: impl FnOnce(&mut DrawContext<'_>),
) -> FrameRGBA {
    let mut surface = Surface::new(size, size).unwrap();
    if let Some(bg) = background {
        surface.clear_to(bg);
    }
    let mut q = DrawContext::new();
    build(&mut q);
    Renderer::default().render(q, &mut surface).unwrap();
    surface.frame().unwrap()
}

fn close(a: [u8; 4], b: [u8; 4], tol: u8) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= tol)
}

#[test]
fn shapes_paint_in_z_order_keeping_insertion_order_for_ties() {
    let log = RefCell::new(Vec::new());
    let mut q = DrawContext::new();
    q.custom(|_| {
        log.borrow_mut().push("z2");
        Ok(())
    })
    .z(2);
    q.custom(|_| {
        log.borrow_mut().push("z0-first");
        Ok(())
    });
    q.custom(|_| {
        log.borrow_mut().push("z1");
        Ok(())
    })
    .z(1);
    q.custom(|_| {
        log.borrow_mut().push("z0-second");
        Ok(())
    });

    let mut surface = Surface::new(8, 8).unwrap();
    Renderer::default().render(q, &mut surface).unwrap();

    assert_eq!(*log.borrow(), ["z0-first", "z0-second", "z1", "z2"]);
}

#[test]
fn clip_limits_children_and_is_not_painted_itself() {
    let frame = render(32, None, |q| {
        q.rect(0.0, 0.0, 16.0, 32.0)
            .fill_with(Rgba::BLACK)
            .clip(|mask| {
                mask.fill(RED);
            });
    });

    assert_eq!(frame.pixel(4, 16), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(28, 16), Some([0, 0, 0, 0]));
}

#[test]
fn clip_ends_with_its_shape() {
    let frame = render(32, None, |q| {
        q.rect(0.0, 0.0, 16.0, 32.0).clip(|mask| {
            mask.fill(RED);
        });
        q.rect(16.0, 0.0, 16.0, 32.0).fill_with(Rgba::WHITE);
    });

    assert_eq!(frame.pixel(28, 16), Some([255, 255, 255, 255]));
}

#[test]
fn layer_opacity_matches_direct_alpha() {
    let layered = render(32, Some(Rgba::WHITE), |q| {
        q.layer(|layer| {
            layer.rect(0.0, 0.0, 32.0, 32.0).fill_with(RED);
        })
        .opacity(0.5);
    });
    let direct = render(32, Some(Rgba::WHITE), |q| {
        q.rect(0.0, 0.0, 32.0, 32.0).fill_with(RED).opacity(0.5);
    });

    let a = layered.pixel(16, 16).unwrap();
    let b = direct.pixel(16, 16).unwrap();
    assert!(close(a, b, 2), "layer {a:?} vs direct {b:?}");
    assert!(close(a, [255, 128, 128, 255], 3), "got {a:?}");
}

#[test]
fn layer_groups_overlapping_children_before_opacity() {
    // Two overlapping opaque rects in a half-opacity layer blend once, not twice.
    let frame = render(32, Some(Rgba::WHITE), |q| {
        q.layer(|layer| {
            layer.rect(0.0, 0.0, 32.0, 32.0).fill_with(RED);
            layer.rect(0.0, 0.0, 32.0, 32.0).fill_with(RED);
        })
        .opacity(0.5);
    });
    assert!(close(frame.pixel(16, 16).unwrap(), [255, 128, 128, 255], 3));
}

#[test]
fn sector_fills_the_clockwise_half_disc() {
    let frame = render(64, None, |q| {
        q.sector(32.0, 32.0, 30.0, 0.0, PI, false).fill_with(RED);
    });

    // Clockwise from 0 to π in y-down space covers the lower half.
    assert_eq!(frame.pixel(32, 50), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(32, 14), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn counter_clockwise_sector_fills_the_other_half() {
    let frame = render(64, None, |q| {
        q.sector(32.0, 32.0, 30.0, 0.0, PI, true).fill_with(RED);
    });

    assert_eq!(frame.pixel(32, 14), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(32, 50), Some([0, 0, 0, 0]));
}

fn nested_layers(q: &mut DrawContext<'_>) {
    q.layer(|outer| {
        outer.layer(|inner| {
            inner.circle(16.0, 16.0, 8.0).fill_with(RED);
        });
    })
    .opacity(0.8);
}

#[test]
fn pool_allocates_only_during_the_first_frame() {
    let mut renderer = Renderer::default();
    let mut surface = Surface::new(32, 32).unwrap();

    let mut q = DrawContext::new();
    nested_layers(&mut q);
    renderer.render(q, &mut surface).unwrap();
    let first = renderer.pool_stats();
    assert_eq!(first.alloc_surfaces, 2);

    surface.clear();
    let mut q = DrawContext::new();
    nested_layers(&mut q);
    renderer.render(q, &mut surface).unwrap();
    let second = renderer.pool_stats();

    assert_eq!(second.alloc_surfaces, first.alloc_surfaces);
    assert_eq!(second.reused_surfaces, first.reused_surfaces + 2);
    assert_eq!(second.retained_surfaces, 2);
}

#[test]
fn exceeding_max_depth_is_a_render_error() {
    let mut renderer = Renderer::new(RendererOpts {
        pool: LayerPoolOpts { max_depth: 1 },
    })
    .unwrap();
    let mut surface = Surface::new(32, 32).unwrap();

    let mut q = DrawContext::new();
    nested_layers(&mut q);
    let err = renderer.render(q, &mut surface).unwrap_err();

    assert!(matches!(err, DialError::Render(_)), "{err}");
    assert_eq!(surface.save_depth(), 0);
}

#[test]
fn zero_max_depth_is_rejected() {
    let err = Renderer::new(RendererOpts {
        pool: LayerPoolOpts { max_depth: 0 },
    })
    .unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
}

#[test]
fn failing_custom_program_leaves_state_balanced() {
    let mut surface = Surface::new(16, 16).unwrap();
    let mut q = DrawContext::new();
    q.circle(8.0, 8.0, 6.0).clip(|mask| {
        mask.custom(|surface| {
            surface.translate(3.0, 3.0);
            Err(DialError::render("boom"))
        });
    });

    let err = Renderer::default().render(q, &mut surface).unwrap_err();
    assert!(err.to_string().contains("boom"));
    assert_eq!(surface.save_depth(), 0);
    assert_eq!(surface.transform(), daydial::Affine::IDENTITY);

    // The clip was released: a later fill reaches the corner.
    surface.fill_rect(0.0, 0.0, 16.0, 16.0);
    assert_eq!(surface.frame().unwrap().pixel(0, 0), Some([0, 0, 0, 255]));
}
