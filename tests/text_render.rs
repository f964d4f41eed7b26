use std::f64::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use daydial::{DrawContext, FontSpec, FrameRGBA, Paintable, Point, Renderer, Rgba, Surface};

const SIZE: u32 = 64;

/// First TrueType font under the system font directories, if any.
fn system_font() -> Option<PathBuf> {
    fn walk(dir: &Path, depth: u32) -> Option<PathBuf> {
        if depth > 4 {
            return None;
        }
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        entries.sort();
        for path in &entries {
            let is_ttf = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf"));
            if is_ttf && path.is_file() {
                return Some(path.clone());
            }
        }
        entries
            .iter()
            .filter(|p| p.is_dir())
            .find_map(|p| walk(p, depth + 1))
    }

    let preferred = Path::new("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
    if preferred.is_file() {
        return Some(preferred.to_path_buf());
    }
    ["/usr/share/fonts", "/usr/local/share/fonts"]
        .iter()
        .find_map(|dir| walk(Path::new(dir), 0))
}

fn renderer_with_font() -> Option<(Renderer, String)> {
    let Some(path) = system_font() else {
        eprintln!("no system font found, skipping");
        return None;
    };
    let bytes = std::fs::read(&path).unwrap();
    let mut renderer = Renderer::default();
    let family = renderer.register_font(bytes).unwrap();
    Some((renderer, family))
}

/// Inclusive ink box `(x0, y0, x1, y1)` of pixels with any coverage.
fn ink_bounds(frame: &FrameRGBA) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..frame.height {
        for x in 0..frame.width {
            if frame.pixel(x, y).is_some_and(|px| px[3] > 0) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    bounds
}

fn center(b: (u32, u32, u32, u32)) -> (f64, f64) {
    (
        f64::from(b.0 + b.2) / 2.0,
        f64::from(b.1 + b.3) / 2.0,
    )
}

fn render_label(
    renderer: &mut Renderer,
    family: &str,
    outer_turn: bool,
    build: impl FnOnce(&mut DrawContext<'_>, FontSpec),
) -> FrameRGBA {
    let mut surface = Surface::new(SIZE, SIZE).unwrap();
    if outer_turn {
        surface.rotate_about(FRAC_PI_2, Point::new(32.0, 32.0));
    }
    let mut q = DrawContext::new();
    build(&mut q, FontSpec::new(8.0, family));
    renderer.render(q, &mut surface).unwrap();
    surface.frame().unwrap()
}

#[test]
fn text_reads_upright_under_the_outer_quarter_turn() {
    let Some((mut renderer, family)) = renderer_with_font() else {
        return;
    };
    let frame = render_label(&mut renderer, &family, true, |q, font| {
        q.text("MMMM", 32.0, 32.0, Some(font)).fill_with(Rgba::WHITE);
    });

    let b = ink_bounds(&frame).expect("text left no ink");
    let (w, h) = (b.2 - b.0 + 1, b.3 - b.1 + 1);
    assert!(w > h, "ink box {b:?} should be wider than tall");

    // Centered on the anchor, nudged 2px along the user x axis (device +y after the turn).
    let (cx, cy) = center(b);
    assert!((cx - 32.0).abs() <= 3.0, "ink center {cx},{cy}");
    assert!((cy - 34.0).abs() <= 4.0, "ink center {cx},{cy}");
}

#[test]
fn text_without_the_outer_turn_runs_vertically() {
    let Some((mut renderer, family)) = renderer_with_font() else {
        return;
    };
    let frame = render_label(&mut renderer, &family, false, |q, font| {
        q.text("MMMM", 32.0, 32.0, Some(font)).fill_with(Rgba::WHITE);
    });

    let b = ink_bounds(&frame).expect("text left no ink");
    assert!(b.3 - b.1 > b.2 - b.0, "ink box {b:?} should be taller than wide");
    let (cx, cy) = center(b);
    assert!((cx - 34.0).abs() <= 4.0, "ink center {cx},{cy}");
    assert!((cy - 32.0).abs() <= 3.0, "ink center {cx},{cy}");
}

#[test]
fn text_paints_only_with_a_fill_or_stroke_intent() {
    let Some((mut renderer, family)) = renderer_with_font() else {
        return;
    };

    let silent = render_label(&mut renderer, &family, true, |q, font| {
        q.text("MMMM", 32.0, 32.0, Some(font));
    });
    assert!(ink_bounds(&silent).is_none());

    let stroked = render_label(&mut renderer, &family, true, |q, font| {
        q.text("MMMM", 32.0, 32.0, Some(font))
            .stroke_with(Rgba::WHITE, 1.0);
    });
    assert!(ink_bounds(&stroked).is_some());
}
