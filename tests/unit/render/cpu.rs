use super::*;
use crate::settings::{FontFamily, FontWeight};

fn renderer(style: FrameStyle) -> Option<CpuFrameRenderer> {
    let face = match FontFace::system(FontFamily::Mono, FontWeight::Bold) {
        Ok(face) => face,
        Err(err) => {
            eprintln!("skipping: {err}");
            return None;
        }
    };
    Some(CpuFrameRenderer::new(&face, style, FrameTheme::default(), 0.9).unwrap())
}

fn small_style() -> FrameStyle {
    FrameStyle::for_canvas(
        Canvas {
            width: 320,
            height: 180,
        },
        false,
    )
}

#[test]
fn surface_rejects_oversize_and_empty_canvas() {
    assert!(
        Surface::new(Canvas {
            width: 70_000,
            height: 10
        })
        .is_err()
    );
    assert!(
        Surface::new(Canvas {
            width: 0,
            height: 10
        })
        .is_err()
    );
    let s = Surface::new(Canvas {
        width: 8,
        height: 4,
    })
    .unwrap();
    assert_eq!(s.to_frame().data.len(), 8 * 4 * 4);
}

#[test]
fn placeholder_renders_without_words() {
    let Some(mut r) = renderer(small_style()) else {
        return;
    };
    let frame = r.render_frame(None, 0.0).unwrap();
    assert_eq!((frame.width, frame.height), (320, 180));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn progress_bar_fill_follows_fraction() {
    let style = small_style();
    let bar = progress_geometry(&style, 1.0);
    let x = (bar.track.x0 + 2.0) as u32;
    let y = ((bar.track.y0 + bar.track.y1) / 2.0) as u32;
    let Some(mut r) = renderer(style) else {
        return;
    };
    let word = WordUnit::new("focus");

    let full = r.render_frame(Some(&word), 1.0).unwrap();
    assert_eq!(full.pixel(x, y), Some([0xef, 0x44, 0x44, 255]));

    let empty = r.render_frame(Some(&word), 0.0).unwrap();
    assert_eq!(empty.pixel(x, y), Some([0x27, 0x27, 0x2a, 255]));
}

#[test]
fn rendering_is_deterministic() {
    let Some(mut r) = renderer(small_style()) else {
        return;
    };
    let word = WordUnit::new("deterministic,");
    let a = r.render_frame(Some(&word), 0.5).unwrap();
    let b = r.render_frame(Some(&word), 0.5).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, r.render_frame(Some(&WordUnit::new("other")), 0.5).unwrap());
}

#[test]
fn surface_size_must_match_style() {
    let Some(mut r) = renderer(small_style()) else {
        return;
    };
    let mut wrong = Surface::new(Canvas::HD).unwrap();
    assert!(matches!(
        r.render(&mut wrong, None, 0.0),
        Err(RsvpError::Render(_))
    ));
}

fn hd_renderer() -> Option<CpuFrameRenderer> {
    let mut style = FrameStyle::for_canvas(Canvas::HD, false);
    style.show_guides = false;
    renderer(style)
}

fn unit(text: &str, focal_index: usize) -> WordUnit {
    WordUnit {
        text: text.to_owned(),
        focal_index,
        pause_weight: 1.0,
    }
}

/// Leftmost and rightmost columns with any non-background pixel in the text band.
fn ink_columns(frame: &FrameRGBA) -> Option<(u32, u32)> {
    let mut span: Option<(u32, u32)> = None;
    for y in frame.height / 4..frame.height * 3 / 4 {
        for x in 0..frame.width {
            if frame.pixel(x, y) != Some([0, 0, 0, 255]) {
                span = Some(match span {
                    Some((l, r)) => (l.min(x), r.max(x)),
                    None => (x, x),
                });
            }
        }
    }
    span
}

fn side_width(r: &mut CpuFrameRenderer, text: &str) -> f64 {
    let brush = r.theme.side.into();
    f64::from(r.engine.layout_line(text, brush).width())
}

#[test]
fn longer_suffix_extends_ink_to_the_right() {
    let Some(mut r) = hd_renderer() else {
        return;
    };
    let short = r.render_frame(Some(&unit("abcdef", 3)), 0.0).unwrap();
    let long = r.render_frame(Some(&unit("abcdefghijkl", 3)), 0.0).unwrap();
    let (short_l, short_r) = ink_columns(&short).unwrap();
    let (long_l, long_r) = ink_columns(&long).unwrap();

    assert!(short_l.abs_diff(long_l) <= 1, "prefix moved: {short_l} vs {long_l}");
    let grown = f64::from(long_r) - f64::from(short_r);
    let expected = side_width(&mut r, "efghijkl") - side_width(&mut r, "ef");
    assert!(
        grown >= expected * 0.8,
        "suffix ink grew {grown}px, shaped width grew {expected}px"
    );
}

#[test]
fn longer_prefix_extends_ink_to_the_left() {
    let Some(mut r) = hd_renderer() else {
        return;
    };
    let short = r.render_frame(Some(&unit("adxyz", 1)), 0.0).unwrap();
    let long = r.render_frame(Some(&unit("abcdefdxyz", 6)), 0.0).unwrap();
    let (short_l, short_r) = ink_columns(&short).unwrap();
    let (long_l, long_r) = ink_columns(&long).unwrap();

    assert!(short_r.abs_diff(long_r) <= 1, "suffix moved: {short_r} vs {long_r}");
    let grown = f64::from(short_l) - f64::from(long_l);
    let expected = side_width(&mut r, "abcdef") - side_width(&mut r, "a");
    assert!(
        grown >= expected * 0.8,
        "prefix ink grew {grown}px, shaped width grew {expected}px"
    );
}
