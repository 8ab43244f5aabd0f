use super::*;
use crate::text::segment::{WordUnit, split_word};

/// Proportional stand-in font: 'm'/'w' are wide, 'i'/'l' narrow, everything else 10.
struct Proportional;

impl TextMeasure for Proportional {
    fn advance(&mut self, text: &str) -> f64 {
        text.chars()
            .map(|c| match c {
                'm' | 'w' | 'M' | 'W' => 16.0,
                'i' | 'l' | '.' | ',' => 4.0,
                _ => 10.0,
            })
            .sum()
    }
}

fn geometry_for(word: &str) -> (WordGeometry, PartWidths) {
    let unit = WordUnit::new(word);
    let widths = PartWidths::measure(&mut Proportional, &split_word(&unit));
    (word_geometry(640.0, widths, 4.0), widths)
}

#[test]
fn focal_slot_stays_centered_for_any_prefix_and_suffix() {
    for word in ["a", "it", "mmmmmmwide", "illicit", "www.", "wallpapering,"] {
        let (g, _) = geometry_for(word);
        assert!((g.slot_center() - 640.0).abs() < 1e-9, "{word}");
    }
}

#[test]
fn prefix_right_aligned_and_suffix_left_aligned_to_slot() {
    let (g, w) = geometry_for("reading");
    assert!((g.prefix_x + w.prefix - (g.slot_left - 4.0)).abs() < 1e-9);
    assert!((g.suffix_x - (g.slot_right() + 4.0)).abs() < 1e-9);
    assert_eq!(g.slot_width, w.focal);
}

#[test]
fn empty_parts_measure_zero() {
    let widths = PartWidths::measure(&mut Proportional, &WordParts {
            prefix: "",
            focal: "",
            suffix: "",
        },);
    assert_eq!(widths, PartWidths::default());
    let g = word_geometry(100.0, widths, 2.0);
    assert_eq!(g.slot_left, 100.0);
    assert_eq!(g.prefix_x, 98.0);
    assert_eq!(g.suffix_x, 102.0);
}

#[test]
fn progress_fill_matches_fraction() {
    let style = FrameStyle::default();
    let p = progress_geometry(&style, 0.25);
    assert_eq!(p.track, Rect::new(100.0, 680.0, 1180.0, 684.0));
    assert!((p.fill.width() - 1080.0 * 0.25).abs() < 1e-9);
    assert_eq!(p.fill.x0, p.track.x0);

    assert_eq!(progress_geometry(&style, 1.7).fill.width(), p.track.width());
    assert_eq!(progress_geometry(&style, -1.0).fill.width(), 0.0);
    assert_eq!(progress_geometry(&style, f64::NAN).fill.width(), 0.0);
}

#[test]
fn style_scales_with_canvas_height() {
    let small = FrameStyle::for_canvas(
        Canvas {
            width: 640,
            height: 360,
        },
        false,
    );
    assert_eq!(small.font_size_px, 60.0);
    assert_eq!(small.focal_gap_px, 2.0);
    assert_eq!(small.progress_margin_px, 50.0);

    let zen = FrameStyle::for_canvas(Canvas::HD, true);
    assert!(zen.font_size_px > FrameStyle::default().font_size_px);
    assert!(!zen.show_guides);
}

#[test]
fn guides_sit_outside_the_text_band() {
    let style = FrameStyle::default();
    let [top, bottom] = guide_geometry(&style, 640.0, 100.0);
    assert!(top.y1 <= 360.0 - 50.0);
    assert!(bottom.y0 >= 360.0 + 50.0);
    assert_eq!(top.center().x, 640.0);
    assert_eq!(bottom.height(), style.guide_length_px);
}
