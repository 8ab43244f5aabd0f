use super::*;

fn system_face() -> Option<FontFace> {
    match FontFace::system(FontFamily::Mono, FontWeight::Bold) {
        Ok(face) => Some(face),
        Err(err) => {
            eprintln!("skipping: {err}");
            None
        }
    }
}

#[test]
fn brush_converts_from_rgba() {
    let b: TextBrushRgba8 = Rgba8::opaque(239, 68, 68).into();
    assert_eq!(
        b,
        TextBrushRgba8 {
            r: 239,
            g: 68,
            b: 68,
            a: 255
        }
    );
}

#[test]
fn engine_rejects_non_positive_size() {
    let face = FontFace {
        bytes: Arc::new(Vec::new()),
        index: 0,
        family_name: "none".to_string(),
        weight: FontWeight::Normal,
    };
    assert!(matches!(
        TextLayoutEngine::new(&face, 0.0),
        Err(RsvpError::Render(_))
    ));
}

#[test]
fn missing_font_file_is_an_error() {
    assert!(FontFace::from_file(Path::new("does/not/exist.ttf"), FontWeight::Normal).is_err());
}

#[test]
fn measured_advance_grows_with_text() {
    let Some(face) = system_face() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&face, 48.0).unwrap();
    let one = engine.advance("m");
    let three = engine.advance("mmm");
    assert!(one > 0.0);
    assert!(three > one * 2.5);
    assert_eq!(engine.advance(""), 0.0);
}
