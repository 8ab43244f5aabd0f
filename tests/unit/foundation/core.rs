use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0).is_err());
    assert_eq!(Fps::new(60).unwrap(), Fps::DEFAULT);
}

#[test]
fn fps_frame_ms_and_duration_agree() {
    let fps = Fps::new(50).unwrap();
    assert_eq!(fps.frame_ms(), 20.0);
    assert_eq!(fps.frames_to_duration(1), Duration::from_millis(20));
    assert_eq!(fps.frames_to_duration(100), Duration::from_secs(2));
}

#[test]
fn canvas_center_is_midpoint() {
    assert_eq!(Canvas::HD.center(), Point::new(640.0, 360.0));
}

#[test]
fn with_opacity_scales_alpha_only() {
    let half = Rgba8::opaque(255, 0, 0).with_opacity(0.5);
    assert_eq!((half.r, half.g, half.b, half.a), (255, 0, 0, 128));
    assert_eq!(half.with_opacity(2.0), half);
}

#[test]
fn frame_pixel_is_bounds_checked() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
}
