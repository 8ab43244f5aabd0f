use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RsvpError::config("x")
            .to_string()
            .contains("config out of range:")
    );
    assert!(
        RsvpError::unavailable("x")
            .to_string()
            .contains("export unavailable:")
    );
    assert!(
        RsvpError::sink("x")
            .to_string()
            .contains("recording sink failure:")
    );
    assert!(RsvpError::render("x").to_string().contains("render error:"));
    assert!(
        RsvpError::NothingToExport
            .to_string()
            .contains("nothing to export")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RsvpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
