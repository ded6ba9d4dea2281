use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DotweaveError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(DotweaveError::raster("x").to_string().contains("raster error:"));
    assert!(DotweaveError::config("x").to_string().contains("config error:"));
    assert!(DotweaveError::media("x").to_string().contains("media error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DotweaveError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
