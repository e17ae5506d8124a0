use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(ShowError::resource("x").to_string().contains("resource error:"));
    assert!(ShowError::format("x").to_string().contains("format error:"));
    assert!(ShowError::encoding("x").to_string().contains("encoding error:"));
    assert!(ShowError::state("x").to_string().contains("state error:"));
    assert!(
        ShowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn budget_error_formats_durations() {
    let fps = Fps::new(12.0).unwrap();
    let err = ShowError::budget_exceeded(KEY_AUDIO_TOO_LONG, 16_006, 16_000, fps);
    assert_eq!(err.message_key(), KEY_AUDIO_TOO_LONG);
    assert_eq!(err.message_args(), vec!["22:13.83".to_string(), "22:13.33".to_string()]);
    assert!(err.to_string().contains("22:13.83"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ShowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.message_key(), "error.other");
}

#[test]
fn cancelled_has_no_arguments() {
    assert_eq!(ShowError::Cancelled.message_key(), "error.cancelled");
    assert!(ShowError::Cancelled.message_args().is_empty());
}
