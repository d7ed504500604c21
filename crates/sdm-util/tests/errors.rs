use sdm_util::errors::SdmError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = SdmError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_manifest_error_display() {
    let err = SdmError::Manifest {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Manifest error: bad syntax");
}

#[test]
fn test_config_error_display() {
    let err = SdmError::Config {
        message: "unknown branch policy".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: unknown branch policy");
}

#[test]
fn test_git_error_display() {
    let err = SdmError::Git {
        message: "clone failed".to_string(),
    };
    assert_eq!(err.to_string(), "git error: clone failed");
}

#[test]
fn test_generic_error_display() {
    let err = SdmError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let sdm_err: SdmError = io_err.into();
    assert!(matches!(sdm_err, SdmError::Io(_)));
}
