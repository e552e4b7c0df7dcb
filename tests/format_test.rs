//! Status format detection tests

use openvpn_exporter::error::ExporterError;
use openvpn_exporter::status::{detect, StatusFormat};

#[test]
fn test_detect_server_v2() {
    let format = detect(b"TITLE,OpenVPN 2.4.4 x86_64").expect("detection failed");
    assert_eq!(format, StatusFormat::ServerV2);
    assert_eq!(format.separator(), ',');
}

#[test]
fn test_detect_server_v3() {
    let format = detect(b"TITLE\tOpenVPN 2.4.4 x86_64").expect("detection failed");
    assert_eq!(format, StatusFormat::ServerV3);
    assert_eq!(format.separator(), '\t');
}

#[test]
fn test_detect_client() {
    let format = detect(b"OpenVPN STATISTICS\nUpdated").expect("detection failed");
    assert_eq!(format, StatusFormat::Client);
}

#[test]
fn test_unrecognized_prefix() {
    // Given: A status file from something that is not OpenVPN
    let result = detect(b"HELLO WORLD");

    // Then: Detection fails and the error shows what was seen
    let err = result.expect_err("must not detect");
    assert!(matches!(err, ExporterError::UnrecognizedFormat(_)));
    assert!(err.to_string().contains("HELLO WORLD"));
}

#[test]
fn test_detection_only_looks_at_prefix() {
    // Given: A valid marker after the first 18 bytes
    let result = detect(b"garbage-garbage-xxTITLE,");

    // Then: It is not found
    assert!(result.is_err());
}

#[test]
fn test_empty_input_is_unrecognized() {
    assert!(matches!(detect(b""), Err(ExporterError::UnrecognizedFormat(_))));
}

#[test]
fn test_title_with_space_is_unrecognized() {
    assert!(detect(b"TITLE OpenVPN").is_err());
}
