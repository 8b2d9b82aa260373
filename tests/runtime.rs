use std::fs;

use redapp_bridge::runtime::{
    build_classpath, describe_error, format_version, required_archives, ErrorCode, RuntimeState,
    LOAD_ERROR_NO_ENTRY, REQUIRED_ARCHIVES,
};
use redapp_bridge::sys::jni;
use tempfile::TempDir;

#[test]
fn error_descriptions_are_stable() {
    assert_eq!(describe_error(ErrorCode::Ok, 0, 0), "No error");
    assert_eq!(
        describe_error(ErrorCode::NoJava, 0, 0),
        "No Java installation found."
    );
    assert_eq!(
        describe_error(ErrorCode::NoJni, LOAD_ERROR_NO_ENTRY, 0),
        "The Java install doesn't contain a valid JNI library."
    );
    assert_eq!(
        describe_error(ErrorCode::MissingJar, 0, 0),
        "Java installation issues."
    );
    assert_eq!(
        describe_error(ErrorCode::Architecture, 0, 0),
        "Installed Java is not 64-bit."
    );
}

#[test]
fn jvm_errors_are_refined_by_the_creation_code() {
    assert_eq!(
        describe_error(ErrorCode::JvmError, 0, jni::JNI_EVERSION),
        "Incorrect Java version."
    );
    assert_eq!(
        describe_error(ErrorCode::JvmError, 0, jni::JNI_ENOMEM),
        "Not enough memory to load the JVM."
    );
    assert_eq!(
        describe_error(ErrorCode::JvmError, 0, jni::JNI_EINVAL),
        "Internal JVM error."
    );
    assert_eq!(
        describe_error(ErrorCode::JvmError, 0, jni::JNI_EDETACHED),
        "Internal JVM error."
    );
    assert_eq!(
        describe_error(ErrorCode::JvmError, 0, jni::JNI_ERR),
        "Unknown Java initialization issue"
    );
}

#[test]
fn validity_requires_initialization_and_a_clean_error() {
    let mut state = RuntimeState::default();
    assert!(!state.is_valid());

    state.initialized = true;
    assert!(state.is_valid());

    // a missing jar makes the runtime invalid even if the VM came up
    state.error = ErrorCode::MissingJar;
    state.java_version = Some("1.8".to_string());
    assert!(!state.is_valid());
}

#[test]
fn merged_error_prefers_the_recorded_code() {
    let mut state = RuntimeState::default();
    assert_eq!(state.merged_error(), 0);

    state.load_error = LOAD_ERROR_NO_ENTRY;
    assert_eq!(state.merged_error(), LOAD_ERROR_NO_ENTRY);

    state.error = ErrorCode::NoJni;
    assert_eq!(state.merged_error(), ErrorCode::NoJni as i32);
}

#[test]
fn archive_manifest_is_complete() {
    assert_eq!(REQUIRED_ARCHIVES.len(), 34);
    assert!(REQUIRED_ARCHIVES.contains(&"REDapp_Lib.jar"));
    assert!(REQUIRED_ARCHIVES.contains(&"weather.jar"));
    assert!(REQUIRED_ARCHIVES.contains(&"hss-java.jar"));
    assert!(REQUIRED_ARCHIVES.contains(&"xmlbeans.jar"));
    // xml-apis.jar is the windows-only extra
    assert!(!REQUIRED_ARCHIVES.contains(&"xml-apis.jar"));

    let jars = required_archives();
    if cfg!(windows) {
        assert_eq!(jars.len(), 35);
        let apis = jars.iter().position(|j| *j == "xml-apis.jar").unwrap();
        let beans = jars.iter().position(|j| *j == "xmlbeans.jar").unwrap();
        assert!(apis < beans);
    } else {
        assert_eq!(jars.len(), 34);
    }
}

#[test]
fn classpath_lists_every_jar_and_flags_the_missing_ones() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("REDapp_Lib.jar"), b"pk").unwrap();
    fs::write(tmp.path().join("weather.jar"), b"pk").unwrap();

    let classpath = build_classpath(tmp.path());
    assert!(classpath.option.starts_with("-Djava.class.path="));

    let separator = if cfg!(windows) { ';' } else { ':' };
    let entries: Vec<&str> = classpath.option["-Djava.class.path=".len()..]
        .split(separator)
        .filter(|e| !e.is_empty())
        .collect();
    assert_eq!(entries.len(), required_archives().len());
    // every entry is terminated, so the option ends with the separator
    assert!(classpath.option.ends_with(separator));

    assert!(!classpath.missing.contains(&"REDapp_Lib.jar"));
    assert!(!classpath.missing.contains(&"weather.jar"));
    assert!(classpath.missing.contains(&"fwi.jar"));
    assert_eq!(classpath.missing.len(), required_archives().len() - 2);
}

#[cfg(windows)]
#[test]
fn classpath_entries_use_forward_slashes() {
    let tmp = TempDir::new().unwrap();
    let classpath = build_classpath(tmp.path());
    let body = &classpath.option["-Djava.class.path=".len()..];
    assert!(!body.contains('\\'));
}

#[test]
fn version_words_decode_to_major_minor() {
    assert_eq!(format_version(jni::JNI_VERSION_1_8), "1.8");
    assert_eq!(format_version(0x0001_0006), "1.6");
    assert_eq!(format_version(0x0009_0000), "9.0");
}
