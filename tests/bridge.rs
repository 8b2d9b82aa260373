use std::path::PathBuf;

use redapp_bridge::{BridgeConfig, ErrorCode, JvmBridge, Tristate};

/// A bridge whose discovery is guaranteed to fail: the override path is
/// a hard stop, so no real installation on the machine can be picked up.
fn dead_bridge() -> JvmBridge {
    JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java/install"))
}

#[test]
fn failed_discovery_reports_no_java() {
    let bridge = dead_bridge();
    assert!(!bridge.can_load(false));
    assert_eq!(bridge.load_error(), ErrorCode::NoJava as i32);
    assert_eq!(bridge.error_description(), "No Java installation found.");
    assert_eq!(bridge.java_path(), None);
    assert_eq!(bridge.java_version(), None);
}

#[test]
fn failed_discovery_leaves_a_trace() {
    let bridge = dead_bridge();
    let trace = bridge.discovery_trace();
    assert!(trace.contains("Java user path:"));
    assert!(trace.contains("(invalid Java path)"));
}

#[test]
fn invalid_runtime_never_dispatches_jobs() {
    let bridge = dead_bridge();
    assert!(!bridge.can_load(false));
    assert!(bridge.find_class("java/lang/String").is_none());
    assert!(bridge.new_string("hello").is_none());
    assert!(!bridge.exception_check());
    assert_eq!(bridge.jobs_executed(), 0);
}

#[test]
fn reinit_with_the_same_bad_override_still_fails() {
    let bridge = dead_bridge();
    assert!(!bridge.can_load(false));
    assert!(!bridge.can_load(true));
    assert_eq!(bridge.load_error(), ErrorCode::NoJava as i32);
}

#[test]
fn override_can_be_replaced_before_reinit() {
    let bridge = dead_bridge();
    assert!(!bridge.can_load(false));
    // still a nonexistent root, but proves the setter + reinit path runs
    bridge.set_runtime_override(Some(PathBuf::from("/another/bad/root")));
    assert!(!bridge.can_load(true));
    assert!(bridge.discovery_trace().contains("/another/bad/root"));
}

#[test]
fn tristate_folds_from_bool() {
    assert_eq!(Tristate::from(true), Tristate::True);
    assert_eq!(Tristate::from(false), Tristate::False);
    assert_ne!(Tristate::Invalid, Tristate::False);
}

#[test]
fn config_builders_accumulate() {
    let config = BridgeConfig::default()
        .runtime_override("/opt/java")
        .vm_option("-Xmx1g")
        .vm_option("-Xss2m")
        .verbose_jni(true)
        .cache_handles(true)
        .jar_dir("/opt/redapp");
    assert_eq!(config.runtime_override, Some(PathBuf::from("/opt/java")));
    assert_eq!(config.extra_vm_options, vec!["-Xmx1g", "-Xss2m"]);
    assert!(config.verbose_jni);
    assert!(config.cache_handles);
    assert_eq!(config.jar_dir, Some(PathBuf::from("/opt/redapp")));
}

#[test]
fn drop_without_initialization_is_clean() {
    let bridge = JvmBridge::new(BridgeConfig::default().runtime_override("/no/such/java"));
    drop(bridge);
}
