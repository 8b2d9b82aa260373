use std::fs;
use std::path::{Path, PathBuf};

use redapp_bridge::locate::{library_filename, locate_runtime, DiscoveryInputs, DiscoveryTrace};
use tempfile::TempDir;

/// Lays down the files a real install root would have, enough for the
/// probe to accept it.
fn make_install_root(dir: &Path) -> PathBuf {
    let root = dir.to_path_buf();
    let library_dir = if cfg!(windows) {
        root.join("bin").join("server")
    } else {
        root.join("lib").join("server")
    };
    fs::create_dir_all(&library_dir).unwrap();
    fs::write(library_dir.join(library_filename()), b"not a real jvm").unwrap();
    fs::create_dir_all(root.join("bin")).unwrap();
    let java = if cfg!(windows) { "java.exe" } else { "java" };
    fs::write(root.join("bin").join(java), b"not a real launcher").unwrap();
    root
}

#[test]
fn override_path_wins() {
    let tmp = TempDir::new().unwrap();
    let root = make_install_root(tmp.path());

    let inputs = DiscoveryInputs {
        override_path: Some(root.clone()),
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    let found = locate_runtime(&inputs, &mut trace).unwrap();
    assert_eq!(found.install_root, root);
    assert!(found.library.is_file());
    assert!(trace.as_str().contains("Java user path:"));
}

#[test]
fn bad_override_stops_discovery_even_with_a_valid_java_home() {
    let tmp = TempDir::new().unwrap();
    let good = make_install_root(&tmp.path().join("good"));
    let bad = tmp.path().join("nothing-here");

    let inputs = DiscoveryInputs {
        override_path: Some(bad),
        java_home: Some(good.into_os_string()),
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    assert!(locate_runtime(&inputs, &mut trace).is_none());
    assert!(trace.as_str().contains("(invalid Java path)"));
    // the override is a hard stop: JAVA_HOME was never consulted
    assert!(!trace.as_str().contains("JAVA_HOME"));
}

#[test]
fn empty_override_is_treated_as_unset() {
    let tmp = TempDir::new().unwrap();
    let root = make_install_root(tmp.path());

    let inputs = DiscoveryInputs {
        override_path: Some(PathBuf::new()),
        java_home: Some(root.clone().into_os_string()),
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    let found = locate_runtime(&inputs, &mut trace).unwrap();
    assert_eq!(found.install_root, root);
    assert!(trace.as_str().contains("JAVA_HOME = "));
}

#[test]
fn java_home_beats_the_search_path() {
    let tmp = TempDir::new().unwrap();
    let home = make_install_root(&tmp.path().join("home"));
    let on_path = make_install_root(&tmp.path().join("on-path"));

    let inputs = DiscoveryInputs {
        java_home: Some(home.clone().into_os_string()),
        path_entries: vec![on_path.join("bin")],
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    let found = locate_runtime(&inputs, &mut trace).unwrap();
    assert_eq!(found.install_root, home);
}

#[test]
fn search_path_is_walked_when_java_home_is_invalid() {
    let tmp = TempDir::new().unwrap();
    let root = make_install_root(&tmp.path().join("real"));

    let inputs = DiscoveryInputs {
        java_home: Some(tmp.path().join("bogus").into_os_string()),
        path_entries: vec![tmp.path().join("no-java-here"), root.join("bin")],
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    let found = locate_runtime(&inputs, &mut trace).unwrap();
    assert_eq!(found.install_root, root);
    assert!(trace.as_str().contains("Testing paths: "));
}

#[cfg(unix)]
#[test]
fn search_path_resolves_symlinked_launchers() {
    let tmp = TempDir::new().unwrap();
    let root = make_install_root(&tmp.path().join("install"));

    // /usr/bin/java -> .../install/bin/java, the usual distro layout
    let link_dir = tmp.path().join("linkbin");
    fs::create_dir_all(&link_dir).unwrap();
    std::os::unix::fs::symlink(root.join("bin").join("java"), link_dir.join("java")).unwrap();

    let inputs = DiscoveryInputs {
        path_entries: vec![link_dir],
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    let found = locate_runtime(&inputs, &mut trace).unwrap();
    assert_eq!(found.install_root, root);
}

#[test]
fn registry_home_is_probed_last() {
    let tmp = TempDir::new().unwrap();
    let root = make_install_root(tmp.path());

    let inputs = DiscoveryInputs {
        registry_home: Some(root.clone()),
        ..DiscoveryInputs::default()
    };
    let mut trace = DiscoveryTrace::new();
    let found = locate_runtime(&inputs, &mut trace).unwrap();
    assert_eq!(found.install_root, root);
    assert!(trace.as_str().contains("Checking registry:"));
}

#[test]
fn nothing_found_reports_every_phase() {
    let inputs = DiscoveryInputs::default();
    let mut trace = DiscoveryTrace::new();
    assert!(locate_runtime(&inputs, &mut trace).is_none());
    let text = trace.as_str();
    assert!(text.contains("JAVA_HOME is not set"));
    assert!(text.contains("Java is not in the path"));
}
