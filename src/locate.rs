//! Runtime discovery: find a directory containing a usable JVM shared
//! library.
//!
//! Candidates are probed in a fixed priority order: an explicit override
//! path, `JAVA_HOME`, every entry of the executable search path, and on
//! Windows the JavaSoft registry keys. The first install root whose
//! derived subpath contains the JVM library wins.
//!
//! Discovery never fails with an error; it returns `None` and leaves a
//! human-readable trace of every candidate tried and why it was
//! rejected. The trace ends up in the bridge's detailed error text, so
//! the phrasing here is user-facing.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Filename of the JVM shared library on the current platform.
pub fn library_filename() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "jvm.dll"
    }
    #[cfg(target_os = "macos")]
    {
        "libjvm.dylib"
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        "libjvm.so"
    }
}

/// Relative directories under an install root that may hold the library.
fn library_subdirs() -> &'static [&'static str] {
    #[cfg(windows)]
    {
        &["bin/server", "bin/client", "jre/bin/server", "jre/bin/client"]
    }
    #[cfg(unix)]
    {
        &["lib/server", "lib/amd64/server"]
    }
}

/// A successfully discovered Java runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRuntime {
    /// Directory containing `bin/` and `lib/` of the installation.
    pub install_root: PathBuf,
    /// Directory holding the JVM shared library.
    pub library_dir: PathBuf,
    /// Full path to the JVM shared library.
    pub library: PathBuf,
}

/// Everything discovery consults, captured up front so tests can supply
/// a synthetic environment.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryInputs {
    /// User-supplied install root. Non-empty and wrong is a hard stop.
    pub override_path: Option<PathBuf>,
    /// Value of `JAVA_HOME`, if set.
    pub java_home: Option<OsString>,
    /// Entries of the executable search path.
    pub path_entries: Vec<PathBuf>,
    /// Install root read from the JavaSoft registry keys (Windows).
    pub registry_home: Option<PathBuf>,
}

impl DiscoveryInputs {
    /// Captures the real process environment.
    pub fn from_process_env(override_path: Option<PathBuf>) -> Self {
        let path_entries = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        DiscoveryInputs {
            override_path,
            java_home: std::env::var_os("JAVA_HOME"),
            path_entries,
            registry_home: registry_java_home(),
        }
    }
}

#[cfg(windows)]
fn registry_java_home() -> Option<PathBuf> {
    // CurrentVersion names the most recently installed runtime; its
    // subkey holds the install root. The RuntimeLib value in the same
    // key can point at a client\jvm.dll that 64-bit JREs do not ship,
    // so JavaHome is the one to trust.
    const KEYS: [&str; 2] = [
        r"SOFTWARE\JavaSoft\JRE",
        r"SOFTWARE\JavaSoft\Java Runtime Environment",
    ];
    for key in KEYS {
        let Some(version) = crate::sys::windows::read_hklm_string(key, "CurrentVersion") else {
            continue;
        };
        let subkey = format!("{}\\{}", key, version.to_string_lossy());
        if let Some(home) = crate::sys::windows::read_hklm_string(&subkey, "JavaHome") {
            return Some(PathBuf::from(home));
        }
    }
    None
}

#[cfg(not(windows))]
fn registry_java_home() -> Option<PathBuf> {
    None
}

/// Append-only log of every discovery step.
#[derive(Debug, Default)]
pub struct DiscoveryTrace {
    text: String,
}

impl DiscoveryTrace {
    pub fn new() -> Self {
        DiscoveryTrace::default()
    }

    fn push(&mut self, s: &str) {
        self.text.push_str(s);
    }

    fn push_line(&mut self, s: &str) {
        self.text.push_str(s);
        self.text.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Tests the fixed subpath set under `root` for the JVM library.
fn probe_install_root(root: &Path) -> Option<LocatedRuntime> {
    let filename = library_filename();
    for subdir in library_subdirs() {
        let library_dir = root.join(subdir);
        let library = library_dir.join(filename);
        if library.is_file() {
            return Some(LocatedRuntime {
                install_root: root.to_path_buf(),
                library_dir,
                library,
            });
        }
    }
    None
}

/// Follow symlinks from `start`, at most `max_hops` times. A relative
/// link target resolves against the link's parent directory.
fn resolve_links(start: PathBuf, max_hops: u32) -> PathBuf {
    let mut current = start;
    for _ in 0..max_hops {
        match std::fs::read_link(&current) {
            Ok(target) => {
                current = if target.is_absolute() {
                    target
                } else {
                    match current.parent() {
                        Some(parent) => parent.join(target),
                        None => target,
                    }
                };
            }
            Err(_) => break,
        }
    }
    current
}

fn java_binary_name() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Runs the full discovery sequence.
///
/// Returns the first candidate that probes successfully. A non-empty
/// override path that fails the probe stops discovery entirely; the
/// user asked for that installation and silently using another one
/// would be worse than failing.
pub fn locate_runtime(
    inputs: &DiscoveryInputs,
    trace: &mut DiscoveryTrace,
) -> Option<LocatedRuntime> {
    // Phase 1: explicit override.
    if let Some(over) = &inputs.override_path {
        if !over.as_os_str().is_empty() {
            trace.push(&format!("Java user path: \"{}\"", over.display()));
            match probe_install_root(over) {
                Some(found) => {
                    trace.push("\n");
                    debug!(root = %found.install_root.display(), "runtime found via override path");
                    return Some(found);
                }
                None => {
                    trace.push_line(" (invalid Java path)");
                    return None;
                }
            }
        }
    }

    // Phase 2: JAVA_HOME.
    match &inputs.java_home {
        Some(home) if !home.is_empty() => {
            let home = PathBuf::from(home);
            trace.push(&format!("JAVA_HOME = \"{}\"", home.display()));
            match probe_install_root(&home) {
                Some(found) => {
                    trace.push("\n");
                    debug!(root = %found.install_root.display(), "runtime found via JAVA_HOME");
                    return Some(found);
                }
                None => trace.push_line(" (invalid Java path)"),
            }
        }
        _ => trace.push_line("JAVA_HOME is not set"),
    }

    // Phase 3: walk the executable search path for a java binary and
    // derive the install root from its (resolved) location.
    trace.push_line("Testing paths: ");
    let mut found_any_java = false;
    for entry in &inputs.path_entries {
        // the Common Files launcher stub is not an installation
        if cfg!(windows) && entry.to_string_lossy().contains("Common Files") {
            continue;
        }
        let candidate = entry.join(java_binary_name());
        if !candidate.is_file() {
            continue;
        }
        found_any_java = true;
        let resolved = resolve_links(candidate, 10);
        trace.push(&format!("\"{}\"", resolved.display()));
        // <root>/bin/java -> <root>
        let root = resolved.parent().and_then(Path::parent);
        if let Some(root) = root {
            if let Some(found) = probe_install_root(root) {
                trace.push("\n");
                debug!(root = %found.install_root.display(), "runtime found via PATH");
                return Some(found);
            }
        }
        trace.push_line(" (invalid Java path)");
    }
    if !found_any_java {
        trace.push_line("Java is not in the path");
    }

    // Phase 4: registry (Windows installs that never touch PATH).
    match &inputs.registry_home {
        Some(home) => {
            trace.push_line("Checking registry:");
            trace.push(&format!("\"{}\"", home.display()));
            match probe_install_root(home) {
                Some(found) => {
                    trace.push("\n");
                    debug!(root = %found.install_root.display(), "runtime found via registry");
                    return Some(found);
                }
                None => trace.push_line(" (invalid Java path)"),
            }
        }
        None => {
            if cfg!(windows) {
                trace.push_line("Java is not in the registry");
            }
        }
    }

    debug!("no usable Java runtime found");
    None
}
