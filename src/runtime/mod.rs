//! Native runtime handle: loads the JVM shared library, creates the VM,
//! and records why either step failed.
//!
//! There is one concrete handle per platform (`unix`, `windows`) behind
//! the `NativeRuntime` re-export; call sites never learn which variant
//! is active. Everything that is not genuinely platform-specific lives
//! here: the error taxonomy, the inspectable state, the jar manifest and
//! classpath assembly, and the 64-bit probe.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::sys::jni;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UnixRuntime as NativeRuntime;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsRuntime as NativeRuntime;

/// Recorded value of `RuntimeState::load_error` when the shared library
/// or its VM-creation entry point could not be resolved.
pub const LOAD_ERROR_NO_ENTRY: i32 = -2;

/// Stable initialization error codes, queryable by callers that predate
/// the typed error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// No error recorded.
    Ok = 0,
    /// No Java installation could be discovered.
    NoJava = 1,
    /// An installation was found but its JNI library would not load.
    NoJni = 2,
    /// VM creation itself failed; see `vm_error` for the JNI code.
    JvmError = 3,
    /// A required archive is missing next to the executable. May coexist
    /// with a successfully created VM; the runtime is still invalid.
    MissingJar = 4,
    /// The installed runtime is not 64-bit.
    Architecture = 5,
}

/// Typed failures from the individual initialization steps. These are
/// internal plumbing; `initialize` folds them into `RuntimeState`.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no Java runtime found")]
    NoRuntime,
    #[error("failed to load the JVM library: {detail}")]
    NoLibrary { detail: String },
    #[error("JNI_CreateJavaVM failed with code {code}")]
    Creation { code: i32 },
    #[error("a fault occurred inside JNI_CreateJavaVM (code {code})")]
    CreationFault { code: i32 },
    #[error("required archive missing: {name}")]
    MissingArchive { name: String },
    #[error("installed Java runtime is not 64-bit")]
    WrongArchitecture,
    #[error("option string contains a NUL byte")]
    Nul,
}

/// Everything a caller can ask about an initialization attempt.
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    /// Whether `initialize` has run. At-most-once; a second call is a
    /// no-op that returns the recorded validity.
    pub initialized: bool,
    pub error: ErrorCode,
    /// Platform library-load detail (0 when loading succeeded).
    pub load_error: i32,
    /// JNI code returned by VM creation (0 when creation succeeded or
    /// was never attempted).
    pub vm_error: i32,
    /// Install root of the runtime in use.
    pub java_path: Option<PathBuf>,
    /// `"<major>.<minor>"` decoded from the env's version word.
    pub java_version: Option<String>,
    /// Discovery trace plus any load diagnostics.
    pub trace: String,
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Ok
    }
}

impl RuntimeState {
    pub fn is_valid(&self) -> bool {
        self.initialized && self.error == ErrorCode::Ok
    }

    /// Merged numeric error: the recorded code when non-zero, otherwise
    /// the platform load detail.
    pub fn merged_error(&self) -> i32 {
        if self.error != ErrorCode::Ok {
            self.error as i32
        } else {
            self.load_error
        }
    }
}

/// Human-readable description of a recorded failure. The strings are
/// shown in diagnostics UIs; platform codes never surface directly.
pub fn describe_error(error: ErrorCode, load_error: i32, vm_error: i32) -> &'static str {
    match error {
        ErrorCode::Ok if load_error == 0 => "No error",
        ErrorCode::NoJava => "No Java installation found.",
        ErrorCode::NoJni => "The Java install doesn't contain a valid JNI library.",
        ErrorCode::MissingJar => "Java installation issues.",
        ErrorCode::Architecture => "Installed Java is not 64-bit.",
        _ => match vm_error {
            jni::JNI_EVERSION => "Incorrect Java version.",
            jni::JNI_ENOMEM => "Not enough memory to load the JVM.",
            jni::JNI_EINVAL | jni::JNI_EDETACHED => "Internal JVM error.",
            _ => "Unknown Java initialization issue",
        },
    }
}

/// Archives the managed library needs on its classpath, expected to sit
/// next to the hosting executable.
pub const REQUIRED_ARCHIVES: &[&str] = &[
    "checker-qual.jar",
    "commons-codec.jar",
    "commons-collections4.jar",
    "commons-compress.jar",
    "commons-io.jar",
    "commons-math3.jar",
    "curvesapi.jar",
    "error_prone_annotations.jar",
    "failureaccess.jar",
    "fuel.jar",
    "fwi.jar",
    "grid.jar",
    "gson.jar",
    "guava.jar",
    "hss-java.jar",
    "jakarta.activation.jar",
    "jakarta.xml.bind-api.jar",
    "javax.activation-api.jar",
    "jaxb-api.jar",
    "jaxb-core.jar",
    "jaxb-impl.jar",
    "jsr305.jar",
    "listenablefuture.jar",
    "math.jar",
    "poi.jar",
    "poi-ooxml.jar",
    "poi-ooxml-lite.jar",
    "protobuf-java.jar",
    "protobuf-java-util.jar",
    "REDapp_Lib.jar",
    "SparseBitSet.jar",
    "weather.jar",
    "wtime.jar",
    "xmlbeans.jar",
];

/// The manifest for the current platform. Windows additionally needs
/// `xml-apis.jar`, ordered before `xmlbeans.jar`.
pub fn required_archives() -> Vec<&'static str> {
    let mut jars: Vec<&'static str> = REQUIRED_ARCHIVES.to_vec();
    if cfg!(windows) {
        let pos = jars
            .iter()
            .position(|j| *j == "xmlbeans.jar")
            .unwrap_or(jars.len());
        jars.insert(pos, "xml-apis.jar");
    }
    jars
}

/// An assembled `-Djava.class.path=` option plus the archives that were
/// absent. Missing archives degrade initialization but the option still
/// lists every jar; the VM tolerates dangling classpath entries and a
/// partial list would just move the failure somewhere less diagnosable.
#[derive(Debug, Clone)]
pub struct Classpath {
    pub option: String,
    pub missing: Vec<&'static str>,
}

pub fn build_classpath(base_dir: &Path) -> Classpath {
    let separator = if cfg!(windows) { ';' } else { ':' };
    let mut option = String::from("-Djava.class.path=");
    let mut missing = Vec::new();
    for jar in required_archives() {
        let path = base_dir.join(jar);
        if !path.is_file() {
            missing.push(jar);
        }
        let mut entry = path.to_string_lossy().into_owned();
        if cfg!(windows) {
            entry = entry.replace('\\', "/");
        }
        option.push_str(&entry);
        option.push(separator);
    }
    Classpath { option, missing }
}

/// Directory the jar manifest is rooted at: the current executable's.
pub(crate) fn executable_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_path_buf)
}

/// `"<major>.<minor>"` from a JNI version word.
pub fn format_version(version: jni::jint) -> String {
    format!("{}.{}", (version >> 16) & 0xffff, version & 0xffff)
}

/// Asks the installed runtime itself whether it is 64-bit by running
/// `<root>/bin/java -version` and text-matching the output.
///
/// Returns `None` when the command produced no output (nothing to judge
/// by), otherwise whether `64-bit` appeared, case-insensitively.
pub fn probe_64bit(install_root: &Path) -> Option<bool> {
    let java = install_root
        .join("bin")
        .join(if cfg!(windows) { "java.exe" } else { "java" });
    let output = Command::new(&java).arg("-version").output().ok()?;
    // -version prints to stderr on every JDK so far; merge both anyway
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    if text.is_empty() {
        return None;
    }
    Some(text.to_lowercase().contains("64-bit"))
}

/// Options VM creation honors, derived from the bridge configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Adds `-verbose:jni` to the creation options.
    pub verbose_jni: bool,
    /// Extra raw VM options, e.g. `-Xmx1g`.
    pub extra_options: Vec<String>,
    /// Overrides the directory the jar manifest is rooted at. Default
    /// is the current executable's directory.
    pub jar_dir: Option<PathBuf>,
}
