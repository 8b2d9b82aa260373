//! Unix/macOS runtime handle: `dlopen` the JVM library, resolve the
//! VM-creation entry point, create the VM.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::os::unix::{Library, Symbol, RTLD_GLOBAL, RTLD_NOW};
use tracing::{debug, warn};

use crate::env::JniEnv;
use crate::locate::LocatedRuntime;
use crate::runtime::{
    build_classpath, executable_dir, format_version, ErrorCode, RuntimeError, RuntimeOptions,
    RuntimeState, LOAD_ERROR_NO_ENTRY,
};
use crate::sys::jni;

/// Owns the loaded JVM library, the created VM, and the creator-thread
/// environment pointer.
///
/// The VM and env pointers are only used on the thread that called
/// `initialize`; the dispatch facade guarantees that is its worker
/// thread for the handle's entire life.
pub struct UnixRuntime {
    // declaration order: the VM must be destroyed before the library is
    // unloaded, and Drop runs destroy explicitly before fields drop
    lib: Option<Library>,
    vm: *mut jni::JavaVM,
    env: *mut jni::JNIEnv,
    located: Option<LocatedRuntime>,
    options: RuntimeOptions,
    state: RuntimeState,
}

// SAFETY: the raw VM/env pointers are only dereferenced on the worker
// thread the facade pins all JNI work to. The handle itself moves to
// that thread once during initialization and is dropped there.
unsafe impl Send for UnixRuntime {}

impl UnixRuntime {
    /// Constructs an uninitialized handle from a discovery result.
    /// `located: None` records a failed discovery; `initialize` will
    /// mark the state `NoJava` without touching the filesystem.
    pub fn new(located: Option<LocatedRuntime>, trace: String, options: RuntimeOptions) -> Self {
        UnixRuntime {
            lib: None,
            vm: ptr::null_mut(),
            env: ptr::null_mut(),
            located,
            options,
            state: RuntimeState {
                trace,
                ..RuntimeState::default()
            },
        }
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    /// The environment wrapper for JNI calls.
    ///
    /// Only meaningful on the thread that ran `initialize`; the bridge
    /// calls this exclusively from worker jobs.
    pub(crate) fn env(&self) -> Option<JniEnv> {
        if self.env.is_null() {
            return None;
        }
        Some(unsafe { JniEnv::from_raw(self.env) })
    }

    /// Loads the library and creates the VM. At-most-once: a second call
    /// is a no-op returning the recorded validity.
    pub fn initialize(&mut self) -> bool {
        if self.state.initialized {
            return self.state.is_valid();
        }
        self.state.initialized = true;

        let located = match self.located.clone() {
            Some(located) => located,
            None => {
                self.state.error = ErrorCode::NoJava;
                return false;
            }
        };

        let (lib, create) = match load_create_fn(&located.library) {
            Ok(pair) => pair,
            Err(err) => {
                warn!(library = %located.library.display(), %err, "JVM library load failed");
                self.state.error = ErrorCode::NoJni;
                self.state.load_error = LOAD_ERROR_NO_ENTRY;
                self.state.trace.push_str(&format!("{err}\n"));
                return false;
            }
        };
        self.lib = Some(lib);

        let jar_dir = self.options.jar_dir.clone().or_else(executable_dir);
        let classpath = match jar_dir {
            Some(dir) => build_classpath(&dir),
            None => {
                // cannot even name the jar directory
                self.state.error = ErrorCode::MissingJar;
                return false;
            }
        };
        for jar in &classpath.missing {
            warn!(jar, "required archive missing next to the executable");
            self.state.error = ErrorCode::MissingJar;
        }

        if let Some(false) = crate::runtime::probe_64bit(&located.install_root) {
            warn!("installed Java runtime is not 64-bit");
            self.state.error = ErrorCode::Architecture;
        }

        match create_vm(create, &classpath.option, &self.options) {
            Ok((vm, env)) => {
                self.vm = vm;
                self.env = env;
                let version = unsafe { JniEnv::from_raw(env) }.version();
                self.state.java_version = Some(format_version(version));
                self.state.java_path = java_path_from_library(&located.library);
                debug!(
                    version = self.state.java_version.as_deref(),
                    path = ?self.state.java_path,
                    "JVM created"
                );
            }
            Err(RuntimeError::Creation { code }) | Err(RuntimeError::CreationFault { code }) => {
                warn!(code, "JNI_CreateJavaVM failed");
                self.state.vm_error = code;
                if self.state.error == ErrorCode::Ok {
                    self.state.error = ErrorCode::JvmError;
                }
            }
            Err(err) => {
                warn!(%err, "VM creation rejected");
                self.state.vm_error = jni::JNI_EINVAL;
                if self.state.error == ErrorCode::Ok {
                    self.state.error = ErrorCode::JvmError;
                }
            }
        }

        self.state.is_valid()
    }
}

impl Drop for UnixRuntime {
    fn drop(&mut self) {
        if !self.vm.is_null() {
            unsafe {
                let _ = crate::jvm_call!(self.vm, DestroyJavaVM);
            }
            self.vm = ptr::null_mut();
            self.env = ptr::null_mut();
        }
    }
}

fn load_create_fn(library: &Path) -> Result<(Library, jni::JNI_CreateJavaVM), RuntimeError> {
    // RTLD_GLOBAL so the JVM's own dependent libraries resolve symbols
    // against it
    let lib = unsafe { Library::open(Some(library), RTLD_NOW | RTLD_GLOBAL) }.map_err(|e| {
        RuntimeError::NoLibrary {
            detail: e.to_string(),
        }
    })?;
    let create: Symbol<jni::JNI_CreateJavaVM> =
        unsafe { lib.get(b"JNI_CreateJavaVM\0") }.map_err(|e| RuntimeError::NoLibrary {
            detail: e.to_string(),
        })?;
    let create = *create;
    Ok((lib, create))
}

fn create_vm(
    create: jni::JNI_CreateJavaVM,
    classpath_option: &str,
    options: &RuntimeOptions,
) -> Result<(*mut jni::JavaVM, *mut jni::JNIEnv), RuntimeError> {
    let mut opt_strings = vec![CString::new(classpath_option).map_err(|_| RuntimeError::Nul)?];
    if options.verbose_jni {
        opt_strings.push(CString::new("-verbose:jni").map_err(|_| RuntimeError::Nul)?);
    }
    for extra in &options.extra_options {
        opt_strings.push(CString::new(extra.as_str()).map_err(|_| RuntimeError::Nul)?);
    }

    let mut opt_structs: Vec<jni::JavaVMOption> = opt_strings
        .iter()
        .map(|s| jni::JavaVMOption {
            optionString: s.as_ptr() as *mut std::os::raw::c_char,
            extraInfo: ptr::null_mut(),
        })
        .collect();

    let mut args = jni::JavaVMInitArgs {
        version: jni::JNI_VERSION_1_8,
        nOptions: opt_structs.len() as jni::jint,
        options: opt_structs.as_mut_ptr(),
        ignoreUnrecognized: jni::JNI_FALSE,
    };

    let mut vm: *mut jni::JavaVM = ptr::null_mut();
    let mut env: *mut jni::JNIEnv = ptr::null_mut();
    let code = unsafe { create(&mut vm, &mut env, &mut args) };
    if code != jni::JNI_OK || vm.is_null() || env.is_null() {
        return Err(RuntimeError::Creation { code });
    }
    Ok((vm, env))
}

/// `<root>/lib/server/libjvm.so` -> `<root>`.
fn java_path_from_library(library: &Path) -> Option<PathBuf> {
    library
        .parent()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}
