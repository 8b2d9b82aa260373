//! Windows runtime handle.
//!
//! Differs from the unix handle in two ways: the process DLL search
//! directory is pointed at the JVM's library directory while the library
//! loads and the VM is created (jvm.dll resolves its own dependencies
//! relative to its directory only when that directory is searched), and
//! the creation call site is guarded so an in-process fault becomes a
//! recoverable error code instead of taking the process down.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::Library;
use tracing::{debug, warn};

use crate::env::JniEnv;
use crate::locate::LocatedRuntime;
use crate::runtime::{
    build_classpath, executable_dir, format_version, ErrorCode, RuntimeError, RuntimeOptions,
    RuntimeState, LOAD_ERROR_NO_ENTRY,
};
use crate::sys::jni;
use crate::sys::windows::DllDirectoryGuard;

/// Owns the loaded jvm.dll, the created VM, and the creator-thread
/// environment pointer. Same contract as the unix handle: the pointers
/// are only used on the facade's worker thread.
pub struct WindowsRuntime {
    lib: Option<Library>,
    vm: *mut jni::JavaVM,
    env: *mut jni::JNIEnv,
    located: Option<LocatedRuntime>,
    options: RuntimeOptions,
    state: RuntimeState,
}

// SAFETY: the raw VM/env pointers are only dereferenced on the worker
// thread the facade pins all JNI work to.
unsafe impl Send for WindowsRuntime {}

impl WindowsRuntime {
    pub fn new(located: Option<LocatedRuntime>, trace: String, options: RuntimeOptions) -> Self {
        WindowsRuntime {
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

    pub(crate) fn env(&self) -> Option<JniEnv> {
        if self.env.is_null() {
            return None;
        }
        Some(unsafe { JniEnv::from_raw(self.env) })
    }

    /// Loads jvm.dll and creates the VM. At-most-once: a second call is
    /// a no-op returning the recorded validity.
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

        // The guard stays in scope through VM creation; jvm.dll loads
        // some of its dependencies lazily during JNI_CreateJavaVM.
        let _dll_dir = DllDirectoryGuard::set(&located.library_dir);

        let lib = match load_library(&located.library) {
            Ok(lib) => lib,
            Err(err) => {
                warn!(library = %located.library.display(), %err, "jvm.dll load failed");
                self.state.error = ErrorCode::NoJni;
                self.state.load_error = LOAD_ERROR_NO_ENTRY;
                self.state.trace.push_str(&format!("{err}\n"));
                return false;
            }
        };
        let create = match resolve_create_fn(&lib) {
            Ok(create) => create,
            Err(err) => {
                warn!(%err, "JNI_CreateJavaVM entry point missing");
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

        match create_vm_guarded(create, &classpath.option, &self.options) {
            Ok((vm, env)) => {
                self.vm = vm;
                self.env = env;
                let version = unsafe { JniEnv::from_raw(env) }.version();
                self.state.java_version = Some(format_version(version));
                self.state.java_path = java_path_from_library_dir(&located.library_dir);
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

impl Drop for WindowsRuntime {
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

fn load_library(library: &Path) -> Result<Library, RuntimeError> {
    unsafe { Library::new(library) }.map_err(|e| RuntimeError::NoLibrary {
        detail: e.to_string(),
    })
}

fn resolve_create_fn(lib: &Library) -> Result<jni::JNI_CreateJavaVM, RuntimeError> {
    let create: libloading::Symbol<'_, jni::JNI_CreateJavaVM> =
        unsafe { lib.get(b"JNI_CreateJavaVM\0") }.map_err(|e| RuntimeError::NoLibrary {
            detail: e.to_string(),
        })?;
    Ok(*create)
}

/// The one call site where an in-process fault during VM creation is
/// converted to an error. Historically a structured exception handler
/// wrapped this call; current HotSpot builds convert internal faults to
/// a JNI error code themselves, and any such code surfaces here as
/// `CreationFault` rather than unwinding through the bridge.
fn create_vm_guarded(
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
    if code == jni::JNI_ERR {
        return Err(RuntimeError::CreationFault { code });
    }
    if code != jni::JNI_OK || vm.is_null() || env.is_null() {
        return Err(RuntimeError::Creation { code });
    }
    Ok((vm, env))
}

/// `<root>\bin\server` -> `<root>`.
fn java_path_from_library_dir(library_dir: &Path) -> Option<PathBuf> {
    library_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}
