//! The dispatch facade: the single access point every domain call goes
//! through.
//!
//! A `JvmBridge` owns the runtime handle, the handle caches, and the
//! worker thread, and is built exactly once per process; domain call
//! sites receive a reference instead of reaching for a global.
//!
//! Locking is two-level. `init_lock` guards only the lazy-init decision
//! so concurrent first callers initialize once. `core` is the mutex
//! every job submission and every (re)initialization serializes
//! through: by the time the worker is replaced, no job referencing the
//! old runtime can be in flight, because running one requires this same
//! lock.
//!
//! Every public operation checks validity first and short-circuits to a
//! type-appropriate absent value without submitting a job when the
//! runtime is unusable. Callers that need to distinguish "false" from
//! "couldn't ask" check `can_load` or use the tri-state helpers.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::cache::HandleCache;
use crate::dispatch::Worker;
use crate::env::JniEnv;
use crate::locate::{locate_runtime, DiscoveryInputs, DiscoveryTrace};
use crate::object::{
    to_jvalues, CallArg, CallTarget, ClassDesc, ClassHandle, FieldHandle, JavaReturn,
    MethodHandle, OwnedObject, RawObject,
};
use crate::runtime::{describe_error, NativeRuntime, RuntimeOptions};

type Cache = HandleCache<ClassHandle, MethodHandle, FieldHandle>;

/// A boolean answer that can also be "the runtime was not usable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tristate {
    True,
    False,
    Invalid,
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

/// Construction-time configuration for the bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Install root to probe instead of running discovery's later
    /// phases. Settable again via [`JvmBridge::set_runtime_override`].
    pub runtime_override: Option<PathBuf>,
    /// Extra raw VM options, e.g. `-Xmx1g`.
    pub extra_vm_options: Vec<String>,
    /// Adds `-verbose:jni` at VM creation.
    pub verbose_jni: bool,
    /// Enables the class/method/field handle caches. Off by default;
    /// caching is strictly an optimization with no observable effect on
    /// results.
    pub cache_handles: bool,
    /// Overrides where the jar manifest is rooted. Default: next to the
    /// current executable.
    pub jar_dir: Option<PathBuf>,
}

impl BridgeConfig {
    pub fn runtime_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_override = Some(path.into());
        self
    }

    pub fn vm_option(mut self, option: impl Into<String>) -> Self {
        self.extra_vm_options.push(option.into());
        self
    }

    pub fn verbose_jni(mut self, value: bool) -> Self {
        self.verbose_jni = value;
        self
    }

    pub fn cache_handles(mut self, value: bool) -> Self {
        self.cache_handles = value;
        self
    }

    pub fn jar_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.jar_dir = Some(dir.into());
        self
    }
}

struct Core {
    config: BridgeConfig,
    override_path: Option<PathBuf>,
    runtime: Option<NativeRuntime>,
    worker: Option<Worker>,
    cache: Cache,
    /// Jobs executed by workers that have since been replaced.
    retired_jobs: u64,
}

/// Process-wide bridge to the embedded JVM.
///
/// Intended lifecycle: construct one per process, share it by
/// reference, drop it at shutdown (which destroys the VM on the worker
/// thread and joins the worker). Nothing enforces the single instance,
/// but each instance owns a full JVM, and HotSpot only tolerates one
/// per process.
pub struct JvmBridge {
    init_lock: Mutex<()>,
    core: Mutex<Core>,
}

impl JvmBridge {
    /// Creates the bridge without touching the JVM; initialization is
    /// lazy, on first use.
    pub fn new(config: BridgeConfig) -> Self {
        let override_path = config.runtime_override.clone();
        let cache = Cache::with_enabled(config.cache_handles);
        JvmBridge {
            init_lock: Mutex::new(()),
            core: Mutex::new(Core {
                config,
                override_path,
                runtime: None,
                worker: None,
                cache,
                retired_jobs: 0,
            }),
        }
    }

    /// Initializes on first use; re-initializes when `force` is set and
    /// the current runtime reports itself invalid.
    fn ensure_init(&self, force: bool) {
        let _init_guard = self.init_lock.lock().unwrap();
        let mut core = self.core.lock().unwrap();
        let needed = match &core.runtime {
            None => true,
            Some(rt) => force && !rt.is_valid(),
        };
        if !needed {
            return;
        }
        debug!(force, "initializing the JVM bridge");

        // Holding the core lock here is what makes re-init safe: any
        // in-flight job finished before we acquired it, and no new job
        // can start until we release it.
        core.cache.clear_all();
        if let Some(old) = core.worker.take() {
            core.retired_jobs += old.jobs_executed();
            // drop joins the old worker before a fresh one exists
            drop(old);
        }
        core.runtime = None;

        let mut trace = DiscoveryTrace::new();
        let inputs = DiscoveryInputs::from_process_env(core.override_path.clone());
        let located = locate_runtime(&inputs, &mut trace);
        let options = RuntimeOptions {
            verbose_jni: core.config.verbose_jni,
            extra_options: core.config.extra_vm_options.clone(),
            jar_dir: core.config.jar_dir.clone(),
        };

        match located {
            None => {
                // Nothing found: record the failure without spawning a
                // worker. No job is ever dispatched for this state.
                let mut runtime = NativeRuntime::new(None, trace.into_string(), options);
                runtime.initialize();
                core.runtime = Some(runtime);
            }
            Some(found) => {
                let worker = Worker::spawn();
                let trace_text = trace.into_string();
                // Construction and initialization both happen on the
                // worker thread; the env pointer is bound to it from
                // the first moment it exists.
                let runtime = worker.submit(move || {
                    let mut runtime = NativeRuntime::new(Some(found), trace_text, options);
                    runtime.initialize();
                    runtime
                });
                core.runtime = Some(runtime);
                core.worker = Some(worker);
            }
        }
    }

    /// Ensures the runtime is initialized, then runs `op` as a job on
    /// the worker thread, or returns `absent` when the runtime is not
    /// valid (no job is submitted in that case).
    fn with_env<R>(&self, absent: R, op: impl FnOnce(&JniEnv, &mut Cache) -> R) -> R {
        self.ensure_init(false);
        let mut core = self.core.lock().unwrap();
        let Core {
            runtime,
            worker,
            cache,
            ..
        } = &mut *core;
        let (Some(runtime), Some(worker)) = (runtime.as_ref(), worker.as_ref()) else {
            return absent;
        };
        if !runtime.is_valid() {
            return absent;
        }
        worker.submit(move || match runtime.env() {
            Some(env) => op(&env, cache),
            None => absent,
        })
    }

    // =========================================================================
    // State queries
    // =========================================================================

    /// Whether the runtime is usable. `reinit` additionally retries
    /// initialization when the current runtime reports itself invalid.
    pub fn can_load(&self, reinit: bool) -> bool {
        self.ensure_init(reinit);
        let core = self.core.lock().unwrap();
        core.runtime.as_ref().is_some_and(NativeRuntime::is_valid)
    }

    /// Merged numeric load error: the recorded error code when set,
    /// otherwise the platform load detail.
    pub fn load_error(&self) -> i32 {
        self.ensure_init(false);
        let core = self.core.lock().unwrap();
        core.runtime
            .as_ref()
            .map(|rt| rt.state().merged_error())
            .unwrap_or(0)
    }

    /// Short human-readable description of the recorded failure.
    pub fn error_description(&self) -> &'static str {
        self.ensure_init(false);
        let core = self.core.lock().unwrap();
        match core.runtime.as_ref() {
            Some(rt) => {
                let state = rt.state();
                describe_error(state.error, state.load_error, state.vm_error)
            }
            None => "No error",
        }
    }

    /// The accumulated discovery/load trace, verbatim.
    pub fn discovery_trace(&self) -> String {
        self.ensure_init(false);
        let core = self.core.lock().unwrap();
        core.runtime
            .as_ref()
            .map(|rt| rt.state().trace.clone())
            .unwrap_or_default()
    }

    /// Install root of the runtime in use.
    pub fn java_path(&self) -> Option<PathBuf> {
        self.ensure_init(false);
        let core = self.core.lock().unwrap();
        core.runtime.as_ref().and_then(|rt| rt.state().java_path.clone())
    }

    /// Runtime version as `"<major>.<minor>"`.
    pub fn java_version(&self) -> Option<String> {
        self.ensure_init(false);
        let core = self.core.lock().unwrap();
        core.runtime
            .as_ref()
            .and_then(|rt| rt.state().java_version.clone())
    }

    /// Stores an install-root override; takes effect on the next
    /// (re)initialization.
    pub fn set_runtime_override(&self, path: Option<PathBuf>) {
        let mut core = self.core.lock().unwrap();
        core.override_path = path;
    }

    /// Total jobs executed, across worker replacements.
    pub fn jobs_executed(&self) -> u64 {
        let core = self.core.lock().unwrap();
        core.retired_jobs
            + core
                .worker
                .as_ref()
                .map(Worker::jobs_executed)
                .unwrap_or(0)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Finds a class by its slash-separated binary name.
    pub fn find_class(&self, name: &str) -> Option<ClassDesc> {
        self.with_env(None, |env, cache| {
            let enabled = cache.enabled;
            cache
                .classes
                .lookup(enabled, &[name], || env.find_class(name).map(ClassHandle))
                .map(|handle| ClassDesc::new(handle, name))
        })
    }

    pub fn get_method(&self, cls: &ClassDesc, name: &str, sig: &str) -> Option<MethodHandle> {
        self.with_env(None, |env, cache| {
            let enabled = cache.enabled;
            cache.methods.lookup(enabled, &[&cls.name, name, sig], || {
                env.get_method_id(cls.handle.0, name, sig).map(MethodHandle)
            })
        })
    }

    pub fn get_static_method(
        &self,
        cls: &ClassDesc,
        name: &str,
        sig: &str,
    ) -> Option<MethodHandle> {
        self.with_env(None, |env, cache| {
            let enabled = cache.enabled;
            cache.methods.lookup(enabled, &[&cls.name, name, sig], || {
                env.get_static_method_id(cls.handle.0, name, sig)
                    .map(MethodHandle)
            })
        })
    }

    pub fn get_field(&self, cls: &ClassDesc, name: &str, sig: &str) -> Option<FieldHandle> {
        self.with_env(None, |env, cache| {
            let enabled = cache.enabled;
            cache.fields.lookup(enabled, &[&cls.name, name, sig], || {
                env.get_field_id(cls.handle.0, name, sig).map(FieldHandle)
            })
        })
    }

    pub fn get_static_field(&self, cls: &ClassDesc, name: &str, sig: &str) -> Option<FieldHandle> {
        self.with_env(None, |env, cache| {
            let enabled = cache.enabled;
            cache.fields.lookup(enabled, &[&cls.name, name, sig], || {
                env.get_static_field_id(cls.handle.0, name, sig)
                    .map(FieldHandle)
            })
        })
    }

    // =========================================================================
    // Invocation and construction
    // =========================================================================

    /// Generic invoke, parameterized by return-type tag. Returns the
    /// type's absent value when the runtime is invalid.
    pub fn call<R: JavaReturn>(
        &self,
        target: CallTarget,
        method: MethodHandle,
        args: &[CallArg],
    ) -> R {
        self.with_env(R::absent(), |env, _| {
            R::call(env, target, method, &to_jvalues(args))
        })
    }

    /// Object-returning invoke with nulls folded to `None`.
    pub fn call_object(
        &self,
        target: CallTarget,
        method: MethodHandle,
        args: &[CallArg],
    ) -> Option<RawObject> {
        let raw: RawObject = self.call(target, method, args);
        if raw.is_null() {
            None
        } else {
            Some(raw)
        }
    }

    /// Constructs an object; the returned wrapper owns the reference and
    /// must be disposed through the bridge.
    pub fn new_object(
        &self,
        cls: &ClassDesc,
        ctor: MethodHandle,
        args: &[CallArg],
    ) -> Option<OwnedObject> {
        let raw = self.with_env(None, |env, _| {
            env.new_object(cls.handle.0, ctor.0, &to_jvalues(args))
        })?;
        Some(OwnedObject::new(RawObject(raw), cls.clone()))
    }

    // =========================================================================
    // Fields
    // =========================================================================

    pub fn get_static_object_field(
        &self,
        cls: ClassHandle,
        field: FieldHandle,
    ) -> Option<RawObject> {
        self.with_env(None, |env, _| {
            let raw = env.get_static_object_field(cls.0, field.0);
            if raw.is_null() {
                None
            } else {
                Some(RawObject(raw))
            }
        })
    }

    pub fn get_object_field(&self, obj: RawObject, field: FieldHandle) -> Option<RawObject> {
        self.with_env(None, |env, _| {
            let raw = env.get_object_field(obj.0, field.0);
            if raw.is_null() {
                None
            } else {
                Some(RawObject(raw))
            }
        })
    }

    pub fn get_int_field(&self, obj: RawObject, field: FieldHandle) -> i32 {
        self.with_env(0, |env, _| env.get_int_field(obj.0, field.0))
    }

    pub fn get_long_field(&self, obj: RawObject, field: FieldHandle) -> i64 {
        self.with_env(0, |env, _| env.get_long_field(obj.0, field.0))
    }

    pub fn get_double_field(&self, obj: RawObject, field: FieldHandle) -> f64 {
        self.with_env(0.0, |env, _| env.get_double_field(obj.0, field.0))
    }

    pub fn set_object_field(&self, obj: RawObject, field: FieldHandle, value: RawObject) {
        self.with_env((), |env, _| env.set_object_field(obj.0, field.0, value.0))
    }

    pub fn set_int_field(&self, obj: RawObject, field: FieldHandle, value: i32) {
        self.with_env((), |env, _| env.set_int_field(obj.0, field.0, value))
    }

    pub fn set_long_field(&self, obj: RawObject, field: FieldHandle, value: i64) {
        self.with_env((), |env, _| env.set_long_field(obj.0, field.0, value))
    }

    pub fn set_double_field(&self, obj: RawObject, field: FieldHandle, value: f64) {
        self.with_env((), |env, _| env.set_double_field(obj.0, field.0, value))
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Interns a Rust string as a Java string. The returned reference
    /// must be released via [`delete_ref`](Self::delete_ref).
    pub fn new_string(&self, value: &str) -> Option<RawObject> {
        self.with_env(None, |env, _| env.new_string_utf(value).map(RawObject))
    }

    /// Copies a Java string into a Rust `String`.
    pub fn read_string(&self, value: RawObject) -> Option<String> {
        self.with_env(None, |env, _| env.get_string_utf(value.0))
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    pub fn new_int_array(&self, values: &[i32]) -> Option<RawObject> {
        self.with_env(None, |env, _| env.new_int_array(values).map(RawObject))
    }

    pub fn new_double_array(&self, values: &[f64]) -> Option<RawObject> {
        self.with_env(None, |env, _| env.new_double_array(values).map(RawObject))
    }

    pub fn new_object_array(&self, len: i32, cls: ClassHandle) -> Option<RawObject> {
        self.with_env(None, |env, _| {
            env.new_object_array(len, cls.0, std::ptr::null_mut())
                .map(RawObject)
        })
    }

    pub fn array_length(&self, array: RawObject) -> i32 {
        self.with_env(0, |env, _| env.array_length(array.0))
    }

    pub fn object_array_get(&self, array: RawObject, index: i32) -> Option<RawObject> {
        self.with_env(None, |env, _| {
            let raw = env.get_object_array_element(array.0, index);
            if raw.is_null() {
                None
            } else {
                Some(RawObject(raw))
            }
        })
    }

    pub fn object_array_set(&self, array: RawObject, index: i32, value: RawObject) {
        self.with_env((), |env, _| {
            env.set_object_array_element(array.0, index, value.0)
        })
    }

    pub fn read_int_array(&self, array: RawObject) -> Vec<i32> {
        self.with_env(Vec::new(), |env, _| env.read_int_array(array.0))
    }

    pub fn read_double_array(&self, array: RawObject) -> Vec<f64> {
        self.with_env(Vec::new(), |env, _| env.read_double_array(array.0))
    }

    // =========================================================================
    // References and exceptions
    // =========================================================================

    /// Releases an unmanaged local reference.
    pub fn delete_ref(&self, raw: RawObject) {
        self.with_env((), |env, _| env.delete_local_ref(raw.0))
    }

    /// Releases an owned wrapper's reference, exactly once; later calls
    /// are no-ops.
    pub fn dispose(&self, obj: &mut OwnedObject) {
        obj.release_with(|raw| self.delete_ref(raw));
    }

    /// Whether a Java exception is pending on the worker thread.
    ///
    /// A pending exception is never cleared or translated here;
    /// clearing it implicitly could mask an error the caller needs to
    /// see.
    pub fn exception_check(&self) -> bool {
        self.with_env(false, |env, _| env.exception_check())
    }

    /// Tri-state wrapper for boolean queries where "couldn't ask" must
    /// stay distinct from "no".
    pub fn call_tristate(
        &self,
        target: CallTarget,
        method: MethodHandle,
        args: &[CallArg],
    ) -> Tristate {
        if !self.can_load(false) {
            return Tristate::Invalid;
        }
        Tristate::from(self.call::<bool>(target, method, args))
    }
}

impl Drop for JvmBridge {
    fn drop(&mut self) {
        let mut core = self.core.lock().unwrap();
        let runtime = core.runtime.take();
        if let (Some(runtime), Some(worker)) = (runtime, core.worker.as_ref()) {
            // the VM must be destroyed on the thread its env belongs to
            worker.submit(move || drop(runtime));
        }
        // joins the worker
        core.worker = None;
        debug!("JVM bridge shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ClassHandle;
    use std::cell::Cell;

    fn dead_bridge() -> JvmBridge {
        JvmBridge::new(
            BridgeConfig::default()
                .cache_handles(true)
                .runtime_override("/no/such/java/install"),
        )
    }

    #[test]
    fn forced_reinit_clears_cached_handles() {
        let bridge = dead_bridge();
        assert!(!bridge.can_load(false));

        let resolutions = Cell::new(0u32);
        let resolve = || {
            resolutions.set(resolutions.get() + 1);
            Some(ClassHandle(std::ptr::null_mut()))
        };
        {
            let mut core = bridge.core.lock().unwrap();
            assert!(core.cache.enabled);
            core.cache
                .classes
                .lookup(true, &["java/lang/String"], resolve);
            core.cache
                .classes
                .lookup(true, &["java/lang/String"], resolve);
            assert_eq!(resolutions.get(), 1, "second lookup served from cache");
        }

        // a forced retry on an invalid runtime rebuilds bridge state;
        // handles resolved against the old state must not survive it
        assert!(!bridge.can_load(true));
        {
            let mut core = bridge.core.lock().unwrap();
            assert!(core.cache.classes.is_empty());
            core.cache
                .classes
                .lookup(true, &["java/lang/String"], resolve);
            assert_eq!(resolutions.get(), 2, "known key re-resolves after re-init");
        }
    }
}
