//! Handles to managed objects and the argument/return marshaling used by
//! the bridge's generic invoke.
//!
//! Raw JNI identifiers are plain pointers. The newtypes here exist to
//! carry the thread-confinement invariant in one place: a handle is only
//! ever dereferenced inside a job running on the dispatcher's worker
//! thread, so shipping the (otherwise non-Send) pointer between threads
//! is sound.
//!
//! Local object references need releasing exactly once. `OwnedObject` is
//! the release-responsible wrapper: it is not `Clone`, and borrowing it
//! yields an `ObjectRef` that has no release path at all, so a borrow
//! can never double-free the reference it came from.

use crate::sys::jni;

macro_rules! confined_handle {
    ($(#[$doc:meta])* $name:ident, $raw:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub(crate) $raw);

        // SAFETY: the wrapped pointer is only dereferenced on the
        // dispatcher's worker thread; any thread may hold or move it.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}

        impl $name {
            pub fn raw(self) -> $raw {
                self.0
            }
        }
    };
}

confined_handle!(
    /// An opaque class handle. Globally valid once obtained; cheap to copy.
    ClassHandle,
    jni::jclass
);
confined_handle!(
    /// A resolved method id.
    MethodHandle,
    jni::jmethodID
);
confined_handle!(
    /// A resolved field id.
    FieldHandle,
    jni::jfieldID
);
confined_handle!(
    /// An unmanaged reference to a Java object. Carries no release
    /// responsibility; see [`OwnedObject`] for the owning wrapper.
    RawObject,
    jni::jobject
);

impl RawObject {
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

/// A class handle paired with the fully-qualified name it was resolved
/// from. The name is kept because member resolution and cache keys need
/// it alongside the handle.
#[derive(Debug, Clone)]
pub struct ClassDesc {
    pub handle: ClassHandle,
    pub name: String,
}

impl ClassDesc {
    pub fn new(handle: ClassHandle, name: impl Into<String>) -> Self {
        ClassDesc {
            handle,
            name: name.into(),
        }
    }
}

/// A Java object reference this wrapper is responsible for releasing.
///
/// Release happens at most once, through [`release_with`], which the
/// bridge drives on the worker thread. Dropping an unreleased owner
/// only logs; the local reference cannot be deleted here because drop
/// may run on the wrong thread.
///
/// [`release_with`]: OwnedObject::release_with
#[derive(Debug)]
pub struct OwnedObject {
    raw: RawObject,
    class: ClassDesc,
    released: bool,
}

impl OwnedObject {
    pub fn new(raw: RawObject, class: ClassDesc) -> Self {
        OwnedObject {
            raw,
            class,
            released: false,
        }
    }

    pub fn class(&self) -> &ClassDesc {
        &self.class
    }

    /// Borrows the underlying reference. The borrow carries no release
    /// responsibility and cannot outlive the owner.
    pub fn as_ref(&self) -> ObjectRef<'_> {
        ObjectRef {
            raw: self.raw,
            _owner: std::marker::PhantomData,
        }
    }

    pub fn raw(&self) -> RawObject {
        self.raw
    }

    /// Runs `release` on the wrapped reference the first time it is
    /// called; later calls are no-ops. Returns whether `release` ran.
    pub fn release_with(&mut self, release: impl FnOnce(RawObject)) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        if !self.raw.is_null() {
            release(self.raw);
        }
        self.raw = RawObject(std::ptr::null_mut());
        true
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for OwnedObject {
    fn drop(&mut self) {
        if !self.released && !self.raw.is_null() {
            tracing::warn!(
                class = %self.class.name,
                "dropping an unreleased Java object reference; call dispose() on the bridge"
            );
        }
    }
}

/// A borrowed Java object reference. Never responsible for release.
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'a> {
    raw: RawObject,
    _owner: std::marker::PhantomData<&'a OwnedObject>,
}

impl ObjectRef<'_> {
    pub fn raw(self) -> RawObject {
        self.raw
    }
}

/// One typed argument of a Java call.
///
/// The original native surface grew a fixed set of per-arity, per-type
/// invoke overloads; a tagged list consumed by one generic invoke covers
/// the same ground without the combinatorics.
#[derive(Debug, Clone, Copy)]
pub enum CallArg {
    Object(RawObject),
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
}

impl CallArg {
    /// A null object argument.
    pub fn null() -> Self {
        CallArg::Object(RawObject(std::ptr::null_mut()))
    }

    pub(crate) fn to_jvalue(self) -> jni::jvalue {
        match self {
            CallArg::Object(o) => jni::jvalue { l: o.0 },
            CallArg::Bool(b) => jni::jvalue {
                z: if b { jni::JNI_TRUE } else { jni::JNI_FALSE },
            },
            CallArg::Int(i) => jni::jvalue { i },
            CallArg::Long(j) => jni::jvalue { j },
            CallArg::Double(d) => jni::jvalue { d },
        }
    }
}

pub(crate) fn to_jvalues(args: &[CallArg]) -> Vec<jni::jvalue> {
    args.iter().map(|a| a.to_jvalue()).collect()
}

/// Whether an invoke targets an instance or a class.
#[derive(Debug, Clone, Copy)]
pub enum CallTarget {
    Instance(RawObject),
    Static(ClassHandle),
}

// SAFETY: same confinement argument as the handle newtypes.
unsafe impl Send for CallTarget {}
unsafe impl Sync for CallTarget {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for () {}
    impl Sealed for bool {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for super::RawObject {}
}

/// Return-type tag for the generic invoke. Implemented for exactly the
/// types the managed surface returns; sealed so the set stays fixed.
pub trait JavaReturn: sealed::Sealed + Sized {
    /// The value returned when the bridge is invalid and no call is made.
    fn absent() -> Self;

    /// Performs the call on the worker thread.
    fn call(env: &crate::env::JniEnv, target: CallTarget, method: MethodHandle, args: &[jni::jvalue]) -> Self;
}

impl JavaReturn for () {
    fn absent() -> Self {}

    fn call(env: &crate::env::JniEnv, target: CallTarget, method: MethodHandle, args: &[jni::jvalue]) {
        match target {
            CallTarget::Instance(obj) => env.call_void_method(obj.0, method.0, args),
            CallTarget::Static(cls) => env.call_static_void_method(cls.0, method.0, args),
        }
    }
}

impl JavaReturn for bool {
    fn absent() -> Self {
        false
    }

    fn call(env: &crate::env::JniEnv, target: CallTarget, method: MethodHandle, args: &[jni::jvalue]) -> bool {
        match target {
            CallTarget::Instance(obj) => env.call_boolean_method(obj.0, method.0, args),
            CallTarget::Static(cls) => env.call_static_boolean_method(cls.0, method.0, args),
        }
    }
}

impl JavaReturn for i32 {
    fn absent() -> Self {
        0
    }

    fn call(env: &crate::env::JniEnv, target: CallTarget, method: MethodHandle, args: &[jni::jvalue]) -> i32 {
        match target {
            CallTarget::Instance(obj) => env.call_int_method(obj.0, method.0, args),
            CallTarget::Static(cls) => env.call_static_int_method(cls.0, method.0, args),
        }
    }
}

impl JavaReturn for i64 {
    fn absent() -> Self {
        0
    }

    fn call(env: &crate::env::JniEnv, target: CallTarget, method: MethodHandle, args: &[jni::jvalue]) -> i64 {
        match target {
            CallTarget::Instance(obj) => env.call_long_method(obj.0, method.0, args),
            CallTarget::Static(cls) => env.call_static_long_method(cls.0, method.0, args),
        }
    }
}

impl JavaReturn for f64 {
    fn absent() -> Self {
        0.0
    }

    fn call(env: &crate::env::JniEnv, target: CallTarget, method: MethodHandle, args: &[jni::jvalue]) -> f64 {
        match target {
            CallTarget::Instance(obj) => env.call_double_method(obj.0, method.0, args),
            CallTarget::Static(cls) => env.call_static_double_method(cls.0, method.0, args),
        }
    }
}

impl JavaReturn for RawObject {
    fn absent() -> Self {
        RawObject(std::ptr::null_mut())
    }

    fn call(
        env: &crate::env::JniEnv,
        target: CallTarget,
        method: MethodHandle,
        args: &[jni::jvalue],
    ) -> RawObject {
        let raw = match target {
            CallTarget::Instance(obj) => env.call_object_method(obj.0, method.0, args),
            CallTarget::Static(cls) => env.call_static_object_method(cls.0, method.0, args),
        };
        RawObject(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fake_object() -> RawObject {
        RawObject(0xdead_beef_usize as jni::jobject)
    }

    fn fake_class() -> ClassDesc {
        ClassDesc::new(ClassHandle(std::ptr::null_mut()), "java/lang/Object")
    }

    #[test]
    fn release_runs_at_most_once() {
        let releases = Cell::new(0u32);
        let mut obj = OwnedObject::new(fake_object(), fake_class());
        assert!(!obj.is_released());

        assert!(obj.release_with(|_| releases.set(releases.get() + 1)));
        assert!(obj.is_released());
        assert!(!obj.release_with(|_| releases.set(releases.get() + 1)));
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn releasing_a_null_reference_skips_the_closure() {
        let releases = Cell::new(0u32);
        let mut obj = OwnedObject::new(RawObject(std::ptr::null_mut()), fake_class());
        // marked released, but there was nothing to delete
        assert!(obj.release_with(|_| releases.set(releases.get() + 1)));
        assert_eq!(releases.get(), 0);
    }

    #[test]
    fn released_owner_hands_out_null() {
        let mut obj = OwnedObject::new(fake_object(), fake_class());
        obj.release_with(|_| {});
        assert!(obj.raw().is_null());
        assert!(obj.as_ref().raw().is_null());
    }

    #[test]
    fn borrows_see_the_owner_reference() {
        let obj = OwnedObject::new(fake_object(), fake_class());
        let borrow = obj.as_ref();
        assert_eq!(borrow.raw(), obj.raw());
        // two borrows are fine; neither can release
        let another = obj.as_ref();
        assert_eq!(another.raw(), obj.raw());
    }

    #[test]
    fn args_marshal_to_the_right_union_member() {
        unsafe {
            assert_eq!(CallArg::Int(41).to_jvalue().i, 41);
            assert_eq!(CallArg::Long(1 << 40).to_jvalue().j, 1 << 40);
            assert_eq!(CallArg::Double(2.5).to_jvalue().d, 2.5);
            assert_eq!(CallArg::Bool(true).to_jvalue().z, jni::JNI_TRUE);
            assert_eq!(CallArg::Bool(false).to_jvalue().z, jni::JNI_FALSE);
            assert!(CallArg::null().to_jvalue().l.is_null());
            assert_eq!(
                CallArg::Object(fake_object()).to_jvalue().l,
                fake_object().0
            );
        }
    }

    #[test]
    fn arg_lists_convert_in_order() {
        let values = to_jvalues(&[CallArg::Int(1), CallArg::Int(2), CallArg::Int(3)]);
        unsafe {
            assert_eq!(values[0].i, 1);
            assert_eq!(values[1].i, 2);
            assert_eq!(values[2].i, 3);
        }
    }
}
