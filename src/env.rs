//! Safe wrapper around a JNI environment pointer.
//!
//! All lookups that can fail return `Option`; JNI reports failed lookups
//! with a null result plus a pending Java exception, and callers here
//! treat null as "absent" and leave exception policy to the layer above.
//!
//! A `JniEnv` is only valid on the thread it was obtained on. Nothing in
//! this module enforces that; the dispatcher confines every call to the
//! worker thread that created the VM.

use std::ffi::{CStr, CString};
use std::ptr;

use crate::sys::jni;

/// Thin wrapper over `*mut JNIEnv` with Rust-friendly argument and return
/// types.
pub struct JniEnv {
    env: *mut jni::JNIEnv,
}

impl JniEnv {
    /// Wraps a raw environment pointer.
    ///
    /// # Safety
    ///
    /// The pointer must be a live `JNIEnv*` for the current thread.
    pub unsafe fn from_raw(env: *mut jni::JNIEnv) -> Self {
        JniEnv { env }
    }

    /// Returns the raw environment pointer.
    pub fn raw(&self) -> *mut jni::JNIEnv {
        self.env
    }

    /// Returns the JNI version word reported by the VM.
    pub fn version(&self) -> jni::jint {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetVersion)(self.env)
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Finds a class by its slash-separated binary name.
    pub fn find_class(&self, name: &str) -> Option<jni::jclass> {
        let c_name = CString::new(name).ok()?;
        unsafe {
            let vtable = *self.env;
            let cls = ((*vtable).FindClass)(self.env, c_name.as_ptr());
            if cls.is_null() {
                None
            } else {
                Some(cls)
            }
        }
    }

    /// Resolves an instance method.
    pub fn get_method_id(
        &self,
        cls: jni::jclass,
        name: &str,
        sig: &str,
    ) -> Option<jni::jmethodID> {
        let c_name = CString::new(name).ok()?;
        let c_sig = CString::new(sig).ok()?;
        unsafe {
            let vtable = *self.env;
            let id = ((*vtable).GetMethodID)(self.env, cls, c_name.as_ptr(), c_sig.as_ptr());
            if id.is_null() {
                None
            } else {
                Some(id)
            }
        }
    }

    /// Resolves a static method.
    pub fn get_static_method_id(
        &self,
        cls: jni::jclass,
        name: &str,
        sig: &str,
    ) -> Option<jni::jmethodID> {
        let c_name = CString::new(name).ok()?;
        let c_sig = CString::new(sig).ok()?;
        unsafe {
            let vtable = *self.env;
            let id =
                ((*vtable).GetStaticMethodID)(self.env, cls, c_name.as_ptr(), c_sig.as_ptr());
            if id.is_null() {
                None
            } else {
                Some(id)
            }
        }
    }

    /// Resolves an instance field.
    pub fn get_field_id(&self, cls: jni::jclass, name: &str, sig: &str) -> Option<jni::jfieldID> {
        let c_name = CString::new(name).ok()?;
        let c_sig = CString::new(sig).ok()?;
        unsafe {
            let vtable = *self.env;
            let id = ((*vtable).GetFieldID)(self.env, cls, c_name.as_ptr(), c_sig.as_ptr());
            if id.is_null() {
                None
            } else {
                Some(id)
            }
        }
    }

    /// Resolves a static field.
    pub fn get_static_field_id(
        &self,
        cls: jni::jclass,
        name: &str,
        sig: &str,
    ) -> Option<jni::jfieldID> {
        let c_name = CString::new(name).ok()?;
        let c_sig = CString::new(sig).ok()?;
        unsafe {
            let vtable = *self.env;
            let id =
                ((*vtable).GetStaticFieldID)(self.env, cls, c_name.as_ptr(), c_sig.as_ptr());
            if id.is_null() {
                None
            } else {
                Some(id)
            }
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Constructs an object through the given constructor.
    pub fn new_object(
        &self,
        cls: jni::jclass,
        ctor: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> Option<jni::jobject> {
        unsafe {
            let vtable = *self.env;
            let obj = ((*vtable).NewObjectA)(self.env, cls, ctor, args.as_ptr());
            if obj.is_null() {
                None
            } else {
                Some(obj)
            }
        }
    }

    // =========================================================================
    // Instance calls
    // =========================================================================

    pub fn call_object_method(
        &self,
        obj: jni::jobject,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jobject {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallObjectMethodA)(self.env, obj, method, args.as_ptr())
        }
    }

    pub fn call_boolean_method(
        &self,
        obj: jni::jobject,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> bool {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallBooleanMethodA)(self.env, obj, method, args.as_ptr()) != jni::JNI_FALSE
        }
    }

    pub fn call_int_method(
        &self,
        obj: jni::jobject,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jint {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallIntMethodA)(self.env, obj, method, args.as_ptr())
        }
    }

    pub fn call_long_method(
        &self,
        obj: jni::jobject,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jlong {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallLongMethodA)(self.env, obj, method, args.as_ptr())
        }
    }

    pub fn call_double_method(
        &self,
        obj: jni::jobject,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jdouble {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallDoubleMethodA)(self.env, obj, method, args.as_ptr())
        }
    }

    pub fn call_void_method(
        &self,
        obj: jni::jobject,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallVoidMethodA)(self.env, obj, method, args.as_ptr());
        }
    }

    // =========================================================================
    // Static calls
    // =========================================================================

    pub fn call_static_object_method(
        &self,
        cls: jni::jclass,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jobject {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallStaticObjectMethodA)(self.env, cls, method, args.as_ptr())
        }
    }

    pub fn call_static_boolean_method(
        &self,
        cls: jni::jclass,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> bool {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallStaticBooleanMethodA)(self.env, cls, method, args.as_ptr())
                != jni::JNI_FALSE
        }
    }

    pub fn call_static_int_method(
        &self,
        cls: jni::jclass,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jint {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallStaticIntMethodA)(self.env, cls, method, args.as_ptr())
        }
    }

    pub fn call_static_long_method(
        &self,
        cls: jni::jclass,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jlong {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallStaticLongMethodA)(self.env, cls, method, args.as_ptr())
        }
    }

    pub fn call_static_double_method(
        &self,
        cls: jni::jclass,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) -> jni::jdouble {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallStaticDoubleMethodA)(self.env, cls, method, args.as_ptr())
        }
    }

    pub fn call_static_void_method(
        &self,
        cls: jni::jclass,
        method: jni::jmethodID,
        args: &[jni::jvalue],
    ) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).CallStaticVoidMethodA)(self.env, cls, method, args.as_ptr());
        }
    }

    // =========================================================================
    // Fields
    // =========================================================================

    pub fn get_object_field(&self, obj: jni::jobject, field: jni::jfieldID) -> jni::jobject {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetObjectField)(self.env, obj, field)
        }
    }

    pub fn get_int_field(&self, obj: jni::jobject, field: jni::jfieldID) -> jni::jint {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetIntField)(self.env, obj, field)
        }
    }

    pub fn get_long_field(&self, obj: jni::jobject, field: jni::jfieldID) -> jni::jlong {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetLongField)(self.env, obj, field)
        }
    }

    pub fn get_double_field(&self, obj: jni::jobject, field: jni::jfieldID) -> jni::jdouble {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetDoubleField)(self.env, obj, field)
        }
    }

    pub fn set_object_field(&self, obj: jni::jobject, field: jni::jfieldID, value: jni::jobject) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).SetObjectField)(self.env, obj, field, value);
        }
    }

    pub fn set_int_field(&self, obj: jni::jobject, field: jni::jfieldID, value: jni::jint) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).SetIntField)(self.env, obj, field, value);
        }
    }

    pub fn set_long_field(&self, obj: jni::jobject, field: jni::jfieldID, value: jni::jlong) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).SetLongField)(self.env, obj, field, value);
        }
    }

    pub fn set_double_field(&self, obj: jni::jobject, field: jni::jfieldID, value: jni::jdouble) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).SetDoubleField)(self.env, obj, field, value);
        }
    }

    pub fn get_static_object_field(
        &self,
        cls: jni::jclass,
        field: jni::jfieldID,
    ) -> jni::jobject {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetStaticObjectField)(self.env, cls, field)
        }
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Creates a Java string from a Rust string.
    pub fn new_string_utf(&self, s: &str) -> Option<jni::jstring> {
        let c_str = CString::new(s).ok()?;
        unsafe {
            let vtable = *self.env;
            let jstr = ((*vtable).NewStringUTF)(self.env, c_str.as_ptr());
            if jstr.is_null() {
                None
            } else {
                Some(jstr)
            }
        }
    }

    /// Copies a Java string into a Rust `String`.
    ///
    /// Returns `None` for a null reference or non-UTF-8 contents.
    pub fn get_string_utf(&self, s: jni::jstring) -> Option<String> {
        if s.is_null() {
            return None;
        }
        unsafe {
            let vtable = *self.env;
            let chars = ((*vtable).GetStringUTFChars)(self.env, s, ptr::null_mut());
            if chars.is_null() {
                return None;
            }
            let result = CStr::from_ptr(chars).to_str().ok().map(|s| s.to_string());
            ((*vtable).ReleaseStringUTFChars)(self.env, s, chars);
            result
        }
    }

    // =========================================================================
    // Arrays
    // =========================================================================

    pub fn array_length(&self, array: jni::jarray) -> jni::jsize {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetArrayLength)(self.env, array)
        }
    }

    pub fn new_object_array(
        &self,
        len: jni::jsize,
        cls: jni::jclass,
        initial: jni::jobject,
    ) -> Option<jni::jobjectArray> {
        unsafe {
            let vtable = *self.env;
            let arr = ((*vtable).NewObjectArray)(self.env, len, cls, initial);
            if arr.is_null() {
                None
            } else {
                Some(arr)
            }
        }
    }

    pub fn get_object_array_element(
        &self,
        array: jni::jobjectArray,
        index: jni::jsize,
    ) -> jni::jobject {
        unsafe {
            let vtable = *self.env;
            ((*vtable).GetObjectArrayElement)(self.env, array, index)
        }
    }

    pub fn set_object_array_element(
        &self,
        array: jni::jobjectArray,
        index: jni::jsize,
        value: jni::jobject,
    ) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).SetObjectArrayElement)(self.env, array, index, value);
        }
    }

    pub fn new_int_array(&self, values: &[jni::jint]) -> Option<jni::jintArray> {
        unsafe {
            let vtable = *self.env;
            let arr = ((*vtable).NewIntArray)(self.env, values.len() as jni::jsize);
            if arr.is_null() {
                return None;
            }
            if !values.is_empty() {
                ((*vtable).SetIntArrayRegion)(
                    self.env,
                    arr,
                    0,
                    values.len() as jni::jsize,
                    values.as_ptr(),
                );
            }
            Some(arr)
        }
    }

    pub fn new_double_array(&self, values: &[jni::jdouble]) -> Option<jni::jdoubleArray> {
        unsafe {
            let vtable = *self.env;
            let arr = ((*vtable).NewDoubleArray)(self.env, values.len() as jni::jsize);
            if arr.is_null() {
                return None;
            }
            if !values.is_empty() {
                ((*vtable).SetDoubleArrayRegion)(
                    self.env,
                    arr,
                    0,
                    values.len() as jni::jsize,
                    values.as_ptr(),
                );
            }
            Some(arr)
        }
    }

    pub fn read_int_array(&self, array: jni::jintArray) -> Vec<jni::jint> {
        if array.is_null() {
            return Vec::new();
        }
        unsafe {
            let vtable = *self.env;
            let len = ((*vtable).GetArrayLength)(self.env, array);
            let mut out = vec![0; len.max(0) as usize];
            if len > 0 {
                ((*vtable).GetIntArrayRegion)(self.env, array, 0, len, out.as_mut_ptr());
            }
            out
        }
    }

    pub fn read_double_array(&self, array: jni::jdoubleArray) -> Vec<jni::jdouble> {
        if array.is_null() {
            return Vec::new();
        }
        unsafe {
            let vtable = *self.env;
            let len = ((*vtable).GetArrayLength)(self.env, array);
            let mut out = vec![0.0; len.max(0) as usize];
            if len > 0 {
                ((*vtable).GetDoubleArrayRegion)(self.env, array, 0, len, out.as_mut_ptr());
            }
            out
        }
    }

    // =========================================================================
    // References and exceptions
    // =========================================================================

    /// Releases a local reference.
    pub fn delete_local_ref(&self, obj: jni::jobject) {
        if obj.is_null() {
            return;
        }
        unsafe {
            let vtable = *self.env;
            ((*vtable).DeleteLocalRef)(self.env, obj);
        }
    }

    /// Reports whether a Java exception is pending on this thread.
    pub fn exception_check(&self) -> bool {
        unsafe {
            let vtable = *self.env;
            ((*vtable).ExceptionCheck)(self.env) != jni::JNI_FALSE
        }
    }
}
