//! Windows platform calls used by runtime discovery and loading.
//!
//! Hand-written declarations for the handful of `advapi32`/`kernel32`
//! entry points this crate needs: reading the JavaSoft registry keys and
//! saving/restoring the process DLL search directory around JVM loading.

#![allow(non_snake_case)]

use std::ffi::{OsStr, OsString};
use std::os::raw::c_void;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::Path;
use std::ptr;

type HKEY = *mut c_void;
type LONG = i32;
type BOOL = i32;
type DWORD = u32;
type LPCWSTR = *const u16;
type LPWSTR = *mut u16;

const HKEY_LOCAL_MACHINE: HKEY = 0x8000_0002usize as HKEY;
const KEY_READ: DWORD = 0x0002_0019;
const ERROR_SUCCESS: LONG = 0;
const REG_SZ: DWORD = 1;
const REG_EXPAND_SZ: DWORD = 2;

#[link(name = "advapi32")]
extern "system" {
    fn RegOpenKeyExW(
        hkey: HKEY,
        subkey: LPCWSTR,
        options: DWORD,
        sam: DWORD,
        result: *mut HKEY,
    ) -> LONG;
    fn RegQueryValueExW(
        hkey: HKEY,
        value_name: LPCWSTR,
        reserved: *mut DWORD,
        value_type: *mut DWORD,
        data: *mut u8,
        data_len: *mut DWORD,
    ) -> LONG;
    fn RegCloseKey(hkey: HKEY) -> LONG;
}

#[link(name = "kernel32")]
extern "system" {
    fn GetDllDirectoryW(len: DWORD, buffer: LPWSTR) -> DWORD;
    fn SetDllDirectoryW(path: LPCWSTR) -> BOOL;
}

fn to_wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(std::iter::once(0)).collect()
}

/// Read a string value from a key under `HKEY_LOCAL_MACHINE`.
///
/// Returns `None` when the key or value is absent or the value is not a
/// string type.
pub fn read_hklm_string(subkey: &str, value: &str) -> Option<OsString> {
    let wide_key = to_wide(OsStr::new(subkey));
    let wide_value = to_wide(OsStr::new(value));

    let mut hkey: HKEY = ptr::null_mut();
    let status =
        unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, wide_key.as_ptr(), 0, KEY_READ, &mut hkey) };
    if status != ERROR_SUCCESS {
        return None;
    }

    let result = read_string_value(hkey, &wide_value);
    unsafe { RegCloseKey(hkey) };
    result
}

fn read_string_value(hkey: HKEY, wide_value: &[u16]) -> Option<OsString> {
    let mut value_type: DWORD = 0;
    let mut len: DWORD = 0;
    let status = unsafe {
        RegQueryValueExW(
            hkey,
            wide_value.as_ptr(),
            ptr::null_mut(),
            &mut value_type,
            ptr::null_mut(),
            &mut len,
        )
    };
    if status != ERROR_SUCCESS || (value_type != REG_SZ && value_type != REG_EXPAND_SZ) {
        return None;
    }

    let mut buf: Vec<u8> = vec![0; len as usize];
    let status = unsafe {
        RegQueryValueExW(
            hkey,
            wide_value.as_ptr(),
            ptr::null_mut(),
            &mut value_type,
            buf.as_mut_ptr(),
            &mut len,
        )
    };
    if status != ERROR_SUCCESS {
        return None;
    }

    let units: Vec<u16> = buf
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    Some(OsString::from_wide(&units[..end]))
}

/// Points the process DLL search directory at the JVM's library directory
/// for the duration of library loading and VM creation, then restores the
/// previous setting.
///
/// `jvm.dll` resolves its own dependencies relative to its directory only
/// when that directory is on the DLL search path.
pub struct DllDirectoryGuard {
    previous: Option<Vec<u16>>,
}

impl DllDirectoryGuard {
    pub fn set(dir: &Path) -> Self {
        let previous = unsafe {
            let needed = GetDllDirectoryW(0, ptr::null_mut());
            if needed == 0 {
                None
            } else {
                let mut buf: Vec<u16> = vec![0; needed as usize];
                let written = GetDllDirectoryW(needed, buf.as_mut_ptr());
                if written == 0 {
                    None
                } else {
                    buf.truncate(written as usize + 1);
                    Some(buf)
                }
            }
        };

        let wide = to_wide(dir.as_os_str());
        unsafe { SetDllDirectoryW(wide.as_ptr()) };
        DllDirectoryGuard { previous }
    }
}

impl Drop for DllDirectoryGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.previous {
                Some(prev) => {
                    SetDllDirectoryW(prev.as_ptr());
                }
                None => {
                    // restores the default search order
                    SetDllDirectoryW(ptr::null());
                }
            }
        }
    }
}
