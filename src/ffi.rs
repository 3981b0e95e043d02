//! FFI bindings for Screen Health
//!
//! C-compatible entry points. All functions take null-terminated C strings and
//! return allocated memory that must be freed by the caller using
//! `sh_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ScoringConfig;
use crate::pipeline::{dashboard_to_json, DashboardProcessor};
use crate::seed::score_from_identity;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("Result contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Baseline risk scores for an identity key, as a JSON object.
///
/// # Safety
/// - `identity` must be a valid null-terminated UTF-8 C string.
/// - Returns a newly allocated string that must be freed with `sh_free_string`.
/// - Returns NULL on error; call `sh_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sh_score_from_identity(identity: *const c_char) -> *mut c_char {
    clear_last_error();

    let identity = match cstr_to_string(identity) {
        Some(s) => s,
        None => {
            set_last_error("Invalid identity string pointer");
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&score_from_identity(&identity)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Build dashboard JSON from a store snapshot JSON.
///
/// # Safety
/// - `snapshot_json` and `identity` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sh_free_string`.
/// - Returns NULL on error; call `sh_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sh_dashboard_json(
    snapshot_json: *const c_char,
    identity: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let identity = match cstr_to_string(identity) {
        Some(s) => s,
        None => {
            set_last_error("Invalid identity string pointer");
            return ptr::null_mut();
        }
    };

    match dashboard_to_json(&json_str, &identity) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a DashboardProcessor
pub struct DashboardProcessorHandle {
    processor: DashboardProcessor,
}

/// Create a processor from a configuration JSON, or defaults when NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `sh_processor_free`.
/// - Returns NULL on error; call `sh_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sh_processor_new(
    config_json: *const c_char,
) -> *mut DashboardProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        ScoringConfig::default()
    } else {
        let parsed = cstr_to_string(config_json)
            .ok_or_else(|| "Invalid config string pointer".to_string())
            .and_then(|json| ScoringConfig::from_json(&json).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(msg) => {
                set_last_error(&msg);
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(DashboardProcessorHandle {
        processor: DashboardProcessor::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sh_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sh_processor_free(processor: *mut DashboardProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Build dashboard JSON with a configured processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sh_processor_new`.
/// - `snapshot_json` and `identity` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sh_free_string`.
/// - Returns NULL on error; call `sh_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sh_processor_dashboard(
    processor: *const DashboardProcessorHandle,
    snapshot_json: *const c_char,
    identity: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(snapshot_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let identity = match cstr_to_string(identity) {
        Some(s) => s,
        None => {
            set_last_error("Invalid identity string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process(&json_str, &identity) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Screen Health functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an `sh_` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sh_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `sh_` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sh_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sh_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_snapshot_json() -> CString {
        CString::new(
            r#"{
                "screenTime": [
                    { "minutes": 120, "device": "computer", "timestamp": 1705312800000000000 },
                    { "minutes": 20, "device": "phone", "timestamp": 1705363200000000000 }
                ],
                "healthMetrics": { "bmi": 23.5, "exerciseHoursPerWeek": 3.0 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_score_from_identity() {
        let identity = CString::new("abc").unwrap();
        unsafe {
            let result = sh_score_from_identity(identity.as_ptr());
            assert!(!result.is_null());

            let json = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(json).unwrap();
            assert_eq!(value["burnout"], 59);
            assert_eq!(value["healthScore"], 36);

            sh_free_string(result);
        }
    }

    #[test]
    fn test_ffi_dashboard_json() {
        let json = sample_snapshot_json();
        let identity = CString::new("2vxsx-fae").unwrap();
        unsafe {
            let result = sh_dashboard_json(json.as_ptr(), identity.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("quick_stats"));
            assert!(result_str.contains("2vxsx-fae…"));

            sh_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let config = CString::new(r#"{ "burnout_threshold": 40 }"#).unwrap();
        unsafe {
            let processor = sh_processor_new(config.as_ptr());
            assert!(!processor.is_null());

            let json = sample_snapshot_json();
            let identity = CString::new("abc").unwrap();
            let result = sh_processor_dashboard(processor, json.as_ptr(), identity.as_ptr());
            assert!(!result.is_null());

            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(value["metrics"][0]["level"], "elevated");

            sh_free_string(result);
            sh_processor_free(processor);

            let defaults = sh_processor_new(ptr::null());
            assert!(!defaults.is_null());
            sh_processor_free(defaults);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let identity = CString::new("abc").unwrap();

            let result = sh_dashboard_json(invalid_json.as_ptr(), identity.as_ptr());
            assert!(result.is_null());

            let error = sh_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("snapshot"));

            let result = sh_score_from_identity(ptr::null());
            assert!(result.is_null());
            assert!(!sh_last_error().is_null());

            let processor = sh_processor_dashboard(ptr::null(), invalid_json.as_ptr(), identity.as_ptr());
            assert!(processor.is_null());
        }
    }

    #[test]
    fn test_ffi_invalid_config() {
        let config = CString::new(r#"{ "lookback_days": 0 }"#).unwrap();
        unsafe {
            let processor = sh_processor_new(config.as_ptr());
            assert!(processor.is_null());
            assert!(!sh_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = sh_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
