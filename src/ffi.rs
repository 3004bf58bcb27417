//! FFI bindings for CAP
//!
//! C-compatible functions for calling the scoring pipeline from other languages.
//! All functions take null-terminated C strings and return allocated memory that
//! must be freed by the caller using `cap_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{measurements_to_report, AlignmentProcessor};
use crate::policy::Policy;

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

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score measurements JSON with the default policy and return report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `cap_free_string`.
/// - Returns NULL on error; call `cap_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cap_compute_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match measurements_to_report(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Processor API
// ============================================================================

/// Opaque handle to an AlignmentProcessor
pub struct CapProcessorHandle {
    processor: AlignmentProcessor,
}

/// Create a processor from a policy JSON string, or the default policy if NULL.
///
/// # Safety
/// - `policy_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `cap_processor_free`.
/// - Returns NULL on error; call `cap_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cap_processor_new(policy_json: *const c_char) -> *mut CapProcessorHandle {
    clear_last_error();

    let processor = if policy_json.is_null() {
        AlignmentProcessor::new()
    } else {
        let json_str = match cstr_to_string(policy_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid policy string pointer");
                return ptr::null_mut();
            }
        };
        match Policy::from_json(&json_str).and_then(AlignmentProcessor::with_policy) {
            Ok(processor) => processor,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(CapProcessorHandle { processor }))
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `cap_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cap_processor_free(processor: *mut CapProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score measurements JSON with a processor and return report JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `cap_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `cap_free_string`.
/// - Returns NULL on error; call `cap_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cap_processor_process(
    processor: *const CapProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by CAP functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a CAP function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cap_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next CAP call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn cap_last_error() -> *const c_char {
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
pub unsafe extern "C" fn cap_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_measurements_json() -> CString {
        CString::new(
            r#"{
                "indoor_hours": 6.7,
                "nature_minutes_this_week": 18,
                "screen_switches_per_minute": 2.8,
                "late_night_screen_minutes": 110,
                "social_proximity_events": 1
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_compute_report() {
        let json = sample_measurements_json();

        unsafe {
            let result = cap_compute_report(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"composite\""));
            assert!(result_str.contains("high_mismatch"));

            cap_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let policy = CString::new(r#"{"nudges": {"max_nudges": 6}}"#).unwrap();
        let json = sample_measurements_json();

        unsafe {
            let processor = cap_processor_new(policy.as_ptr());
            assert!(!processor.is_null());

            let result = cap_processor_process(processor, json.as_ptr());
            assert!(!result.is_null());

            let report: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(report["nudges"].as_array().unwrap().len(), 6);

            cap_free_string(result);
            cap_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_default_processor() {
        unsafe {
            let processor = cap_processor_new(ptr::null());
            assert!(!processor.is_null());
            cap_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_invalid_policy() {
        let policy = CString::new(r#"{"scoring": {"weights": {"nature": 0.9}}}"#).unwrap();

        unsafe {
            let processor = cap_processor_new(policy.as_ptr());
            assert!(processor.is_null());

            let error = cap_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("weights"));
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new(r#"{"indoor_hours": "many"}"#).unwrap();
            let result = cap_compute_report(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = cap_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.starts_with("Invalid input"));

            let result = cap_compute_report(ptr::null());
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = cap_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, env!("CARGO_PKG_VERSION"));
        }
    }
}
