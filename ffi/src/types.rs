//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests mirror `product_core::HttpRequest` field for field. Products are
//! opaque JSON in the core, so results carry them as JSON text and a tag
//! saying what shape that text has; the C host parses it with whatever JSON
//! library it already uses.

use std::ffi::CString;
use std::os::raw::c_char;

use product_core::error::ApiError;
use product_core::http::HttpMethod;

/// Opaque handle to a `ProductClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiProductClient {
    pub(crate) inner: product_core::ProductClient,
}

/// Move `s` onto the C heap. Interior NULs are dropped rather than failing.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `product_build_*`. `path` is the absolute URL; `body` is null
/// for GET and DELETE.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: product_core::HttpRequest) -> *mut Self {
        let path = to_c_string(req.path);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            // Boxed slice so capacity == len when `product_free_request` rebuilds it.
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller builds this on the stack after running the request and
/// passes a pointer to a `product_parse_*` function. The FFI layer reads
/// but does not free these fields. A null `body` is an empty body; a body
/// that is not UTF-8 is decoded lossily.
///
/// Response headers do not cross the C ABI: `FfiProductResult` exposes only
/// the status and the decoded data, so the host keeps any header it needs.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiProductResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Http = 1,
    Deserialization = 2,
    Serialization = 3,
    Panic = 4,
    NullArg = 5,
    Transport = 6,
}

/// Shape of the JSON text in `FfiProductResult::data`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Product = 1,
    ProductList = 2,
    Value = 3,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data` is
/// the decoded body as JSON text (tagged by `data_tag`). On failure `data`
/// is null and `error_message` is a readable C string; for `Http` errors it
/// holds the backend's raw body. `http_status` is the response status in
/// both cases (0 when no response was involved).
#[repr(C)]
pub struct FfiProductResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_char,
}

impl FfiProductResult {
    fn new(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiProductResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying `data` re-encoded as JSON.
    pub(crate) fn ok<T: serde::Serialize + ?Sized>(status: u16, tag: FfiDataTag, data: &T) -> *mut Self {
        match serde_json::to_string(data) {
            Ok(json) => Self::new(FfiErrorCode::Ok, std::ptr::null_mut(), status, tag, to_c_string(json)),
            Err(e) => Self::from_error(ApiError::SerializationError(e.to_string()), status),
        }
    }

    /// Build an error result from an `ApiError`. `status` is the response
    /// status seen by the parser.
    pub(crate) fn from_error(err: ApiError, status: u16) -> *mut Self {
        let (error_code, message) = match err {
            ApiError::HttpError { body, .. } => (FfiErrorCode::Http, body),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, err.to_string()),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, err.to_string()),
            ApiError::TransportError(_) => (FfiErrorCode::Transport, err.to_string()),
        };
        Self::new(
            error_code,
            to_c_string(message),
            status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::new(
            FfiErrorCode::NullArg,
            to_c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::new(
            FfiErrorCode::Panic,
            to_c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}
