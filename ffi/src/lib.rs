//! C-ABI wrapper around `product-core`.
//!
//! # Overview
//! Exposes the product API through `extern "C"` functions so a UI layer in
//! any language with a C FFI can build requests and parse responses without
//! linking Rust's async runtime. The host runs the HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `product_build_*` / `product_parse_*` mirror the core API 1:1.
//! - Payloads in and out are JSON text; one `FfiProductResult` envelope
//!   carries success data and errors alike.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `product_free_*` function.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use product_core::http::HttpResponse;
use product_core::ProductClient;
use serde_json::Value;

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Parse caller-supplied JSON text. `None` for null, bad UTF-8 or bad JSON.
fn read_json(ptr: *const c_char) -> Option<Value> {
    read_str(ptr).and_then(|s| serde_json::from_str(s).ok())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `ProductClient` bound to the API root `api_url`
/// (e.g. `http://127.0.0.1:8000/api`).
///
/// Returns null if `api_url` is null or not UTF-8, or if a panic occurs.
/// The caller must free the returned pointer with `product_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn product_client_new(api_url: *const c_char) -> *mut FfiProductClient {
    catch_unwind(|| {
        let Some(url) = read_str(api_url) else {
            return std::ptr::null_mut();
        };
        let client = ProductClient::new(url);
        Box::into_raw(Box::new(FfiProductClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a `ProductClient` bound to the default local backend.
#[unsafe(no_mangle)]
pub extern "C" fn product_client_default() -> *mut FfiProductClient {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiProductClient {
            inner: ProductClient::default(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `product_client_new` or
/// `product_client_default`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn product_client_free(client: *mut FfiProductClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the request listing all products.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `product_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn product_build_list(client: *const FfiProductClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_products())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request fetching product `id`.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn product_build_get(client: *const FfiProductClient, id: u64) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_product(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request creating a product from the JSON text `data`.
///
/// Returns null if `client` or `data` is null, or if `data` is not valid JSON.
#[unsafe(no_mangle)]
pub extern "C" fn product_build_create(
    client: *const FfiProductClient,
    data: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(input) = read_json(data) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_create_product(&input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request replacing fields of product `id` with the JSON text
/// `data`.
///
/// Returns null if `client` or `data` is null, or if `data` is not valid JSON.
#[unsafe(no_mangle)]
pub extern "C" fn product_build_update(
    client: *const FfiProductClient,
    id: u64,
    data: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(input) = read_json(data) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_update_product(id, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request deleting product `id`.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn product_build_delete(client: *const FfiProductClient, id: u64) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_delete_product(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. Only a null body
/// is an empty body; bytes that are not UTF-8 become U+FFFD so the rest of
/// the content still reaches the parser.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Shared null checks and panic guard for the `product_parse_*` functions.
///
/// The core sees a response with no headers; callers needing them read them
/// from their own HTTP client before building the `FfiHttpResponse`.
fn parse_with<F>(
    client: *const FfiProductClient,
    response: *const FfiHttpResponse,
    op: &str,
    parse: F,
) -> *mut FfiProductResult
where
    F: FnOnce(&ProductClient, HttpResponse) -> *mut FfiProductResult,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiProductResult::null_arg("client");
        }
        if response.is_null() {
            return FfiProductResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        parse(&client.inner, resp)
    }))
    .unwrap_or_else(|_| FfiProductResult::panic(&format!("panic in {op}")))
}

/// Parse the response of a list request. `data_tag = ProductList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn product_parse_list(
    client: *const FfiProductClient,
    response: *const FfiHttpResponse,
) -> *mut FfiProductResult {
    parse_with(client, response, "product_parse_list", |c, resp| {
        let status = resp.status;
        match c.parse_list_products(resp) {
            Ok(r) => FfiProductResult::ok(r.status, FfiDataTag::ProductList, &r.data),
            Err(e) => FfiProductResult::from_error(e, status),
        }
    })
}

/// Parse the response of a get request. `data_tag = Product` on success.
#[unsafe(no_mangle)]
pub extern "C" fn product_parse_get(
    client: *const FfiProductClient,
    response: *const FfiHttpResponse,
) -> *mut FfiProductResult {
    parse_with(client, response, "product_parse_get", |c, resp| {
        let status = resp.status;
        match c.parse_get_product(resp) {
            Ok(r) => FfiProductResult::ok(r.status, FfiDataTag::Product, &r.data),
            Err(e) => FfiProductResult::from_error(e, status),
        }
    })
}

/// Parse the response of a create request. `data_tag = Product` on success.
#[unsafe(no_mangle)]
pub extern "C" fn product_parse_create(
    client: *const FfiProductClient,
    response: *const FfiHttpResponse,
) -> *mut FfiProductResult {
    parse_with(client, response, "product_parse_create", |c, resp| {
        let status = resp.status;
        match c.parse_create_product(resp) {
            Ok(r) => FfiProductResult::ok(r.status, FfiDataTag::Product, &r.data),
            Err(e) => FfiProductResult::from_error(e, status),
        }
    })
}

/// Parse the response of an update request. `data_tag = Product` on success.
#[unsafe(no_mangle)]
pub extern "C" fn product_parse_update(
    client: *const FfiProductClient,
    response: *const FfiHttpResponse,
) -> *mut FfiProductResult {
    parse_with(client, response, "product_parse_update", |c, resp| {
        let status = resp.status;
        match c.parse_update_product(resp) {
            Ok(r) => FfiProductResult::ok(r.status, FfiDataTag::Product, &r.data),
            Err(e) => FfiProductResult::from_error(e, status),
        }
    })
}

/// Parse the response of a delete request. On success `data_tag = Value`
/// and `data` is the backend's body as JSON (`null` when it sent none).
#[unsafe(no_mangle)]
pub extern "C" fn product_parse_delete(
    client: *const FfiProductClient,
    response: *const FfiHttpResponse,
) -> *mut FfiProductResult {
    parse_with(client, response, "product_parse_delete", |c, resp| {
        let status = resp.status;
        match c.parse_delete_product(resp) {
            Ok(r) => FfiProductResult::ok(r.status, FfiDataTag::Value, &r.data),
            Err(e) => FfiProductResult::from_error(e, status),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `product_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn product_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.path.is_null() {
            drop(unsafe { CString::from_raw(req.path) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiProductResult` returned by any `product_parse_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn product_free_result(result: *mut FfiProductResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() {
            drop(unsafe { CString::from_raw(result.data) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn product_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client() -> *mut FfiProductClient {
        let url = CString::new("http://localhost:8000/api").unwrap();
        let client = product_client_new(url.as_ptr());
        assert!(!client.is_null());
        client
    }

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn headers_of(req: &FfiHttpRequest) -> Vec<(String, String)> {
        if req.headers.is_null() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) }
            .iter()
            .map(|h| (c_str(h.key).to_string(), c_str(h.value).to_string()))
            .collect()
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        product_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let client = product_client_new(std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        product_client_free(std::ptr::null_mut());
    }

    #[test]
    fn default_client_targets_local_backend() {
        let client = product_client_default();
        let req = product_build_list(client);
        let path = c_str(unsafe { &*req }.path);
        assert_eq!(path, "http://127.0.0.1:8000/api/productos");
        product_free_request(req);
        product_client_free(client);
    }

    #[test]
    fn build_list_returns_correct_request() {
        let client = new_client();
        let req = product_build_list(client);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(c_str(req_ref.path), "http://localhost:8000/api/productos");
        assert!(req_ref.body.is_null());
        assert_eq!(
            headers_of(req_ref),
            vec![("accept".to_string(), "application/json".to_string())]
        );

        product_free_request(req);
        product_client_free(client);
    }

    #[test]
    fn build_list_null_client_returns_null() {
        let req = product_build_list(std::ptr::null());
        assert!(req.is_null());
    }

    #[test]
    fn build_get_puts_id_in_path() {
        let client = new_client();
        let req = product_build_get(client, 42);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(c_str(req_ref.path), "http://localhost:8000/api/productos/42");
        assert!(req_ref.body.is_null());

        product_free_request(req);
        product_client_free(client);
    }

    #[test]
    fn build_create_forwards_json_body() {
        let client = new_client();
        let data = CString::new(r#"{"nombre":"Lapiz","precio":1.25}"#).unwrap();
        let req = product_build_create(client, data.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(req_ref.headers_len, 2);
        assert_eq!(c_str(req_ref.body), r#"{"nombre":"Lapiz","precio":1.25}"#);

        product_free_request(req);
        product_client_free(client);
    }

    #[test]
    fn build_create_invalid_json_returns_null() {
        let client = new_client();
        let data = CString::new("{not json").unwrap();
        assert!(product_build_create(client, data.as_ptr()).is_null());
        assert!(product_build_create(client, std::ptr::null()).is_null());
        product_client_free(client);
    }

    #[test]
    fn build_update_produces_put() {
        let client = new_client();
        let data = CString::new(r#"{"stock":0}"#).unwrap();
        let req = product_build_update(client, 3, data.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Put);
        assert_eq!(c_str(req_ref.path), "http://localhost:8000/api/productos/3");
        let body: Value = serde_json::from_str(c_str(req_ref.body)).unwrap();
        assert_eq!(body, serde_json::json!({"stock": 0}));

        product_free_request(req);
        product_client_free(client);
    }

    #[test]
    fn build_delete_produces_delete() {
        let client = new_client();
        let req = product_build_delete(client, 3);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Delete);
        assert!(req_ref.body.is_null());

        product_free_request(req);
        product_client_free(client);
    }

    #[test]
    fn parse_list_empty() {
        let client = new_client();
        let body = CString::new("[]").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = product_parse_list(client, &resp);
        assert!(!result.is_null());

        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.http_status, 200);
        assert_eq!(r.data_tag, FfiDataTag::ProductList);
        assert_eq!(c_str(r.data), "[]");

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_list_two_items() {
        let client = new_client();
        let body = CString::new(r#"[{"id":1,"nombre":"Mesa"},{"id":2,"nombre":"Silla"}]"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = product_parse_list(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);

        let data: Value = serde_json::from_str(c_str(r.data)).unwrap();
        assert_eq!(data[1]["nombre"], "Silla");

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_get_success() {
        let client = new_client();
        let body = CString::new(r#"{"id":1,"nombre":"Mesa"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = product_parse_get(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Product);
        assert_eq!(c_str(r.data), r#"{"id":1,"nombre":"Mesa"}"#);

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_get_not_found_keeps_status_and_body() {
        let client = new_client();
        let body = CString::new(r#"{"message":"Not Found"}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = product_parse_get(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 404);
        assert_eq!(c_str(r.error_message), r#"{"message":"Not Found"}"#);
        assert!(r.data.is_null());

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_create_bad_json_is_deserialization_error() {
        let client = new_client();
        let body = CString::new("<html>").unwrap();
        let resp = FfiHttpResponse {
            status: 201,
            body: body.as_ptr(),
        };
        let result = product_parse_create(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Deserialization);
        assert_eq!(r.http_status, 201);

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_update_success() {
        let client = new_client();
        let body = CString::new(r#"{"id":3,"stock":0}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = product_parse_update(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Product);

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_delete_no_content() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 204,
            body: std::ptr::null(),
        };
        let result = product_parse_delete(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Value);
        assert_eq!(r.http_status, 204);
        assert_eq!(c_str(r.data), "null");

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_delete_not_found() {
        let client = new_client();
        let body = CString::new("").unwrap();
        let resp = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = product_parse_delete(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 404);

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_get_not_found_keeps_latin1_body() {
        let client = new_client();
        let body = CString::new(b"Art\xedculo no encontrado".to_vec()).unwrap();
        let resp = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = product_parse_get(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 404);
        assert_eq!(c_str(r.error_message), "Art\u{FFFD}culo no encontrado");

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_delete_latin1_body_is_kept_as_text() {
        let client = new_client();
        let body = CString::new(b"Art\xedculo eliminado".to_vec()).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = product_parse_delete(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Value);
        let data: Value = serde_json::from_str(c_str(r.data)).unwrap();
        assert_eq!(data, Value::String("Art\u{FFFD}culo eliminado".to_string()));

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("[]").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = product_parse_list(std::ptr::null(), &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        assert_eq!(c_str(r.error_message), "null argument: client");

        product_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let result = product_parse_list(client, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        product_free_result(result);
        product_client_free(client);
    }

    #[test]
    fn to_c_string_drops_interior_nul() {
        let ptr = to_c_string("a\0b".to_string());
        assert_eq!(c_str(ptr), "ab");
        product_free_string(ptr);
    }

    #[test]
    fn free_request_null_is_safe() {
        product_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        product_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        product_free_string(std::ptr::null_mut());
    }
}
