//! Naming conventions.
//!
//! Pure, total string transforms that turn type and operation identifiers
//! into route paths and HTTP verbs. These are the contract between plugin
//! authors and the route compiler: `UserController::GetProfile` becomes
//! `GET .../user/get/profile` with no further registration.

use crate::HttpVerb;

/// Strip ownership markers and the module path from a runtime type name.
///
/// `"&app::controllers::UserController"` becomes `"UserController"`.
pub fn clean_type_name(raw: &str) -> &str {
    let raw = raw.trim_start_matches('&');
    raw.rsplit("::").next().unwrap_or(raw)
}

/// Convert an operation name into its route path segments.
///
/// The first character is lower-cased, a separator is inserted before every
/// uppercase letter that follows a lowercase letter or digit, and the result
/// is fully lower-cased: `GetUserOrders` -> `get/user/orders`. Already
/// separated input is returned unchanged, so the transform is idempotent.
pub fn operation_path(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && prev_lower_or_digit {
            out.push('/');
        }
        prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Infer the HTTP verb from an operation name prefix.
///
/// Order matters: the `GetPost` exclusion is checked before the general
/// `Get` prefix. Everything unrecognized defaults to POST.
pub fn infer_verb(name: &str) -> HttpVerb {
    if name == "Index" || (name.starts_with("Get") && !name.starts_with("GetPost")) {
        HttpVerb::Get
    } else if name.starts_with("Del") {
        HttpVerb::Delete
    } else if name.starts_with("Put") {
        HttpVerb::Put
    } else {
        HttpVerb::Post
    }
}

/// Extract the route segment for a controller type name.
///
/// The module path is stripped, a trailing `Controller` suffix is removed,
/// the literal name `Index` maps to the root segment, and everything else is
/// lower-cased and wrapped in separators: `UserController` -> `/user/`,
/// `IndexController` -> `/`.
pub fn module_segment(type_name: &str) -> String {
    let name = clean_type_name(type_name);
    let name = name.strip_suffix("Controller").unwrap_or(name);
    if name == "Index" {
        return "/".to_string();
    }
    format!("/{}/", name.to_ascii_lowercase())
}

/// Convert a camel-case field name into its store column form.
///
/// Uppercase boundaries become underscores and a trailing `ID` pair folds
/// into `_id`: `BusinessID` -> `business_id`, `ID` -> `id`.
pub fn snake_case_column(name: &str) -> String {
    if name == "ID" {
        return "id".to_string();
    }
    let bytes = name.as_bytes();
    let mut out = String::with_capacity(name.len() + 4);
    let mut i = 0;
    while i < bytes.len() {
        let ch = bytes[i] as char;
        if i > 0 && ch.is_ascii_uppercase() {
            if ch == 'I' && i + 1 < bytes.len() && bytes[i + 1] == b'D' {
                out.push_str("_id");
                i += 2;
                continue;
            }
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
        i += 1;
    }
    out
}
