use md5::{Digest, Md5};

use crate::model::params::{ParamSet, render_value};

/// Keys that never take part in the signature.
const EXCLUDED_KEYS: [&str; 2] = ["sign", "sign_type"];

pub const SIGN_TYPE_MD5: &str = "MD5";

/// Build the string that gets digested, minus the secret.
///
/// Format: `"k1=v1&k2=v2&..."` over every non-null entry except `sign` and
/// `sign_type`, keys in ordinal order. Falsy values (`0`, `""`, `false`) stay.
pub fn build_sign_message(params: &ParamSet) -> String {
    params
        .iter()
        .filter(|(k, v)| !EXCLUDED_KEYS.contains(&k.as_str()) && !v.is_null())
        .map(|(k, v)| format!("{k}={}", render_value(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign the parameters with MD5 and return the lowercase hex digest.
///
/// Digest input: `build_sign_message(params) + secret`, UTF-8 encoded.
pub fn sign_md5(params: &ParamSet, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(build_sign_message(params).as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
