//! Turns a configured cluster address into request URLs.

/// Join `addr` and `path`, prefixing `http://` when `addr` carries no scheme.
///
/// No slash is added or removed and the result is not validated; a malformed
/// address surfaces later as a transport error.
pub fn resolve(addr: &str, path: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        format!("{addr}{path}")
    } else {
        format!("http://{addr}{path}")
    }
}
