use sf_domain::error::Error;

/// Convert a `reqwest::Error` into a domain `Error`.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
