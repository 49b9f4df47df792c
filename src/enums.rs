use std::fmt;

/// HTTP request method.
///
/// `Get`, `Post`, `Put` and `Delete` occupy fixed slots in the per-method
/// root set (component C); every other method, including `Extension`, is
/// appended to the root set the first time a route registers it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
    /// A method outside the well-known set, carried verbatim and upper-cased.
    Extension(Box<str>),
}

impl HttpMethod {
    /// Index into the fixed pre-allocated slots, or `None` for appended methods.
    pub(crate) const fn fixed_slot(&self) -> Option<usize> {
        match self {
            HttpMethod::Get => Some(0),
            HttpMethod::Post => Some(1),
            HttpMethod::Put => Some(2),
            HttpMethod::Delete => Some(3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Extension(s) => s,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HttpMethod {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            "CONNECT" => HttpMethod::Connect,
            other => HttpMethod::Extension(other.into()),
        }
    }
}
