//! HTTP verbs recognized by the extractor, with their sort rank.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An HTTP method as written in a declaration, uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    /// Anything outside the five enumerated verbs. Never rejected.
    Other(String),
}

impl HttpMethod {
    /// Rank used for ordering endpoints within a file.
    ///
    /// GET < POST < PUT < PATCH < DELETE; every other method sorts after DELETE.
    pub fn rank(&self) -> u8 {
        match self {
            HttpMethod::Get => 0,
            HttpMethod::Post => 1,
            HttpMethod::Put => 2,
            HttpMethod::Patch => 3,
            HttpMethod::Delete => 4,
            HttpMethod::Other(_) => 5,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(other) => other,
        }
    }

    pub fn is_enumerated(&self) -> bool {
        !matches!(self, HttpMethod::Other(_))
    }
}

impl From<&str> for HttpMethod {
    fn from(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        match upper.as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(upper),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(raw: String) -> Self {
        HttpMethod::from(raw.as_str())
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
