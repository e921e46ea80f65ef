use serde::Serialize;
use serde_json::Value;

/// A user record as stored and as serialized on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserPatch {
    /// Build a patch from a decoded JSON object.
    ///
    /// A field counts as present only when it holds a non-empty string.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        Self {
            name: non_empty_field(body, "name").map(str::to_owned),
            email: non_empty_field(body, "email").map(str::to_owned),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Look up `key` in a JSON object and return it if it is a non-empty string.
#[must_use]
pub fn non_empty_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
