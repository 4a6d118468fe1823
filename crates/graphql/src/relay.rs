//! Relay global object identifiers.
//!
//! A global id is `base64("<Type>:<id>")`. It is opaque to clients and
//! lets `node(id)` find an object without knowing which query produced it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A decoded global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalId {
    pub type_name: String,
    pub id: String,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Encode as an opaque string.
    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.type_name, self.id))
    }

    /// Decode an opaque string; `None` if it is not a global id.
    pub fn decode(global_id: &str) -> Option<Self> {
        let bytes = STANDARD.decode(global_id).ok()?;
        let raw = String::from_utf8(bytes).ok()?;
        let (type_name, id) = raw.split_once(':')?;

        if type_name.is_empty() {
            return None;
        }

        Some(Self::new(type_name, id))
    }
}

/// Shorthand for [`GlobalId::encode`].
pub fn to_global_id(type_name: &str, id: &str) -> String {
    GlobalId::new(type_name, id).encode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_id_format() {
        // Format compatible graphql-relay: base64("Type:id")
        assert_eq!(to_global_id("Breed", "husky"), "QnJlZWQ6aHVza3k=");
        assert_eq!(
            GlobalId::decode("QnJlZWQ6aHVza3k="),
            Some(GlobalId::new("Breed", "husky"))
        );
    }

    #[test]
    fn test_id_may_contain_separator() {
        let id = GlobalId::new("Breed", "a:b");
        assert_eq!(GlobalId::decode(&id.encode()), Some(id));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(GlobalId::decode("husky"), None);
        assert_eq!(GlobalId::decode(""), None);
        // base64 valide mais sans séparateur
        assert_eq!(GlobalId::decode("aHVza3k="), None);
        // type vide
        assert_eq!(GlobalId::decode(&STANDARD.encode(":husky")), None);
    }
}
