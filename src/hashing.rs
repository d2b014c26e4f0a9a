//! Hashing System - SHA-1 content hashes for published schemas
//!
//! The artifact format pins the schema content hash to SHA-1; the hex digest
//! is persisted beside the schema so consumers can verify what they fetched.

use sha1::{Digest, Sha1};

use crate::model::ComponentId;

/// Compute the SHA-1 hash of bytes, return hex string.
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Content hash of a generated schema buffer.
pub fn schema_hash(schema: &str) -> String {
    sha1_hex(schema.as_bytes())
}

/// Conventional artifact file names for one generated Concept:
/// `{prefix}-{concept-id}.{ext}`.
#[derive(Debug, Clone)]
pub struct ArtifactNames {
    pub schema: String,
    pub instance: String,
    pub docs: String,
    pub hash: String,
}

pub const ARTIFACT_PREFIX: &str = "concept";

impl ArtifactNames {
    pub fn for_concept(id: ComponentId) -> Self {
        Self {
            schema: format!("{}-{}.xsd", ARTIFACT_PREFIX, id),
            instance: format!("{}-{}.xml", ARTIFACT_PREFIX, id),
            docs: format!("{}-{}.html", ARTIFACT_PREFIX, id),
            hash: format!("{}-{}.sha1", ARTIFACT_PREFIX, id),
        }
    }
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_hash_deterministic() {
        let data = b"schema body";
        let h1 = sha1_hex(data);
        let h2 = sha1_hex(data);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 40);
    }

    #[test]
    fn test_known_digest() {
        // sha1("abc")
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_artifact_names_follow_convention() {
        let id = Uuid::new_v4();
        let names = ArtifactNames::for_concept(id);
        assert_eq!(names.schema, format!("concept-{}.xsd", id));
        assert_eq!(names.hash, format!("concept-{}.sha1", id));
    }
}
