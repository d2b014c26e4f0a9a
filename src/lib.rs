//! ConceptGen Core - Concept Schema Compiler
//!
//! # The Five Rules (Non-Negotiable)
//! 1. Fragments Are Written Once
//! 2. Identities Are Immutable
//! 3. Every Reference Resolves Or The Call Dies
//! 4. One Defining Block Per Identity
//! 5. No Partial Bundles

pub mod auxgen;
pub mod docform;
pub mod generator;
pub mod hashing;
pub mod instance;
pub mod model;
pub mod publisher;
pub mod registry;
pub mod xmlutil;

pub use generator::{generate, ArtifactWriter, GeneratedBundle, GenerationError, MAX_NESTING_DEPTH};
pub use hashing::{schema_hash, sha1_hex, ArtifactNames};
pub use model::{
    Body, Component, ComponentId, ComponentKind, Concept, DocMetadata, Fragments, MemberRef, Meta,
    RootKind, Severity, UnitsRef,
};
pub use publisher::{
    publish, publish_concept, unpublish, unpublish_concept, PublicationError, PublishOutcome,
};
pub use registry::ComponentRegistry;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reference model release the engine emits schemas against.
pub const RM_VERSION: &str = "2.5.0";

/// Target namespace of every generated schema and instance.
pub const CG_NAMESPACE: &str = "https://www.conceptgen.org/xmlns/cg";
