//! Composition Tests
//!
//! End-to-end generate() behavior: deduplication, deferred substitution
//! groups, cycle and completeness guards, single-shot generation and the
//! writer handoff.

use std::collections::HashMap;

use conceptgen_core::model::{
    Body, ClusterDef, CountDef, DefinitionDef, MemberRef, PartyDef, TextDef,
};
use conceptgen_core::{
    generate, publish, publish_concept, schema_hash, unpublish, unpublish_concept, ArtifactWriter,
    Component, ComponentId, ComponentRegistry, Concept, DocMetadata, GeneratedBundle,
    GenerationError, RootKind, UnitsRef, RM_VERSION,
};

struct Fixture {
    registry: ComponentRegistry,
    concept: ComponentId,
    definition: ComponentId,
    cluster: ComponentId,
    text: ComponentId,
    count: ComponentId,
    units: ComponentId,
}

fn definition_def(subject: ComponentId, provider: ComponentId, data: ComponentId) -> DefinitionDef {
    DefinitionDef {
        language: "en-US".to_string(),
        encoding: "utf-8".to_string(),
        state: "default".to_string(),
        links: vec![],
        audit: None,
        subject: Some(subject),
        provider: Some(provider),
        participations: vec![],
        protocol: None,
        workflow: None,
        attestation: None,
        data,
    }
}

/// A published Concept over one Cluster holding a Text shared under two
/// roles plus a Count with simple units.
fn build_fixture() -> Fixture {
    let mut registry = ComponentRegistry::new();

    let text = registry.register(Component::new("Person Name", Body::Text(TextDef::default())));
    publish(&mut registry, text).unwrap();

    let units = registry.register(Component::new(
        "Beats Per Minute",
        Body::Text(TextDef::default()),
    ));
    publish(&mut registry, units).unwrap();

    let count = registry.register(Component::new(
        "Heart Rate",
        Body::Count(CountDef {
            units: Some(UnitsRef::Simple(units)),
            ..Default::default()
        }),
    ));
    publish(&mut registry, count).unwrap();

    let cluster = registry.register(Component::new(
        "Vitals",
        Body::Cluster(ClusterDef {
            texts: vec![
                MemberRef::new("first-name", text),
                MemberRef::new("preferred-name", text),
            ],
            counts: vec![MemberRef::new("heart-rate", count)],
            ..Default::default()
        }),
    ));
    publish(&mut registry, cluster).unwrap();

    let subject = registry.register(Component::new("Subject", Body::Party(PartyDef::default())));
    publish(&mut registry, subject).unwrap();
    let provider = registry.register(Component::new("Provider", Body::Party(PartyDef::default())));
    publish(&mut registry, provider).unwrap();

    let definition = registry.register(Component::new(
        "Encounter",
        Body::Definition(definition_def(subject, provider, cluster)),
    ));
    publish(&mut registry, definition).unwrap();

    let concept = registry.register_concept(Concept::new(
        DocMetadata::new("Encounter Record", "Test Author"),
        RM_VERSION,
        Some(RootKind::Admin(definition)),
    ));
    publish_concept(&mut registry, concept).unwrap();

    Fixture {
        registry,
        concept,
        definition,
        cluster,
        text,
        count,
        units,
    }
}

#[test]
fn shared_component_gets_one_block_and_one_substitution_group() {
    let mut f = build_fixture();
    let bundle = generate(&mut f.registry, f.concept).unwrap();

    // Exactly one defining block for the shared Text.
    let defining = format!("<xs:complexType name='ct-{}'", f.text);
    assert_eq!(bundle.schema.matches(&defining).count(), 1);

    // Exactly one deferred element whose membership lists both roles in
    // first-appearance order.
    let deferred = format!(
        "<xs:element name='el-{}' substitutionGroup='cg:first-name cg:preferred-name' type='cg:ct-{}'/>",
        f.text, f.text
    );
    assert_eq!(bundle.schema.matches(&deferred).count(), 1);

    // The shared Text is wrapped exactly once.
    assert_eq!(bundle.schema.matches("Adapter for: Person Name").count(), 1);
}

#[test]
fn bundle_buffers_are_parallel_and_complete() {
    let mut f = build_fixture();
    let bundle = generate(&mut f.registry, f.concept).unwrap();

    assert!(bundle.schema.starts_with("<?xml"));
    assert!(bundle.schema.trim_end().ends_with("</xs:schema>"));

    // The instance nests the same identities the schema declared.
    assert!(bundle.instance.starts_with("<?xml"));
    assert!(bundle.instance.contains(&format!("<cg:me-{}>", f.cluster)));
    assert!(bundle.instance.contains(&format!("<cg:me-{}>", f.text)));
    assert!(bundle.instance.contains(&format!("<cg:me-{}>", f.count)));
    assert!(bundle
        .instance
        .trim_end()
        .ends_with(&format!("</cg:concept-{}>", f.concept)));

    // Documentation is best-effort but covers the traversal.
    assert!(bundle.docs.contains("Vitals"));
    assert!(bundle.docs.contains("Heart Rate"));

    // The shared Text appears once per structural position in the instance.
    assert_eq!(
        bundle.instance.matches(&format!("<cg:me-{}>", f.text)).count(),
        2
    );
}

#[test]
fn writer_bookkeeping_maps_every_used_identity_to_its_adapter() {
    let mut f = build_fixture();
    let bundle = generate(&mut f.registry, f.concept).unwrap();

    for id in [f.definition, f.cluster, f.text, f.count, f.units] {
        assert!(bundle.used.contains(&id), "{} missing from used list", id);
        let adapter = f.registry.get(&id).unwrap().meta.adapter_id;
        assert_eq!(bundle.adapters.get(&id), Some(&adapter));
    }
    // The definition opens the traversal.
    assert_eq!(bundle.used.first(), Some(&f.definition));
}

#[test]
fn generation_is_single_shot_per_publication_cycle() {
    let mut f = build_fixture();
    generate(&mut f.registry, f.concept).unwrap();
    assert!(f.registry.concept(&f.concept).unwrap().generated);

    let err = generate(&mut f.registry, f.concept).unwrap_err();
    assert!(matches!(err, GenerationError::AlreadyGenerated { .. }));

    // A fresh publication cycle re-arms composition.
    unpublish_concept(&mut f.registry, f.concept).unwrap();
    publish_concept(&mut f.registry, f.concept).unwrap();
    generate(&mut f.registry, f.concept).unwrap();
}

#[test]
fn completeness_guard_names_the_unpublished_component() {
    let mut f = build_fixture();
    unpublish(&mut f.registry, f.text).unwrap();

    let err = generate(&mut f.registry, f.concept).unwrap_err();
    assert!(matches!(err, GenerationError::NotPublished { .. }));
    assert!(err.to_string().contains("Person Name"));

    // Fatal abort: the latch must not move.
    assert!(!f.registry.concept(&f.concept).unwrap().generated);
}

#[test]
fn self_embedded_cluster_aborts_with_a_loop_error() {
    let mut f = build_fixture();
    // Corrupt the published Cluster so it embeds itself; the composer must
    // catch what publication can no longer see.
    let cluster = f.cluster;
    if let Body::Cluster(def) = &mut f.registry.get_mut(&cluster).unwrap().body {
        def.clusters.push(MemberRef::new("loop", cluster));
    }

    let err = generate(&mut f.registry, f.concept).unwrap_err();
    assert!(matches!(err, GenerationError::SelfEmbedded { .. }));
    let message = err.to_string();
    assert!(message.contains("Vitals"));
    assert!(message.contains("embedded"));
    assert!(message.contains("loop"));

    assert!(!f.registry.concept(&f.concept).unwrap().generated);
}

#[test]
fn count_without_units_aborts_naming_component_and_slot() {
    let mut f = build_fixture();
    // Strip the units slot after publication; composition re-validates the
    // closure and must refuse.
    let count = f.count;
    if let Body::Count(def) = &mut f.registry.get_mut(&count).unwrap().body {
        def.units = None;
    }

    let err = generate(&mut f.registry, f.concept).unwrap_err();
    assert!(matches!(err, GenerationError::MissingUnits { .. }));
    let message = err.to_string();
    assert!(message.contains("Heart Rate"));
    assert!(message.contains("units"));

    assert!(!f.registry.concept(&f.concept).unwrap().generated);
}

#[test]
fn unpublished_concept_cannot_generate() {
    let mut f = build_fixture();
    unpublish_concept(&mut f.registry, f.concept).unwrap();

    let err = generate(&mut f.registry, f.concept).unwrap_err();
    assert!(matches!(err, GenerationError::ConceptNotPublished { .. }));
}

#[test]
fn reference_model_version_is_gated() {
    let mut f = build_fixture();
    f.registry.concept_mut(&f.concept).unwrap().rm_version = "9.0.0".to_string();

    let err = generate(&mut f.registry, f.concept).unwrap_err();
    assert!(matches!(err, GenerationError::RmVersionMismatch { .. }));
}

#[test]
fn writer_receives_the_complete_bundle() {
    struct CollectingWriter {
        files: HashMap<String, String>,
    }

    impl ArtifactWriter for CollectingWriter {
        fn write_bundle(&mut self, bundle: &GeneratedBundle) -> std::io::Result<()> {
            let names = conceptgen_core::ArtifactNames::for_concept(bundle.concept_id);
            self.files.insert(names.schema, bundle.schema.clone());
            self.files.insert(names.instance, bundle.instance.clone());
            self.files.insert(names.docs, bundle.docs.clone());
            self.files.insert(names.hash, schema_hash(&bundle.schema));
            Ok(())
        }
    }

    let mut f = build_fixture();
    let bundle = generate(&mut f.registry, f.concept).unwrap();

    let mut writer = CollectingWriter { files: HashMap::new() };
    writer.write_bundle(&bundle).unwrap();

    assert_eq!(writer.files.len(), 4);
    let hash = writer
        .files
        .get(&format!("concept-{}.sha1", f.concept))
        .unwrap();
    assert_eq!(hash.len(), 40);
    assert_eq!(hash, &schema_hash(&bundle.schema));
}
