//! Publication Invariant Tests
//!
//! These tests verify the non-negotiable publish/unpublish guarantees.

use conceptgen_core::model::{
    Body, ClusterDef, CodedTextDef, CountDef, IntervalDef, IntervalType, MemberRef, QuantityDef,
    ReferenceRangeDef, Terminology, TextDef,
};
use conceptgen_core::{
    publish, unpublish, Component, ComponentRegistry, PublicationError, PublishOutcome, Severity,
    UnitsRef,
};

fn text_component(label: &str) -> Component {
    Component::new(label, Body::Text(TextDef::default()))
}

fn published_text(registry: &mut ComponentRegistry, label: &str) -> conceptgen_core::ComponentId {
    let id = registry.register(text_component(label));
    publish(registry, id).expect("text publishes");
    id
}

#[test]
fn invariant_publish_writes_all_four_fragments() {
    let mut registry = ComponentRegistry::new();
    let id = registry.register(text_component("Given Name"));

    let outcome = publish(&mut registry, id).unwrap();
    assert_eq!(outcome, PublishOutcome::Published);

    let component = registry.get(&id).unwrap();
    assert!(component.meta.published);
    assert!(component.meta.fragments.schema_well_formed());
    assert!(!component.meta.fragments.aux.is_empty());
    assert!(!component.meta.fragments.read.is_empty());
    assert!(!component.meta.fragments.write.is_empty());
    assert!(component
        .meta
        .fragments
        .schema
        .contains(&format!("ct-{}", component.meta.id)));
}

#[test]
fn invariant_publish_is_idempotent() {
    // A second publish must be a reported no-op regardless of current field
    // values.
    let mut registry = ComponentRegistry::new();
    let id = registry.register(text_component("Given Name"));

    publish(&mut registry, id).unwrap();
    let before = registry.get(&id).unwrap().meta.fragments.clone();

    // Upstream edits the fields; the stored fragments must not move.
    if let Body::Text(def) = &mut registry.get_mut(&id).unwrap().body {
        def.default_value = Some("changed".to_string());
    }

    let outcome = publish(&mut registry, id).unwrap();
    assert_eq!(outcome, PublishOutcome::AlreadyPublished);

    let after = registry.get(&id).unwrap().meta.fragments.clone();
    assert_eq!(before.schema, after.schema);
    assert_eq!(before.aux, after.aux);
}

#[test]
fn invariant_clean_republish_has_no_residue() {
    let mut registry = ComponentRegistry::new();
    let id = registry.register(Component::new(
        "Status",
        Body::Text(TextDef {
            default_value: Some("old-default".to_string()),
            ..Default::default()
        }),
    ));

    publish(&mut registry, id).unwrap();
    assert!(registry.get(&id).unwrap().meta.fragments.schema.contains("old-default"));

    unpublish(&mut registry, id).unwrap();
    {
        let component = registry.get(&id).unwrap();
        assert!(!component.meta.published);
        assert!(component.meta.fragments.is_empty());
    }

    if let Body::Text(def) = &mut registry.get_mut(&id).unwrap().body {
        def.default_value = Some("new-default".to_string());
    }
    publish(&mut registry, id).unwrap();

    let schema = &registry.get(&id).unwrap().meta.fragments.schema;
    assert!(schema.contains("new-default"));
    assert!(!schema.contains("old-default"));
}

#[test]
fn invariant_failed_publish_resets_state() {
    // A CodedText with no codes cannot synthesize; nothing may survive the
    // attempt.
    let mut registry = ComponentRegistry::new();
    let id = registry.register(Component::new(
        "Empty Codes",
        Body::CodedText(CodedTextDef {
            terminology: Terminology {
                name: "Example Terminology".to_string(),
                abbrev: "EXT".to_string(),
                version: "1.0".to_string(),
            },
            codes: vec![],
        }),
    ));

    let err = publish(&mut registry, id).unwrap_err();
    assert!(matches!(err, PublicationError::NoCodes { .. }));
    assert_eq!(err.severity(), Severity::Error);
    assert!(err.to_string().contains("Empty Codes"));

    let component = registry.get(&id).unwrap();
    assert!(!component.meta.published);
    assert!(component.meta.fragments.is_empty());
}

#[test]
fn invariant_count_requires_a_units_slot_at_publish() {
    let mut registry = ComponentRegistry::new();
    let id = registry.register(Component::new(
        "Pulse",
        Body::Count(CountDef::default()),
    ));

    let err = publish(&mut registry, id).unwrap_err();
    assert!(err.to_string().contains("Pulse"));
    assert!(err.to_string().contains("units"));
}

#[test]
fn invariant_quantified_units_resolve_through_the_sum_type() {
    let mut registry = ComponentRegistry::new();
    let units = published_text(&mut registry, "Beats Per Minute");

    let id = registry.register(Component::new(
        "Pulse",
        Body::Quantity(QuantityDef {
            units: Some(UnitsRef::Simple(units)),
            ..Default::default()
        }),
    ));
    publish(&mut registry, id).unwrap();

    let schema = &registry.get(&id).unwrap().meta.fragments.schema;
    let units_el = format!("el-{}", registry.get(&units).unwrap().meta.id);
    assert!(schema.contains(&units_el));
}

#[test]
fn invariant_cluster_refuses_unpublished_member() {
    let mut registry = ComponentRegistry::new();
    let unpublished = registry.register(text_component("Draft Field"));

    let cluster = registry.register(Component::new(
        "Demographics",
        Body::Cluster(ClusterDef {
            texts: vec![MemberRef::new("draft", unpublished)],
            ..Default::default()
        }),
    ));

    let err = publish(&mut registry, cluster).unwrap_err();
    assert!(matches!(err, PublicationError::UnpublishedChild { .. }));
    assert!(err.to_string().contains("Draft Field"));

    // The cluster itself must be left unpublished.
    assert!(!registry.get(&cluster).unwrap().meta.published);
}

#[test]
fn invariant_empty_cluster_refuses_to_publish() {
    let mut registry = ComponentRegistry::new();
    let cluster = registry.register(Component::new(
        "Empty",
        Body::Cluster(ClusterDef::default()),
    ));

    let err = publish(&mut registry, cluster).unwrap_err();
    assert!(matches!(err, PublicationError::EmptyCluster { .. }));
}

#[test]
fn invariant_directly_self_contained_cluster_refuses_to_publish() {
    let mut registry = ComponentRegistry::new();
    let member = published_text(&mut registry, "Field");

    let cluster = registry.register(Component::new(
        "Recursive",
        Body::Cluster(ClusterDef {
            texts: vec![MemberRef::new("field", member)],
            ..Default::default()
        }),
    ));
    // Point the cluster at itself before publishing.
    let self_id = cluster;
    if let Body::Cluster(def) = &mut registry.get_mut(&cluster).unwrap().body {
        def.clusters.push(MemberRef::new("loop", self_id));
    }

    let err = publish(&mut registry, cluster).unwrap_err();
    assert!(matches!(err, PublicationError::SelfContained { .. }));
}

#[test]
fn invariant_two_reference_ranges_cannot_share_one_interval() {
    let mut registry = ComponentRegistry::new();

    let interval = registry.register(Component::new(
        "Normal Range",
        Body::Interval(IntervalDef {
            interval_type: IntervalType::Decimal,
            lower: Some("60".to_string()),
            upper: Some("100".to_string()),
            lower_included: true,
            upper_included: true,
            lower_bounded: true,
            upper_bounded: true,
        }),
    ));
    publish(&mut registry, interval).unwrap();

    let rr = |definition: &str| {
        Component::new(
            definition,
            Body::ReferenceRange(ReferenceRangeDef {
                definition: definition.to_string(),
                interval,
                is_normal: true,
            }),
        )
    };
    let rr_a = registry.register(rr("adult"));
    let rr_b = registry.register(rr("child"));
    publish(&mut registry, rr_a).unwrap();
    publish(&mut registry, rr_b).unwrap();

    let units = published_text(&mut registry, "bpm");
    let count = registry.register(Component::new(
        "Heart Rate",
        Body::Count(CountDef {
            units: Some(UnitsRef::Simple(units)),
            reference_ranges: vec![rr_a, rr_b],
            ..Default::default()
        }),
    ));

    let err = publish(&mut registry, count).unwrap_err();
    assert!(matches!(err, PublicationError::DuplicateInterval { .. }));
    assert!(err.to_string().contains("Heart Rate"));
}

#[test]
fn invariant_unknown_component_is_an_error() {
    let mut registry = ComponentRegistry::new();
    let err = publish(&mut registry, uuid_like()).unwrap_err();
    assert!(matches!(err, PublicationError::UnknownComponent(_)));
}

fn uuid_like() -> conceptgen_core::ComponentId {
    Component::new("probe", Body::Text(TextDef::default())).meta.id
}
