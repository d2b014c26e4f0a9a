//! Synthesizer - one-shot fragment publication
//!
//! CRITICAL: fragments are written exactly once per publication cycle. A
//! component whose schema fragment is already non-empty reports a no-op
//! outcome; rewriting under the same identity is never allowed. Clearing
//! requires an explicit `unpublish`.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::auxgen;
use crate::model::{
    AttestationDef, AuditDef, Body, BooleanDef, ClusterDef, CodedTextDef, Component, ComponentId,
    ComponentKind, Concept, CountDef, DefinitionDef, Fragments, IdentifierDef, IntervalDef,
    LinkDef, MagnitudeFacets, MediaDef, Meta, OrdinalDef, ParsableDef, ParticipationDef, PartyDef,
    QuantityDef, RatioDef, ReferenceRangeDef, Severity, TemporalDef, TextDef, UnitsRef,
};
use crate::registry::ComponentRegistry;
use crate::xmlutil::{escape, pad};
use crate::CG_NAMESPACE;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static SYNTHESIS_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_synthesis_call_count() -> u32 {
    SYNTHESIS_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_synthesis_call_count() {
    SYNTHESIS_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PublicationError {
    #[error("Unknown component: {0}")]
    UnknownComponent(ComponentId),

    #[error("{kind} '{label}' hasn't been published. Publish it and retry.")]
    UnpublishedChild { kind: ComponentKind, label: String },

    #[error("{label}: expected a {expected} component in this slot")]
    WrongKind { label: String, expected: ComponentKind },

    #[error("{kind} '{label}' must reference either a simple or a coded units component for its {slot} slot")]
    MissingUnits { kind: ComponentKind, label: String, slot: &'static str },

    #[error("Cannot publish '{label}': {detail}")]
    MismatchedLists { label: String, detail: &'static str },

    #[error("Cluster '{label}' appears to be empty. You cannot publish an empty Cluster.")]
    EmptyCluster { label: String },

    #[error("Cluster '{label}' cannot contain itself at any level.")]
    SelfContained { label: String },

    #[error("'{label}' cannot use two reference ranges that share the same Interval as their data-range.")]
    DuplicateInterval { label: String },

    #[error("CodedText '{label}' has no codes defined.")]
    NoCodes { label: String },

    #[error("'{label}' is missing its mandatory {slot}.")]
    MissingSlot { label: String, slot: &'static str },
}

impl PublicationError {
    /// Publication failures are uniformly fatal to the attempt.
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// Outcome of a publish call. Publishing an already-published component is
/// a reported no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    AlreadyPublished,
}

/// Synthesize and store all four fragments for one component.
///
/// Children that appear inside the fragment (units, reference ranges,
/// cluster members, definition slots) must already be published. On any
/// failure the component is left with empty fragments and `published`
/// false.
pub fn publish(
    registry: &mut ComponentRegistry,
    id: ComponentId,
) -> Result<PublishOutcome, PublicationError> {
    #[cfg(feature = "test-hooks")]
    SYNTHESIS_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    let component = registry
        .get(&id)
        .ok_or(PublicationError::UnknownComponent(id))?;

    // One-shot guard: a non-empty schema fragment means this publication
    // cycle already ran.
    if !component.meta.fragments.schema.is_empty() {
        return Ok(PublishOutcome::AlreadyPublished);
    }

    debug!(component = %component.meta.label, kind = %component.kind(), "publishing component");

    let synthesized = synthesize(registry, component);

    match synthesized {
        Ok(fragments) => {
            let component = registry
                .get_mut(&id)
                .ok_or(PublicationError::UnknownComponent(id))?;
            component.meta.published = fragments.schema_well_formed();
            component.meta.fragments = fragments;
            Ok(PublishOutcome::Published)
        }
        Err(e) => {
            // The flag must never survive a failed synthesis.
            if let Some(component) = registry.get_mut(&id) {
                component.meta.fragments.clear();
                component.meta.published = false;
            }
            Err(e)
        }
    }
}

/// Clear all four fragments and reset the published flag, opening a new
/// publication cycle.
pub fn unpublish(registry: &mut ComponentRegistry, id: ComponentId) -> Result<(), PublicationError> {
    let component = registry
        .get_mut(&id)
        .ok_or(PublicationError::UnknownComponent(id))?;
    component.meta.fragments.clear();
    component.meta.published = false;
    Ok(())
}

/// Synthesize the schema front-matter and metadata fragments for a Concept.
pub fn publish_concept(
    registry: &mut ComponentRegistry,
    id: ComponentId,
) -> Result<PublishOutcome, PublicationError> {
    #[cfg(feature = "test-hooks")]
    SYNTHESIS_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    let concept = registry
        .concept(&id)
        .ok_or(PublicationError::UnknownComponent(id))?;

    if !concept.fragments.schema.is_empty() {
        return Ok(PublishOutcome::AlreadyPublished);
    }

    debug!(concept = %concept.metadata.title, "publishing concept");

    let synthesized = synthesize_concept(registry, concept);

    match synthesized {
        Ok((fragments, doc_fragment)) => {
            let concept = registry
                .concept_mut(&id)
                .ok_or(PublicationError::UnknownComponent(id))?;
            concept.published = fragments.schema_well_formed();
            concept.fragments = fragments;
            concept.doc_fragment = doc_fragment;
            Ok(PublishOutcome::Published)
        }
        Err(e) => {
            if let Some(concept) = registry.concept_mut(&id) {
                concept.fragments.clear();
                concept.doc_fragment.clear();
                concept.published = false;
            }
            Err(e)
        }
    }
}

/// Clear a Concept's fragments, its publication flag and its generation
/// latch, opening a new publication cycle.
pub fn unpublish_concept(
    registry: &mut ComponentRegistry,
    id: ComponentId,
) -> Result<(), PublicationError> {
    let concept = registry
        .concept_mut(&id)
        .ok_or(PublicationError::UnknownComponent(id))?;
    concept.fragments.clear();
    concept.doc_fragment.clear();
    concept.published = false;
    concept.generated = false;
    Ok(())
}

fn synthesize(
    registry: &ComponentRegistry,
    component: &Component,
) -> Result<Fragments, PublicationError> {
    let meta = &component.meta;
    let kind = component.kind();

    let schema = match &component.body {
        Body::Boolean(d) => boolean_schema(meta, d),
        Body::Text(d) => text_schema(meta, d)?,
        Body::CodedText(d) => coded_text_schema(meta, d)?,
        Body::Link(d) => link_schema(meta, d),
        Body::Identifier(d) => identifier_schema(meta, d)?,
        Body::Parsable(d) => parsable_schema(meta, d),
        Body::Media(d) => media_schema(meta, d),
        Body::Ordinal(d) => ordinal_schema(registry, meta, d)?,
        Body::Count(d) => count_schema(registry, meta, d)?,
        Body::Quantity(d) => quantity_schema(registry, meta, d)?,
        Body::Ratio(d) => ratio_schema(registry, meta, d)?,
        Body::Temporal(d) => temporal_schema(registry, meta, d)?,
        Body::Interval(d) => interval_schema(meta, d),
        Body::ReferenceRange(d) => reference_range_schema(registry, meta, d)?,
        Body::Cluster(d) => cluster_schema(registry, meta, d)?,
        Body::Party(d) => party_schema(registry, meta, d)?,
        Body::Audit(d) => audit_schema(registry, meta, d)?,
        Body::Attestation(d) => attestation_schema(registry, meta, d)?,
        Body::Participation(d) => participation_schema(registry, meta, d)?,
        Body::Definition(d) => definition_schema(registry, meta, d)?,
    };

    Ok(Fragments {
        schema,
        aux: auxgen::report_fragment(meta, kind),
        read: auxgen::read_fragment(meta),
        write: auxgen::write_fragment(meta),
    })
}

// --- shared lookup helpers ---

fn child<'a>(
    registry: &'a ComponentRegistry,
    id: &ComponentId,
) -> Result<&'a Component, PublicationError> {
    registry
        .get(id)
        .ok_or(PublicationError::UnknownComponent(*id))
}

fn published_child<'a>(
    registry: &'a ComponentRegistry,
    id: &ComponentId,
) -> Result<&'a Component, PublicationError> {
    let component = child(registry, id)?;
    if !component.is_published() {
        return Err(PublicationError::UnpublishedChild {
            kind: component.kind(),
            label: component.meta.label.clone(),
        });
    }
    Ok(component)
}

fn units_target<'a>(
    registry: &'a ComponentRegistry,
    units: &UnitsRef,
) -> Result<&'a Component, PublicationError> {
    let component = published_child(registry, &units.target())?;
    let expected = match units {
        UnitsRef::Simple(_) => ComponentKind::Text,
        UnitsRef::Coded(_) => ComponentKind::CodedText,
    };
    if component.kind() != expected {
        return Err(PublicationError::WrongKind {
            label: component.meta.label.clone(),
            expected,
        });
    }
    Ok(component)
}

// --- block scaffolding shared by every kind ---

fn open_block(meta: &Meta, kind: ComponentKind) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "\n{}<xs:complexType name='ct-{}' xml:lang='{}'> <!-- {} -->\n",
        pad(2),
        meta.id,
        meta.lang,
        escape(&meta.label)
    ));
    s.push_str(&format!("{}<xs:annotation>\n", pad(4)));
    s.push_str(&format!("{}<xs:documentation>\n", pad(4)));
    s.push_str(&format!("{}{}\n", pad(6), escape(&meta.description)));
    s.push_str(&format!("{}</xs:documentation>\n", pad(4)));
    s.push_str(&format!("{}<xs:appinfo>\n", pad(4)));
    s.push_str(&format!(
        "{}<rdf:Description rdf:about='{}:ct-{}'>\n",
        pad(4),
        CG_NAMESPACE,
        meta.id
    ));
    s.push_str(&format!(
        "{}<rdfs:subClassOf rdf:resource='cg:{}'/>\n",
        pad(6),
        kind.base_type()
    ));
    s.push_str(&format!(
        "{}<rdfs:label>{}</rdfs:label>\n",
        pad(6),
        escape(meta.label.trim())
    ));
    for link in &meta.links {
        s.push_str(&format!(
            "{}<{} rdf:resource='{}'/>\n",
            pad(6),
            link.predicate,
            escape(&link.object_uri)
        ));
    }
    s.push_str(&format!("{}</rdf:Description>\n", pad(4)));
    s.push_str(&format!("{}</xs:appinfo>\n", pad(4)));
    s.push_str(&format!("{}</xs:annotation>\n", pad(4)));
    s.push_str(&format!("{}<xs:complexContent>\n", pad(4)));
    s.push_str(&format!(
        "{}<xs:restriction base='cg:{}'>\n",
        pad(6),
        kind.base_type()
    ));
    s.push_str(&format!("{}<xs:sequence>\n", pad(8)));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='label' type='xs:string' fixed=\"{}\"/>\n",
        pad(10),
        escape(meta.label.trim())
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:ExceptionalValue'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='valid-time-begin' type='xs:dateTime'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='valid-time-end' type='xs:dateTime'/>\n",
        pad(10)
    ));

    s
}

fn close_block(meta: &Meta) -> String {
    let mut s = String::new();
    s.push_str(&format!("{}</xs:sequence>\n", pad(8)));
    for a in &meta.asserts {
        s.push_str(&format!("{}<xs:assert test=\"{}\"/>\n", pad(8), a));
    }
    s.push_str(&format!("{}</xs:restriction>\n", pad(6)));
    s.push_str(&format!("{}</xs:complexContent>\n", pad(4)));
    s.push_str(&format!("{}</xs:complexType>\n\n", pad(2)));
    s
}

fn enum_restriction(values: &[String], base: &str, indent: usize) -> String {
    let mut s = String::new();
    s.push_str(&format!("{}<xs:simpleType>\n", pad(indent)));
    s.push_str(&format!("{}<xs:restriction base='{}'>\n", pad(indent + 2), base));
    for v in values {
        s.push_str(&format!(
            "{}<xs:enumeration value='{}'/>\n",
            pad(indent + 4),
            escape(v.trim())
        ));
    }
    s.push_str(&format!("{}</xs:restriction>\n", pad(indent + 2)));
    s.push_str(&format!("{}</xs:simpleType>\n", pad(indent)));
    s
}

fn annotated_enum_restriction(values: &[String], tips: &[String], indent: usize) -> String {
    let mut s = String::new();
    s.push_str(&format!("{}<xs:simpleType>\n", pad(indent)));
    s.push_str(&format!("{}<xs:restriction base='xs:string'>\n", pad(indent + 2)));
    for (v, tip) in values.iter().zip(tips.iter()) {
        s.push_str(&format!(
            "{}<xs:enumeration value='{}'>\n",
            pad(indent + 4),
            escape(v.trim())
        ));
        s.push_str(&format!("{}<xs:annotation>\n", pad(indent + 4)));
        s.push_str(&format!("{}<xs:appinfo>\n", pad(indent + 6)));
        s.push_str(&format!("{}{}\n", pad(indent + 8), escape(tip.trim())));
        s.push_str(&format!("{}</xs:appinfo>\n", pad(indent + 6)));
        s.push_str(&format!("{}</xs:annotation>\n", pad(indent + 4)));
        s.push_str(&format!("{}</xs:enumeration>\n", pad(indent + 4)));
    }
    s.push_str(&format!("{}</xs:restriction>\n", pad(indent + 2)));
    s.push_str(&format!("{}</xs:simpleType>\n", pad(indent)));
    s
}

fn magnitude_element(facets: &MagnitudeFacets) -> String {
    let mut s = String::new();
    if !facets.is_constrained() {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='1' name='magnitude' type='xs:decimal'/>\n",
            pad(10)
        ));
        return s;
    }
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='magnitude'>\n",
        pad(10)
    ));
    s.push_str(&format!("{}<xs:simpleType>\n", pad(12)));
    s.push_str(&format!("{}<xs:restriction base='xs:decimal'>\n", pad(14)));
    if let Some(v) = facets.min_inclusive {
        s.push_str(&format!("{}<xs:minInclusive value='{}'/>\n", pad(16), v));
    }
    if let Some(v) = facets.max_inclusive {
        s.push_str(&format!("{}<xs:maxInclusive value='{}'/>\n", pad(16), v));
    }
    if let Some(v) = facets.min_exclusive {
        s.push_str(&format!("{}<xs:minExclusive value='{}'/>\n", pad(16), v));
    }
    if let Some(v) = facets.max_exclusive {
        s.push_str(&format!("{}<xs:maxExclusive value='{}'/>\n", pad(16), v));
    }
    if let Some(v) = facets.total_digits.filter(|d| *d > 0) {
        s.push_str(&format!("{}<xs:totalDigits value='{}'/>\n", pad(16), v));
    }
    if let Some(v) = facets.fraction_digits {
        s.push_str(&format!("{}<xs:fractionDigits value='{}'/>\n", pad(16), v));
    }
    s.push_str(&format!("{}</xs:restriction>\n", pad(14)));
    s.push_str(&format!("{}</xs:simpleType>\n", pad(12)));
    s.push_str(&format!("{}</xs:element>\n", pad(10)));
    s
}

fn normal_status_element(normal_status: &Option<String>) -> String {
    let status = normal_status.as_deref().unwrap_or("");
    format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='normal-status' type='xs:string' default='{}'/>\n",
        pad(10),
        escape(status.trim())
    )
}

/// Element references for the reference ranges of an ordered component,
/// refusing two ranges that share one Interval.
fn reference_range_refs(
    registry: &ComponentRegistry,
    meta: &Meta,
    ranges: &[ComponentId],
) -> Result<String, PublicationError> {
    let mut s = String::new();
    if ranges.is_empty() {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:reference-ranges'/>\n",
            pad(10)
        ));
        return Ok(s);
    }
    let mut used_intervals: HashSet<ComponentId> = HashSet::new();
    for rr_id in ranges {
        let rr = published_child(registry, rr_id)?;
        let def = match &rr.body {
            Body::ReferenceRange(def) => def,
            _ => {
                return Err(PublicationError::WrongKind {
                    label: rr.meta.label.clone(),
                    expected: ComponentKind::ReferenceRange,
                })
            }
        };
        if !used_intervals.insert(def.interval) {
            return Err(PublicationError::DuplicateInterval {
                label: meta.label.clone(),
            });
        }
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- reference-ranges -->\n",
            pad(10),
            rr.meta.id
        ));
    }
    Ok(s)
}

fn units_ref_element(
    registry: &ComponentRegistry,
    units: &UnitsRef,
    slot: &str,
) -> Result<String, PublicationError> {
    let target = units_target(registry, units)?;
    Ok(format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' ref='cg:el-{}'/> <!-- {} -->\n",
        pad(10),
        target.meta.id,
        slot
    ))
}

// --- leaf kinds ---

fn boolean_schema(meta: &Meta, def: &BooleanDef) -> String {
    let mut s = open_block(meta, ComponentKind::Boolean);
    s.push_str(&format!("{}<xs:choice>\n", pad(10)));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='valid-true'>\n",
        pad(12)
    ));
    s.push_str(&enum_restriction(&def.trues, "xs:string", 14));
    s.push_str(&format!("{}</xs:element>\n", pad(12)));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='valid-false'>\n",
        pad(12)
    ));
    s.push_str(&enum_restriction(&def.falses, "xs:string", 14));
    s.push_str(&format!("{}</xs:element>\n", pad(12)));
    s.push_str(&format!("{}</xs:choice>\n", pad(10)));
    s.push_str(&close_block(meta));
    s
}

fn text_schema(meta: &Meta, def: &TextDef) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Text);

    if def.enums.is_empty() {
        match &def.default_value {
            Some(default) => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='1' name='value' type='xs:string' default='{}'/>\n",
                pad(10),
                escape(default.trim())
            )),
            None => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='1' name='value' type='xs:string'/>\n",
                pad(10)
            )),
        }
    } else {
        let tips = if def.enum_annotations.is_empty() {
            def.enums.clone()
        } else if def.enum_annotations.len() == def.enums.len() {
            def.enum_annotations.clone()
        } else {
            return Err(PublicationError::MismatchedLists {
                label: meta.label.clone(),
                detail: "the number of enumerations and annotations must be the same",
            });
        };
        match &def.default_value {
            Some(default) => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='1' name='value' default='{}'>\n",
                pad(10),
                escape(default.trim())
            )),
            None => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='1' name='value'>\n",
                pad(10)
            )),
        }
        s.push_str(&annotated_enum_restriction(&def.enums, &tips, 12));
        s.push_str(&format!("{}</xs:element>\n", pad(10)));
    }
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='language' type='xs:language'/>\n",
        pad(10)
    ));
    s.push_str(&close_block(meta));
    Ok(s)
}

fn coded_text_schema(meta: &Meta, def: &CodedTextDef) -> Result<String, PublicationError> {
    if def.codes.is_empty() {
        return Err(PublicationError::NoCodes {
            label: meta.label.clone(),
        });
    }

    let code_strings: Vec<String> = def.codes.iter().map(|c| c.code_string.clone()).collect();
    let codes: Vec<String> = def.codes.iter().map(|c| c.code.clone()).collect();
    let n = def.codes.len();
    let abbrevs = vec![def.terminology.abbrev.clone(); n];
    let names = vec![def.terminology.name.clone(); n];
    let versions = vec![def.terminology.version.clone(); n];

    let mut s = open_block(meta, ComponentKind::CodedText);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='value'>\n",
        pad(10)
    ));
    s.push_str(&enum_restriction(&code_strings, "xs:string", 12));
    s.push_str(&format!("{}</xs:element>\n", pad(10)));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='language' type='xs:language'/>\n",
        pad(10)
    ));

    for (slot, values) in [
        ("terminology-abbrev", &abbrevs),
        ("terminology-name", &names),
        ("terminology-version", &versions),
    ] {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='1' name='{}'>\n",
            pad(10),
            slot
        ));
        s.push_str(&enum_restriction(values, "xs:string", 12));
        s.push_str(&format!("{}</xs:element>\n", pad(10)));
    }

    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='terminology-code'>\n",
        pad(10)
    ));
    s.push_str(&annotated_enum_restriction(&codes, &code_strings, 12));
    s.push_str(&format!("{}</xs:element>\n", pad(10)));
    s.push_str(&close_block(meta));
    Ok(s)
}

fn link_schema(meta: &Meta, def: &LinkDef) -> String {
    let mut s = open_block(meta, ComponentKind::Link);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='link' type='xs:anyURI'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='relation' type='xs:string' fixed='{}'/>\n",
        pad(10),
        escape(def.relation.trim())
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='relation-uri' type='xs:anyURI' fixed='{}'/>\n",
        pad(10),
        escape(def.relation_uri.trim())
    ));
    s.push_str(&close_block(meta));
    s
}

fn identifier_schema(meta: &Meta, def: &IdentifierDef) -> Result<String, PublicationError> {
    if def.id_names.len() != def.issuers.len() || def.id_names.len() != def.assignors.len() {
        return Err(PublicationError::MismatchedLists {
            label: meta.label.clone(),
            detail: "the number of names, issuers and assignors must be exactly equal",
        });
    }

    let mut s = open_block(meta, ComponentKind::Identifier);

    if def.exact_length.is_some() || def.min_length.is_some() || def.max_length.is_some() {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' name='value'>\n",
            pad(10)
        ));
        s.push_str(&format!("{}<xs:simpleType>\n", pad(12)));
        s.push_str(&format!("{}<xs:restriction base='xs:string'>\n", pad(14)));
        if let Some(len) = def.exact_length {
            s.push_str(&format!("{}<xs:length value='{}'/>\n", pad(16), len));
        } else {
            if let Some(len) = def.min_length {
                s.push_str(&format!("{}<xs:minLength value='{}'/>\n", pad(16), len));
            }
            if let Some(len) = def.max_length {
                s.push_str(&format!("{}<xs:maxLength value='{}'/>\n", pad(16), len));
            }
        }
        s.push_str(&format!("{}</xs:restriction>\n", pad(14)));
        s.push_str(&format!("{}</xs:simpleType>\n", pad(12)));
        s.push_str(&format!("{}</xs:element>\n", pad(10)));
    } else {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' name='value' type='xs:string'/>\n",
            pad(10)
        ));
    }

    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='id-name'>\n",
        pad(10)
    ));
    s.push_str(&annotated_enum_restriction(&def.id_names, &def.id_names, 12));
    s.push_str(&format!("{}</xs:element>\n", pad(10)));

    for (slot, values) in [("issuer", &def.issuers), ("assignor", &def.assignors)] {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='1' name='{}'>\n",
            pad(10),
            slot
        ));
        s.push_str(&enum_restriction(values, "xs:string", 12));
        s.push_str(&format!("{}</xs:element>\n", pad(10)));
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn parsable_schema(meta: &Meta, def: &ParsableDef) -> String {
    let mut s = open_block(meta, ComponentKind::Parsable);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='size' type='xs:int'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='encoding' type='xs:string' default='{}'/>\n",
        pad(10),
        def.encoding.trim()
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='value' type='xs:string'/>\n",
        pad(10)
    ));
    if def.formalisms.is_empty() {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='1' name='formalism' type='xs:string'/>\n",
            pad(10)
        ));
    } else {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='1' name='formalism'>\n",
            pad(10)
        ));
        s.push_str(&enum_restriction(&def.formalisms, "xs:string", 12));
        s.push_str(&format!("{}</xs:element>\n", pad(10)));
    }
    s.push_str(&close_block(meta));
    s
}

fn media_schema(meta: &Meta, def: &MediaDef) -> String {
    let mut s = open_block(meta, ComponentKind::Media);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='size' type='xs:int'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='encoding' type='xs:string' default='{}'/>\n",
        pad(10),
        def.encoding.trim()
    ));
    for (slot, values) in [
        ("media-type", &def.mime_types),
        ("compression-type", &def.compression_types),
    ] {
        if values.is_empty() {
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' name='{}' type='xs:string'/>\n",
                pad(10),
                slot
            ));
        } else {
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' name='{}'>\n",
                pad(10),
                slot
            ));
            s.push_str(&enum_restriction(values, "xs:string", 12));
            s.push_str(&format!("{}</xs:element>\n", pad(10)));
        }
    }
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='hash-result' type='xs:string'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='hash-function' type='xs:string'/>\n",
        pad(10)
    ));
    if let Some(alt) = &def.alt_text {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' name='alt-txt' type='xs:string' fixed='{}'/>\n",
            pad(10),
            escape(alt.trim())
        ));
    }
    s.push_str(&format!("{}<xs:choice>\n", pad(10)));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='uri' type='xs:anyURI'/>\n",
        pad(12)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='media-content' type='xs:base64Binary'/>\n",
        pad(12)
    ));
    s.push_str(&format!("{}</xs:choice>\n", pad(10)));
    s.push_str(&close_block(meta));
    s
}

fn ordinal_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &OrdinalDef,
) -> Result<String, PublicationError> {
    if def.ordinals.len() != def.symbols.len() {
        return Err(PublicationError::MismatchedLists {
            label: meta.label.clone(),
            detail: "the number of ordinals and symbols must be the same",
        });
    }

    let mut s = open_block(meta, ComponentKind::Ordinal);
    s.push_str(&reference_range_refs(registry, meta, &def.reference_ranges)?);
    s.push_str(&normal_status_element(&def.normal_status));

    let ordinals: Vec<String> = def.ordinals.iter().map(|o| o.to_string()).collect();
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='ordinal'>\n",
        pad(10)
    ));
    s.push_str(&enum_restriction(&ordinals, "xs:decimal", 12));
    s.push_str(&format!("{}</xs:element>\n", pad(10)));

    let tips = if def.annotations.len() == def.symbols.len() {
        def.annotations.clone()
    } else {
        def.symbols.clone()
    };
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='symbol'>\n",
        pad(10)
    ));
    s.push_str(&annotated_enum_restriction(&def.symbols, &tips, 12));
    s.push_str(&format!("{}</xs:element>\n", pad(10)));
    s.push_str(&close_block(meta));
    Ok(s)
}

fn count_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &CountDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Count);
    s.push_str(&reference_range_refs(registry, meta, &def.reference_ranges)?);
    s.push_str(&normal_status_element(&def.normal_status));
    s.push_str(&magnitude_element(&def.facets));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:magnitude-status'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='error' type='xs:int' default='0'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='accuracy' type='xs:int' default='0'/>\n",
        pad(10)
    ));

    match &def.units {
        Some(units) => s.push_str(&units_ref_element(registry, units, "Count-units")?),
        None => {
            return Err(PublicationError::MissingUnits {
                kind: ComponentKind::Count,
                label: meta.label.clone(),
                slot: "units",
            })
        }
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn quantity_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &QuantityDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Quantity);
    s.push_str(&reference_range_refs(registry, meta, &def.reference_ranges)?);
    s.push_str(&normal_status_element(&def.normal_status));
    s.push_str(&magnitude_element(&def.facets));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:magnitude-status'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='error' type='xs:int' default='0'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='accuracy' type='xs:int' default='0'/>\n",
        pad(10)
    ));

    match &def.units {
        Some(units) => s.push_str(&units_ref_element(registry, units, "Quantity-units")?),
        None => {
            return Err(PublicationError::MissingUnits {
                kind: ComponentKind::Quantity,
                label: meta.label.clone(),
                slot: "units",
            })
        }
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn ratio_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &RatioDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Ratio);
    s.push_str(&reference_range_refs(registry, meta, &def.reference_ranges)?);
    s.push_str(&normal_status_element(&def.normal_status));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='ratio-type' type='xs:string' fixed='{}'/>\n",
        pad(10),
        def.ratio_type.name()
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='numerator' type='xs:decimal'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='denominator' type='xs:decimal'/>\n",
        pad(10)
    ));
    s.push_str(&magnitude_element(&def.numerator_facets));

    // The three units slots resolve independently; none is mandatory.
    for (slot, units) in [
        ("numerator-units", &def.numerator_units),
        ("denominator-units", &def.denominator_units),
        ("ratio-units", &def.ratio_units),
    ] {
        if let Some(units) = units {
            s.push_str(&units_ref_element(registry, units, slot)?);
        }
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn temporal_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &TemporalDef,
) -> Result<String, PublicationError> {
    if !(def.allow_date || def.allow_time || def.allow_datetime || def.allow_duration) {
        return Err(PublicationError::MissingSlot {
            label: meta.label.clone(),
            slot: "temporal representation",
        });
    }

    let mut s = open_block(meta, ComponentKind::Temporal);
    s.push_str(&reference_range_refs(registry, meta, &def.reference_ranges)?);
    s.push_str(&normal_status_element(&def.normal_status));
    s.push_str(&format!("{}<xs:choice maxOccurs='unbounded'>\n", pad(10)));
    for (allowed, name, xs_type) in [
        (def.allow_date, "temporal-date", "xs:date"),
        (def.allow_time, "temporal-time", "xs:time"),
        (def.allow_datetime, "temporal-datetime", "xs:dateTime"),
        (def.allow_duration, "temporal-duration", "xs:duration"),
    ] {
        if allowed {
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' name='{}' type='{}'/>\n",
                pad(12),
                name,
                xs_type
            ));
        }
    }
    s.push_str(&format!("{}</xs:choice>\n", pad(10)));
    s.push_str(&close_block(meta));
    Ok(s)
}

fn interval_schema(meta: &Meta, def: &IntervalDef) -> String {
    let xs_type = def.interval_type.xs_name();
    let mut s = open_block(meta, ComponentKind::Interval);
    for (slot, value) in [("lower", &def.lower), ("upper", &def.upper)] {
        match value {
            Some(v) => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' name='{}' type='{}' fixed='{}'/>\n",
                pad(10),
                slot,
                xs_type,
                escape(v.trim())
            )),
            None => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' name='{}' type='{}'/>\n",
                pad(10),
                slot,
                xs_type
            )),
        }
    }
    for (slot, value) in [
        ("lower-included", def.lower_included),
        ("upper-included", def.upper_included),
        ("lower-bounded", def.lower_bounded),
        ("upper-bounded", def.upper_bounded),
    ] {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='1' name='{}' type='xs:boolean' fixed='{}'/>\n",
            pad(10),
            slot,
            value
        ));
    }
    s.push_str(&close_block(meta));
    s
}

fn reference_range_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &ReferenceRangeDef,
) -> Result<String, PublicationError> {
    let interval = published_child(registry, &def.interval)?;
    if interval.kind() != ComponentKind::Interval {
        return Err(PublicationError::WrongKind {
            label: interval.meta.label.clone(),
            expected: ComponentKind::Interval,
        });
    }

    let mut s = open_block(meta, ComponentKind::ReferenceRange);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='definition' type='xs:string' fixed='{}'/>\n",
        pad(10),
        escape(def.definition.trim())
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' ref='cg:el-{}'/> <!-- data-range -->\n",
        pad(10),
        interval.meta.id
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='is-normal' type='xs:boolean' fixed='{}'/>\n",
        pad(10),
        def.is_normal
    ));
    s.push_str(&close_block(meta));
    Ok(s)
}

// --- structural and auxiliary kinds ---

fn cluster_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &ClusterDef,
) -> Result<String, PublicationError> {
    if def.is_empty() {
        return Err(PublicationError::EmptyCluster {
            label: meta.label.clone(),
        });
    }

    let mut s = open_block(meta, ComponentKind::Cluster);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='cluster-subject' type='xs:string' fixed=\"{}\"/>\n",
        pad(10),
        escape(meta.label.trim())
    ));

    for member in &def.clusters {
        if member.target == meta.id {
            return Err(PublicationError::SelfContained {
                label: meta.label.clone(),
            });
        }
        let nested = published_child(registry, &member.target)?;
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- Cluster: {} -->\n",
            pad(10),
            nested.meta.id,
            escape(&member.role)
        ));
    }

    // Leaf members are referenced through their adapter elements so a shared
    // component keeps one defining block across every position.
    for (kind, members) in def.leaf_sections() {
        for member in members {
            let leaf = published_child(registry, &member.target)?;
            if leaf.kind() != kind {
                return Err(PublicationError::WrongKind {
                    label: leaf.meta.label.clone(),
                    expected: kind,
                });
            }
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- {} {} -->\n",
                pad(10),
                leaf.meta.adapter_id,
                kind.name(),
                escape(&member.role)
            ));
        }
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn party_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &PartyDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Party);
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='party-name' type='xs:string'/>\n",
        pad(10)
    ));
    for link_id in &def.external_refs {
        let link = published_child(registry, link_id)?;
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- external-ref -->\n",
            pad(10),
            link.meta.id
        ));
    }
    if let Some(details) = &def.details {
        let cluster = published_child(registry, details)?;
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- details -->\n",
            pad(10),
            cluster.meta.id
        ));
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn audit_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &AuditDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Audit);
    for (slot, child_id) in [
        ("system-id", &def.system_id),
        ("system-user", &def.system_user),
        ("location", &def.location),
    ] {
        match child_id {
            Some(child_id) => {
                let child = published_child(registry, child_id)?;
                s.push_str(&format!(
                    "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- {} -->\n",
                    pad(10),
                    child.meta.id,
                    slot
                ));
            }
            None => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:{}'/>\n",
                pad(10),
                slot
            )),
        }
    }
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='timestamp' type='xs:dateTime'/>\n",
        pad(10)
    ));
    s.push_str(&close_block(meta));
    Ok(s)
}

fn attestation_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &AttestationDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Attestation);
    for (slot, child_id) in [
        ("attested-view", &def.view),
        ("proof", &def.proof),
        ("reason", &def.reason),
        ("committer", &def.committer),
    ] {
        if let Some(child_id) = child_id {
            let child = published_child(registry, child_id)?;
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- {} -->\n",
                pad(10),
                child.meta.id,
                slot
            ));
        }
    }
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='time-committed' type='xs:dateTime'/>\n",
        pad(10)
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='is-pending' type='xs:boolean'/>\n",
        pad(10)
    ));
    s.push_str(&close_block(meta));
    Ok(s)
}

fn participation_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &ParticipationDef,
) -> Result<String, PublicationError> {
    let mut s = open_block(meta, ComponentKind::Participation);
    for (slot, child_id) in [
        ("performer", &def.performer),
        ("function", &def.function),
        ("mode", &def.mode),
    ] {
        if let Some(child_id) = child_id {
            let child = published_child(registry, child_id)?;
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- {} -->\n",
                pad(10),
                child.meta.id,
                slot
            ));
        }
    }
    s.push_str(&close_block(meta));
    Ok(s)
}

fn definition_schema(
    registry: &ComponentRegistry,
    meta: &Meta,
    def: &DefinitionDef,
) -> Result<String, PublicationError> {
    let subject = def.subject.ok_or(PublicationError::MissingSlot {
        label: meta.label.clone(),
        slot: "subject",
    })?;
    let provider = def.provider.ok_or(PublicationError::MissingSlot {
        label: meta.label.clone(),
        slot: "provider",
    })?;

    let mut s = open_block(meta, ComponentKind::Definition);

    if def.links.is_empty() {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='unbounded' minOccurs='0' ref='cg:links'/>\n",
            pad(10)
        ));
    } else {
        for link_id in &def.links {
            let link = published_child(registry, link_id)?;
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- links -->\n",
                pad(10),
                link.meta.id
            ));
        }
    }

    match &def.audit {
        Some(audit_id) => {
            let audit = published_child(registry, audit_id)?;
            s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- audit -->\n",
                pad(10),
                audit.meta.id
            ));
        }
        None => s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:audit'/>\n",
            pad(10)
        )),
    }

    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='language' type='xs:language' fixed='{}'/>\n",
        pad(10),
        def.language.trim()
    ));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' name='encoding' type='xs:string' fixed='{}'/>\n",
        pad(10),
        def.encoding.trim()
    ));

    let subject = published_child(registry, &subject)?;
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- subject -->\n",
        pad(10),
        subject.meta.id
    ));
    let provider = published_child(registry, &provider)?;
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- provider -->\n",
        pad(10),
        provider.meta.id
    ));

    if def.participations.is_empty() {
        s.push_str(&format!(
            "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:participations'/>\n",
            pad(10)
        ));
    } else {
        for participation_id in &def.participations {
            let participation = published_child(registry, participation_id)?;
            s.push_str(&format!(
                "{}<xs:element maxOccurs='unbounded' minOccurs='0' ref='cg:el-{}'/> <!-- participations -->\n",
                pad(10),
                participation.meta.id
            ));
        }
    }

    for (slot, child_id) in [
        ("protocol-id", &def.protocol),
        ("workflow-id", &def.workflow),
        ("attestation", &def.attestation),
    ] {
        match child_id {
            Some(child_id) => {
                let child = published_child(registry, child_id)?;
                s.push_str(&format!(
                    "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:el-{}'/> <!-- {} -->\n",
                    pad(10),
                    child.meta.id,
                    slot
                ));
            }
            None => s.push_str(&format!(
                "{}<xs:element maxOccurs='1' minOccurs='0' ref='cg:{}'/>\n",
                pad(10),
                slot
            )),
        }
    }

    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='0' name='current-state' type='xs:string' default='{}'/>\n",
        pad(10),
        escape(def.state.trim())
    ));

    let data = published_child(registry, &def.data)?;
    if data.kind() != ComponentKind::Cluster {
        return Err(PublicationError::WrongKind {
            label: data.meta.label.clone(),
            expected: ComponentKind::Cluster,
        });
    }
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' ref='cg:el-{}'/> <!-- data -->\n",
        pad(10),
        data.meta.id
    ));

    s.push_str(&close_block(meta));
    Ok(s)
}

// --- Concept front-matter ---

fn synthesize_concept(
    registry: &ComponentRegistry,
    concept: &Concept,
) -> Result<(Fragments, String), PublicationError> {
    let root = concept.root.ok_or(PublicationError::MissingSlot {
        label: concept.metadata.title.clone(),
        slot: "root definition",
    })?;

    let definition = published_child(registry, &root.definition())?;
    if definition.kind() != ComponentKind::Definition {
        return Err(PublicationError::WrongKind {
            label: definition.meta.label.clone(),
            expected: ComponentKind::Definition,
        });
    }

    let md = &concept.metadata;
    let mut s = String::new();
    let mut doc = String::new();

    s.push_str("<?xml version='1.0' encoding='UTF-8'?>\n");
    s.push_str("<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'\n");
    s.push_str(&format!("{}xmlns:rdf='http://www.w3.org/1999/02/22-rdf-syntax-ns#'\n", pad(2)));
    s.push_str(&format!("{}xmlns:rdfs='http://www.w3.org/2000/01/rdf-schema#'\n", pad(2)));
    s.push_str(&format!("{}xmlns:dc='http://purl.org/dc/elements/1.1/'\n", pad(2)));
    s.push_str(&format!("{}xmlns:vc='http://www.w3.org/2007/XMLSchema-versioning'\n", pad(2)));
    s.push_str(&format!("{}xmlns:cg='{}'\n", pad(2), CG_NAMESPACE));
    s.push_str(&format!("{}targetNamespace='{}'\n", pad(2), CG_NAMESPACE));
    s.push_str(&format!("{}vc:minVersion='1.1'\n", pad(2)));
    s.push_str(&format!("{}xml:lang='{}'>\n\n", pad(2), md.language));

    s.push_str(&format!("{}<!-- Include the Reference Model -->\n", pad(2)));
    s.push_str(&format!(
        "{}<xs:include schemaLocation='cg-rm-{}.xsd'/>\n\n",
        pad(2),
        concept.rm_version.replace('.', "")
    ));

    doc.push_str("<div class='concept-metadata'>\n");
    doc.push_str(&format!("<h2>{}</h2>\n", escape(md.title.trim())));

    s.push_str(&format!("{}<!-- METADATA Section -->\n", pad(2)));
    s.push_str(&format!("{}<xs:annotation>\n", pad(2)));
    s.push_str(&format!("{}<xs:appinfo>\n", pad(4)));
    s.push_str(&format!("{}<rdf:RDF>\n", pad(4)));
    s.push_str(&format!(
        "{}<rdf:Description rdf:about='{}-{}.xsd'>\n",
        pad(4),
        crate::hashing::ARTIFACT_PREFIX,
        concept.id
    ));
    s.push_str(&format!("{}<dc:title>{}</dc:title>\n", pad(6), escape(md.title.trim())));
    s.push_str(&format!(
        "{}<dc:creator>{} {}</dc:creator>\n",
        pad(6),
        escape(md.creator_name.trim()),
        escape(md.creator_email.trim())
    ));
    doc.push_str(&format!(
        "<b>Created By:</b> {} {}<br/>\n",
        escape(md.creator_name.trim()),
        escape(md.creator_email.trim())
    ));
    if md.contributors.is_empty() {
        s.push_str(&format!("{}<dc:contributor>None</dc:contributor>\n", pad(6)));
        doc.push_str("<b>Contributors:</b> None<br/>\n");
    } else {
        for contributor in &md.contributors {
            s.push_str(&format!(
                "{}<dc:contributor>{}</dc:contributor>\n",
                pad(6),
                escape(contributor.trim())
            ));
            doc.push_str(&format!("<b>Contributor:</b> {}<br/>\n", escape(contributor.trim())));
        }
    }
    s.push_str(&format!("{}<dc:subject>{}</dc:subject>\n", pad(6), escape(md.subject.trim())));
    s.push_str(&format!("{}<dc:source>{}</dc:source>\n", pad(6), escape(md.source.trim())));
    s.push_str(&format!("{}<dc:rights>{}</dc:rights>\n", pad(6), escape(md.rights.trim())));
    s.push_str(&format!("{}<dc:relation>{}</dc:relation>\n", pad(6), escape(md.relation.trim())));
    s.push_str(&format!("{}<dc:coverage>{}</dc:coverage>\n", pad(6), escape(md.coverage.trim())));
    s.push_str(&format!("{}<dc:type>Concept Schema Definition</dc:type>\n", pad(6)));
    s.push_str(&format!(
        "{}<dc:identifier>{}-{}</dc:identifier>\n",
        pad(6),
        crate::hashing::ARTIFACT_PREFIX,
        concept.id
    ));
    s.push_str(&format!(
        "{}<dc:description>{}</dc:description>\n",
        pad(6),
        escape(concept.description.trim())
    ));
    s.push_str(&format!("{}<dc:publisher>{}</dc:publisher>\n", pad(6), escape(md.publisher.trim())));
    s.push_str(&format!("{}<dc:date>{}</dc:date>\n", pad(6), md.pub_date.to_rfc3339()));
    s.push_str(&format!("{}<dc:format>text/xml</dc:format>\n", pad(6)));
    s.push_str(&format!("{}<dc:language>{}</dc:language>\n", pad(6), md.language));
    s.push_str(&format!("{}</rdf:Description>\n", pad(4)));
    s.push_str(&format!(
        "{}<rdf:Description rdf:about='{}:ct-{}'>\n",
        pad(4),
        CG_NAMESPACE,
        concept.id
    ));
    s.push_str(&format!("{}<rdfs:subClassOf rdf:resource='cg:ConceptType'/>\n", pad(6)));
    s.push_str(&format!("{}<rdfs:label>{}</rdfs:label>\n", pad(6), escape(md.title.trim())));
    s.push_str(&format!("{}</rdf:Description>\n", pad(4)));
    s.push_str(&format!("{}</rdf:RDF>\n", pad(4)));
    s.push_str(&format!("{}</xs:appinfo>\n", pad(4)));
    s.push_str(&format!("{}</xs:annotation>\n\n", pad(2)));

    doc.push_str(&format!("<b>Rights:</b> {}<br/>\n", escape(md.rights.trim())));
    doc.push_str(&format!("<b>Publication Date:</b> {}<br/>\n", md.pub_date.to_rfc3339()));
    doc.push_str(&format!("<b>Language:</b> {}<br/>\n", md.language));
    doc.push_str(&format!("<b>Reference Model Version:</b> {}<br/>\n", concept.rm_version));
    doc.push_str(&format!(
        "<b>Description:</b> {}<br/>\n",
        escape(concept.description.trim())
    ));
    doc.push_str(&format!("<b>Root Kind:</b> {}<br/>\n", root.name()));
    doc.push_str("</div>\n");

    s.push_str(&format!("{}<!-- Concept Root Element -->\n", pad(2)));
    s.push_str(&format!(
        "{}<xs:element name='{}-{}' type='cg:ct-{}'/>\n",
        pad(2),
        crate::hashing::ARTIFACT_PREFIX,
        concept.id,
        concept.id
    ));
    s.push_str(&format!(
        "{}<xs:complexType name='ct-{}'> <!-- {} -->\n",
        pad(2),
        concept.id,
        escape(md.title.trim())
    ));
    s.push_str(&format!("{}<xs:complexContent>\n", pad(4)));
    s.push_str(&format!("{}<xs:restriction base='cg:ConceptType'>\n", pad(6)));
    s.push_str(&format!("{}<xs:sequence>\n", pad(8)));
    s.push_str(&format!(
        "{}<xs:element maxOccurs='1' minOccurs='1' ref='cg:el-{}'/> <!-- definition -->\n",
        pad(10),
        definition.meta.id
    ));
    s.push_str(&format!("{}</xs:sequence>\n", pad(8)));
    for a in &concept.asserts {
        s.push_str(&format!("{}<xs:assert test=\"{}\"/>\n", pad(8), a));
    }
    s.push_str(&format!("{}</xs:restriction>\n", pad(6)));
    s.push_str(&format!("{}</xs:complexContent>\n", pad(4)));
    s.push_str(&format!("{}</xs:complexType>\n\n", pad(2)));
    s.push_str(&format!("{}<!-- Concept Components Begin Below -->\n", pad(2)));

    let fragments = Fragments {
        schema: s,
        aux: auxgen::concept_report_fragment(concept),
        read: String::new(),
        write: String::new(),
    };
    Ok((fragments, doc))
}
