//! Modeling Component Data Model
//!
//! Every component carries two immutable identities: the type identity used
//! for its defining schema block and the adapter identity used when the
//! component is wrapped for inclusion inside a Cluster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ComponentId = Uuid;

/// Coarse severity attached to engine errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// The four generated text fragments of a component.
///
/// All four are empty until `publish()` succeeds; `unpublish()` clears them
/// again. The schema fragment gates the `published` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fragments {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub aux: String,
    #[serde(default)]
    pub read: String,
    #[serde(default)]
    pub write: String,
}

impl Fragments {
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty() && self.aux.is_empty() && self.read.is_empty() && self.write.is_empty()
    }

    pub fn clear(&mut self) {
        self.schema.clear();
        self.aux.clear();
        self.read.clear();
        self.write.clear();
    }

    /// Minimum well-formedness gate for the schema fragment: it must hold a
    /// complete complexType block. The result of this check is persisted as
    /// the `published` flag at publication time, never re-derived from
    /// fragment length downstream.
    pub fn schema_well_formed(&self) -> bool {
        !self.schema.is_empty()
            && self.schema.contains("<xs:complexType")
            && self.schema.contains("</xs:complexType>")
    }
}

/// A semantic predicate/object link rendered into the appinfo block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemLink {
    pub predicate: String,
    pub object_uri: String,
}

/// Fields shared by every component kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub id: ComponentId,
    pub adapter_id: ComponentId,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub links: Vec<SemLink>,
    #[serde(default)]
    pub asserts: Vec<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub fragments: Fragments,
    pub created: DateTime<Utc>,
}

fn default_lang() -> String {
    "en-US".to_string()
}

impl Meta {
    pub fn new(label: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            adapter_id: Uuid::new_v4(),
            label: label.to_string(),
            description: String::new(),
            lang: default_lang(),
            links: Vec::new(),
            asserts: Vec::new(),
            published: false,
            fragments: Fragments::default(),
            created: Utc::now(),
        }
    }
}

/// Either/or choice between a simple (Text) and a coded (CodedText) units
/// reference. The sum type makes "both populated" unrepresentable; an empty
/// slot is an `Option<UnitsRef>` and is diagnosed by the publisher and the
/// generator where the slot is mandatory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitsRef {
    Simple(ComponentId),
    Coded(ComponentId),
}

impl UnitsRef {
    pub fn target(&self) -> ComponentId {
        match self {
            UnitsRef::Simple(id) | UnitsRef::Coded(id) => *id,
        }
    }
}

/// One structural position inside a Cluster: the role name under which the
/// target component is reached. The same target may appear under several
/// roles, in the same Cluster or in different ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRef {
    pub role: String,
    pub target: ComponentId,
}

impl MemberRef {
    pub fn new(role: &str, target: ComponentId) -> Self {
        Self { role: role.to_string(), target }
    }
}

// --- Leaf datatype kinds ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BooleanDef {
    pub trues: Vec<String>,
    pub falses: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextDef {
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub enums: Vec<String>,
    /// One annotation per enumeration; empty means the enumerations
    /// themselves are used as annotations.
    #[serde(default)]
    pub enum_annotations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terminology {
    pub name: String,
    pub abbrev: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Code {
    pub code: String,
    pub code_string: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodedTextDef {
    pub terminology: Terminology,
    pub codes: Vec<Code>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDef {
    pub relation: String,
    #[serde(default)]
    pub relation_uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifierDef {
    pub id_names: Vec<String>,
    pub issuers: Vec<String>,
    pub assignors: Vec<String>,
    #[serde(default)]
    pub exact_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsableDef {
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub formalisms: Vec<String>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDef {
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub mime_types: Vec<String>,
    #[serde(default)]
    pub compression_types: Vec<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// Value space of an Interval, mapped onto the schema primitive types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    Int,
    Decimal,
    Date,
    Time,
    DateTime,
    Duration,
}

impl IntervalType {
    pub fn xs_name(&self) -> &'static str {
        match self {
            IntervalType::Int => "xs:int",
            IntervalType::Decimal => "xs:decimal",
            IntervalType::Date => "xs:date",
            IntervalType::Time => "xs:time",
            IntervalType::DateTime => "xs:dateTime",
            IntervalType::Duration => "xs:duration",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalDef {
    pub interval_type: IntervalType,
    #[serde(default)]
    pub lower: Option<String>,
    #[serde(default)]
    pub upper: Option<String>,
    pub lower_included: bool,
    pub upper_included: bool,
    pub lower_bounded: bool,
    pub upper_bounded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRangeDef {
    pub definition: String,
    /// Exactly one Interval supplies the data-range.
    pub interval: ComponentId,
    #[serde(default)]
    pub is_normal: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdinalDef {
    pub ordinals: Vec<i64>,
    pub symbols: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub normal_status: Option<String>,
    #[serde(default)]
    pub reference_ranges: Vec<ComponentId>,
}

/// Optional facets constraining a magnitude element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagnitudeFacets {
    #[serde(default)]
    pub min_inclusive: Option<f64>,
    #[serde(default)]
    pub max_inclusive: Option<f64>,
    #[serde(default)]
    pub min_exclusive: Option<f64>,
    #[serde(default)]
    pub max_exclusive: Option<f64>,
    #[serde(default)]
    pub total_digits: Option<u32>,
    #[serde(default)]
    pub fraction_digits: Option<u32>,
}

impl MagnitudeFacets {
    pub fn is_constrained(&self) -> bool {
        self.min_inclusive.is_some()
            || self.max_inclusive.is_some()
            || self.min_exclusive.is_some()
            || self.max_exclusive.is_some()
            || self.total_digits.map_or(false, |d| d > 0)
            || self.fraction_digits.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountDef {
    /// Mandatory at composition time: exactly one of simple/coded.
    #[serde(default)]
    pub units: Option<UnitsRef>,
    #[serde(default)]
    pub facets: MagnitudeFacets,
    #[serde(default)]
    pub normal_status: Option<String>,
    #[serde(default)]
    pub reference_ranges: Vec<ComponentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuantityDef {
    #[serde(default)]
    pub units: Option<UnitsRef>,
    #[serde(default)]
    pub facets: MagnitudeFacets,
    #[serde(default)]
    pub normal_status: Option<String>,
    #[serde(default)]
    pub reference_ranges: Vec<ComponentId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RatioType {
    Ratio,
    Proportion,
    Rate,
}

impl RatioType {
    pub fn name(&self) -> &'static str {
        match self {
            RatioType::Ratio => "ratio",
            RatioType::Proportion => "proportion",
            RatioType::Rate => "rate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioDef {
    pub ratio_type: RatioType,
    /// The three units slots are resolved independently; none is mandatory.
    #[serde(default)]
    pub numerator_units: Option<UnitsRef>,
    #[serde(default)]
    pub denominator_units: Option<UnitsRef>,
    #[serde(default)]
    pub ratio_units: Option<UnitsRef>,
    #[serde(default)]
    pub numerator_facets: MagnitudeFacets,
    #[serde(default)]
    pub denominator_facets: MagnitudeFacets,
    #[serde(default)]
    pub normal_status: Option<String>,
    #[serde(default)]
    pub reference_ranges: Vec<ComponentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalDef {
    #[serde(default)]
    pub allow_date: bool,
    #[serde(default)]
    pub allow_time: bool,
    #[serde(default)]
    pub allow_datetime: bool,
    #[serde(default)]
    pub allow_duration: bool,
    #[serde(default)]
    pub normal_status: Option<String>,
    #[serde(default)]
    pub reference_ranges: Vec<ComponentId>,
}

// --- Structural and auxiliary kinds ---

/// Ordered, typed multi-collection of role-named member references.
/// Nested Clusters come first in the traversal, then one collection per
/// leaf kind in a fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterDef {
    #[serde(default)]
    pub clusters: Vec<MemberRef>,
    #[serde(default)]
    pub booleans: Vec<MemberRef>,
    #[serde(default)]
    pub links: Vec<MemberRef>,
    #[serde(default)]
    pub texts: Vec<MemberRef>,
    #[serde(default)]
    pub coded_texts: Vec<MemberRef>,
    #[serde(default)]
    pub identifiers: Vec<MemberRef>,
    #[serde(default)]
    pub parsables: Vec<MemberRef>,
    #[serde(default)]
    pub media: Vec<MemberRef>,
    #[serde(default)]
    pub ordinals: Vec<MemberRef>,
    #[serde(default)]
    pub counts: Vec<MemberRef>,
    #[serde(default)]
    pub quantities: Vec<MemberRef>,
    #[serde(default)]
    pub ratios: Vec<MemberRef>,
    #[serde(default)]
    pub temporals: Vec<MemberRef>,
}

impl ClusterDef {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.leaf_sections().iter().all(|(_, refs)| refs.is_empty())
    }

    /// The leaf collections in their fixed traversal order.
    pub fn leaf_sections(&self) -> [(ComponentKind, &[MemberRef]); 12] {
        [
            (ComponentKind::Boolean, self.booleans.as_slice()),
            (ComponentKind::Link, self.links.as_slice()),
            (ComponentKind::Text, self.texts.as_slice()),
            (ComponentKind::CodedText, self.coded_texts.as_slice()),
            (ComponentKind::Identifier, self.identifiers.as_slice()),
            (ComponentKind::Parsable, self.parsables.as_slice()),
            (ComponentKind::Media, self.media.as_slice()),
            (ComponentKind::Ordinal, self.ordinals.as_slice()),
            (ComponentKind::Count, self.counts.as_slice()),
            (ComponentKind::Quantity, self.quantities.as_slice()),
            (ComponentKind::Ratio, self.ratios.as_slice()),
            (ComponentKind::Temporal, self.temporals.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyDef {
    /// Link components identifying the party externally.
    #[serde(default)]
    pub external_refs: Vec<ComponentId>,
    /// Optional details Cluster.
    #[serde(default)]
    pub details: Option<ComponentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditDef {
    /// Text component naming the originating system.
    #[serde(default)]
    pub system_id: Option<ComponentId>,
    /// Party component for the acting user.
    #[serde(default)]
    pub system_user: Option<ComponentId>,
    /// Cluster describing the location.
    #[serde(default)]
    pub location: Option<ComponentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttestationDef {
    /// Media component holding the attested view.
    #[serde(default)]
    pub view: Option<ComponentId>,
    /// Parsable component holding the proof.
    #[serde(default)]
    pub proof: Option<ComponentId>,
    /// Text component holding the reason.
    #[serde(default)]
    pub reason: Option<ComponentId>,
    /// Party component for the committer.
    #[serde(default)]
    pub committer: Option<ComponentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipationDef {
    #[serde(default)]
    pub performer: Option<ComponentId>,
    #[serde(default)]
    pub function: Option<ComponentId>,
    #[serde(default)]
    pub mode: Option<ComponentId>,
}

/// The top-level structural definition a Concept points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionDef {
    #[serde(default = "default_lang")]
    pub language: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub links: Vec<ComponentId>,
    #[serde(default)]
    pub audit: Option<ComponentId>,
    #[serde(default)]
    pub subject: Option<ComponentId>,
    #[serde(default)]
    pub provider: Option<ComponentId>,
    #[serde(default)]
    pub participations: Vec<ComponentId>,
    #[serde(default)]
    pub protocol: Option<ComponentId>,
    #[serde(default)]
    pub workflow: Option<ComponentId>,
    #[serde(default)]
    pub attestation: Option<ComponentId>,
    /// The data Cluster; the structural root of the traversal.
    pub data: ComponentId,
}

fn default_state() -> String {
    "default".to_string()
}

/// Kind-specific payload of a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Boolean(BooleanDef),
    Text(TextDef),
    CodedText(CodedTextDef),
    Link(LinkDef),
    Identifier(IdentifierDef),
    Parsable(ParsableDef),
    Media(MediaDef),
    Ordinal(OrdinalDef),
    Count(CountDef),
    Quantity(QuantityDef),
    Ratio(RatioDef),
    Temporal(TemporalDef),
    Interval(IntervalDef),
    ReferenceRange(ReferenceRangeDef),
    Cluster(ClusterDef),
    Party(PartyDef),
    Audit(AuditDef),
    Attestation(AttestationDef),
    Participation(ParticipationDef),
    Definition(DefinitionDef),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Boolean,
    Text,
    CodedText,
    Link,
    Identifier,
    Parsable,
    Media,
    Ordinal,
    Count,
    Quantity,
    Ratio,
    Temporal,
    Interval,
    ReferenceRange,
    Cluster,
    Party,
    Audit,
    Attestation,
    Participation,
    Definition,
}

impl ComponentKind {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Boolean => "Boolean",
            ComponentKind::Text => "Text",
            ComponentKind::CodedText => "CodedText",
            ComponentKind::Link => "Link",
            ComponentKind::Identifier => "Identifier",
            ComponentKind::Parsable => "Parsable",
            ComponentKind::Media => "Media",
            ComponentKind::Ordinal => "Ordinal",
            ComponentKind::Count => "Count",
            ComponentKind::Quantity => "Quantity",
            ComponentKind::Ratio => "Ratio",
            ComponentKind::Temporal => "Temporal",
            ComponentKind::Interval => "Interval",
            ComponentKind::ReferenceRange => "ReferenceRange",
            ComponentKind::Cluster => "Cluster",
            ComponentKind::Party => "Party",
            ComponentKind::Audit => "Audit",
            ComponentKind::Attestation => "Attestation",
            ComponentKind::Participation => "Participation",
            ComponentKind::Definition => "Definition",
        }
    }

    /// The reference-model base type restricted by a published fragment.
    pub fn base_type(&self) -> String {
        format!("{}Type", self.name())
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed modeling component: shared metadata plus a kind-specific body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub meta: Meta,
    pub body: Body,
}

impl Component {
    pub fn new(label: &str, body: Body) -> Self {
        Self { meta: Meta::new(label), body }
    }

    pub fn kind(&self) -> ComponentKind {
        match &self.body {
            Body::Boolean(_) => ComponentKind::Boolean,
            Body::Text(_) => ComponentKind::Text,
            Body::CodedText(_) => ComponentKind::CodedText,
            Body::Link(_) => ComponentKind::Link,
            Body::Identifier(_) => ComponentKind::Identifier,
            Body::Parsable(_) => ComponentKind::Parsable,
            Body::Media(_) => ComponentKind::Media,
            Body::Ordinal(_) => ComponentKind::Ordinal,
            Body::Count(_) => ComponentKind::Count,
            Body::Quantity(_) => ComponentKind::Quantity,
            Body::Ratio(_) => ComponentKind::Ratio,
            Body::Temporal(_) => ComponentKind::Temporal,
            Body::Interval(_) => ComponentKind::Interval,
            Body::ReferenceRange(_) => ComponentKind::ReferenceRange,
            Body::Cluster(_) => ComponentKind::Cluster,
            Body::Party(_) => ComponentKind::Party,
            Body::Audit(_) => ComponentKind::Audit,
            Body::Attestation(_) => ComponentKind::Attestation,
            Body::Participation(_) => ComponentKind::Participation,
            Body::Definition(_) => ComponentKind::Definition,
        }
    }

    /// Published with a well-formed schema fragment; the condition every
    /// reachable component must satisfy during composition.
    pub fn is_published(&self) -> bool {
        self.meta.published && self.meta.fragments.schema_well_formed()
    }
}

// --- Concept (root) ---

/// Document metadata carried by a Concept and rendered into the schema
/// front-matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMetadata {
    pub title: String,
    pub creator_name: String,
    #[serde(default)]
    pub creator_email: String,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub rights: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub coverage: String,
    #[serde(default)]
    pub publisher: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default = "default_lang")]
    pub language: String,
}

impl DocMetadata {
    pub fn new(title: &str, creator_name: &str) -> Self {
        Self {
            title: title.to_string(),
            creator_name: creator_name.to_string(),
            creator_email: String::new(),
            contributors: Vec::new(),
            subject: String::new(),
            source: String::new(),
            rights: String::new(),
            relation: String::new(),
            coverage: String::new(),
            publisher: String::new(),
            pub_date: Utc::now(),
            language: default_lang(),
        }
    }
}

/// The mutually-exclusive root kinds, expressed as a sum type rather than
/// three optional slots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    Admin(ComponentId),
    Care(ComponentId),
    Demographic(ComponentId),
}

impl RootKind {
    /// Identity of the Definition component this root points at.
    pub fn definition(&self) -> ComponentId {
        match self {
            RootKind::Admin(id) | RootKind::Care(id) | RootKind::Demographic(id) => *id,
        }
    }

    /// Build from the three legacy optional slots, preserving their
    /// admin > care > demographic priority. Returns None when all slots
    /// are empty.
    pub fn from_slots(
        admin: Option<ComponentId>,
        care: Option<ComponentId>,
        demographic: Option<ComponentId>,
    ) -> Option<Self> {
        admin
            .map(RootKind::Admin)
            .or(care.map(RootKind::Care))
            .or(demographic.map(RootKind::Demographic))
    }

    pub fn name(&self) -> &'static str {
        match self {
            RootKind::Admin(_) => "admin",
            RootKind::Care(_) => "care",
            RootKind::Demographic(_) => "demographic",
        }
    }
}

/// The root component representing one complete schema-generation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub id: ComponentId,
    pub metadata: DocMetadata,
    /// Reference model release this Concept constrains; gated with semver
    /// against the engine's supported release.
    pub rm_version: String,
    pub root: Option<RootKind>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub asserts: Vec<String>,
    #[serde(default)]
    pub published: bool,
    /// Single-shot latch: composition may run once per publication cycle.
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub fragments: Fragments,
    /// Metadata block rendered at the top of the documentation buffer.
    #[serde(default)]
    pub doc_fragment: String,
}

impl Concept {
    pub fn new(metadata: DocMetadata, rm_version: &str, root: Option<RootKind>) -> Self {
        Self {
            id: Uuid::new_v4(),
            metadata,
            rm_version: rm_version.to_string(),
            root,
            description: String::new(),
            asserts: Vec::new(),
            published: false,
            generated: false,
            fragments: Fragments::default(),
            doc_fragment: String::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.published && self.fragments.schema_well_formed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_kind_priority_follows_slot_order() {
        let a = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();

        assert_eq!(RootKind::from_slots(Some(a), Some(c), Some(d)), Some(RootKind::Admin(a)));
        assert_eq!(RootKind::from_slots(None, Some(c), Some(d)), Some(RootKind::Care(c)));
        assert_eq!(RootKind::from_slots(None, None, Some(d)), Some(RootKind::Demographic(d)));
        assert_eq!(RootKind::from_slots(None, None, None), None);
    }

    #[test]
    fn fragments_well_formedness_gate() {
        let mut f = Fragments::default();
        assert!(!f.schema_well_formed());

        f.schema = "<xs:complexType name='ct-x'>...</xs:complexType>".to_string();
        assert!(f.schema_well_formed());

        f.schema = "truncated <xs:complexType".to_string();
        assert!(!f.schema_well_formed());
    }
}
