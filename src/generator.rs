//! Composer - graph walk over a Concept's reachable components
//!
//! CRITICAL: all traversal state is scoped to one `generate()` call. The
//! visited set, adapter set, role table and active path live in a walker
//! created at the start of the call, so concurrent generations of distinct
//! Concepts can never corrupt one another. Failure is atomic: no partial
//! buffers are ever handed to the writer.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info};

use crate::model::{
    Body, ClusterDef, Component, ComponentId, ComponentKind, Meta, Severity, UnitsRef,
};
use crate::registry::ComponentRegistry;
use crate::xmlutil::{escape, pad};
use crate::{docform, instance, RM_VERSION};

/// Sanity cap on legitimately deep, acyclic nesting. True self-embedding is
/// detected exactly from the active ancestor path and is fatal at any depth.
pub const MAX_NESTING_DEPTH: usize = 100;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Unknown component: {0}")]
    UnknownComponent(ComponentId),

    #[error("Concept '{title}' must be published before generating.")]
    ConceptNotPublished { title: String },

    #[error("Concept '{title}' was previously generated. Unpublish it and publish a new cycle before regenerating.")]
    AlreadyGenerated { title: String },

    #[error("Concept '{title}' has no root definition.")]
    NoRootDefinition { title: String },

    #[error("Concept '{title}' targets reference model {found}; this engine supports {supported}.")]
    RmVersionMismatch { title: String, found: String, supported: String },

    #[error("{kind} '{label}' is not published or its schema fragment is malformed. Publish it and retry.")]
    NotPublished { kind: ComponentKind, label: String },

    #[error("{label}: expected a {expected} component in this slot")]
    WrongKind { label: String, expected: ComponentKind },

    #[error("Cluster '{label}' is embedded inside itself; the walk is in a loop.")]
    SelfEmbedded { label: String },

    #[error("Cluster '{label}' exceeds the nesting bound of {bound} levels.")]
    DepthExceeded { label: String, bound: usize },

    #[error("{kind} '{label}' has neither a simple nor a coded units reference in its {slot} slot.")]
    MissingUnits { kind: ComponentKind, label: String, slot: &'static str },
}

impl GenerationError {
    /// Generation failures abort the whole call.
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// The complete output of one `generate()` call: three parallel buffers
/// plus the identity bookkeeping the artifact writer needs to locate each
/// used component's auxiliary fragments.
#[derive(Debug, Clone)]
pub struct GeneratedBundle {
    pub concept_id: ComponentId,
    pub schema: String,
    pub instance: String,
    pub docs: String,
    /// Identities in order of first emission.
    pub used: Vec<ComponentId>,
    /// Identity -> adapter identity for every component used.
    pub adapters: HashMap<ComponentId, ComponentId>,
}

/// Persistence collaborator receiving a complete bundle. Implementations
/// live outside the core; the engine only ever hands over finished bundles.
pub trait ArtifactWriter {
    fn write_bundle(&mut self, bundle: &GeneratedBundle) -> std::io::Result<()>;
}

/// Compose the bundle for a published, not-yet-generated Concept.
///
/// The `generated` latch is set only after all three buffers are complete,
/// making composition single-shot per publication cycle.
pub fn generate(
    registry: &mut ComponentRegistry,
    concept_id: ComponentId,
) -> Result<GeneratedBundle, GenerationError> {
    {
        let concept = registry
            .concept(&concept_id)
            .ok_or(GenerationError::UnknownComponent(concept_id))?;
        if !concept.is_published() {
            return Err(GenerationError::ConceptNotPublished {
                title: concept.metadata.title.clone(),
            });
        }
        if concept.generated {
            return Err(GenerationError::AlreadyGenerated {
                title: concept.metadata.title.clone(),
            });
        }
        check_rm_version(&concept.rm_version, &concept.metadata.title)?;
    }

    let bundle = compose(registry, concept_id)?;

    if let Some(concept) = registry.concept_mut(&concept_id) {
        concept.generated = true;
    }
    info!(concept = %concept_id, components = bundle.used.len(), "generated concept bundle");
    Ok(bundle)
}

fn check_rm_version(found: &str, title: &str) -> Result<(), GenerationError> {
    let mismatch = || GenerationError::RmVersionMismatch {
        title: title.to_string(),
        found: found.to_string(),
        supported: RM_VERSION.to_string(),
    };
    let found_ver = semver::Version::parse(found).map_err(|_| mismatch())?;
    let supported = semver::Version::parse(RM_VERSION).map_err(|_| mismatch())?;
    if found_ver.major != supported.major || found_ver > supported {
        return Err(mismatch());
    }
    Ok(())
}

fn compose(
    registry: &ComponentRegistry,
    concept_id: ComponentId,
) -> Result<GeneratedBundle, GenerationError> {
    let concept = registry
        .concept(&concept_id)
        .ok_or(GenerationError::UnknownComponent(concept_id))?;
    let root = concept.root.ok_or(GenerationError::NoRootDefinition {
        title: concept.metadata.title.clone(),
    })?;
    let definition = expect_published(registry, &root.definition())?;
    if definition.kind() != ComponentKind::Definition {
        return Err(GenerationError::WrongKind {
            label: definition.meta.label.clone(),
            expected: ComponentKind::Definition,
        });
    }

    // Schema walk with call-scoped state.
    let mut walker = Walker::new(registry);
    walker.schema.push_str(&concept.fragments.schema);
    if walker.visit(definition.meta.id, "definition") {
        walker.walk_definition(definition)?;
    }

    let Walker {
        mut schema,
        roles,
        used,
        adapters,
        ..
    } = walker;

    // Deferred cross-reference resolution: one element declaration per
    // recorded identity, once the full role set is known.
    schema.push('\n');
    for (id, role_names) in roles.iter() {
        if role_names.is_empty() {
            continue;
        }
        let groups = role_names
            .iter()
            .map(|r| format!("cg:{}", r))
            .collect::<Vec<_>>()
            .join(" ");
        schema.push_str(&format!(
            "{}<xs:element name='el-{}' substitutionGroup='{}' type='cg:ct-{}'/>\n",
            pad(2),
            id,
            groups,
            id
        ));
    }
    schema.push_str("\n</xs:schema>\n");

    // Second, structurally parallel walk for the example instance, and a
    // third best-effort walk for the documentation view.
    let instance = instance::build(registry, concept, definition)?;
    let docs = docform::build(registry, concept, definition)?;

    Ok(GeneratedBundle {
        concept_id,
        schema,
        instance,
        docs,
        used,
        adapters,
    })
}

// --- lookup helpers shared with the instance/doc walks ---

pub(crate) fn expect<'a>(
    registry: &'a ComponentRegistry,
    id: &ComponentId,
) -> Result<&'a Component, GenerationError> {
    registry
        .get(id)
        .ok_or(GenerationError::UnknownComponent(*id))
}

pub(crate) fn expect_published<'a>(
    registry: &'a ComponentRegistry,
    id: &ComponentId,
) -> Result<&'a Component, GenerationError> {
    let component = expect(registry, id)?;
    if !component.is_published() {
        return Err(GenerationError::NotPublished {
            kind: component.kind(),
            label: component.meta.label.clone(),
        });
    }
    Ok(component)
}

pub(crate) fn as_cluster(component: &Component) -> Result<&ClusterDef, GenerationError> {
    match &component.body {
        Body::Cluster(def) => Ok(def),
        _ => Err(GenerationError::WrongKind {
            label: component.meta.label.clone(),
            expected: ComponentKind::Cluster,
        }),
    }
}

/// Insertion-ordered identity -> role-name table. Role lists keep the order
/// of first appearance and drop duplicates, mirroring how a linker resolves
/// a symbol once every referencing fragment is known.
#[derive(Default)]
struct RoleTable {
    order: Vec<ComponentId>,
    roles: HashMap<ComponentId, Vec<String>>,
}

impl RoleTable {
    fn record(&mut self, id: ComponentId, role: &str) {
        if !self.roles.contains_key(&id) {
            self.order.push(id);
            self.roles.insert(id, Vec::new());
        }
        if let Some(role_names) = self.roles.get_mut(&id) {
            if !role_names.iter().any(|r| r == role) {
                role_names.push(role.to_string());
            }
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&ComponentId, &Vec<String>)> {
        self.order.iter().filter_map(|id| self.roles.get(id).map(|r| (id, r)))
    }
}

/// One schema walk. Owns every piece of traversal state for a single call.
struct Walker<'a> {
    registry: &'a ComponentRegistry,
    visited: HashSet<ComponentId>,
    adapters_done: HashSet<ComponentId>,
    roles: RoleTable,
    /// Active ancestor Cluster identities, exact path.
    active: Vec<ComponentId>,
    used: Vec<ComponentId>,
    adapters: HashMap<ComponentId, ComponentId>,
    schema: String,
}

impl<'a> Walker<'a> {
    fn new(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            visited: HashSet::new(),
            adapters_done: HashSet::new(),
            roles: RoleTable::default(),
            active: Vec::new(),
            used: Vec::new(),
            adapters: HashMap::new(),
            schema: String::new(),
        }
    }

    fn lookup(&self, id: &ComponentId) -> Result<&'a Component, GenerationError> {
        expect_published(self.registry, id)
    }

    /// Record the role this reference was reached under and report whether
    /// the identity's defining block still needs to be emitted.
    fn visit(&mut self, id: ComponentId, role: &str) -> bool {
        self.roles.record(id, role);
        self.visited.insert(id)
    }

    fn enter_cluster(&mut self, meta: &Meta) -> Result<(), GenerationError> {
        if self.active.contains(&meta.id) {
            return Err(GenerationError::SelfEmbedded {
                label: meta.label.clone(),
            });
        }
        if self.active.len() >= MAX_NESTING_DEPTH {
            return Err(GenerationError::DepthExceeded {
                label: meta.label.clone(),
                bound: MAX_NESTING_DEPTH,
            });
        }
        self.active.push(meta.id);
        Ok(())
    }

    fn leave_cluster(&mut self) {
        self.active.pop();
    }

    /// Append a component's defining schema block, exactly once per
    /// identity, and record it for the writer.
    fn append_block(&mut self, meta: &Meta) {
        debug!(component = %meta.label, "emitting schema block");
        self.schema.push_str(&meta.fragments.schema);
        self.used.push(meta.id);
        self.adapters.insert(meta.id, meta.adapter_id);
    }

    /// Wrap a shared component once per adapter identity.
    fn append_adapter(&mut self, meta: &Meta) {
        if !self.adapters_done.insert(meta.adapter_id) {
            return;
        }
        self.schema.push_str(&format!(
            "{}<xs:element name='el-{}' substitutionGroup='cg:items' type='cg:ct-{}'/>\n",
            pad(2),
            meta.adapter_id,
            meta.adapter_id
        ));
        self.schema.push_str(&format!(
            "{}<xs:complexType name='ct-{}'> <!-- Adapter for: {} -->\n",
            pad(2),
            meta.adapter_id,
            escape(&meta.label)
        ));
        self.schema.push_str(&format!("{}<xs:complexContent>\n", pad(4)));
        self.schema
            .push_str(&format!("{}<xs:restriction base='cg:AdapterType'>\n", pad(6)));
        self.schema.push_str(&format!("{}<xs:sequence>\n", pad(8)));
        self.schema.push_str(&format!(
            "{}<xs:element maxOccurs='unbounded' minOccurs='0' ref='cg:el-{}'/> <!-- Reference to: {} -->\n",
            pad(10),
            meta.id,
            escape(&meta.label)
        ));
        self.schema.push_str(&format!("{}</xs:sequence>\n", pad(8)));
        self.schema.push_str(&format!("{}</xs:restriction>\n", pad(6)));
        self.schema.push_str(&format!("{}</xs:complexContent>\n", pad(4)));
        self.schema.push_str(&format!("{}</xs:complexType>\n\n", pad(2)));
    }

    /// Emit a leaf reached through a fixed slot or a cluster position, then
    /// resolve its reference closure.
    fn emit_leaf(&mut self, id: &ComponentId, role: &str) -> Result<(), GenerationError> {
        let component = self.lookup(id)?;
        if self.visit(component.meta.id, role) {
            self.append_block(&component.meta);
            self.resolve_closure(component)?;
        }
        Ok(())
    }

    /// Resolve the typed children a leaf requires: units slots for the
    /// quantified kinds, reference ranges plus their intervals for the
    /// ordered kinds.
    fn resolve_closure(&mut self, component: &Component) -> Result<(), GenerationError> {
        match &component.body {
            Body::Ordinal(def) => self.emit_reference_ranges(&def.reference_ranges)?,
            Body::Temporal(def) => self.emit_reference_ranges(&def.reference_ranges)?,
            Body::Count(def) => {
                self.emit_reference_ranges(&def.reference_ranges)?;
                self.emit_units(&component.meta, ComponentKind::Count, &def.units, "units", true)?;
            }
            Body::Quantity(def) => {
                self.emit_reference_ranges(&def.reference_ranges)?;
                self.emit_units(&component.meta, ComponentKind::Quantity, &def.units, "units", true)?;
            }
            Body::Ratio(def) => {
                self.emit_reference_ranges(&def.reference_ranges)?;
                self.emit_units(&component.meta, ComponentKind::Ratio, &def.numerator_units, "numerator-units", false)?;
                self.emit_units(&component.meta, ComponentKind::Ratio, &def.denominator_units, "denominator-units", false)?;
                self.emit_units(&component.meta, ComponentKind::Ratio, &def.ratio_units, "ratio-units", false)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn emit_units(
        &mut self,
        owner: &Meta,
        owner_kind: ComponentKind,
        units: &Option<UnitsRef>,
        slot: &'static str,
        mandatory: bool,
    ) -> Result<(), GenerationError> {
        match units {
            Some(units) => {
                let role = match owner_kind {
                    ComponentKind::Ratio => slot.to_string(),
                    kind => format!("{}-{}", kind.name(), slot),
                };
                let target = self.lookup(&units.target())?;
                let expected = match units {
                    UnitsRef::Simple(_) => ComponentKind::Text,
                    UnitsRef::Coded(_) => ComponentKind::CodedText,
                };
                if target.kind() != expected {
                    return Err(GenerationError::WrongKind {
                        label: target.meta.label.clone(),
                        expected,
                    });
                }
                if self.visit(target.meta.id, &role) {
                    self.append_block(&target.meta);
                }
                Ok(())
            }
            None if mandatory => Err(GenerationError::MissingUnits {
                kind: owner_kind,
                label: owner.label.clone(),
                slot,
            }),
            None => Ok(()),
        }
    }

    fn emit_reference_ranges(&mut self, ranges: &[ComponentId]) -> Result<(), GenerationError> {
        for rr_id in ranges {
            let rr = self.lookup(rr_id)?;
            let def = match &rr.body {
                Body::ReferenceRange(def) => def,
                _ => {
                    return Err(GenerationError::WrongKind {
                        label: rr.meta.label.clone(),
                        expected: ComponentKind::ReferenceRange,
                    })
                }
            };
            if self.visit(rr.meta.id, "reference-ranges") {
                self.append_block(&rr.meta);
            }
            let interval = self.lookup(&def.interval)?;
            if interval.kind() != ComponentKind::Interval {
                return Err(GenerationError::WrongKind {
                    label: interval.meta.label.clone(),
                    expected: ComponentKind::Interval,
                });
            }
            if self.visit(interval.meta.id, "data-range") {
                self.append_block(&interval.meta);
            }
        }
        Ok(())
    }

    fn walk_definition(&mut self, component: &'a Component) -> Result<(), GenerationError> {
        let def = match &component.body {
            Body::Definition(def) => def,
            _ => {
                return Err(GenerationError::WrongKind {
                    label: component.meta.label.clone(),
                    expected: ComponentKind::Definition,
                })
            }
        };
        self.append_block(&component.meta);

        for link_id in &def.links {
            self.emit_leaf(link_id, "links")?;
        }
        if let Some(audit_id) = &def.audit {
            let audit = self.lookup(audit_id)?;
            if self.visit(audit.meta.id, "audit") {
                self.walk_audit(audit)?;
            }
        }
        if let Some(subject_id) = &def.subject {
            let subject = self.lookup(subject_id)?;
            if self.visit(subject.meta.id, "subject") {
                self.walk_party(subject)?;
            }
        }
        if let Some(provider_id) = &def.provider {
            let provider = self.lookup(provider_id)?;
            if self.visit(provider.meta.id, "provider") {
                self.walk_party(provider)?;
            }
        }
        for participation_id in &def.participations {
            let participation = self.lookup(participation_id)?;
            if self.visit(participation.meta.id, "participations") {
                self.walk_participation(participation)?;
            }
        }
        if let Some(protocol_id) = &def.protocol {
            self.emit_leaf(protocol_id, "protocol-id")?;
        }
        if let Some(workflow_id) = &def.workflow {
            self.emit_leaf(workflow_id, "workflow-id")?;
        }
        if let Some(attestation_id) = &def.attestation {
            let attestation = self.lookup(attestation_id)?;
            if self.visit(attestation.meta.id, "attestation") {
                self.walk_attestation(attestation)?;
            }
        }

        let data = self.lookup(&def.data)?;
        self.enter_cluster(&data.meta)?;
        if self.visit(data.meta.id, "data") {
            self.walk_cluster(data)?;
        }
        self.leave_cluster();
        Ok(())
    }

    /// Depth-first Cluster emission: nested Clusters first, recursing, then
    /// each leaf-kind collection in its fixed order.
    fn walk_cluster(&mut self, component: &'a Component) -> Result<(), GenerationError> {
        let def = as_cluster(component)?;
        self.append_block(&component.meta);

        for member in &def.clusters {
            let nested = self.lookup(&member.target)?;
            as_cluster(nested)?;
            self.enter_cluster(&nested.meta)?;
            if self.visit(nested.meta.id, &member.role) {
                self.walk_cluster(nested)?;
            }
            self.leave_cluster();
        }

        for (kind, members) in def.leaf_sections() {
            for member in members {
                let leaf = self.lookup(&member.target)?;
                if leaf.kind() != kind {
                    return Err(GenerationError::WrongKind {
                        label: leaf.meta.label.clone(),
                        expected: kind,
                    });
                }
                self.emit_leaf(&member.target, &member.role)?;
                self.append_adapter(&leaf.meta);
            }
        }
        Ok(())
    }

    fn walk_party(&mut self, component: &'a Component) -> Result<(), GenerationError> {
        let def = match &component.body {
            Body::Party(def) => def,
            _ => {
                return Err(GenerationError::WrongKind {
                    label: component.meta.label.clone(),
                    expected: ComponentKind::Party,
                })
            }
        };
        self.append_block(&component.meta);

        for ref_id in &def.external_refs {
            self.emit_leaf(ref_id, "external-ref")?;
        }
        if let Some(details_id) = &def.details {
            let details = self.lookup(details_id)?;
            self.enter_cluster(&details.meta)?;
            if self.visit(details.meta.id, "details") {
                self.walk_cluster(details)?;
            }
            self.leave_cluster();
        }
        Ok(())
    }

    fn walk_audit(&mut self, component: &'a Component) -> Result<(), GenerationError> {
        let def = match &component.body {
            Body::Audit(def) => def,
            _ => {
                return Err(GenerationError::WrongKind {
                    label: component.meta.label.clone(),
                    expected: ComponentKind::Audit,
                })
            }
        };
        self.append_block(&component.meta);

        if let Some(system_id) = &def.system_id {
            self.emit_leaf(system_id, "system-id")?;
        }
        if let Some(user_id) = &def.system_user {
            let user = self.lookup(user_id)?;
            if self.visit(user.meta.id, "system-user") {
                self.walk_party(user)?;
            }
        }
        if let Some(location_id) = &def.location {
            let location = self.lookup(location_id)?;
            self.enter_cluster(&location.meta)?;
            if self.visit(location.meta.id, "location") {
                self.walk_cluster(location)?;
            }
            self.leave_cluster();
        }
        Ok(())
    }

    fn walk_participation(&mut self, component: &'a Component) -> Result<(), GenerationError> {
        let def = match &component.body {
            Body::Participation(def) => def,
            _ => {
                return Err(GenerationError::WrongKind {
                    label: component.meta.label.clone(),
                    expected: ComponentKind::Participation,
                })
            }
        };
        self.append_block(&component.meta);

        if let Some(performer_id) = &def.performer {
            let performer = self.lookup(performer_id)?;
            if self.visit(performer.meta.id, "performer") {
                self.walk_party(performer)?;
            }
        }
        if let Some(function_id) = &def.function {
            self.emit_leaf(function_id, "function")?;
        }
        if let Some(mode_id) = &def.mode {
            self.emit_leaf(mode_id, "mode")?;
        }
        Ok(())
    }

    fn walk_attestation(&mut self, component: &'a Component) -> Result<(), GenerationError> {
        let def = match &component.body {
            Body::Attestation(def) => def,
            _ => {
                return Err(GenerationError::WrongKind {
                    label: component.meta.label.clone(),
                    expected: ComponentKind::Attestation,
                })
            }
        };
        self.append_block(&component.meta);

        if let Some(view_id) = &def.view {
            self.emit_leaf(view_id, "attested-view")?;
        }
        if let Some(proof_id) = &def.proof {
            self.emit_leaf(proof_id, "proof")?;
        }
        if let Some(reason_id) = &def.reason {
            self.emit_leaf(reason_id, "reason")?;
        }
        if let Some(committer_id) = &def.committer {
            let committer = self.lookup(committer_id)?;
            if self.visit(committer.meta.id, "committer") {
                self.walk_party(committer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn role_table_keeps_first_appearance_order_and_dedups() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut table = RoleTable::default();
        table.record(a, "first-name");
        table.record(b, "items");
        table.record(a, "preferred-name");
        table.record(a, "first-name");

        let collected: Vec<_> = table.iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(*collected[0].0, a);
        assert_eq!(collected[0].1, &vec!["first-name".to_string(), "preferred-name".to_string()]);
        assert_eq!(collected[1].1, &vec!["items".to_string()]);
    }

    #[test]
    fn rm_version_gate_rejects_newer_and_foreign_majors() {
        assert!(check_rm_version(RM_VERSION, "t").is_ok());
        assert!(check_rm_version("2.0.0", "t").is_ok());
        assert!(check_rm_version("3.0.0", "t").is_err());
        assert!(check_rm_version("2.99.0", "t").is_err());
        assert!(check_rm_version("not-a-version", "t").is_err());
    }
}
