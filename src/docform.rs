//! Documentation builder: a third, best-effort walk rendering the same
//! traversal as a human-browsable HTML view. This buffer carries no
//! completeness guarantees; anything unresolvable is simply skipped.

use crate::generator::{GenerationError, MAX_NESTING_DEPTH};
use crate::model::{Body, Component, ComponentId, Concept};
use crate::registry::ComponentRegistry;
use crate::xmlutil::escape;

pub(crate) fn build(
    registry: &ComponentRegistry,
    concept: &Concept,
    definition: &Component,
) -> Result<String, GenerationError> {
    let mut builder = Builder {
        registry,
        depth: 0,
        buf: String::new(),
    };

    builder.buf.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    builder.buf.push_str(&format!(
        "<title>{}</title>\n",
        escape(concept.metadata.title.trim())
    ));
    builder.buf.push_str("<meta charset=\"UTF-8\"/>\n");
    builder.buf.push_str(&format!(
        "<meta name=\"identifier\" content=\"concept-{}\"/>\n",
        concept.id
    ));
    builder.buf.push_str("</head>\n<body>\n");
    builder.buf.push_str(&concept.doc_fragment);
    builder.definition(definition);
    builder.buf.push_str("</body>\n</html>\n");
    Ok(builder.buf)
}

struct Builder<'a> {
    registry: &'a ComponentRegistry,
    depth: usize,
    buf: String,
}

impl<'a> Builder<'a> {
    fn definition(&mut self, component: &Component) {
        let def = match &component.body {
            Body::Definition(def) => def,
            _ => return,
        };
        self.buf.push_str("<div class='definition'>\n");
        self.buf.push_str(&format!(
            "<h3>{}</h3>\n",
            escape(component.meta.label.trim())
        ));
        if !component.meta.description.is_empty() {
            self.buf.push_str(&format!(
                "<p>{}</p>\n",
                escape(component.meta.description.trim())
            ));
        }

        for link_id in &def.links {
            self.component(link_id, "links");
        }
        if let Some(audit_id) = &def.audit {
            self.component(audit_id, "audit");
        }
        if let Some(subject_id) = &def.subject {
            self.component(subject_id, "subject");
        }
        if let Some(provider_id) = &def.provider {
            self.component(provider_id, "provider");
        }
        for participation_id in &def.participations {
            self.component(participation_id, "participations");
        }
        if let Some(protocol_id) = &def.protocol {
            self.component(protocol_id, "protocol-id");
        }
        if let Some(workflow_id) = &def.workflow {
            self.component(workflow_id, "workflow-id");
        }
        if let Some(attestation_id) = &def.attestation {
            self.component(attestation_id, "attestation");
        }
        self.component(&def.data, "data");
        self.buf.push_str("</div>\n");
    }

    /// Render one component occurrence. Best effort: unresolvable targets
    /// and runaway nesting end the branch quietly.
    fn component(&mut self, id: &ComponentId, role: &str) {
        if self.depth >= MAX_NESTING_DEPTH {
            return;
        }
        let component = match self.registry.get(id) {
            Some(component) => component,
            None => return,
        };
        self.depth += 1;

        self.buf.push_str(&format!(
            "<div class='component {}'>\n",
            component.kind().name().to_lowercase()
        ));
        self.buf.push_str(&format!(
            "<b>{}</b> <i>({} as {})</i><br/>\n",
            escape(component.meta.label.trim()),
            component.kind(),
            escape(role)
        ));
        if !component.meta.description.is_empty() {
            self.buf.push_str(&format!(
                "<p>{}</p>\n",
                escape(component.meta.description.trim())
            ));
        }

        match &component.body {
            Body::Cluster(def) => {
                for member in &def.clusters {
                    self.component(&member.target, &member.role);
                }
                for (_, members) in def.leaf_sections() {
                    for member in members {
                        self.component(&member.target, &member.role);
                    }
                }
            }
            Body::Count(def) => {
                if let Some(units) = &def.units {
                    self.component(&units.target(), "units");
                }
            }
            Body::Quantity(def) => {
                if let Some(units) = &def.units {
                    self.component(&units.target(), "units");
                }
            }
            Body::Ratio(def) => {
                for units in [&def.numerator_units, &def.denominator_units, &def.ratio_units]
                    .into_iter()
                    .flatten()
                {
                    self.component(&units.target(), "units");
                }
            }
            Body::ReferenceRange(def) => {
                self.component(&def.interval, "data-range");
            }
            Body::Party(def) => {
                for ref_id in &def.external_refs {
                    self.component(ref_id, "external-ref");
                }
                if let Some(details_id) = &def.details {
                    self.component(details_id, "details");
                }
            }
            Body::Audit(def) => {
                if let Some(system_id) = &def.system_id {
                    self.component(system_id, "system-id");
                }
                if let Some(user_id) = &def.system_user {
                    self.component(user_id, "system-user");
                }
                if let Some(location_id) = &def.location {
                    self.component(location_id, "location");
                }
            }
            Body::Attestation(def) => {
                for child in [&def.view, &def.proof, &def.reason, &def.committer]
                    .into_iter()
                    .flatten()
                {
                    self.component(child, "attestation");
                }
            }
            Body::Participation(def) => {
                for child in [&def.performer, &def.function, &def.mode].into_iter().flatten() {
                    self.component(child, "participation");
                }
            }
            _ => {}
        }

        self.buf.push_str("</div>\n");
        self.depth -= 1;
    }
}
