//! Example-instance builder: a second walk over the same component graph,
//! structurally parallel to the schema walk but producing example content.
//! The buffer is built from the components themselves, never by rewriting
//! the schema text.

use base64::Engine;

use crate::generator::{expect_published, GenerationError, MAX_NESTING_DEPTH};
use crate::model::{
    Body, Component, ComponentId, Concept, IntervalDef, MagnitudeFacets, ReferenceRangeDef,
};
use crate::registry::ComponentRegistry;
use crate::xmlutil::{escape, pad};
use crate::CG_NAMESPACE;

// Fixed example validity window so generated instances are deterministic.
const EXAMPLE_VTB: &str = "2015-02-20T13:30:00";
const EXAMPLE_VTE: &str = "2025-02-20T13:30:00";

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

    builder.buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    builder.buf.push_str(&format!(
        "<cg:concept-{} xmlns:cg='{}'> <!-- {} -->\n",
        concept.id,
        CG_NAMESPACE,
        escape(concept.metadata.title.trim())
    ));
    builder.definition(definition)?;
    builder.buf.push_str(&format!("</cg:concept-{}>\n", concept.id));
    Ok(builder.buf)
}

struct Builder<'a> {
    registry: &'a ComponentRegistry,
    depth: usize,
    buf: String,
}

impl<'a> Builder<'a> {
    fn open(&mut self, component: &Component, indent: usize) {
        self.buf.push_str(&format!("{}<cg:me-{}>\n", pad(indent), component.meta.id));
        self.buf.push_str(&format!(
            "{}<label>{}</label>\n",
            pad(indent + 2),
            escape(component.meta.label.trim())
        ));
    }

    fn close(&mut self, component: &Component, indent: usize) {
        self.buf.push_str(&format!("{}</cg:me-{}>\n", pad(indent), component.meta.id));
    }

    fn validity(&mut self, indent: usize) {
        self.buf
            .push_str(&format!("{}<valid-time-begin>{}</valid-time-begin>\n", pad(indent), EXAMPLE_VTB));
        self.buf
            .push_str(&format!("{}<valid-time-end>{}</valid-time-end>\n", pad(indent), EXAMPLE_VTE));
    }

    fn element(&mut self, name: &str, value: &str, indent: usize) {
        self.buf
            .push_str(&format!("{}<{}>{}</{}>\n", pad(indent), name, escape(value), name));
    }

    fn definition(&mut self, component: &Component) -> Result<(), GenerationError> {
        let def = match &component.body {
            Body::Definition(def) => def,
            _ => return Ok(()),
        };
        let indent = 2;
        self.buf.push_str(&format!(
            "{}<cg:el-{}> <!-- definition -->\n",
            pad(indent),
            component.meta.id
        ));

        self.buf.push_str(&format!("{}<!-- links -->\n", pad(indent + 2)));
        for link_id in &def.links {
            self.component(link_id, indent + 2)?;
        }
        self.buf.push_str(&format!("{}<!-- audit -->\n", pad(indent + 2)));
        if let Some(audit_id) = &def.audit {
            self.component(audit_id, indent + 2)?;
        }
        self.element("language", &def.language, indent + 2);
        self.element("encoding", &def.encoding, indent + 2);
        self.buf.push_str(&format!("{}<!-- subject -->\n", pad(indent + 2)));
        if let Some(subject_id) = &def.subject {
            self.component(subject_id, indent + 2)?;
        }
        self.buf.push_str(&format!("{}<!-- provider -->\n", pad(indent + 2)));
        if let Some(provider_id) = &def.provider {
            self.component(provider_id, indent + 2)?;
        }
        self.buf.push_str(&format!("{}<!-- participations -->\n", pad(indent + 2)));
        for participation_id in &def.participations {
            self.component(participation_id, indent + 2)?;
        }
        self.buf.push_str(&format!("{}<!-- protocol-id -->\n", pad(indent + 2)));
        if let Some(protocol_id) = &def.protocol {
            self.component(protocol_id, indent + 2)?;
        }
        self.element("current-state", &def.state, indent + 2);
        self.buf.push_str(&format!("{}<!-- workflow-id -->\n", pad(indent + 2)));
        if let Some(workflow_id) = &def.workflow {
            self.component(workflow_id, indent + 2)?;
        }
        self.buf.push_str(&format!("{}<!-- attestation -->\n", pad(indent + 2)));
        if let Some(attestation_id) = &def.attestation {
            self.component(attestation_id, indent + 2)?;
        }
        self.buf.push_str(&format!("{}<!-- data -->\n", pad(indent + 2)));
        self.component(&def.data, indent + 2)?;

        self.buf.push_str(&format!("{}</cg:el-{}>\n", pad(indent), component.meta.id));
        Ok(())
    }

    /// Emit example content for one component occurrence. Repeated
    /// references repeat their content; deduplication belongs to the schema
    /// buffer alone.
    fn component(&mut self, id: &ComponentId, indent: usize) -> Result<(), GenerationError> {
        let component = expect_published(self.registry, id)?;
        match &component.body {
            Body::Boolean(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                let value = def.trues.first().map(String::as_str).unwrap_or("true");
                self.element("true-value", value, indent + 2);
                self.close(component, indent);
            }
            Body::Text(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                let value = def
                    .default_value
                    .as_deref()
                    .or(def.enums.first().map(String::as_str))
                    .unwrap_or("Example Text");
                self.element("value", value, indent + 2);
                self.element("language", &component.meta.lang, indent + 2);
                self.close(component, indent);
            }
            Body::CodedText(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                if let Some(code) = def.codes.first() {
                    self.element("value", &code.code_string, indent + 2);
                    self.element("terminology-abbrev", &def.terminology.abbrev, indent + 2);
                    self.element("terminology-name", &def.terminology.name, indent + 2);
                    self.element("terminology-version", &def.terminology.version, indent + 2);
                    self.element("terminology-code", &code.code, indent + 2);
                }
                self.close(component, indent);
            }
            Body::Link(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.element("link", "https://www.conceptgen.org/", indent + 2);
                self.element("relation", &def.relation, indent + 2);
                self.element("relation-uri", &def.relation_uri, indent + 2);
                self.close(component, indent);
            }
            Body::Identifier(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.element("value", "id-0001", indent + 2);
                if let Some(name) = def.id_names.first() {
                    self.element("id-name", name, indent + 2);
                }
                if let Some(issuer) = def.issuers.first() {
                    self.element("issuer", issuer, indent + 2);
                }
                if let Some(assignor) = def.assignors.first() {
                    self.element("assignor", assignor, indent + 2);
                }
                self.close(component, indent);
            }
            Body::Parsable(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.element("size", "0", indent + 2);
                self.element("encoding", &def.encoding, indent + 2);
                let formalism = def.formalisms.first().map(String::as_str).unwrap_or("text");
                self.element("formalism", formalism, indent + 2);
                self.close(component, indent);
            }
            Body::Media(def) => {
                let content =
                    base64::engine::general_purpose::STANDARD.encode(b"example-media-content");
                self.open(component, indent);
                self.validity(indent + 2);
                self.element("size", &content.len().to_string(), indent + 2);
                self.element("encoding", &def.encoding, indent + 2);
                if let Some(mime) = def.mime_types.first() {
                    self.element("media-type", mime, indent + 2);
                }
                if let Some(alt) = &def.alt_text {
                    self.element("alt-txt", alt, indent + 2);
                }
                self.element("media-content", &content, indent + 2);
                self.close(component, indent);
            }
            Body::Ordinal(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.reference_ranges(&def.reference_ranges, indent + 2)?;
                if let Some(status) = &def.normal_status {
                    self.element("normal-status", status, indent + 2);
                }
                if let Some(ordinal) = def.ordinals.first() {
                    self.element("ordinal", &ordinal.to_string(), indent + 2);
                }
                if let Some(symbol) = def.symbols.first() {
                    self.element("symbol", symbol, indent + 2);
                }
                self.close(component, indent);
            }
            Body::Count(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.reference_ranges(&def.reference_ranges, indent + 2)?;
                self.element("magnitude", &example_magnitude(&def.facets), indent + 2);
                self.element("error", "0", indent + 2);
                self.element("accuracy", "0", indent + 2);
                if let Some(units) = &def.units {
                    self.component(&units.target(), indent + 2)?;
                }
                self.close(component, indent);
            }
            Body::Quantity(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.reference_ranges(&def.reference_ranges, indent + 2)?;
                self.element("magnitude", &example_magnitude(&def.facets), indent + 2);
                self.element("error", "0", indent + 2);
                self.element("accuracy", "0", indent + 2);
                if let Some(units) = &def.units {
                    self.component(&units.target(), indent + 2)?;
                }
                self.close(component, indent);
            }
            Body::Ratio(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.reference_ranges(&def.reference_ranges, indent + 2)?;
                self.element("ratio-type", def.ratio_type.name(), indent + 2);
                self.element("numerator", &example_magnitude(&def.numerator_facets), indent + 2);
                self.element(
                    "denominator",
                    &example_magnitude(&def.denominator_facets),
                    indent + 2,
                );
                for units in [&def.numerator_units, &def.denominator_units, &def.ratio_units]
                    .into_iter()
                    .flatten()
                {
                    self.component(&units.target(), indent + 2)?;
                }
                self.close(component, indent);
            }
            Body::Temporal(def) => {
                self.open(component, indent);
                self.validity(indent + 2);
                self.reference_ranges(&def.reference_ranges, indent + 2)?;
                if def.allow_date {
                    self.element("temporal-date", "2015-02-20", indent + 2);
                } else if def.allow_time {
                    self.element("temporal-time", "13:30:00", indent + 2);
                } else if def.allow_datetime {
                    self.element("temporal-datetime", EXAMPLE_VTB, indent + 2);
                } else if def.allow_duration {
                    self.element("temporal-duration", "P7D", indent + 2);
                }
                self.close(component, indent);
            }
            Body::Interval(def) => {
                self.interval(component, def, indent);
            }
            Body::ReferenceRange(def) => {
                let def = def.clone();
                self.reference_range(component, &def, indent)?;
            }
            Body::Cluster(_) => {
                self.cluster(component, indent)?;
            }
            Body::Party(def) => {
                self.open(component, indent);
                self.element("party-name", "Example Party", indent + 2);
                for ref_id in &def.external_refs {
                    self.component(ref_id, indent + 2)?;
                }
                if let Some(details_id) = &def.details {
                    self.component(details_id, indent + 2)?;
                }
                self.close(component, indent);
            }
            Body::Audit(def) => {
                self.open(component, indent);
                if let Some(system_id) = &def.system_id {
                    self.component(system_id, indent + 2)?;
                }
                if let Some(user_id) = &def.system_user {
                    self.component(user_id, indent + 2)?;
                }
                if let Some(location_id) = &def.location {
                    self.component(location_id, indent + 2)?;
                }
                self.element("timestamp", EXAMPLE_VTB, indent + 2);
                self.close(component, indent);
            }
            Body::Attestation(def) => {
                self.open(component, indent);
                for child in [&def.view, &def.proof, &def.reason, &def.committer]
                    .into_iter()
                    .flatten()
                {
                    self.component(child, indent + 2)?;
                }
                self.element("time-committed", EXAMPLE_VTB, indent + 2);
                self.element("is-pending", "false", indent + 2);
                self.close(component, indent);
            }
            Body::Participation(def) => {
                self.open(component, indent);
                for child in [&def.performer, &def.function, &def.mode].into_iter().flatten() {
                    self.component(child, indent + 2)?;
                }
                self.close(component, indent);
            }
            Body::Definition(_) => {
                self.definition(component)?;
            }
        }
        Ok(())
    }

    fn cluster(&mut self, component: &Component, indent: usize) -> Result<(), GenerationError> {
        // The schema walk already proved the graph acyclic; the cap is kept
        // as a hard stop for this pass as well.
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(GenerationError::DepthExceeded {
                label: component.meta.label.clone(),
                bound: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;

        let def = match &component.body {
            Body::Cluster(def) => def.clone(),
            _ => {
                self.depth -= 1;
                return Ok(());
            }
        };

        self.open(component, indent);
        self.element("cluster-subject", &component.meta.label, indent + 2);
        for member in &def.clusters {
            self.component(&member.target, indent + 2)?;
        }
        for (_, members) in def.leaf_sections() {
            for member in members {
                self.component(&member.target, indent + 2)?;
            }
        }
        self.close(component, indent);

        self.depth -= 1;
        Ok(())
    }

    fn reference_ranges(
        &mut self,
        ranges: &[ComponentId],
        indent: usize,
    ) -> Result<(), GenerationError> {
        for rr_id in ranges {
            self.component(rr_id, indent)?;
        }
        Ok(())
    }

    fn reference_range(
        &mut self,
        component: &Component,
        def: &ReferenceRangeDef,
        indent: usize,
    ) -> Result<(), GenerationError> {
        self.open(component, indent);
        self.element("definition", &def.definition, indent + 2);
        self.component(&def.interval, indent + 2)?;
        self.element("is-normal", if def.is_normal { "true" } else { "false" }, indent + 2);
        self.close(component, indent);
        Ok(())
    }

    fn interval(&mut self, component: &Component, def: &IntervalDef, indent: usize) {
        self.open(component, indent);
        if let Some(lower) = &def.lower {
            self.element("lower", lower, indent + 2);
        }
        if let Some(upper) = &def.upper {
            self.element("upper", upper, indent + 2);
        }
        self.element(
            "lower-included",
            if def.lower_included { "true" } else { "false" },
            indent + 2,
        );
        self.element(
            "upper-included",
            if def.upper_included { "true" } else { "false" },
            indent + 2,
        );
        self.element(
            "lower-bounded",
            if def.lower_bounded { "true" } else { "false" },
            indent + 2,
        );
        self.element(
            "upper-bounded",
            if def.upper_bounded { "true" } else { "false" },
            indent + 2,
        );
        self.close(component, indent);
    }
}

fn example_magnitude(facets: &MagnitudeFacets) -> String {
    let value = facets.min_inclusive.or(facets.min_exclusive.map(|v| v + 1.0)).unwrap_or(1.0);
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
