//! Auxiliary fragment builders: a report function for the R analysis
//! package and a read/write query pair for XQuery consumers.
//!
//! These are synthesized once per component alongside the schema fragment
//! and collected later by the artifact packaging collaborator.

use crate::model::{ComponentKind, Concept, Meta};

/// Strip a label down to an identifier usable in generated function names.
fn fn_name(label: &str) -> String {
    label.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// R function fragment: parses instance documents and returns the collected
/// nodes of this component as a data frame.
pub fn report_fragment(meta: &Meta, kind: ComponentKind) -> String {
    let name = fn_name(&meta.label);
    let mut r = String::new();

    r.push_str(&format!("#' \\code{{{}}}\n", meta.label.trim()));
    r.push_str("#'\n");
    r.push_str(&format!(
        "#' Returns a data.frame of the collected nodes of \\code{{{}}} from the instances passed as sourceList.\n",
        meta.label.trim()
    ));
    r.push_str(&format!(
        "#' The XML element name is me-{} as a restriction of the {}.\n",
        meta.id,
        kind.base_type()
    ));
    for line in meta.description.lines() {
        r.push_str(&format!("#' {}\n", line));
    }
    r.push_str("#' @param sourceList - The path/file name(s) of the XML file(s) to process.\n");
    r.push_str("#' @return A dataframe of the component values plus the concept id and source name.\n");
    r.push_str("#' @export\n");
    r.push_str(&format!("get{} <- function(sourceList)\n", name));
    r.push_str("{\n");
    r.push_str(&format!("    data <- lapply(sourceList, parse{})\n", name));
    r.push_str("    data <- data.table::rbindlist(data, fill=TRUE)\n");
    r.push_str("    return(data)\n");
    r.push_str("}\n");
    r.push_str("\n");
    r.push_str(&format!("parse{} <- function(sourceName)\n", name));
    r.push_str("{\n");
    r.push_str("    doc <- XML::xmlTreeParse(sourceName, useInternalNodes=TRUE)\n");
    r.push_str(&format!(
        "    nodes <- XML::getNodeSet(doc, \"//cg:me-{}\", c(cg=\"{}\"))\n",
        meta.id,
        crate::CG_NAMESPACE
    ));
    r.push_str("    frame <- XML::xmlToDataFrame(nodes, stringsAsFactors=FALSE)\n");
    r.push_str("    frame$sourceName <- sourceName\n");
    r.push_str("    return(frame)\n");
    r.push_str("}\n");

    r
}

/// XQuery read fragment: selects every occurrence of this component from an
/// instance document.
pub fn read_fragment(meta: &Meta) -> String {
    let name = fn_name(&meta.label);
    let mut q = String::new();

    q.push_str(&format!("declare namespace cg = \"{}\";\n", crate::CG_NAMESPACE));
    q.push_str(&format!(
        "declare function local:read-{}($doc as document-node()) as element()*\n",
        name
    ));
    q.push_str("{\n");
    q.push_str(&format!("  $doc//cg:me-{}\n", meta.id));
    q.push_str("};\n");

    q
}

/// XQuery write fragment: inserts a new occurrence of this component under
/// a caller-supplied parent node.
pub fn write_fragment(meta: &Meta) -> String {
    let name = fn_name(&meta.label);
    let mut q = String::new();

    q.push_str(&format!("declare namespace cg = \"{}\";\n", crate::CG_NAMESPACE));
    q.push_str(&format!(
        "declare updating function local:write-{}($parent as element(), $content as element()*)\n",
        name
    ));
    q.push_str("{\n");
    q.push_str(&format!(
        "  insert node element cg:me-{} {{ $content }} as last into $parent\n",
        meta.id
    ));
    q.push_str("};\n");

    q
}

/// Metadata report fragment for a Concept: an R data frame holding the
/// document metadata, packaged with the per-component report functions.
pub fn concept_report_fragment(concept: &Concept) -> String {
    let md = &concept.metadata;
    let mut r = String::new();

    r.push_str(&format!("# metadata.R for concept-{}\n", concept.id));
    r.push_str("#' @title getMetadata\n");
    r.push_str("#'\n");
    r.push_str("#' The Concept document metadata.\n");
    r.push_str("#' @export\n");
    r.push_str("getMetadata <- data.frame(\n");
    r.push_str(&format!("  dc_title='{}',\n", md.title.trim().replace('\'', " ")));
    r.push_str(&format!(
        "  dc_creator='{} {}',\n",
        md.creator_name.trim().replace('\'', " "),
        md.creator_email.trim()
    ));
    r.push_str(&format!("  dc_subject='{}',\n", md.subject.trim().replace('\'', " ")));
    r.push_str(&format!("  dc_source='{}',\n", md.source.trim().replace('\'', " ")));
    r.push_str(&format!("  dc_rights='{}',\n", md.rights.trim().replace('\'', " ")));
    r.push_str(&format!("  dc_identifier='concept-{}',\n", concept.id));
    r.push_str(&format!(
        "  dc_description='{}',\n",
        concept.description.trim().replace('\'', " ")
    ));
    r.push_str(&format!("  dc_date='{}',\n", md.pub_date.to_rfc3339()));
    r.push_str("  dc_format='text/xml',\n");
    r.push_str(&format!("  dc_language='{}',\n", md.language));
    r.push_str("  stringsAsFactors=FALSE)\n");

    r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_name_the_component_element() {
        let meta = Meta::new("Body Weight");
        let marker = format!("me-{}", meta.id);

        assert!(report_fragment(&meta, ComponentKind::Quantity).contains(&marker));
        assert!(report_fragment(&meta, ComponentKind::Quantity).contains("getBodyWeight"));
        assert!(read_fragment(&meta).contains(&marker));
        assert!(write_fragment(&meta).contains(&marker));
    }
}
