//! Human and JSON views of a decoded mesh

use anyhow::Result;
use mesh_codec::{DecodedMesh, MeshDocument, NamingRules};
use serde::Serialize;
use std::fmt::Write;

/// Plain-text summary, one section per table
pub fn render_summary(decoded: &DecodedMesh<'_>, rules: &NamingRules) -> String {
    let doc = &decoded.document;
    let offsets = &decoded.offsets;
    let mut out = String::new();

    let h = &doc.header;
    let _ = writeln!(
        out,
        "tag {:?}, skinned: {}, {} bytes",
        String::from_utf8_lossy(&h.tag),
        h.is_skinned,
        decoded.source().len()
    );
    let _ = writeln!(
        out,
        "bounds: min {:?} max {:?}, sphere {:?} r={}",
        h.bounding_box.min, h.bounding_box.max, h.bounding_sphere.center, h.bounding_sphere.radius
    );
    let _ = writeln!(
        out,
        "{} vertices, {} triangles, {} bones",
        doc.vertices.len(),
        doc.triangle_count(),
        doc.bone_count
    );

    let _ = writeln!(
        out,
        "\nprimitives ({}) @ {:#x}",
        doc.primitives.len(),
        offsets.primitive_table_start()
    );
    for (i, p) in doc.primitives.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{i}] material {} ({}), indices {}..{}",
            p.material_index,
            doc.material_of(p).unwrap_or("?"),
            p.start_index,
            p.start_index as u64 + p.index_count as u64
        );
    }

    let _ = writeln!(
        out,
        "\nmeshpoints ({}) @ {:#x}",
        doc.meshpoints.len(),
        offsets.meshpoint_table_start()
    );
    for (i, mp) in doc.meshpoints.iter().enumerate() {
        let category = rules.category_of(&mp.name).unwrap_or("INVALID");
        let _ = writeln!(
            out,
            "  [{i}] {:<24} {:<14} {:?}",
            mp.name, category, mp.position
        );
    }

    let _ = writeln!(
        out,
        "\nmaterials ({}) @ {:#x}",
        doc.materials.len(),
        offsets.material_table_start()
    );
    let used = doc.used_material_indices();
    for (i, name) in doc.materials.iter().enumerate() {
        let marker = if used.binary_search(&i).is_ok() { "" } else { " (unused)" };
        let _ = writeln!(out, "  [{i}] {name}{marker}");
    }

    out
}

#[derive(Serialize)]
struct JsonDump<'a> {
    space: &'static str,
    #[serde(flatten)]
    document: &'a MeshDocument,
}

/// Full document as pretty JSON, optionally converted to tool space
pub fn render_json(doc: &MeshDocument, tool_space: bool) -> Result<String> {
    let converted;
    let (space, document) = if tool_space {
        converted = doc.to_tool_space();
        ("tool", &converted)
    } else {
        ("engine", doc)
    };
    Ok(serde_json::to_string_pretty(&JsonDump { space, document })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_codec::{Meshpoint, decode, encode};

    fn sample() -> Vec<u8> {
        encode(&MeshDocument {
            meshpoints: vec![
                Meshpoint::new("center", [1.0, 2.0, 3.0]),
                Meshpoint::new("random_name", [0.0; 3]),
            ],
            materials: vec!["hull".into()],
            ..Default::default()
        })
    }

    #[test]
    fn test_summary_flags_invalid_and_unused() {
        let data = sample();
        let decoded = decode(&data).unwrap();
        let text = render_summary(&decoded, NamingRules::builtin());
        assert!(text.contains("meshpoints (2)"));
        assert!(text.contains("INVALID"));
        assert!(text.contains("[0] hull (unused)"));
    }

    #[test]
    fn test_json_tool_space() {
        let doc = decode(&sample()).unwrap().into_document();

        let engine: serde_json::Value =
            serde_json::from_str(&render_json(&doc, false).unwrap()).unwrap();
        assert_eq!(engine["space"], "engine");
        assert_eq!(engine["meshpoints"][0]["name"], "center");
        assert_eq!(engine["meshpoints"][0]["position"][1], 2.0);

        let tool: serde_json::Value =
            serde_json::from_str(&render_json(&doc, true).unwrap()).unwrap();
        assert_eq!(tool["space"], "tool");
        // Engine (1, 2, 3) maps to tool (-1, 3, 2)
        assert_eq!(tool["meshpoints"][0]["position"][0], -1.0);
        assert_eq!(tool["meshpoints"][0]["position"][1], 3.0);
        assert_eq!(tool["meshpoints"][0]["position"][2], 2.0);
    }
}
