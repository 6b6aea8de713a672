//! Infers the resources a shader needs from its render-pass graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One stage of a shader's pipeline as stored under `renderpass`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPass {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PassInput>,
}

/// A channel feeding a render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassInput {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    /// Carried through untouched; no capability depends on it.
    #[serde(default)]
    pub sampler: Option<serde_json::Value>,
}

/// Capability recorded for a pass or input `type`.
///
/// Matching is case-insensitive. Unknown types get a `buf` suffix, so
/// `keyboard` becomes `keyboardbuf`. An empty type maps to nothing.
pub fn capability_for_type(kind: &str) -> Option<String> {
    let kind = kind.to_lowercase();
    let capability = match kind.as_str() {
        "" => return None,
        "image" | "buffer" => "imagebuf".to_string(),
        "sound" => "soundbuf".to_string(),
        "common" => "library".to_string(),
        "cubemap" => "cubemap".to_string(),
        other => format!("{other}buf"),
    };
    Some(capability)
}

fn references_texture(filepath: &str) -> bool {
    filepath.contains("/media/") || filepath.to_lowercase().contains("cubemap")
}

/// Union of every capability implied by `passes`.
pub fn infer_requirements(passes: &[RenderPass]) -> BTreeSet<String> {
    let mut required = BTreeSet::new();

    for pass in passes {
        for input in &pass.inputs {
            if let Some(cap) = input.kind.as_deref().and_then(capability_for_type)
            {
                required.insert(cap);
            }
            if input.filepath.as_deref().is_some_and(references_texture) {
                required.insert("texture".to_string());
            }
        }

        if let Some(cap) = pass.kind.as_deref().and_then(capability_for_type) {
            required.insert(cap);
        }
    }

    required
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(kind: &str, filepath: &str) -> PassInput {
        PassInput {
            kind: Some(kind.to_string()),
            filepath: Some(filepath.to_string()),
            sampler: None,
        }
    }

    fn pass(kind: &str, inputs: Vec<PassInput>) -> RenderPass {
        RenderPass {
            kind: Some(kind.to_string()),
            inputs,
        }
    }

    #[test]
    fn special_types() {
        assert_eq!(capability_for_type("image").as_deref(), Some("imagebuf"));
        assert_eq!(capability_for_type("Buffer").as_deref(), Some("imagebuf"));
        assert_eq!(capability_for_type("SOUND").as_deref(), Some("soundbuf"));
        assert_eq!(capability_for_type("common").as_deref(), Some("library"));
        assert_eq!(capability_for_type("cubemap").as_deref(), Some("cubemap"));
    }

    #[test]
    fn other_types_get_buf_suffix() {
        assert_eq!(
            capability_for_type("keyboard").as_deref(),
            Some("keyboardbuf")
        );
        assert_eq!(
            capability_for_type("texture").as_deref(),
            Some("texturebuf")
        );
        assert_eq!(capability_for_type(""), None);
    }

    #[test]
    fn buffer_input_implies_imagebuf() {
        let passes = vec![pass("", vec![input("buffer", "")])];
        assert!(infer_requirements(&passes).contains("imagebuf"));
    }

    #[test]
    fn media_path_implies_texture() {
        let passes = vec![pass(
            "image",
            vec![input("texture", "/media/a/0c7bf5fe9462d5bf.png")],
        )];
        let required = infer_requirements(&passes);

        assert!(required.contains("texture"));
        assert!(required.contains("texturebuf"));
        assert!(required.contains("imagebuf"));
    }

    #[test]
    fn cubemap_path_is_case_insensitive() {
        let passes = vec![pass("", vec![input("", "presets/CubeMap00.jpg")])];
        let required = infer_requirements(&passes);

        assert_eq!(required, BTreeSet::from(["texture".to_string()]));
    }

    #[test]
    fn pass_types_contribute() {
        let passes = vec![
            pass("common", vec![]),
            pass("sound", vec![]),
            pass("cubemap", vec![]),
        ];
        let required = infer_requirements(&passes);

        assert_eq!(
            required,
            BTreeSet::from([
                "cubemap".to_string(),
                "library".to_string(),
                "soundbuf".to_string(),
            ])
        );
    }

    #[test]
    fn empty_pass_list_is_empty() {
        assert!(infer_requirements(&[]).is_empty());
    }

    #[test]
    fn missing_type_fields_contribute_nothing() {
        let passes = vec![RenderPass {
            kind: None,
            inputs: vec![PassInput::default()],
        }];
        assert!(infer_requirements(&passes).is_empty());
    }

    #[test]
    fn inference_is_idempotent() {
        let passes = vec![
            pass("image", vec![input("keyboard", ""), input("buffer", "")]),
            pass("buffer", vec![input("buffer", "")]),
        ];
        let first = infer_requirements(&passes);
        let second = infer_requirements(&passes);

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn deserializes_shadertoy_passes() {
        let raw = json!([{
            "type": "image",
            "name": "Image",
            "inputs": [{
                "id": 17,
                "type": "texture",
                "filepath": "/media/a/rgba-noise.png",
                "sampler": { "filter": "mipmap", "wrap": "repeat" }
            }, {
                "type": "music"
            }],
            "outputs": []
        }]);
        let passes: Vec<RenderPass> = serde_json::from_value(raw).unwrap();

        assert_eq!(passes[0].inputs.len(), 2);
        assert!(passes[0].inputs[0].sampler.is_some());
        assert_eq!(
            infer_requirements(&passes),
            BTreeSet::from([
                "imagebuf".to_string(),
                "musicbuf".to_string(),
                "texture".to_string(),
                "texturebuf".to_string(),
            ])
        );
    }
}
