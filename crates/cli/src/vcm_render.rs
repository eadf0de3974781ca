//! Converts a fully-literal VCM tree back into a `Variant` so it can be
//! re-serialized through the same canonical stringifier the tokenizer's
//! literals came from. There is no evaluator in this workspace, so any
//! node that requires runtime context (a variable getter, a call, string
//! interpolation) is reported as an error instead of guessed at.

use purc_core::Variant;
use purc_ejson::VcmNode;
use purc_ejson::vcm::VcmKind;
use purc_runtime::{Array, Object};

pub fn literal_to_variant(node: &VcmNode) -> Result<Variant, String> {
    match &node.kind {
        VcmKind::Literal(v) => Ok(v.clone()),
        VcmKind::ObjectLiteral(entries) => {
            let obj = Object::new();
            for (key_node, value_node) in entries {
                let VcmKind::Literal(Variant::String(key)) = &key_node.kind else {
                    return Err("object key is not a literal string; cannot re-serialize without an evaluator".into());
                };
                let value = literal_to_variant(value_node)?;
                obj.set_by_ckey(key, value).map_err(|e| e.message)?;
            }
            Ok(obj.to_variant())
        }
        VcmKind::ArrayLiteral(items) => {
            let values: Result<Vec<Variant>, String> = items.iter().map(literal_to_variant).collect();
            Ok(Array::from_values(values?).to_variant())
        }
        VcmKind::ConcatString(pieces) => {
            let mut out = String::new();
            for piece in pieces {
                match literal_to_variant(piece)? {
                    Variant::String(s) => out.push_str(&s),
                    other => return Err(format!("cannot concatenate a non-string piece ({other:?}) without an evaluator")),
                }
            }
            Ok(Variant::make_string(out))
        }
        other => Err(format!(
            "{other:?} requires runtime evaluation (variable lookup, element access, or a call), which this tool does not perform"
        )),
    }
}
