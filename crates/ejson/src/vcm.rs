//! Variant-Construction-Method tree.
//!
//! A deferred-evaluation AST: the tokenizer/parser builds this tree; a
//! separate evaluator would walk it against a runtime scope to produce a
//! `Variant`. Every node tracks whether the parser still considers it open
//! to further children ([`VcmNode::is_closed`]/`close`).

use purc_core::Variant;

#[derive(Debug, Clone, PartialEq)]
pub enum VcmKind {
    /// A literal scalar, already a fully-formed `Variant` (number, string,
    /// boolean, null, undefined, byte sequence, keyword).
    Literal(Variant),
    /// `$name` / `$$...$name` — a variable getter.
    GetVariable(Box<VcmNode>),
    /// `expr[elem]` or `expr.name` — element/attribute access.
    GetElement(Box<VcmNode>, Box<VcmNode>),
    /// `expr(args...)` — call-getter.
    CallGetter(Box<VcmNode>, Vec<VcmNode>),
    /// `expr(!args...)` — call-setter.
    CallSetter(Box<VcmNode>, Vec<VcmNode>),
    /// `"...${expr}..."` — string template pieces concatenated in order.
    ConcatString(Vec<VcmNode>),
    /// `{ "k": v, ... }` — object literal; keys are themselves VCM nodes
    /// (always string literals in practice, but the grammar allows a
    /// general expression).
    ObjectLiteral(Vec<(VcmNode, VcmNode)>),
    /// `[ v, ... ]` — array literal.
    ArrayLiteral(Vec<VcmNode>),
    /// `{{ clause (&& | || | ;) clause ... }}` — chained JSON expressions.
    Cjsonee {
        clauses: Vec<VcmNode>,
        joiners: Vec<CjsoneeJoiner>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CjsoneeJoiner {
    And,
    Or,
    Sequence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VcmNode {
    pub kind: VcmKind,
    closed: bool,
}

impl VcmNode {
    pub fn new(kind: VcmKind) -> Self {
        Self { kind, closed: false }
    }

    pub fn closed(kind: VcmKind) -> Self {
        Self { kind, closed: true }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn literal(v: Variant) -> Self {
        Self::closed(VcmKind::Literal(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_nodes_are_born_closed() {
        let node = VcmNode::literal(Variant::make_number(1.0));
        assert!(node.is_closed());
    }

    #[test]
    fn fresh_node_can_be_closed() {
        let mut node = VcmNode::new(VcmKind::ArrayLiteral(Vec::new()));
        assert!(!node.is_closed());
        node.close();
        assert!(node.is_closed());
    }
}
