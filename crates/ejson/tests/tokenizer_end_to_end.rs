use purc_core::{AtomTable, PurcErrorKind, Variant};
use purc_ejson::vcm::VcmKind;
use purc_ejson::{Tokenizer, TokenizerConfig};

fn tokenize(src: &str) -> purc_ejson::Result<purc_ejson::VcmNode> {
    let mut tk = Tokenizer::new(TokenizerConfig::default());
    let mut atoms = AtomTable::new();
    tk.tokenize(src, &mut atoms)
}

#[test]
fn nested_object_and_array_literal_round_trips_through_stringify() {
    let node = tokenize(r#"{"name": "foo", "tags": ["a", "b"], "count": 2}"#).unwrap();
    let VcmKind::ObjectLiteral(entries) = node.kind else {
        panic!("expected an object literal");
    };
    assert_eq!(entries.len(), 3);
    let (_, tags) = &entries[1];
    match &tags.kind {
        VcmKind::ArrayLiteral(items) => assert_eq!(items.len(), 2),
        other => panic!("expected array literal, got {other:?}"),
    }
}

#[test]
fn variable_getter_chained_with_element_and_call() {
    let node = tokenize("$DATA.items[0](!1, 2)").unwrap();
    match node.kind {
        VcmKind::CallSetter(target, args) => {
            assert_eq!(args.len(), 2);
            assert!(matches!(target.kind, VcmKind::GetElement(_, _)));
        }
        other => panic!("expected a call-setter over a chained getter, got {other:?}"),
    }
}

#[test]
fn string_interpolation_embeds_a_full_sub_expression() {
    let node = tokenize(r#""prefix-${$FOO(1)}-suffix""#).unwrap();
    match node.kind {
        VcmKind::ConcatString(pieces) => {
            assert_eq!(pieces.len(), 3);
            assert!(matches!(pieces[1].kind, VcmKind::CallGetter(_, _)));
        }
        other => panic!("expected ConcatString, got {other:?}"),
    }
}

#[test]
fn byte_sequence_literals_decode_all_three_forms() {
    let hex = tokenize("bxcafe").unwrap();
    assert_eq!(hex.kind, VcmKind::Literal(Variant::make_bytes([0xca, 0xfe])));

    let binary = tokenize("bb01000001").unwrap();
    assert_eq!(binary.kind, VcmKind::Literal(Variant::make_bytes([0x41])));

    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
    let b64 = tokenize(&format!("b64{encoded}")).unwrap();
    assert_eq!(b64.kind, VcmKind::Literal(Variant::make_bytes([1, 2, 3])));
}

#[test]
fn cjsonee_sequence_of_three_clauses() {
    let node = tokenize("{{ 1 ; 2 ; 3 }}").unwrap();
    match node.kind {
        VcmKind::Cjsonee { clauses, joiners } => {
            assert_eq!(clauses.len(), 3);
            assert_eq!(joiners.len(), 2);
        }
        other => panic!("expected Cjsonee, got {other:?}"),
    }
}

#[test]
fn unterminated_object_literal_reports_eof_with_position() {
    let err = tokenize(r#"{"a": 1"#).unwrap_err();
    assert_eq!(err.kind, PurcErrorKind::UnexpectedEof);
}

#[test]
fn unknown_keyword_reports_unexpected_character() {
    let err = tokenize("nope").unwrap_err();
    assert_eq!(err.kind, PurcErrorKind::UnexpectedCharacter);
}

#[test]
fn deeply_nested_array_exceeds_default_max_depth() {
    let mut config = TokenizerConfig::default();
    config.max_depth = 4;
    let mut tk = Tokenizer::new(config);
    let mut atoms = AtomTable::new();
    let nested = "[".repeat(10) + &"1" + &"]".repeat(10);
    let err = tk.tokenize(&nested, &mut atoms).unwrap_err();
    assert_eq!(err.kind, PurcErrorKind::MaxDepthExceeded);
}

#[test]
fn number_suffixes_select_the_matching_variant_kind() {
    assert_eq!(tokenize("7L").unwrap().kind, VcmKind::Literal(Variant::make_longint(7)));
    assert_eq!(tokenize("7UL").unwrap().kind, VcmKind::Literal(Variant::make_ulongint(7)));
    assert_eq!(tokenize("7FL").unwrap().kind, VcmKind::Literal(Variant::make_longdouble(7.0)));
    assert_eq!(tokenize("7.5").unwrap().kind, VcmKind::Literal(Variant::make_number(7.5)));
}

#[test]
fn array_literal_with_doubled_comma_is_rejected() {
    let err = tokenize("[1, , 2]").unwrap_err();
    assert_eq!(err.kind, PurcErrorKind::UnexpectedComma);
}

#[test]
fn object_literal_is_a_valid_container_variant() {
    let node = tokenize(r#"{"a": true}"#).unwrap();
    let VcmKind::ObjectLiteral(entries) = node.kind else {
        panic!("expected an object literal");
    };
    let (_, value_node) = &entries[0];
    let VcmKind::Literal(v) = &value_node.kind else {
        panic!("expected a literal value");
    };
    assert!(matches!(v, Variant::Boolean(true)));
}
