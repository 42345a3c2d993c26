use crate::error::ParseError;
use crate::model::*;
use crate::parse_type_ref;

#[test]
fn test_primitive_names_parse_to_primitives() {
    assert_eq!(
        parse_type_ref("System.Int32").unwrap(),
        TypeRef::Primitive(PrimitiveKind::Int32)
    );
    assert_eq!(
        parse_type_ref("System.String").unwrap(),
        TypeRef::Primitive(PrimitiveKind::String)
    );
    assert_eq!(
        parse_type_ref("System.Void").unwrap(),
        TypeRef::Primitive(PrimitiveKind::Void)
    );
}

#[test]
fn test_nominal_reference_splits_namespace() {
    let ty = parse_type_ref("System.Collections.ArrayList").unwrap();
    assert_eq!(
        ty,
        TypeRef::Named(TypeName::new("System.Collections", "ArrayList"))
    );
}

#[test]
fn test_generic_parameters_record_owner() {
    assert_eq!(parse_type_ref("!T").unwrap(), TypeRef::type_param("T"));
    assert_eq!(parse_type_ref("!!TResult").unwrap(), TypeRef::method_param("TResult"));
}

#[test]
fn test_generic_instance_with_nested_arguments() {
    let ty = parse_type_ref(
        "System.Collections.Generic.Dictionary`2<System.String, System.Collections.Generic.List`1<!!T>>",
    )
    .unwrap();

    match ty {
        TypeRef::GenericInstance {
            definition,
            arguments,
        } => {
            assert_eq!(definition.namespace, "System.Collections.Generic");
            assert_eq!(definition.name, "Dictionary`2");
            assert_eq!(arguments.len(), 2);
            assert_eq!(arguments[0], TypeRef::Primitive(PrimitiveKind::String));
            match &arguments[1] {
                TypeRef::GenericInstance { arguments, .. } => {
                    assert_eq!(arguments, &vec![TypeRef::method_param("T")]);
                }
                other => panic!("Expected generic instance, got: {:?}", other),
            }
        }
        other => panic!("Expected generic instance, got: {:?}", other),
    }
}

#[test]
fn test_array_ranks() {
    assert_eq!(
        parse_type_ref("System.Byte[]").unwrap(),
        TypeRef::array_of(TypeRef::Primitive(PrimitiveKind::Byte), 1)
    );
    assert_eq!(
        parse_type_ref("System.Double[,,]").unwrap(),
        TypeRef::array_of(TypeRef::Primitive(PrimitiveKind::Double), 3)
    );
}

#[test]
fn test_suffixes_apply_left_to_right() {
    // Jagged array passed by reference
    let ty = parse_type_ref("System.Int32[][]&").unwrap();
    let expected = TypeRef::by_ref(TypeRef::array_of(
        TypeRef::array_of(TypeRef::Primitive(PrimitiveKind::Int32), 1),
        1,
    ));
    assert_eq!(ty, expected);

    let pointer = parse_type_ref("System.Byte*").unwrap();
    assert_eq!(
        pointer,
        TypeRef::Indirect {
            kind: Indirection::Pointer,
            element: Box::new(TypeRef::Primitive(PrimitiveKind::Byte)),
        }
    );
}

#[test]
fn test_nested_type_path() {
    let ty = parse_type_ref("System.Collections.Generic.Dictionary`2/KeyCollection").unwrap();
    match ty {
        TypeRef::Named(name) => {
            assert_eq!(name.namespace, "System.Collections.Generic");
            assert_eq!(name.enclosing, vec!["Dictionary`2".to_string()]);
            assert_eq!(name.name, "KeyCollection");
        }
        other => panic!("Expected nested named type, got: {:?}", other),
    }
}

#[test]
fn test_trailing_input_is_rejected() {
    assert!(parse_type_ref("System.Int32 garbage").is_err());
}

#[test]
fn test_trailing_input_label_ignores_leading_whitespace() {
    match parse_type_ref("   System.Int32 garbage") {
        Err(ParseError::Syntax { src, span, .. }) => {
            let labelled = &src[span.offset()..span.offset() + span.len()];
            assert_eq!(labelled.trim(), "garbage");
        }
        other => panic!("Expected syntax error, got: {:?}", other),
    }
}

#[test]
fn test_display_round_trips_listing_syntax() {
    let source = "System.Collections.Generic.List`1<!!T>[,]&";
    let ty = parse_type_ref(source).unwrap();
    assert_eq!(ty.to_string(), source);
}
