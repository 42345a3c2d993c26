use super::{assemblies, translate_listings, type_id};
use crate::{NameRegistry, NameResolver, TypeUniverse};
use clrstub_metadata::{TypeName, TypeRef};
use std::collections::HashSet;

const FAMILIES: &str = r#"
assembly Demo
namespace Demo {
  public class Tuple { }
  public class Tuple`1<A> { }
  public class Tuple`2<A, B> { }
  public class Solo`1<T> { }
  public class Pair`1<A> {
    public class Node { }
  }
  public class Pair`2<A, B> { }
  class Internal`1<T> { }
  class Internal`2<A, B> { }
}
namespace Other {
  public class Tuple`1<A> { }
}
"#;

#[test]
fn test_generic_family_gets_arity_digits() {
    let assemblies = assemblies(&[FAMILIES]);
    let universe = TypeUniverse::build(&assemblies);
    let registry = NameRegistry::build(&universe);
    let names = NameResolver::new(&universe, &registry);

    assert_eq!(names.declared_name(type_id(&universe, "Demo.Tuple")), "Tuple");
    assert_eq!(names.declared_name(type_id(&universe, "Demo.Tuple`1")), "Tuple1");
    assert_eq!(names.declared_name(type_id(&universe, "Demo.Tuple`2")), "Tuple2");
    assert_eq!(names.declared_name(type_id(&universe, "Demo.Solo`1")), "Solo");
    // Families are per namespace
    assert_eq!(names.declared_name(type_id(&universe, "Other.Tuple`1")), "Tuple");
    // Only public types form families
    assert_eq!(names.declared_name(type_id(&universe, "Demo.Internal`1")), "Internal");
}

#[test]
fn test_closed_reference_uses_argument_count() {
    let assemblies = assemblies(&[FAMILIES]);
    let universe = TypeUniverse::build(&assemblies);
    let registry = NameRegistry::build(&universe);
    let names = NameResolver::new(&universe, &registry);

    let closed = TypeRef::generic(
        TypeName::new("Demo", "Pair`2"),
        vec![TypeRef::type_param("X"), TypeRef::type_param("Y")],
    );
    assert_eq!(names.simple_name_of(&closed).unwrap(), "Pair2");
    assert_eq!(names.simple_name_of(&TypeRef::type_param("X")), None);
}

#[test]
fn test_nested_names_prefix_declaring_type() {
    let assemblies = assemblies(&[FAMILIES]);
    let universe = TypeUniverse::build(&assemblies);
    let registry = NameRegistry::build(&universe);
    let names = NameResolver::new(&universe, &registry);

    assert_eq!(
        names.declared_name(type_id(&universe, "Demo.Pair`1/Node")),
        "Pair1_Node"
    );
}

#[test]
fn test_unregistered_reference_falls_back_to_base_name() {
    let assemblies = assemblies(&[FAMILIES]);
    let universe = TypeUniverse::build(&assemblies);
    let registry = NameRegistry::build(&universe);
    let names = NameResolver::new(&universe, &registry);

    assert_eq!(
        names.simple_name(&TypeName::new("System.Collections.Generic", "Dictionary`2"), Some(2)),
        "Dictionary"
    );
}

#[test]
fn test_registry_families() {
    let assemblies = assemblies(&[FAMILIES]);
    let universe = TypeUniverse::build(&assemblies);
    let registry = NameRegistry::build(&universe);

    assert_eq!(registry.family("Demo.Tuple").len(), 3);
    assert_eq!(registry.family("Demo.Pair.Node").len(), 1);
    assert!(registry.family("Demo.Internal").is_empty());
    assert!(registry.is_ambiguous("Demo.Pair"));
    assert!(!registry.is_ambiguous("Other.Tuple"));
}

#[test]
fn test_emitted_identifiers_are_unique_per_package() {
    let units = translate_listings(&[FAMILIES]);
    let mut seen = HashSet::new();
    for unit in &units {
        assert!(
            seen.insert((unit.package.clone(), unit.relative_path.clone())),
            "duplicate unit {}",
            unit.relative_path.display()
        );
    }
    assert_eq!(units.len(), 7);
}
