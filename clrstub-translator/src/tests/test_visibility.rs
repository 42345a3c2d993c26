use super::{assemblies, find_unit, translate_listings, type_id};
use crate::visibility::{ArityMatch, MethodResolution, VisibilityResolver};
use crate::TypeUniverse;
use clrstub_metadata::Method;
use pretty_assertions::assert_eq;

const HIERARCHY: &str = r#"
assembly Demo
namespace Demo {
  public interface IBase {
    public method Reset() : System.Void
  }
  public interface IDerived implements Demo.IBase {
    public method Step() : System.Void
  }
  interface ISecret {
    public method Hide() : System.Void
  }
  public class Root implements Demo.IBase {
    public virtual method Reset() : System.Void
    public virtual method Draw(x : System.Int32) : System.Void
  }
  public class Middle extends Demo.Root implements Demo.ISecret {
    private virtual method Hide() : System.Void
  }
  public class Leaf extends Demo.Middle implements Demo.IDerived {
    public virtual method Draw(y : System.Int32) : System.Void
    public virtual method Reset() : System.Void
    public virtual method Step() : System.Void
    public static operator method op_Implicit(value : Demo.Leaf) : System.Int32
    public property Size : System.Int32 { get; }
  }
}
"#;

fn method<'a>(universe: &TypeUniverse<'a>, type_name: &str, name: &str) -> &'a Method {
    universe
        .entity(type_id(universe, type_name))
        .methods
        .iter()
        .find(|method| method.name == name)
        .unwrap()
}

#[test]
fn test_closures() {
    let assemblies = assemblies(&[HIERARCHY]);
    let universe = TypeUniverse::build(&assemblies);
    let leaf = universe.closure(type_id(&universe, "Demo.Leaf"));

    assert_eq!(
        leaf.ancestors,
        vec![type_id(&universe, "Demo.Middle"), type_id(&universe, "Demo.Root")]
    );

    let mut interfaces = leaf.interfaces.clone();
    interfaces.sort();
    let mut expected = vec![type_id(&universe, "Demo.IDerived"), type_id(&universe, "Demo.IBase")];
    expected.sort();
    assert_eq!(interfaces, expected);
    assert!(leaf.contract_names.contains("Reset"));
    assert!(leaf.contract_names.contains("Step"));

    // Internal interfaces never count
    let middle = universe.closure(type_id(&universe, "Demo.Middle"));
    assert!(middle.interfaces.is_empty());
    assert_eq!(middle.all_interfaces, vec![type_id(&universe, "Demo.IBase")]);

    assert!(leaf.instance_names.contains("Draw"));
    assert!(leaf.instance_names.contains("Step"));
    assert!(!leaf.instance_names.contains("Hide"));
    assert!(!leaf.instance_names.contains("op_Implicit"));
    assert!(!leaf.instance_names.contains("get_Size"));
}

#[test]
fn test_candidates() {
    let assemblies = assemblies(&[HIERARCHY]);
    let universe = TypeUniverse::build(&assemblies);
    let resolver = VisibilityResolver::new(&universe);
    let leaf = type_id(&universe, "Demo.Leaf");
    let middle = type_id(&universe, "Demo.Middle");

    assert!(resolver.is_candidate(leaf, method(&universe, "Demo.Leaf", "Step")));
    assert!(!resolver.is_candidate(leaf, method(&universe, "Demo.Leaf", "op_Implicit")));
    assert!(!resolver.is_candidate(leaf, method(&universe, "Demo.Leaf", "get_Size")));
    // Private, and the only interface requiring it is not public
    assert!(!resolver.is_candidate(middle, method(&universe, "Demo.Middle", "Hide")));
}

#[test]
fn test_ancestor_lookup() {
    let assemblies = assemblies(&[HIERARCHY]);
    let universe = TypeUniverse::build(&assemblies);
    let resolver = VisibilityResolver::new(&universe);
    let leaf = type_id(&universe, "Demo.Leaf");
    let draw = method(&universe, "Demo.Leaf", "Draw");

    let ancestor = resolver
        .visible_ancestor_method(leaf, draw, ArityMatch::Exact)
        .unwrap();
    assert_eq!(ancestor.declaring, type_id(&universe, "Demo.Root"));
    assert!(resolver
        .visible_ancestor_method(leaf, method(&universe, "Demo.Leaf", "Step"), ArityMatch::Any)
        .is_none());
}

#[test]
fn test_resolutions() {
    let assemblies = assemblies(&[HIERARCHY]);
    let universe = TypeUniverse::build(&assemblies);
    let resolver = VisibilityResolver::new(&universe);
    let leaf = type_id(&universe, "Demo.Leaf");

    // Same name and arity as Root.Draw, no new contract
    assert!(matches!(
        resolver.resolve(leaf, method(&universe, "Demo.Leaf", "Draw")),
        MethodResolution::Hidden
    ));
    // IBase is already satisfied by Root
    assert!(matches!(
        resolver.resolve(leaf, method(&universe, "Demo.Leaf", "Reset")),
        MethodResolution::Hidden
    ));
    assert!(matches!(
        resolver.resolve(leaf, method(&universe, "Demo.Leaf", "Step")),
        MethodResolution::Emit
    ));
    assert!(matches!(
        resolver.resolve(leaf, method(&universe, "Demo.Leaf", "op_Implicit")),
        MethodResolution::Ineligible
    ));
}

#[test]
fn test_override_suppression() {
    let listing = r#"
assembly Demo
namespace Demo {
  public class A {
    public virtual method M(x : System.Int32) : System.Void
  }
  public class B extends Demo.A {
    public virtual method M(y : System.Int32) : System.Void
    public method N() : System.Void
  }
}
"#;
    let units = translate_listings(&[listing]);
    let b = &find_unit(&units, "Demo.B").contents;
    assert!(!b.contains("function M"));
    assert!(b.contains("  public function N() : Void;\n"));
}

#[test]
fn test_new_overload_is_not_hidden() {
    let listing = r#"
assembly Demo
namespace Demo {
  public class A {
    public virtual method M(x : System.Int32) : System.Void
  }
  public class B extends Demo.A {
    public method M(x : System.Int32, y : System.Int32) : System.Void
  }
}
"#;
    let units = translate_listings(&[listing]);
    assert!(find_unit(&units, "Demo.B")
        .contents
        .contains("  public function M(x:Int, y:Int) : Void;\n"));
}

#[test]
fn test_forced_override_retention() {
    let listing = r#"
assembly Demo
namespace Demo {
  public interface I {
    public method M() : System.Void
  }
  public class A {
    public virtual method M(x : System.Int32) : System.Void
  }
  public class B extends Demo.A implements Demo.I {
    public virtual method M() : System.Void
  }
}
"#;
    let units = translate_listings(&[listing]);
    let expected = r#"package dotnet.demo;

@:native("Demo.B")
extern class B extends A implements I {

  @:overload(function(x:Int) : Void {})
  public override function M() : Void;
}

"#;
    assert_eq!(find_unit(&units, "Demo.B").contents, expected);
}

#[test]
fn test_forced_override_with_equal_arity() {
    let listing = r#"
assembly Demo
namespace Demo {
  public interface I {
    public method M() : System.Void
  }
  public class A {
    public virtual method M() : System.Int32
  }
  public class B extends Demo.A implements Demo.I {
    public virtual method M() : System.Void
  }
}
"#;
    let units = translate_listings(&[listing]);
    let b = &find_unit(&units, "Demo.B").contents;
    assert!(b.contains(
        "  @:overload(function() : Int {})\n  public override function M() : Void;\n"
    ));
    assert_eq!(b.matches("function").count(), 2);
}

#[test]
fn test_forced_override_with_identical_signature() {
    let listing = r#"
assembly Demo
namespace Demo {
  public interface I {
    public method M() : System.Void
  }
  public class A {
    public virtual method M() : System.Void
  }
  public class B extends Demo.A implements Demo.I {
    public virtual method M() : System.Void
  }
}
"#;
    let units = translate_listings(&[listing]);
    let b = &find_unit(&units, "Demo.B").contents;
    assert!(b.contains(
        "  @:overload(function() : Void {})\n  public override function M() : Void;\n"
    ));
    assert_eq!(b.matches("function").count(), 2);
}
