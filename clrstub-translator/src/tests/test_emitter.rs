use super::{assemblies, find_unit, translate_listings};
use crate::{translate, GenerateError, PackageOptions};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

const SYSTEM: &str = r#"
assembly mscorlib
namespace System {
  public class EventArgs { }
  public sealed class EventHandler extends System.Object {
    public virtual method Invoke(sender : System.Object, e : System.EventArgs) : System.Void
  }
  public sealed class EventHandler`1<TEventArgs> extends System.Object {
    public virtual method Invoke(sender : System.Object, e : !TEventArgs) : System.Void
  }
  public sealed class Action`1<T> extends System.Object {
    public virtual method Invoke(obj : !T) : System.Void
  }
}
"#;

#[test]
fn test_class_declaration() {
    let demo = r#"
assembly Demo
namespace Demo {
  public sealed class Widget extends System.Object implements Demo.IThing {
    public field Count : System.Int32
    public static field Ratio : System.Single
    field secret : System.String
    public property Name : System.String { get; set; }
    public property Id : System.Int64 { get; }
    public event Changed : System.EventHandler { add; remove; }
    public ctor()
    public ctor(capacity : System.Int32)
    public method Poke() : System.Void
    public method Resize(width : System.Int32, height : System.Single) : System.Boolean
  }
  public interface IThing {
    public method Poke() : System.Void
  }
}
"#;
    let units = translate_listings(&[SYSTEM, demo]);
    let widget = find_unit(&units, "Demo.Widget");

    let expected = r#"package dotnet.demo;

@:native("Demo.Widget") @:final
extern class Widget extends dotnet.system.Object implements IThing {
  public var Changed(default,null) : dotnet.system.NativeEvent<dotnet.system.EventArgs>;
  public var Count : Int;
  public static var Ratio : Single;
  public var Name : String;
  public var Id(default,never) : dotnet.system.Int64;

  public function Poke() : Void;

  public function Resize(width:Int, height:Float) : Bool;

  @:overload(function(capacity:Int) : Void {})
  public function new() : Void;
}

"#;
    assert_eq!(widget.contents, expected);
    assert_eq!(widget.package, "dotnet.demo");
    assert_eq!(widget.relative_path, PathBuf::from("demo").join("Widget.hx"));
    assert_eq!(widget.companions, 0);
}

#[test]
fn test_interface_declaration() {
    let demo = r#"
assembly Demo
namespace Demo {
  public interface IBase {
    public method Reset() : System.Void
  }
  public interface IThing implements Demo.IBase, Demo.IHidden {
    public method Poke(times : System.Int32) : System.Void
    public property Size : System.Int32 { get; }
  }
  interface IHidden { }
}
"#;
    let units = translate_listings(&[demo]);
    let thing = find_unit(&units, "Demo.IThing");

    let expected = r#"package dotnet.demo;

@:native("Demo.IThing")
extern interface IThing extends IBase {

  function Poke(times:Int) : Void;
}

"#;
    assert_eq!(thing.contents, expected);
    assert!(units.iter().all(|unit| unit.type_name != "Demo.IHidden"));
}

#[test]
fn test_enum_declaration() {
    let demo = r#"
assembly Demo
namespace Demo {
  public enum Color {
    public specialname field value__ : System.Int32
    public static field Red : Demo.Color
    public static field Green : Demo.Color
    public static field Blue : Demo.Color
  }
}
"#;
    let units = translate_listings(&[demo]);
    let color = find_unit(&units, "Demo.Color");

    let expected = r#"package dotnet.demo;

@:fakeEnum(Int) @:native("Demo.Color")
extern enum Color {
  Red;
  Green;
  Blue;
}

"#;
    assert_eq!(color.contents, expected);
    assert_eq!(color.contents.matches(';').count(), 4);
}

#[test]
fn test_enum_without_storage_is_malformed() {
    let demo = r#"
assembly Demo
namespace Demo {
  public enum Broken {
    public static field Only : Demo.Broken
  }
}
"#;
    let result = translate(&assemblies(&[demo]), &PackageOptions::default());
    match result {
        Err(GenerateError::MalformedMetadata { type_name, .. }) => {
            assert_eq!(type_name, "Demo.Broken")
        }
        other => panic!("Expected malformed metadata, got: {:?}", other),
    }
}

#[test]
fn test_nested_types_are_flattened_before_owner() {
    let demo = r#"
assembly Demo
namespace Demo {
  public class Outer {
    public field Child : Demo.Outer/Inner
    public class Inner {
      public field Parent : Demo.Outer
    }
    class Hidden { }
  }
  public class User {
    public field Item : Demo.Outer/Inner
  }
}
"#;
    let units = translate_listings(&[demo]);
    assert_eq!(units.len(), 2);

    let expected = r#"package dotnet.demo;

@:native("Demo.Outer.Inner")
extern class Outer_Inner {
  public var Parent : Outer;
}

@:native("Demo.Outer")
extern class Outer {
  public var Child : Outer_Inner;
}

"#;
    assert_eq!(find_unit(&units, "Demo.Outer").contents, expected);
    assert!(find_unit(&units, "Demo.User")
        .contents
        .contains("  public var Item : Outer.Outer_Inner;\n"));
}

#[test]
fn test_events() {
    let demo = r#"
assembly Demo
namespace Demo {
  public class ClickArgs { }
  public class Button {
    public event Clicked : System.EventHandler`1<Demo.ClickArgs> { add; remove; }
    public static event Counted : System.Action`1<System.Int32> { add; remove; }
    public event Secret : System.EventHandler { add private; remove private; }
    public event Unknown : Other.Handler { add; remove; }
    public event Raw : System.EventHandler`1<System.Object> { add; remove; }
  }
}
"#;
    let units = translate_listings(&[SYSTEM, demo]);
    let button = &find_unit(&units, "Demo.Button").contents;

    assert!(button.contains(
        "  public var Clicked(default,null) : dotnet.system.NativeEvent<ClickArgs>;\n"
    ));
    assert!(button.contains(
        "  public static var Counted(default,null) : dotnet.system.NativeEvent1<Int>;\n"
    ));
    // Event arguments use the general table
    assert!(button.contains(
        "  public var Raw(default,null) : dotnet.system.NativeEvent<Dynamic>;\n"
    ));
    assert!(!button.contains("Secret"));
    assert!(!button.contains("Unknown"));
}

#[test]
fn test_delegate_without_invoke_is_malformed() {
    let demo = r#"
assembly Demo
namespace Demo {
  public class NotADelegate { }
  public class Button {
    public event Clicked : Demo.NotADelegate { add; remove; }
  }
}
"#;
    let result = translate(&assemblies(&[demo]), &PackageOptions::default());
    assert!(matches!(
        result,
        Err(GenerateError::MalformedMetadata { type_name, .. }) if type_name == "Demo.NotADelegate"
    ));
}

#[test]
fn test_properties() {
    let demo = r#"
assembly Demo
namespace Demo {
  public class Base {
    public virtual property Name : System.String { get; set; }
  }
  public class Derived extends Demo.Base {
    public virtual property Name : System.String { get; set; }
    public property Item : System.String [index : System.Int32] { get; set; }
    public property WriteOnly : System.Double { set; }
    public property Hidden : System.Double { get private; set private; }
    public static property Default : Demo.Derived { get; }
  }
}
"#;
    let units = translate_listings(&[demo]);
    let derived = &find_unit(&units, "Demo.Derived").contents;

    assert!(!derived.contains("Name"));
    assert!(!derived.contains("Item"));
    assert!(!derived.contains("Hidden"));
    assert!(derived.contains("  public var WriteOnly(never,default) : Float;\n"));
    assert!(derived.contains("  public static var Default(default,never) : Derived;\n"));
}

#[test]
fn test_builtin_types_are_not_emitted() {
    let system = r#"
assembly mscorlib
namespace System {
  public sealed class String { }
  public class Type { }
  public class Version { }
}
"#;
    let units = translate_listings(&[system]);
    let names: Vec<&str> = units.iter().map(|unit| unit.type_name.as_str()).collect();
    assert_eq!(names, vec!["System.Version"]);
}

#[test]
fn test_global_namespace_unit() {
    let scripts = r#"
assembly Scripts
namespace {
  public class GameManager {
    public method Start() : System.Void
  }
}
"#;
    let units = translate_listings(&[scripts]);
    let manager = find_unit(&units, "GameManager");
    assert!(manager.contents.starts_with("package dotnet;\n\n"));
    assert_eq!(manager.relative_path, PathBuf::from("GameManager.hx"));
}

#[test]
fn test_units_follow_input_order() {
    let first = "assembly First\nnamespace A {\n  public class Zed { }\n  public class Alpha { }\n}\n";
    let second = "assembly Second\nnamespace B {\n  public class Middle { }\n}\n";
    let units = translate_listings(&[first, second]);
    let names: Vec<&str> = units.iter().map(|unit| unit.type_name.as_str()).collect();
    assert_eq!(names, vec!["A.Zed", "A.Alpha", "B.Middle"]);
}

#[test]
fn test_translation_is_idempotent() {
    let demo = r#"
assembly Demo
namespace Demo {
  public class Box`1<T> {
    public static method Create(value : !T) : Demo.Box`1<!T>
    public method Get() : !T
  }
  public class Box`2<A, B> { }
}
"#;
    let first = translate_listings(&[SYSTEM, demo]);
    let second = translate_listings(&[SYSTEM, demo]);
    assert_eq!(first, second);
}
