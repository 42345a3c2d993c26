// clrstub Metadata Model
// Read-only object graph of an assembly's declared types and members

use std::fmt;

/// Source position information for listing entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A loaded assembly and its top-level types
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub name: String,
    pub types: Vec<TypeEntity>,
    pub source_file: Option<String>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            source_file: None,
        }
    }

    /// Every namespace declared by a top-level type of this assembly
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|ty| ty.namespace.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

/// A declared type. Nested types are owned by their declaring type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntity {
    /// Namespace of the type, or of its top-level declaring type when nested
    pub namespace: String,
    /// Raw names of the enclosing types, outermost first
    pub enclosing: Vec<String>,
    /// Raw name including any generic arity marker (e.g. ``List`1``)
    pub name: String,
    pub kind: TypeKind,
    pub visibility: Visibility,
    pub is_sealed: bool,
    pub generic_params: Vec<String>,
    pub base_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub nested_types: Vec<TypeEntity>,
    pub fields: Vec<Field>,
    pub properties: Vec<Property>,
    pub events: Vec<Event>,
    pub methods: Vec<Method>,
    pub span: Span,
}

impl TypeEntity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            namespace: namespace.into(),
            enclosing: Vec::new(),
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            is_sealed: false,
            generic_params: Vec::new(),
            base_type: None,
            interfaces: Vec::new(),
            nested_types: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            methods: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_nested(&self) -> bool {
        !self.enclosing.is_empty()
    }

    pub fn generic_arity(&self) -> usize {
        self.generic_params.len()
    }

    /// Name with the generic arity marker stripped
    pub fn base_name(&self) -> &str {
        strip_arity(&self.name)
    }

    /// The name a reference to this type carries
    pub fn type_name(&self) -> TypeName {
        TypeName {
            namespace: self.namespace.clone(),
            enclosing: self.enclosing.clone(),
            name: self.name.clone(),
        }
    }

    pub fn method(&self, index: usize) -> Option<&Method> {
        self.methods.get(index)
    }

    /// The delegate invocation contract, if this type declares one
    pub fn invoke_method(&self) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == "Invoke")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: TypeRef,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_special_name: bool,
    pub span: Span,
}

/// Property with accessor indices into the declaring type's method list
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub property_type: TypeRef,
    pub getter: Option<usize>,
    pub setter: Option<usize>,
    pub index_params: Vec<Parameter>,
    pub span: Span,
}

impl Property {
    pub fn is_indexer(&self) -> bool {
        !self.index_params.is_empty()
    }
}

/// Event with accessor indices into the declaring type's method list
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub handler_type: TypeRef,
    pub adder: Option<usize>,
    pub remover: Option<usize>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessorKind {
    #[default]
    None,
    Getter,
    Setter,
    Adder,
    Remover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Raw name, possibly qualified by an explicitly implemented interface
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_constructor: bool,
    pub is_operator: bool,
    pub accessor: AccessorKind,
    pub generic_params: Vec<String>,
    pub params: Vec<Parameter>,
    pub return_type: TypeRef,
    pub span: Span,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_virtual: false,
            is_constructor: false,
            is_operator: false,
            accessor: AccessorKind::None,
            generic_params: Vec::new(),
            params: Vec::new(),
            return_type: TypeRef::Primitive(PrimitiveKind::Void),
            span: Span::default(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    pub fn is_accessor(&self) -> bool {
        self.accessor != AccessorKind::None
    }

    /// Name without any interface qualification prefix
    pub fn exposed_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn has_generic_param(&self, name: &str) -> bool {
        self.generic_params.iter().any(|param| param == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub param_type: TypeRef,
    pub is_out: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            param_type,
            is_out: false,
        }
    }

    /// Declared by reference (`ref` or `out`)
    pub fn is_by_ref(&self) -> bool {
        matches!(
            self.param_type,
            TypeRef::Indirect {
                kind: Indirection::ByRef,
                ..
            }
        )
    }
}

/// Fully qualified name of a declared type, used as a lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub namespace: String,
    pub enclosing: Vec<String>,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            enclosing: Vec::new(),
            name: name.into(),
        }
    }

    /// Split a dotted name such as ``System.Collections.Generic.List`1``
    pub fn parse_dotted(full: &str) -> Self {
        match full.rfind('.') {
            Some(idx) => Self::new(&full[..idx], &full[idx + 1..]),
            None => Self::new("", full),
        }
    }

    pub fn nested(mut self, name: impl Into<String>) -> Self {
        let outer = std::mem::replace(&mut self.name, name.into());
        self.enclosing.push(outer);
        self
    }

    pub fn is_nested(&self) -> bool {
        !self.enclosing.is_empty()
    }

    pub fn base_name(&self) -> &str {
        strip_arity(&self.name)
    }

    /// Name of the declaring type one level up
    pub fn declaring(&self) -> Option<TypeName> {
        let (last, rest) = self.enclosing.split_last()?;
        Some(TypeName {
            namespace: self.namespace.clone(),
            enclosing: rest.to_vec(),
            name: last.clone(),
        })
    }

    /// Name of the outermost declaring type (itself when not nested)
    pub fn top_level(&self) -> TypeName {
        match self.enclosing.first() {
            Some(outer) => TypeName::new(self.namespace.clone(), outer.clone()),
            None => self.clone(),
        }
    }

    /// Lookup name in runtime form: ``Ns.Outer`1/Inner``
    pub fn lookup_name(&self) -> String {
        let mut out = String::new();
        if !self.namespace.is_empty() {
            out.push_str(&self.namespace);
            out.push('.');
        }
        for outer in &self.enclosing {
            out.push_str(outer);
            out.push('/');
        }
        out.push_str(&self.name);
        out
    }

    /// Dotted name with every arity marker stripped: `Ns.Outer.Inner`
    pub fn base_key(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.enclosing.len() + 2);
        if !self.namespace.is_empty() {
            parts.push(&self.namespace);
        }
        parts.extend(self.enclosing.iter().map(|outer| strip_arity(outer)));
        parts.push(self.base_name());
        parts.join(".")
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lookup_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Object,
    String,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    IntPtr,
    UIntPtr,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 17] = [
        PrimitiveKind::Void,
        PrimitiveKind::Object,
        PrimitiveKind::String,
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::SByte,
        PrimitiveKind::Byte,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Single,
        PrimitiveKind::Double,
        PrimitiveKind::IntPtr,
        PrimitiveKind::UIntPtr,
    ];

    /// Unqualified runtime name within `System`
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "Void",
            PrimitiveKind::Object => "Object",
            PrimitiveKind::String => "String",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::UInt16 => "UInt16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::UInt32 => "UInt32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::UInt64 => "UInt64",
            PrimitiveKind::Single => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::IntPtr => "IntPtr",
            PrimitiveKind::UIntPtr => "UIntPtr",
        }
    }

    pub fn canonical_name(self) -> String {
        format!("System.{}", self.name())
    }

    pub fn from_canonical_name(full: &str) -> Option<Self> {
        let name = full.strip_prefix("System.")?;
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn type_name(self) -> TypeName {
        TypeName::new("System", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericOwner {
    Type,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirection {
    ByRef,
    Pointer,
}

/// A usage-site type reference. Never owns the referenced declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    GenericParam { name: String, owner: GenericOwner },
    Array { element: Box<TypeRef>, rank: u32 },
    Indirect { kind: Indirection, element: Box<TypeRef> },
    GenericInstance { definition: TypeName, arguments: Vec<TypeRef> },
    Named(TypeName),
}

impl TypeRef {
    pub fn named(full: &str) -> Self {
        match PrimitiveKind::from_canonical_name(full) {
            Some(kind) => TypeRef::Primitive(kind),
            None => TypeRef::Named(TypeName::parse_dotted(full)),
        }
    }

    pub fn type_param(name: impl Into<String>) -> Self {
        TypeRef::GenericParam {
            name: name.into(),
            owner: GenericOwner::Type,
        }
    }

    pub fn method_param(name: impl Into<String>) -> Self {
        TypeRef::GenericParam {
            name: name.into(),
            owner: GenericOwner::Method,
        }
    }

    pub fn array_of(element: TypeRef, rank: u32) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank,
        }
    }

    pub fn by_ref(element: TypeRef) -> Self {
        TypeRef::Indirect {
            kind: Indirection::ByRef,
            element: Box::new(element),
        }
    }

    pub fn generic(definition: TypeName, arguments: Vec<TypeRef>) -> Self {
        TypeRef::GenericInstance {
            definition,
            arguments,
        }
    }

    /// Declaration name for nominal, generic-instance and primitive references
    pub fn type_name(&self) -> Option<TypeName> {
        match self {
            TypeRef::Primitive(kind) => Some(kind.type_name()),
            TypeRef::Named(name) => Some(name.clone()),
            TypeRef::GenericInstance { definition, .. } => Some(definition.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "System.{}", kind.name()),
            TypeRef::GenericParam {
                name,
                owner: GenericOwner::Type,
            } => write!(f, "!{name}"),
            TypeRef::GenericParam {
                name,
                owner: GenericOwner::Method,
            } => write!(f, "!!{name}"),
            TypeRef::Array { element, rank } => {
                write!(f, "{element}[{}]", ",".repeat(rank.saturating_sub(1) as usize))
            }
            TypeRef::Indirect {
                kind: Indirection::ByRef,
                element,
            } => write!(f, "{element}&"),
            TypeRef::Indirect {
                kind: Indirection::Pointer,
                element,
            } => write!(f, "{element}*"),
            TypeRef::GenericInstance {
                definition,
                arguments,
            } => {
                write!(f, "{definition}<")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeRef::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Strip a trailing generic arity marker: ``Tuple`3`` becomes `Tuple`
pub fn strip_arity(name: &str) -> &str {
    match name.find('`') {
        Some(idx) => &name[..idx],
        None => name,
    }
}
