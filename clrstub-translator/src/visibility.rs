//! Member eligibility and override resolution
//!
//! Haxe externs have single inheritance and no explicit interface implementations, so a derived
//! member is only re-declared when it adds something: a new overload, or an interface contract
//! the ancestor does not satisfy. "Declared in an ancestor" always means the nearest ancestor
//! member with the same exposed name (and arity, where it matters).

use crate::universe::{TypeId, TypeUniverse};
use clrstub_metadata::Method;
use std::collections::BTreeSet;

/// Whether an ancestor lookup also compares parameter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityMatch {
    Exact,
    Any,
}

/// Visible ancestor declaration of a method
#[derive(Debug, Clone, Copy)]
pub struct AncestorMethod<'a> {
    pub declaring: TypeId,
    pub method: &'a Method,
}

/// Outcome for one method declared on an emitted type
#[derive(Debug, Clone, Copy)]
pub enum MethodResolution<'a> {
    /// Accessor, operator or invisible method
    Ineligible,
    /// Fully shadowed by a visible ancestor declaration
    Hidden,
    Emit,
    /// Satisfies a contract the ancestor does not; both signatures are kept
    Forced { ancestor: AncestorMethod<'a> },
}

#[derive(Debug, Clone, Copy)]
pub struct VisibilityResolver<'a> {
    universe: &'a TypeUniverse<'a>,
}

impl<'a> VisibilityResolver<'a> {
    pub fn new(universe: &'a TypeUniverse<'a>) -> Self {
        Self { universe }
    }

    /// Some public interface of `owner` requires the method's exposed name
    pub fn satisfies_contract(&self, owner: TypeId, method: &Method) -> bool {
        self.universe
            .closure(owner)
            .contract_names
            .contains(method.exposed_name())
    }

    pub fn is_candidate(&self, owner: TypeId, method: &Method) -> bool {
        !method.is_accessor()
            && !method.is_operator
            && (method.is_public() || self.satisfies_contract(owner, method))
    }

    /// Nearest ancestor declaration with the same exposed name, if it is visible
    pub fn visible_ancestor_method(
        &self,
        owner: TypeId,
        method: &Method,
        arity: ArityMatch,
    ) -> Option<AncestorMethod<'a>> {
        let name = method.exposed_name();
        let (declaring, found) = self
            .universe
            .hierarchy_methods(owner)
            .filter(|(_, candidate)| !candidate.is_constructor)
            .find(|(_, candidate)| {
                candidate.exposed_name() == name
                    && (arity == ArityMatch::Any || candidate.arity() == method.arity())
            })?;

        (found.is_public() || self.satisfies_contract(declaring, found)).then_some(AncestorMethod {
            declaring,
            method: found,
        })
    }

    /// `owner` requires the name through an interface the ancestor's type does not implement
    pub fn introduces_new_contract(&self, owner: TypeId, method: &Method, ancestor: TypeId) -> bool {
        let name = method.exposed_name();
        let inherited = &self.universe.closure(ancestor).all_interfaces;
        self.universe
            .closure(owner)
            .interfaces
            .iter()
            .filter(|interface| !inherited.contains(interface))
            .any(|&interface| {
                self.universe
                    .entity(interface)
                    .methods
                    .iter()
                    .any(|required| required.exposed_name() == name)
            })
    }

    /// A same-arity visible ancestor declaration shadows the method
    pub fn is_hidden_override(&self, owner: TypeId, method: &Method) -> bool {
        if method.is_static || method.is_constructor {
            return false;
        }
        match self.visible_ancestor_method(owner, method, ArityMatch::Exact) {
            Some(ancestor) => !self.introduces_new_contract(owner, method, ancestor.declaring),
            None => false,
        }
    }

    pub fn resolve(&self, owner: TypeId, method: &Method) -> MethodResolution<'a> {
        if !self.is_candidate(owner, method) {
            return MethodResolution::Ineligible;
        }
        if method.is_static || method.is_constructor {
            return MethodResolution::Emit;
        }

        let same_arity = self.visible_ancestor_method(owner, method, ArityMatch::Exact);
        let nearest = same_arity.or_else(|| self.visible_ancestor_method(owner, method, ArityMatch::Any));

        match nearest {
            Some(ancestor) if self.introduces_new_contract(owner, method, ancestor.declaring) => {
                MethodResolution::Forced { ancestor }
            }
            Some(_) if same_arity.is_some() => MethodResolution::Hidden,
            _ => MethodResolution::Emit,
        }
    }

    /// Instance method names a static member of `owner` would collide with
    pub fn eligible_instance_names(&self, owner: TypeId) -> BTreeSet<String> {
        let closure = self.universe.closure(owner);
        std::iter::once(owner)
            .chain(closure.ancestors.iter().copied())
            .chain(closure.all_interfaces.iter().copied())
            .flat_map(|declaring| {
                self.universe
                    .entity(declaring)
                    .methods
                    .iter()
                    .filter(move |method| {
                        !method.is_static
                            && !method.is_constructor
                            && method.is_public()
                            && !method.is_accessor()
                            && !method.is_operator
                            && !self.is_hidden_override(declaring, method)
                    })
                    .map(|method| method.exposed_name().to_string())
            })
            .collect()
    }
}
