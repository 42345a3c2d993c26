mod test_emitter;
mod test_naming;
mod test_visibility;

use crate::{translate, OutputUnit, PackageOptions, TypeId, TypeUniverse};
use clrstub_metadata::{parse_listing, Assembly, TypeName};

pub(crate) fn assemblies(listings: &[&str]) -> Vec<Assembly> {
    listings
        .iter()
        .map(|listing| parse_listing(listing).unwrap())
        .collect()
}

pub(crate) fn translate_listings(listings: &[&str]) -> Vec<OutputUnit> {
    translate(&assemblies(listings), &PackageOptions::default()).unwrap()
}

pub(crate) fn find_unit<'u>(units: &'u [OutputUnit], type_name: &str) -> &'u OutputUnit {
    units
        .iter()
        .find(|unit| unit.type_name == type_name)
        .unwrap_or_else(|| panic!("No unit emitted for {type_name}"))
}

pub(crate) fn type_id(universe: &TypeUniverse<'_>, lookup_name: &str) -> TypeId {
    let name = match lookup_name.split_once('/') {
        Some((outer, inner)) => TypeName::parse_dotted(outer).nested(inner),
        None => TypeName::parse_dotted(lookup_name),
    };
    universe
        .lookup(&name)
        .unwrap_or_else(|| panic!("Type {lookup_name} not in universe"))
}
