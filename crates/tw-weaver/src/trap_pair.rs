//! Marker-constant plus variable adjacency.

use crate::descriptor::{DeclShape, Descriptor};
use crate::extract::is_trap_marker_for;

/// Pair every marker constant with the variable descriptor right after it.
///
/// The scan runs from the end so a variable consumed by one marker is never
/// offered to another. Paired variables (and their address companion) get
/// `follows_trap_marker`; the marker itself is dropped.
pub fn detect_trap_pairs(descriptors: &mut Vec<Descriptor>) -> usize {
    let mut pairs = 0;
    let mut i = descriptors.len();
    while i >= 2 {
        let var_index = i - 1;
        let marker_index = i - 2;
        if !is_pair(&descriptors[marker_index], &descriptors[var_index]) {
            i -= 1;
            continue;
        }

        descriptors[var_index].follows_trap_marker = true;
        let var_name = descriptors[var_index].name.clone();
        if let Some(address) = descriptors.get_mut(var_index + 1) {
            if address.shape == DeclShape::AddressOfVariable && address.name == var_name {
                address.follows_trap_marker = true;
            }
        }
        descriptors.remove(marker_index);
        pairs += 1;
        i = marker_index;
    }
    pairs
}

fn is_pair(marker: &Descriptor, var: &Descriptor) -> bool {
    marker.shape == DeclShape::Constant
        && var.shape == DeclShape::PlainVariable
        && is_trap_marker_for(&marker.name, &var.name)
}
