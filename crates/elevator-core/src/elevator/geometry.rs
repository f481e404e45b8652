//! Where the elevator stops.

use super::host::Viewport;

/// Offset chains deeper than this are treated as cyclic
const MAX_CHAIN_DEPTH: usize = 1024;

/// Absolute scroll offset that puts the element `padding` units below the
/// top of the viewport.
///
/// Walks the element's offset-parent chain, summing each `offset_top`.
/// An unknown id is not an error: the result is just `padding`, i.e. the
/// top of the page plus padding.
pub fn resolve_target_offset<V>(viewport: &V, element_id: &str, padding: f64) -> f64
where
    V: Viewport + ?Sized,
{
    let Some(element) = viewport.element_by_id(element_id) else {
        tracing::debug!("Target '{}' not found, using top of page", element_id);
        return padding;
    };

    let mut offset = 0.0;
    let mut current = Some(element);
    let mut depth = 0;

    while let Some(el) = current {
        offset += viewport.offset_top(el);
        current = viewport.offset_parent(el);

        depth += 1;
        if depth >= MAX_CHAIN_DEPTH {
            tracing::warn!(
                "Offset chain for '{}' exceeds {} ancestors, stopping early",
                element_id,
                MAX_CHAIN_DEPTH
            );
            break;
        }
    }

    offset - padding
}
