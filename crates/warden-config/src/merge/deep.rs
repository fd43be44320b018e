use super::path::join_path;
use super::{ConfigLayer, FieldSources};

/// Deep-merge `overlay` into `base`, recording which layer set each leaf.
///
/// Tables merge per key. Scalars and arrays from the overlay replace the
/// base value. `prefix` is the dotted path of `base` within the root tree.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    let (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) = (&mut *base, overlay)
    else {
        *base = overlay.clone();
        sources.insert(prefix.to_owned(), layer.clone());
        return;
    };

    for (key, overlay_val) in overlay_table {
        let path = join_path(prefix, key);
        match base_table.get_mut(key) {
            Some(base_val) if overlay_val.is_table() && base_val.is_table() => {
                deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
            },
            Some(base_val) => {
                *base_val = overlay_val.clone();
                record_leaves(overlay_val, &path, layer, sources);
            },
            None => {
                base_table.insert(key.clone(), overlay_val.clone());
                record_leaves(overlay_val, &path, layer, sources);
            },
        }
    }
}

/// Convenience wrapper that merges without caring about provenance.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    let mut scratch = FieldSources::new();
    deep_merge_tracking(base, overlay, "", &ConfigLayer::Defaults, &mut scratch);
}

/// Record every leaf under `val` as coming from `layer`.
pub(crate) fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match val {
        toml::Value::Table(table) if !table.is_empty() => {
            for (key, child) in table {
                record_leaves(child, &join_path(prefix, key), layer, sources);
            }
        },
        _ => {
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}
