//! Dotted-path helpers over raw TOML trees.

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

pub(crate) fn get_path<'a>(root: &'a toml::Value, path: &[&str]) -> Option<&'a toml::Value> {
    path.iter().try_fold(root, |node, segment| node.get(*segment))
}

/// Set a value, creating intermediate tables as needed.
///
/// A non-table node on the way down aborts silently; the caller's later
/// deserialization step reports the type mismatch.
pub(crate) fn set_path(root: &mut toml::Value, path: &[&str], value: toml::Value) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry((*segment).to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    if let Some(table) = current.as_table_mut() {
        table.insert((*leaf).to_owned(), value);
    }
}
