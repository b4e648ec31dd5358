use serde_json::{Map, Value};

/// Layer `sources` onto `target`, depth first, later sources winning.
///
/// When both the existing and the incoming value under a key are objects the
/// merge recurses, so nested keys survive unless shadowed. Any other
/// combination (scalars, arrays, `null`, type mismatch) replaces the existing
/// value wholesale; arrays are never concatenated. Sources are not modified.
///
/// Returns `target` for chaining.
pub fn deep_merge<'a, I>(target: &mut Map<String, Value>, sources: I) -> &mut Map<String, Value>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    for source in sources {
        for (key, value) in source {
            merge_value(target, key, value);
        }
    }
    target
}

/// Like [`deep_merge`], for a sparse layer where `None` marks an absent
/// value.
///
/// A `None` entry is skipped and never overwrites what is already in
/// `target`. This is how optional overrides stay "absent" rather than
/// becoming `null`.
pub fn deep_merge_entries<I, K>(target: &mut Map<String, Value>, entries: I) -> &mut Map<String, Value>
where
    I: IntoIterator<Item = (K, Option<Value>)>,
    K: Into<String>,
{
    for (key, value) in entries {
        let Some(value) = value else { continue };
        merge_value(target, &key.into(), &value);
    }
    target
}

fn merge_value(target: &mut Map<String, Value>, key: &str, incoming: &Value) {
    if let (Some(Value::Object(existing)), Value::Object(incoming)) = (target.get_mut(key), incoming)
    {
        deep_merge(existing, [incoming]);
        return;
    }
    target.insert(key.to_owned(), incoming.clone());
}
