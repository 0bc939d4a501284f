//! Partial-update semantics.
//!
//! Updates are shallow: every field present in the patch overwrites the stored
//! value, fields absent from the patch are left alone. Fields listed as nested
//! are the exception: when both sides hold an object the patch's members are
//! merged into the stored object one by one.

use crate::model::{Record, ID_FIELD};
use serde_json::Value;

/// Merge `patch` into `target`. The `id` field is never touched.
pub fn apply(target: &mut Record, patch: Record, nested: &[&str]) {
    for (key, value) in patch {
        if key == ID_FIELD {
            continue;
        }

        if nested.contains(&key.as_str()) {
            if let (Some(Value::Object(existing)), Value::Object(members)) =
                (target.get_mut(&key), &value)
            {
                for (member, member_value) in members {
                    existing.insert(member.clone(), member_value.clone());
                }
                continue;
            }
        }

        target.insert(key, value);
    }
}
