use crate::commands::{CmdMessage, CmdResult};
use crate::db::Database;
use crate::error::Result;
use crate::store::backend::StorageBackend;

/// Check one collection, or every collection in storage when none is given.
/// A collection that does not parse is reported and skipped; it is never rewritten.
pub fn run<B: StorageBackend + 'static>(
    db: &Database<B>,
    collection: Option<&str>,
) -> Result<CmdResult> {
    let names = match collection {
        Some(name) => vec![name.to_string()],
        None => db.collections()?,
    };
    let mut result = CmdResult::default();

    for name in names {
        let store = db.dyn_store(&name)?;
        let report = match store.doctor() {
            Ok(report) => report,
            Err(e) => {
                result.add_message(CmdMessage::error(format!("{}: {}", name, e)));
                continue;
            }
        };

        if report.is_clean() {
            result.add_message(CmdMessage::success(format!(
                "{}: {} record(s), no inconsistencies found.",
                name, report.records
            )));
            continue;
        }

        result.add_message(CmdMessage::warning(format!(
            "{}: inconsistencies found and fixed:",
            name
        )));
        if report.missing_ids > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Assigned ids to {} record(s) without one.",
                report.missing_ids
            )));
        }
        if report.duplicate_ids > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Re-keyed {} record(s) with a duplicate id.",
                report.duplicate_ids
            )));
        }
        if report.removed_temp_files > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Removed {} leftover temp file(s).",
                report.removed_temp_files
            )));
        }
    }

    Ok(result)
}
