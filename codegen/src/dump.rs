//! Human-readable schema dump
//!
//! Renders a database model back into the declarative text form, one line
//! per column, suitable for inspecting what a model actually contains.

use rowforge_core::{Constraints, Database};

/// Render the schema of a database as text.
pub fn dump_database(db: &Database) -> String {
    let mut out = String::new();
    out.push_str(&format!("database {:?}\n", db.name()));
    out.push_str(&format!("charset {:?}\n", db.charset()));
    for table in db.tables() {
        out.push('\n');
        out.push_str(&format!("table {:?}\n", table.name()));
        for column in table.columns() {
            out.push_str(&format!(
                "- {} {:?}",
                column.ty().schema_string(),
                column.name()
            ));
            if let Some(minsize) = column.minsize() {
                out.push_str(&format!(" minsize {minsize}"));
            }
            for (flag, word) in [
                (Constraints::PRIMARY_KEY, "primarykey"),
                (Constraints::NOT_NULL, "notnull"),
                (Constraints::UNIQUE, "unique"),
            ] {
                if column.constraints().contains(flag) {
                    out.push(' ');
                    out.push_str(word);
                }
            }
            if let Some(default) = column.default() {
                out.push_str(&format!(" default {:?}", default.as_text()));
            }
            out.push('\n');
        }
    }
    out
}
