//! Artifact output
//!
//! Writes one generated unit per database into the configured output
//! directory, named `db_<database>.rs`. Output failures are fatal.

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::render::render_database;
use rowforge_core::Database;
use std::fs;
use std::path::{Path, PathBuf};

/// The artifact path for one database under an output directory.
pub fn artifact_path(out: &Path, db: &Database) -> PathBuf {
    out.join(format!("db_{}.rs", db.name()))
}

/// Render a database and write its artifact. Returns the path written.
pub fn write_database(db: &Database, cfg: &GeneratorConfig) -> Result<PathBuf> {
    let code = render_database(db, cfg);
    fs::create_dir_all(&cfg.out)?;
    let path = artifact_path(&cfg.out, db);
    fs::write(&path, &code)?;
    tracing::info!(path = %path.display(), "wrote generated unit");
    Ok(path)
}
