mod atomic_io;
mod compiler;
mod database;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::AppPaths;

pub use atomic_io::{write_bytes_atomic, write_text_atomic};
pub use compiler::{
    compile_case_document, compile_case_file, ContentCompileError, ContentErrorCode,
    SourceLocation, RIDDLE_OPTION_COUNT,
};
pub use database::CaseDatabase;

pub const CASE_FILE_NAME: &str = "case.xml";

/// The shipped case, used when no case file exists under the content root.
pub const BUILTIN_CASE_XML: &str = include_str!("../../../../assets/base/case.xml");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("case file {path} failed to compile: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: ContentCompileError,
    },
    #[error("built-in case failed to compile: {0}")]
    Builtin(#[source] ContentCompileError),
}

pub fn builtin_case() -> Result<CaseDatabase, ContentError> {
    compile_case_document(Path::new("<builtin>/case.xml"), BUILTIN_CASE_XML)
        .map_err(ContentError::Builtin)
}

/// Loads `assets/base/case.xml` under the resolved root, falling back to the
/// built-in case when the file is absent.
pub fn load_case_database(app_paths: &AppPaths) -> Result<CaseDatabase, ContentError> {
    let path = app_paths.base_content_dir.join(CASE_FILE_NAME);
    if !path.is_file() {
        info!(path = %path.display(), "case_file_missing_using_builtin");
        return builtin_case();
    }

    let database = compile_case_file(&path).map_err(|source| ContentError::Compile {
        path: path.clone(),
        source,
    })?;
    info!(
        path = %path.display(),
        riddles = database.riddles().len(),
        npcs = database.npcs().len(),
        stages = database.stages().len(),
        "case_loaded"
    );
    Ok(database)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn app_paths(root: &Path) -> AppPaths {
        AppPaths {
            root: root.to_path_buf(),
            base_content_dir: root.join("assets").join("base"),
            config_dir: root.join("config"),
        }
    }

    #[test]
    fn missing_case_file_falls_back_to_builtin() {
        let temp = TempDir::new().expect("temp");
        let db = load_case_database(&app_paths(temp.path())).expect("builtin");
        assert_eq!(db.riddles().len(), 6);
    }

    #[test]
    fn case_file_on_disk_wins_over_builtin() {
        let temp = TempDir::new().expect("temp");
        let paths = app_paths(temp.path());
        fs::create_dir_all(&paths.base_content_dir).expect("mkdir");
        fs::write(
            paths.base_content_dir.join(CASE_FILE_NAME),
            r#"<Case title="tiny"/>"#,
        )
        .expect("write");

        let db = load_case_database(&paths).expect("compile");
        assert_eq!(db.title(), "tiny");
        assert!(db.riddles().is_empty());
    }

    #[test]
    fn broken_case_file_is_an_error_not_a_fallback() {
        let temp = TempDir::new().expect("temp");
        let paths = app_paths(temp.path());
        fs::create_dir_all(&paths.base_content_dir).expect("mkdir");
        fs::write(paths.base_content_dir.join(CASE_FILE_NAME), "<Case>").expect("write");

        let err = load_case_database(&paths).expect_err("err");
        assert!(matches!(
            err,
            ContentError::Compile {
                source: ContentCompileError {
                    code: ContentErrorCode::XmlMalformed,
                    ..
                },
                ..
            }
        ));
    }
}
