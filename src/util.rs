//! A utility module for common operations.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{in_context, Result};

/// Rename a file.
pub fn rename_path(old: impl AsRef<Path>, new: impl AsRef<Path>) -> Result<()> {
    let (old, new) = (old.as_ref(), new.as_ref());
    std::fs::rename(old, new).map_err(|err| {
        format!(
            "could not move '{}' to '{}': {err}",
            old.display(),
            new.display()
        )
        .into()
    })
}

/// Write a file, replacing it in one step if it already exists.
///
/// The content is written to a temporary file next to the target which is
/// then renamed over it, so readers never see a partially written file.
pub fn write_file_atomic(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    let mut temp = path.to_path_buf();
    temp.as_mut_os_string().push(".new");

    in_context(
        || format!("writing '{}'", path.display()),
        || {
            let mut file = File::create(&temp)
                .map_err(|err| format!("cannot create '{}': {err}", temp.display()))?;
            file.write_all(content.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|err| format!("cannot write '{}': {err}", temp.display()))?;
            rename_path(&temp, path)
        },
    )
}
