//! `PATH` lookup for the external geospatial tools.

use std::path::PathBuf;

use crate::ExtractError;

/// Locates an executable by name on the `PATH`.
///
/// # Errors
///
/// Returns [`ExtractError::ProgramNotFound`] if no `PATH` entry contains a
/// file with the given name.
pub fn find_program(name: &str) -> Result<PathBuf, ExtractError> {
    let path_var = std::env::var_os("PATH")
        .ok_or_else(|| ExtractError::ProgramNotFound(name.to_string()))?;

    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ExtractError::ProgramNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn finds_a_common_shell() {
        let path = find_program("sh").unwrap();
        assert!(path.is_file());
        assert_eq!(path.file_name().unwrap(), "sh");
    }

    #[test]
    fn unknown_program_is_an_error() {
        let result = find_program("definitely-not-a-real-tool");
        assert!(matches!(result, Err(ExtractError::ProgramNotFound(_))));
    }
}
