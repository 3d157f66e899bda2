//! Built-in warehouse pipelines
//!
//! Dimensions come first in registration order so a full run always
//! builds them before any fact resolves keys against them.

pub(crate) mod institution;
pub(crate) mod publication;
pub(crate) mod time;

use sf_core::{Config, NamingRegistry};
use sf_etl::Pipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Locate a source extract across the configured source directories.
///
/// The first directory containing the file wins; when none does, the
/// first directory's candidate is returned so the extract stage fails
/// with the path the operator most likely intended.
pub(crate) fn source_file(config: &Config, root: &Path, file_name: &str) -> PathBuf {
    let dirs = config.source_paths_absolute(root);
    for dir in &dirs {
        let candidate = dir.join(file_name);
        if candidate.exists() {
            return candidate;
        }
    }
    log::warn!(
        "{} not found in any configured source directory",
        file_name
    );
    dirs.first()
        .map(|d| d.join(file_name))
        .unwrap_or_else(|| root.join(file_name))
}

/// All registered pipelines in execution order
pub(crate) fn build_pipelines(
    config: &Config,
    root: &Path,
    registry: Arc<NamingRegistry>,
) -> Vec<Box<dyn Pipeline>> {
    vec![
        Box::new(time::time_pipeline(Arc::clone(&registry))),
        Box::new(institution::institution_pipeline(
            config,
            root,
            Arc::clone(&registry),
        )),
        Box::new(publication::publication_pipeline(config, root, registry)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_etl::Layer;

    fn test_config() -> Config {
        serde_yaml::from_str("name: test_warehouse").unwrap()
    }

    #[test]
    fn dimensions_precede_facts() {
        let pipelines = build_pipelines(
            &test_config(),
            Path::new("."),
            Arc::new(NamingRegistry::standard()),
        );

        let first_fact = pipelines
            .iter()
            .position(|p| p.layer() == Layer::Fact)
            .unwrap();
        assert!(pipelines[..first_fact]
            .iter()
            .all(|p| p.layer() != Layer::Fact));
    }

    #[test]
    fn source_file_falls_back_to_first_directory() {
        let config = test_config();
        let path = source_file(&config, Path::new("/proj"), "institutions.csv");
        assert_eq!(path, Path::new("/proj/sources/institutions.csv"));
    }
}
