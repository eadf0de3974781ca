//! `--config <file>` TOML override for tokenizer knobs.

use purc_ejson::TokenizerConfig;
use serde::Deserialize;
use std::path::Path;

/// Partial overlay over [`TokenizerConfig`]'s defaults. Every field is
/// optional so a config file only needs to mention the knobs it wants to
/// change.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub max_depth: Option<usize>,
    pub line_cache_capacity: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {e}", path.display()))?;
        toml::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))
    }

    pub fn apply(&self, mut base: TokenizerConfig) -> TokenizerConfig {
        if let Some(max_depth) = self.max_depth {
            base.max_depth = max_depth;
        }
        if let Some(line_cache_capacity) = self.line_cache_capacity {
            base.line_cache_capacity = line_cache_capacity;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overrides_only_the_fields_present_in_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 16").unwrap();
        let loaded = FileConfig::load(file.path()).unwrap();
        let merged = loaded.apply(TokenizerConfig::default());
        assert_eq!(merged.max_depth, 16);
        assert_eq!(merged.line_cache_capacity, TokenizerConfig::default().line_cache_capacity);
    }

    #[test]
    fn missing_file_is_a_readable_error() {
        let err = FileConfig::load(Path::new("/nonexistent/purc-cli-config.toml")).unwrap_err();
        assert!(err.contains("reading"));
    }
}
