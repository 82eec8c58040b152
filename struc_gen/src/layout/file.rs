/* Layout file loading.
   Reads YAML structure definitions and collects them into a `LayoutSet`,
   rejecting structure names that appear in more than one place. */

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use struc_types::LayoutFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
    #[error("struct '{name}' in {} is already defined in {}", path.display(), first.display())]
    DuplicateStruct {
        name: String,
        path: PathBuf,
        first: PathBuf,
    },
}

/// Reads a single layout definition file.
pub fn load_layout_file(path: &Path) -> Result<LayoutFile, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: LayoutFile = serde_yml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        package = file.package.as_deref().unwrap_or("<none>"),
        structs = file.structs.len(),
        "loaded layout file"
    );
    Ok(file)
}

/// Every loaded file, in load order.
#[derive(Debug, Default)]
pub struct LayoutSet {
    files: Vec<(PathBuf, LayoutFile)>,
    /* struct name -> file that defined it first */
    owners: IndexMap<String, PathBuf>,
}

impl LayoutSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> Result<&LayoutFile, LoadError> {
        let file = load_layout_file(path)?;
        self.insert(path.to_path_buf(), file)
    }

    pub fn insert(&mut self, path: PathBuf, file: LayoutFile) -> Result<&LayoutFile, LoadError> {
        let mut added: IndexMap<String, PathBuf> = IndexMap::new();
        for def in &file.structs {
            if let Some(first) = self.owners.get(&def.name).or_else(|| added.get(&def.name)) {
                return Err(LoadError::DuplicateStruct {
                    name: def.name.clone(),
                    path: path.clone(),
                    first: first.clone(),
                });
            }
            added.insert(def.name.clone(), path.clone());
        }
        self.owners.extend(added);
        self.files.push((path, file));
        Ok(&self.files[self.files.len() - 1].1)
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &LayoutFile)> {
        self.files.iter().map(|(path, file)| (path.as_path(), file))
    }

    pub fn struct_count(&self) -> usize {
        self.owners.len()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
