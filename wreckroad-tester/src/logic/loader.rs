use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use wreckroad_game::{Catalog, DataLoader, EmbeddedData};

/// Reads `<name>.json` overrides from a directory and falls back to the
/// embedded assets for anything the directory does not provide.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: Option<PathBuf>,
}

impl DirectoryLoader {
    pub const fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn read(&self, name: &str) -> io::Result<String> {
        if let Some(root) = &self.root {
            let path = root.join(format!("{name}.json"));
            if path.is_file() {
                log::debug!("loading {name} from {}", path.display());
                return std::fs::read_to_string(&path)
                    .map_err(|err| with_path(&path, err));
            }
        }
        EmbeddedData::raw(name).map(ToString::to_string).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no data named {name}"))
        })
    }
}

fn with_path(path: &Path, err: io::Error) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {err}", path.display()))
}

impl DataLoader for DirectoryLoader {
    type Error = io::Error;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        let raw = self.read("catalog")?;
        Ok(Catalog::from_json(&raw)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let raw = self.read(config_name)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
