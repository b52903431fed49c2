use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

fn defaultMaxImageBytes() -> u64
{
    100 * 1024 * 1024
}

#[derive(Deserialize, Clone)]
pub struct Config
{
    /// Where `fetch` writes images when -o is not given. Default:
    /// current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Refuse to download a single image bigger than this.
    #[serde(default = "defaultMaxImageBytes")]
    pub max_image_bytes: u64,
    /// Override the hard-coded Qobuz API app ID.
    #[serde(default)]
    pub qobuz_app_id: Option<String>,
}

impl Config
{
    pub fn fromFile(filename: &Path) -> Result<Self, Error>
    {
        let content = std::fs::read_to_string(filename)
            .map_err(|_| rterr!("Failed to read config file"))?;
        toml::from_str(&content)
            .map_err(|e| rterr!("Invalid config file: {}", e))
    }
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            output_dir: None,
            max_image_bytes: defaultMaxImageBytes(),
            qobuz_app_id: None,
        }
    }
}

pub fn configDir() -> Result<PathBuf, Error>
{
    let home = std::env::var("HOME")
        .map_err(|_| rterr!("Failed to get home dir"))?;
    let mut path = PathBuf::from(home);
    path.push(".config");
    path.push("sleeve");
    Ok(path)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn emptyConfigUsesDefaults() -> Result<(), Error>
    {
        let conf: Config = toml::from_str("")
            .map_err(|e| rterr!("Invalid config: {}", e))?;
        assert!(conf.output_dir.is_none());
        assert_eq!(conf.max_image_bytes, defaultMaxImageBytes());
        assert!(conf.qobuz_app_id.is_none());
        Ok(())
    }

    #[test]
    fn configFromFile() -> anyhow::Result<()>
    {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output_dir = \"/tmp/covers\"\n\
                               max_image_bytes = 1024\n")?;
        let conf = Config::fromFile(&path)?;
        assert_eq!(conf.output_dir, Some(PathBuf::from("/tmp/covers")));
        assert_eq!(conf.max_image_bytes, 1024);
        Ok(())
    }
}
