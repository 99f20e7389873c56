use anyhow::{Context, Result, bail};
use log::debug;
use once_cell::sync::Lazy;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

const CARGO_TOML: &str = include_str!("../Cargo.toml");
static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(skip)]
    pub app_name: String,

    #[serde(default)]
    pub render: Render,

    #[serde(default)]
    pub remote: Remote,

    #[serde(default)]
    pub export: Export,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Local,
    Remote,
}

/// How the source image travels to the processing backend
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestShape {
    /// `POST /process-url` with the image inlined as a `data:` URL
    #[default]
    DataUrl,

    /// `POST /process` as a multipart form with a PNG blob
    Multipart,

    /// `POST /upload` once, then `POST /process` by image id
    UploadedId,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Render {
    pub mode: RenderMode,

    // ms
    #[derivative(Default(value = "300"))]
    pub debounce_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Remote {
    #[derivative(Default(value = "\"http://127.0.0.1:5002\".to_string()"))]
    pub base_url: String,

    pub request_shape: RequestShape,

    #[derivative(Default(value = "30"))]
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Export {
    #[derivative(Default(value = "true"))]
    pub rasterize_blur: bool,

    #[derivative(Default(value = "\"edited_image.png\".to_string()"))]
    pub default_file_name: String,
}

impl Config {
    /// Resolve the config file location and load it.
    ///
    /// Without an explicit `path` the file lives in the platform config
    /// directory as `<app_name>.toml`.
    pub fn init(&mut self, path: Option<PathBuf>) -> Result<()> {
        let metadata =
            toml::from_str::<toml::Table>(CARGO_TOML).with_context(|| "parse Cargo.toml failed")?;

        self.app_name = metadata
            .get("package")
            .and_then(|package| package.get("name"))
            .and_then(|name| name.as_str())
            .unwrap_or("pixelfx")
            .to_string();

        self.config_path = match path {
            Some(path) => path,
            None => {
                let Some(app_dirs) = AppDirs::new(Some(&self.app_name), true) else {
                    bail!("can not find config directory for {}", self.app_name);
                };
                app_dirs.config_dir.join(format!("{}.toml", self.app_name))
            }
        };

        if let Some(dir) = self.config_path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        self.load().with_context(|| "load config file failed")?;
        debug!("{:?}", self);
        Ok(())
    }

    /// Loads configuration from file or creates default if not exists
    fn load(&mut self) -> Result<()> {
        let text = match fs::read_to_string(&self.config_path) {
            Ok(text) => text,
            Err(_) => return self.reset(),
        };

        match toml::from_str::<Config>(&text) {
            Ok(mut c) => {
                c.config_path = self.config_path.clone();
                c.is_first_run = self.is_first_run;
                c.app_name = self.app_name.clone();
                *self = c;

                Ok(())
            }
            Err(e) => {
                log::warn!("{} is invalid, backing it up: {e}", self.config_path.display());
                self.reset()
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.is_first_run = true;

        if self.config_path.exists()
            && let Some(bak_file) = self.config_path.as_os_str().to_str()
        {
            _ = fs::copy(&self.config_path, format!("{bak_file}.bak"));
        }

        self.save()
    }

    /// Saves the current configuration to file
    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config from toml format failed. {e:?}")),
        }
    }
}

fn global() -> MutexGuard<'static, Config> {
    CONFIG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initializes the global configuration
///
/// This should be called once at application startup.
pub fn init(path: Option<PathBuf>) -> Result<()> {
    global().init(path)
}

/// Returns a clone of the current configuration
pub fn all() -> Config {
    global().clone()
}

/// Saves a new configuration and updates the global instance
pub fn save(conf: Config) -> Result<()> {
    let mut config = global();
    *config = conf;
    config.save()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_run_writes_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("pixelfx.toml");

        let mut config = Config::default();
        config.init(Some(path.clone()))?;

        assert!(config.is_first_run);
        assert!(path.exists());
        assert_eq!(config.app_name, "pixelfx");
        assert_eq!(config.render.mode, RenderMode::Local);
        assert_eq!(config.render.debounce_ms, 300);
        assert_eq!(config.remote.request_shape, RequestShape::DataUrl);
        assert_eq!(config.remote.timeout_secs, 30);
        assert!(config.export.rasterize_blur);
        assert_eq!(config.export.default_file_name, "edited_image.png");
        Ok(())
    }

    #[test]
    fn test_load_partial_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixelfx.toml");
        fs::write(
            &path,
            r#"
[render]
mode = "remote"

[remote]
base_url = "http://fx.local:8000"
request_shape = "uploaded_id"
"#,
        )?;

        let mut config = Config::default();
        config.init(Some(path))?;

        assert!(!config.is_first_run);
        assert_eq!(config.render.mode, RenderMode::Remote);
        assert_eq!(config.render.debounce_ms, 300);
        assert_eq!(config.remote.base_url, "http://fx.local:8000");
        assert_eq!(config.remote.request_shape, RequestShape::UploadedId);
        assert_eq!(config.remote.timeout_secs, 30);
        assert!(config.export.rasterize_blur);
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_backed_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixelfx.toml");
        fs::write(&path, "render = [not toml")?;

        let mut config = Config::default();
        config.init(Some(path.clone()))?;

        assert!(config.is_first_run);
        let backup = dir.path().join("pixelfx.toml.bak");
        assert_eq!(fs::read_to_string(backup)?, "render = [not toml");
        assert!(toml::from_str::<Config>(&fs::read_to_string(path)?).is_ok());
        Ok(())
    }

    #[test]
    fn test_save_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixelfx.toml");

        let mut config = Config::default();
        config.init(Some(path.clone()))?;
        config.render.debounce_ms = 120;
        config.remote.request_shape = RequestShape::Multipart;
        config.save()?;

        let mut reloaded = Config::default();
        reloaded.init(Some(path))?;
        assert_eq!(reloaded.render.debounce_ms, 120);
        assert_eq!(reloaded.remote.request_shape, RequestShape::Multipart);
        Ok(())
    }
}
