use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use chrono::Weekday;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::calendar::parse_week_start;

const CONFIG_FILE: &str =
  "dealbook.toml";
const CONFIG_DIR: &str = "dealbook";
const CONFIG_ENV_VAR: &str =
  "DEALBOOK_CONFIG";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
  timezone: Option<String>,
  color:    Option<bool>,
  calendar: Option<RawCalendarSection>
}

#[derive(Debug, Default, Deserialize)]
struct RawCalendarSection {
  week_start: Option<String>
}

/// Resolved settings, handed to the
/// renderer and commands explicitly.
#[derive(Debug, Clone)]
pub struct Config {
  pub timezone:    Tz,
  pub color:       bool,
  pub week_start:  Weekday,
  pub loaded_file: Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      timezone:    chrono_tz::UTC,
      color:       true,
      week_start:  Weekday::Mon,
      loaded_file: None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let env_value =
      std::env::var(CONFIG_ENV_VAR).ok();
    match resolve_config_path(
      config_override,
      env_value.as_deref(),
      default_config_path()
    ) {
      | Some((path, source)) => {
        info!(
          config = %path.display(),
          source = source.as_str(),
          "loading config"
        );
        Self::load_file(&path)
      }
      | None => {
        debug!(
          "no config file found; using \
           defaults"
        );
        Ok(Self::default())
      }
    }
  }

  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let mut cfg = Self::from_toml(&text)
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })?;
    cfg.loaded_file =
      Some(path.to_path_buf());
    Ok(cfg)
  }

  pub fn from_toml(
    text: &str
  ) -> anyhow::Result<Self> {
    let raw: RawConfig =
      toml::from_str(text)?;
    Ok(Self::sanitize(raw))
  }

  fn sanitize(raw: RawConfig) -> Self {
    let defaults = Self::default();

    let timezone = raw
      .timezone
      .as_deref()
      .and_then(parse_timezone)
      .unwrap_or(defaults.timezone);

    let week_start = raw
      .calendar
      .and_then(|section| {
        section.week_start
      })
      .and_then(|value| {
        let parsed =
          parse_week_start(&value);
        if parsed.is_none() {
          warn!(
            week_start = %value,
            "unsupported week start; \
             using monday"
          );
        }
        parsed
      })
      .unwrap_or(defaults.week_start);

    let cfg = Self {
      timezone,
      color: raw
        .color
        .unwrap_or(defaults.color),
      week_start,
      loaded_file: None
    };
    debug!(
      timezone = %cfg.timezone,
      color = cfg.color,
      week_start = ?cfg.week_start,
      "resolved config"
    );
    cfg
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
  Flag,
  Env,
  DefaultDir
}

impl ConfigSource {
  fn as_str(self) -> &'static str {
    match self {
      | ConfigSource::Flag => "flag",
      | ConfigSource::Env => {
        CONFIG_ENV_VAR
      }
      | ConfigSource::DefaultDir => {
        "config dir"
      }
    }
  }
}

/// Flag beats env var beats the
/// per-user default. Only the default
/// location is skipped when absent; an
/// explicit path is returned as-is so a
/// missing file surfaces as an error.
fn resolve_config_path(
  flag: Option<&Path>,
  env_value: Option<&str>,
  default_path: Option<PathBuf>
) -> Option<(PathBuf, ConfigSource)> {
  if let Some(path) = flag {
    return Some((
      path.to_path_buf(),
      ConfigSource::Flag
    ));
  }

  if let Some(raw) = env_value {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some((
        PathBuf::from(trimmed),
        ConfigSource::Env
      ));
    }
  }

  default_path
    .filter(|path| path.exists())
    .map(|path| {
      (path, ConfigSource::DefaultDir)
    })
}

fn default_config_path()
-> Option<PathBuf> {
  dirs::config_dir().map(|dir| {
    dir.join(CONFIG_DIR)
      .join(CONFIG_FILE)
  })
}

fn parse_timezone(
  raw: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    warn!(
      "timezone setting was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(err) => {
      tracing::error!(
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id; \
         using UTC"
      );
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::path::Path;

  use chrono::Weekday;
  use tempfile::tempdir;

  use super::{
    Config,
    ConfigSource,
    resolve_config_path
  };

  #[test]
  fn flag_wins_over_env_and_default() {
    let temp =
      tempdir().expect("tempdir");
    let default =
      temp.path().join("dealbook.toml");
    fs::write(&default, "")
      .expect("write config");

    let (path, source) =
      resolve_config_path(
        Some(Path::new("flag.toml")),
        Some("env.toml"),
        Some(default.clone())
      )
      .expect("resolved");
    assert_eq!(path, Path::new("flag.toml"));
    assert_eq!(source, ConfigSource::Flag);

    let (path, source) =
      resolve_config_path(
        None,
        Some(" env.toml "),
        Some(default.clone())
      )
      .expect("resolved");
    assert_eq!(path, Path::new("env.toml"));
    assert_eq!(source, ConfigSource::Env);

    let (path, source) =
      resolve_config_path(
        None,
        Some("  "),
        Some(default.clone())
      )
      .expect("resolved");
    assert_eq!(path, default);
    assert_eq!(
      source,
      ConfigSource::DefaultDir
    );
  }

  #[test]
  fn absent_default_means_no_file() {
    let temp =
      tempdir().expect("tempdir");
    assert!(
      resolve_config_path(
        None,
        None,
        Some(temp.path().join("nope.toml"))
      )
      .is_none()
    );
    assert!(
      resolve_config_path(None, None, None)
        .is_none()
    );
  }

  #[test]
  fn explicit_path_is_loaded() {
    let temp =
      tempdir().expect("tempdir");
    let path =
      temp.path().join("dealbook.toml");
    fs::write(
      &path,
      "color = false\n\n[calendar]\nweek_start = \"sun\"\n"
    )
    .expect("write config");

    let cfg = Config::load(Some(path.as_path()))
      .expect("load explicit config");
    assert!(!cfg.color);
    assert_eq!(cfg.week_start, Weekday::Sun);
    assert_eq!(
      cfg.loaded_file.as_deref(),
      Some(path.as_path())
    );
  }

  #[test]
  fn missing_explicit_path_is_error() {
    let temp =
      tempdir().expect("tempdir");
    let path =
      temp.path().join("absent.toml");

    let err = Config::load(Some(path.as_path()))
      .expect_err("missing config");
    assert!(
      format!("{err:#}")
        .contains("absent.toml")
    );
  }

  #[test]
  fn unparsable_explicit_file_names_path()
  {
    let temp =
      tempdir().expect("tempdir");
    let path =
      temp.path().join("broken.toml");
    fs::write(&path, "timezone = [")
      .expect("write config");

    let err = Config::load_file(&path)
      .expect_err("broken config");
    let message = format!("{err:#}");
    assert!(
      message.contains("failed to parse")
    );
    assert!(message.contains("broken.toml"));
  }

  #[test]
  fn defaults_have_no_loaded_file() {
    assert!(
      Config::default()
        .loaded_file
        .is_none()
    );
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = Config::from_toml("")
      .expect("parse empty config");
    assert_eq!(cfg.timezone, chrono_tz::UTC);
    assert!(cfg.color);
    assert_eq!(cfg.week_start, Weekday::Mon);
  }

  #[test]
  fn reads_all_sections() {
    let cfg = Config::from_toml(
      r#"
timezone = "America/New_York"
color = false

[calendar]
week_start = "Sunday"
"#
    )
    .expect("parse config");
    assert_eq!(
      cfg.timezone,
      chrono_tz::America::New_York
    );
    assert!(!cfg.color);
    assert_eq!(cfg.week_start, Weekday::Sun);
  }

  #[test]
  fn bad_values_fall_back() {
    let cfg = Config::from_toml(
      r#"
timezone = "Mars/Olympus"

[calendar]
week_start = "wednesday"
"#
    )
    .expect("parse config");
    assert_eq!(cfg.timezone, chrono_tz::UTC);
    assert_eq!(cfg.week_start, Weekday::Mon);
  }

  #[test]
  fn malformed_toml_is_error() {
    assert!(
      Config::from_toml("color = ")
        .is_err()
    );
  }
}
