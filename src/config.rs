use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use lettre::message::Mailbox;
use log::{debug, info};
use serde::Deserialize;

use crate::{Port, Template};

/// Used in place of a missing config file so a demo run works out of the box
pub const EXAMPLE_CONFIG_FILENAME: &str = "config_example.json";

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    /// SMTP relay to connect to, STARTTLS is always used
    pub smtp_host: String,

    pub smtp_port: Port,

    /// Login name, also used as the sender address
    pub smtp_user: String,

    pub smtp_password: String,

    /// Display name of the sender, defaults to `smtp_user`
    #[serde(default)]
    pub from_name: Option<String>,

    pub subject_template: Template,

    pub body_template: Template,
}

impl Config {
    /// Loads `config_path` or, if it does not exist, the example config next to it
    pub fn load(config_path: &Path) -> anyhow::Result<Config> {
        if !config_path.exists() {
            let example = Self::example_path_for(config_path);
            if example.exists() {
                info!("{config_path:?} not found, using {example:?} instead.");
                return Self::load_from(&example);
            }
        }
        Self::load_from(config_path)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Config> {
        debug!("Loading Config from: {config_path:?}");
        let file_contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read contents of {config_path:?}"))?;
        let result = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse contents of {config_path:?}"))?;
        debug!("Loaded config: {result:?}");
        Ok(result)
    }

    fn example_path_for(config_path: &Path) -> PathBuf {
        config_path.with_file_name(EXAMPLE_CONFIG_FILENAME)
    }

    pub fn from_name(&self) -> &str {
        self.from_name.as_deref().unwrap_or(&self.smtp_user)
    }

    /// The `From` mailbox for every message
    pub fn sender(&self) -> anyhow::Result<Mailbox> {
        let address = self.smtp_user.trim().parse().with_context(|| {
            format!(
                "SMTP_USER {:?} is not a valid sender address",
                self.smtp_user
            )
        })?;
        Ok(Mailbox::new(Some(self.from_name().to_string()), address))
    }

    /// Fails if either template uses a placeholder that is not one of `columns`
    pub fn check_placeholders(&self, columns: &[String]) -> anyhow::Result<()> {
        let mut missing = vec![];
        for template in [&self.subject_template, &self.body_template] {
            for name in template.placeholders() {
                if !columns.iter().any(|c| c == name) && !missing.contains(&name) {
                    missing.push(name);
                }
            }
        }
        if !missing.is_empty() {
            bail!("Templates use placeholders {missing:?} that are not contact columns {columns:?}");
        }
        Ok(())
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &"<redacted>")
            .field("from_name", &self.from_name)
            .field("subject_template", &self.subject_template.to_string())
            .field("body_template", &self.body_template.to_string())
            .finish()
    }
}
