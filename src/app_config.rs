use anyhow::{anyhow, Context, Result};
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the run configuration,
/// including the registry of text substitution profiles.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Name of the substitution profile applied to every transcript
    #[serde(default = "default_profile_name")]
    pub substitution_profile: String,

    /// User-defined profiles, merged over the built-in registry
    #[serde(default)]
    pub profiles: BTreeMap<String, Vec<SubstitutionRule>>,

    /// ffmpeg binary used by the transcoder
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Extension of the narration files inside the book
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    /// Whether to link the corpus into a MaryTTS voice-import layout
    #[serde(default = "default_true")]
    pub scaffold_marytts: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One `(pattern, replacement)` rule of a substitution profile
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubstitutionRule {
    /// Regular expression, replaced globally
    pub pattern: String,

    /// Replacement text (supports `$1`-style group references)
    #[serde(default)]
    pub replacement: String,
}

impl SubstitutionRule {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Ordered list of compiled substitution rules
#[derive(Debug, Clone, Default)]
pub struct SubstitutionProfile {
    name: String,
    rules: Vec<(Regex, String)>,
}

impl SubstitutionProfile {
    /// Compile a profile from its rules, keeping their order
    pub fn compile(name: &str, rules: &[SubstitutionRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.replacement.clone()))
                    .with_context(|| format!("Invalid pattern {:?} in profile '{}'", rule.pattern, name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            rules,
        })
    }

    /// Profile that leaves text untouched
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order, each as a global replacement
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

/// Built-in profiles, keyed by name
pub fn builtin_profiles() -> BTreeMap<String, Vec<SubstitutionRule>> {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "default".to_string(),
        vec![
            // Curly apostrophe, plus its cp1252 mojibake
            SubstitutionRule::new("(?:’|â€™)", "'"),
            SubstitutionRule::new(r"[^a-zA-Z0-9.,?!']", " "),
        ],
    );
    profiles.insert("none".to_string(), Vec::new());
    profiles
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_profile_name() -> String {
    "default".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_audio_extension() -> String {
    "mp3".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(anyhow!("ffmpeg_path must not be empty"));
        }

        if self.audio_extension.trim().is_empty() {
            return Err(anyhow!("audio_extension must not be empty"));
        }

        for (name, rules) in self.all_profiles() {
            SubstitutionProfile::compile(&name, &rules)?;
        }

        Ok(())
    }

    /// Built-in profiles with user-defined ones layered on top
    pub fn all_profiles(&self) -> BTreeMap<String, Vec<SubstitutionRule>> {
        let mut profiles = builtin_profiles();
        for (name, rules) in &self.profiles {
            profiles.insert(name.clone(), rules.clone());
        }
        profiles
    }

    /// Resolve the selected profile; unknown names yield an empty profile
    pub fn resolve_profile(&self) -> Result<SubstitutionProfile> {
        let name = &self.substitution_profile;
        match self.all_profiles().get(name) {
            Some(rules) => SubstitutionProfile::compile(name, rules),
            None => {
                warn!("Unknown substitution profile '{}', no substitutions will be applied", name);
                Ok(SubstitutionProfile::empty(name))
            }
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            substitution_profile: default_profile_name(),
            profiles: BTreeMap::new(),
            ffmpeg_path: default_ffmpeg_path(),
            audio_extension: default_audio_extension(),
            scaffold_marytts: true,
            log_level: LogLevel::default(),
        }
    }
}
