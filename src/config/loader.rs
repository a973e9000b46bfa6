use crate::filter::Filter;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a classknot analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classpath to analyze if none is given on the command line.
    pub classpath: Option<String>,

    /// Project name shown in reports.
    pub project_name: Option<String>,

    /// Entry classes needed beyond the automatically detected main classes.
    pub entry_points: Vec<String>,

    /// Archives needed at runtime without any class reference, by display
    /// name or regular expression.
    pub known_needed_archives: Vec<String>,

    /// Additional class name patterns to ignore.
    pub ignored_class_names: Vec<String>,

    /// Additional container name patterns not to open.
    pub ignored_sources: Vec<String>,

    /// Additional node name patterns treated as part of the project.
    pub focus: Vec<String>,

    /// Report configuration.
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Show classes collapsed into their packages.
    pub collapse_packages: bool,

    /// Include the unreferenced-elements report.
    pub show_unreferenced: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classpath: None,
            project_name: None,
            entry_points: vec![],
            known_needed_archives: vec![],
            ignored_class_names: vec![],
            ignored_sources: vec![],
            focus: vec![],
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            collapse_packages: false,
            show_unreferenced: true,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(working_directory: &Path) -> Result<Self> {
        let default_names = [
            ".classknot.yml",
            ".classknot.yaml",
            ".classknot.toml",
            "classknot.yml",
            "classknot.yaml",
            "classknot.toml",
        ];

        for name in &default_names {
            let path = working_directory.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Builds the filter: the stock rules plus everything configured here.
    pub fn build_filter(&self) -> Result<Filter> {
        let mut filter = Filter::new();
        for pattern in &self.ignored_class_names {
            filter
                .add_ignored_class_name(pattern)
                .into_diagnostic()
                .wrap_err_with(|| format!("Bad ignored class pattern: {pattern}"))?;
        }
        for pattern in &self.ignored_sources {
            filter
                .add_ignored_source(pattern)
                .into_diagnostic()
                .wrap_err_with(|| format!("Bad ignored source pattern: {pattern}"))?;
        }
        for pattern in &self.focus {
            filter
                .add_focus(pattern)
                .into_diagnostic()
                .wrap_err_with(|| format!("Bad focus pattern: {pattern}"))?;
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.classpath.is_none());
        assert_eq!(config.report.format, "terminal");
        assert!(config.report.show_unreferenced);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "
entry_points:
  - com.example.Worker
ignored_class_names:
  - 'javax\\..*'
report:
  format: json
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.entry_points, ["com.example.Worker"]);
        assert_eq!(config.report.format, "json");
        // unset fields keep their defaults
        assert!(config.report.show_unreferenced);
    }

    #[test]
    fn test_parse_toml() {
        let toml_text = "
classpath = \"build/classes\"
known_needed_archives = [\"slf4j-simple-.*\\\\.jar\"]
";
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.classpath.as_deref(), Some("build/classes"));
        assert_eq!(config.known_needed_archives.len(), 1);
    }

    #[test]
    fn test_build_filter_applies_patterns() {
        let config = Config {
            ignored_class_names: vec!["com.generated\\..*".to_string()],
            focus: vec!["jar:app_jar.*".to_string()],
            ..Config::default()
        };
        let filter = config.build_filter().unwrap();
        assert!(filter.is_ignored_class("com.generated.Stub"));
        assert!(filter.is_in_focus("jar:app_jar"));
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let config = Config {
            ignored_class_names: vec!["(".to_string()],
            ..Config::default()
        };
        assert!(config.build_filter().is_err());
    }
}
