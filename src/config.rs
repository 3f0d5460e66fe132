//! Optional YAML configuration for ingestion.
//!
//! ```yaml
//! row_shape: strict
//! delimiter: ";"
//! aliases:
//!   "kWh Used": Energy_Consumption
//!   "Source": Energy_Source
//! ```
//!
//! Command-line flags take precedence over values loaded from the file.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::{
    aliases::HeaderAliases,
    cli::{InputArgs, parse_delimiter},
    ingest::{IngestOptions, RowShape},
    io_utils,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub row_shape: Option<RowShape>,
    pub delimiter: Option<String>,
    /// Raw header spelling to canonical column name.
    pub aliases: BTreeMap<String, String>,
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: AnalysisConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Parsing config YAML")
    }

    fn delimiter(&self) -> Result<Option<u8>> {
        self.delimiter
            .as_deref()
            .map(|value| {
                parse_delimiter(value).map_err(|err| anyhow!("Invalid config delimiter: {err}"))
            })
            .transpose()
    }

    /// Merges this config with command-line flags into ingestion options.
    pub fn ingest_options(&self, args: &InputArgs) -> Result<IngestOptions> {
        let delimiter = io_utils::resolve_input_delimiter(
            &args.input,
            args.delimiter.or(self.delimiter()?),
        );
        Ok(IngestOptions {
            delimiter,
            row_shape: args.row_shape.or(self.row_shape).unwrap_or_default(),
            aliases: HeaderAliases::with_extra(self.aliases.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn input_args(path: &str) -> InputArgs {
        InputArgs {
            input: PathBuf::from(path),
            delimiter: None,
            input_encoding: None,
            row_shape: None,
            config: None,
        }
    }

    #[test]
    fn parses_all_fields() {
        let config = AnalysisConfig::from_yaml_str(
            "row_shape: strict\ndelimiter: tab\naliases:\n  kWh Used: Energy_Consumption\n",
        )
        .expect("parse config");
        assert_eq!(config.row_shape, Some(RowShape::Strict));
        assert_eq!(config.delimiter.as_deref(), Some("tab"));
        assert_eq!(config.aliases["kWh Used"], "Energy_Consumption");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AnalysisConfig::from_yaml_str("rowshape: strict\n").is_err());
    }

    #[test]
    fn command_line_overrides_config() {
        let config = AnalysisConfig::from_yaml_str("row_shape: strict\ndelimiter: \";\"\n")
            .expect("parse config");
        let mut args = input_args("usage.csv");
        let options = config.ingest_options(&args).expect("options");
        assert_eq!(options.row_shape, RowShape::Strict);
        assert_eq!(options.delimiter, b';');

        args.row_shape = Some(RowShape::Lenient);
        args.delimiter = Some(b'|');
        let options = config.ingest_options(&args).expect("options");
        assert_eq!(options.row_shape, RowShape::Lenient);
        assert_eq!(options.delimiter, b'|');
    }

    #[test]
    fn defaults_follow_input_extension() {
        let options = AnalysisConfig::default()
            .ingest_options(&input_args("usage.tsv"))
            .expect("options");
        assert_eq!(options.delimiter, b'\t');
        assert_eq!(options.row_shape, RowShape::Lenient);
    }

    #[test]
    fn invalid_config_delimiter_is_reported() {
        let config = AnalysisConfig::from_yaml_str("delimiter: ab\n").expect("parse config");
        let err = config
            .ingest_options(&input_args("usage.csv"))
            .expect_err("bad delimiter");
        assert!(err.to_string().contains("single character"));
    }
}
