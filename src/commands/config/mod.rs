use clap::Subcommand;

/// Configuration management commands.
#[derive(Subcommand, Clone, PartialEq, Eq, Debug)]
pub enum ConfigCommands {
    /// Print JSON Schema for the configuration file
    Schema,
}

impl ConfigCommands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Self::Schema => {
                let schema = crate::shared::config::generate_schema();
                let json = serde_json::to_string_pretty(&schema)?;
                println!("{json}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn schema_generates_valid_json() {
        let schema = crate::shared::config::generate_schema();
        let value: serde_json::Value = serde_json::to_value(&schema).unwrap();

        assert_eq!(value["title"], "Config");
        assert_eq!(value["type"], "object");
    }

    #[test]
    fn schema_contains_config_properties() {
        let schema = crate::shared::config::generate_schema();
        let value: serde_json::Value = serde_json::to_value(&schema).unwrap();

        let props = value["properties"].as_object().unwrap();
        assert!(props.contains_key("github"));
        assert!(props.contains_key("themes"));
        assert!(props.contains_key("labels"));
        assert!(props.contains_key("report"));

        let defs = value["$defs"].as_object().unwrap();
        let themes_props = defs["ThemesConfig"]["properties"].as_object().unwrap();
        assert!(themes_props.contains_key("tracking_project"));
        assert!(themes_props.contains_key("build_label_color"));
        assert!(themes_props.contains_key("labels"));
        assert_eq!(
            defs["GitHubConfig"]["properties"]["org"]["default"],
            "NASA-PDS"
        );
    }
}
