//! Organization list loading.
//!
//! Stands in for the organization registry: reads an ordered list of
//! organization records from a JSON array or a YAML sequence.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::graph::Organization;

/// Input formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Json,
    Yaml,
}

impl ListFormat {
    /// Detect the format from a path; anything that is not YAML is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => ListFormat::Yaml,
            _ => ListFormat::Json,
        }
    }
}

/// Parse an organization list from text.
pub fn parse_organizations(text: &str, format: ListFormat) -> Result<Vec<Organization>> {
    let orgs = match format {
        ListFormat::Json => serde_json::from_str(text)?,
        ListFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(orgs)
}

/// Load an organization list, keeping file order.
pub fn load_organizations(path: &Path) -> Result<Vec<Organization>> {
    let text = fs::read_to_string(path)?;
    let orgs = parse_organizations(&text, ListFormat::from_path(path))?;
    info!(path = %path.display(), count = orgs.len(), "organizations loaded");
    Ok(orgs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChartError;

    #[test]
    fn test_yaml_list() {
        let yaml = r#"
- id: acme
  name: Acme Corp
  type: company
  hierarchyLevel: 1
- id: sec
  name: Security
  type: department
  parentId: acme
  hierarchyLevel: 2
  securityContact: ciso@acme.test
"#;
        let orgs = parse_organizations(yaml, ListFormat::Yaml).unwrap();
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[1].parent_id.as_deref(), Some("acme"));
        assert_eq!(orgs[1].security_contact.as_deref(), Some("ciso@acme.test"));
    }

    #[test]
    fn test_json_file_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orgs.json");
        fs::write(
            &path,
            r#"[{"id":"b","name":"B","type":"t","hierarchyLevel":2},
               {"id":"a","name":"A","type":"t","hierarchyLevel":1}]"#,
        )
        .unwrap();
        let ids: Vec<String> = load_organizations(&path)
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_format_detection_and_errors() {
        assert_eq!(ListFormat::from_path(Path::new("x.yml")), ListFormat::Yaml);
        assert_eq!(ListFormat::from_path(Path::new("x.json")), ListFormat::Json);
        assert!(matches!(
            parse_organizations("{}", ListFormat::Json),
            Err(ChartError::Json(_))
        ));
        assert!(matches!(
            load_organizations(Path::new("/definitely/not/here.json")),
            Err(ChartError::Io(_))
        ));
    }
}
