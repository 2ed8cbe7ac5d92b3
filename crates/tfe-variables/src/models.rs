//! Variable models and the option structures accepted by the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tfe_core::id::{valid_string, VariableId, WorkspaceId};
use tfe_core::jsonapi::{Field, Pagination, ResourceSchema, Schema};
use tfe_core::query::{ListOptions, QueryParams};
use tfe_core::{Error, Result};

/// JSON:API resource type of variables.
pub const VARIABLE_RESOURCE_TYPE: &str = "vars";

/// JSON:API resource type of workspaces.
pub const WORKSPACE_RESOURCE_TYPE: &str = "workspaces";

/// Whether a variable is an environment variable or a Terraform input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Exported into the run environment.
    Env,
    /// Passed to Terraform as an input variable.
    Terraform,
}

impl CategoryType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Terraform => "terraform",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "env" => Ok(Self::Env),
            "terraform" => Ok(Self::Terraform),
            other => Err(Error::DecodeError(format!("unknown variable category `{other}`"))),
        }
    }
}

/// Reference to the workspace that owns a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace ID.
    pub id: WorkspaceId,
}

impl Workspace {
    /// Reference a workspace by ID.
    #[must_use]
    pub const fn new(id: WorkspaceId) -> Self {
        Self { id }
    }
}

/// A workspace variable as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Server-assigned identifier.
    pub id: VariableId,
    /// Variable name.
    pub key: String,
    /// Variable value; empty when the variable is sensitive.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    /// Variable category.
    pub category: CategoryType,
    /// Whether the value is evaluated as HCL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hcl: bool,
    /// Whether the value is write-only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sensitive: bool,
    /// Owning workspace. Not reliable on create responses.
    #[serde(default)]
    pub workspace: Option<Workspace>,
}

impl ResourceSchema for Variable {
    const SCHEMA: Schema = Schema {
        resource_type: VARIABLE_RESOURCE_TYPE,
        fields: &[
            Field::primary("id"),
            Field::attribute("key", "key"),
            Field::attribute("value", "value"),
            Field::attribute("category", "category"),
            Field::attribute("hcl", "hcl"),
            Field::attribute("sensitive", "sensitive"),
            Field::relation("workspace", "workspace", WORKSPACE_RESOURCE_TYPE),
        ],
    };
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One page of variables together with the server's pagination details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableList {
    /// Variables in server order.
    pub items: Vec<Variable>,
    /// Pagination details, if the server sent any.
    pub pagination: Option<Pagination>,
}

/// Filters for listing variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableListOptions {
    /// Pagination.
    pub list: ListOptions,
    /// Organization name (required).
    pub organization: Option<String>,
    /// Workspace name (required).
    pub workspace: Option<String>,
}

impl VariableListOptions {
    /// Filter by organization and workspace name.
    #[must_use]
    pub fn new(organization: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            list: ListOptions::default(),
            organization: Some(organization.into()),
            workspace: Some(workspace.into()),
        }
    }

    /// Request a specific page.
    #[must_use]
    pub const fn with_list_options(mut self, list: ListOptions) -> Self {
        self.list = list;
        self
    }

    /// Check required filters, Organization first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first missing filter.
    pub fn validate(&self) -> Result<()> {
        if !valid_string(self.organization.as_deref()) {
            return Err(Error::MissingField("Organization"));
        }
        if !valid_string(self.workspace.as_deref()) {
            return Err(Error::MissingField("Workspace"));
        }
        Ok(())
    }

    /// Convert to URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_list_options(&self.list);
        params.push_opt("filter[organization][name]", self.organization.as_deref());
        params.push_opt("filter[workspace][name]", self.workspace.as_deref());
        params.into_pairs()
    }
}

/// Options for creating a variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCreateOptions {
    /// For internal use only. Always cleared before the request is sent.
    #[serde(default)]
    pub id: Option<String>,
    /// Variable name (required).
    #[serde(default)]
    pub key: Option<String>,
    /// Variable value (required).
    #[serde(default)]
    pub value: Option<String>,
    /// Variable category (required).
    #[serde(default)]
    pub category: Option<CategoryType>,
    /// Evaluate the value as HCL.
    #[serde(default)]
    pub hcl: Option<bool>,
    /// Make the value write-only.
    #[serde(default)]
    pub sensitive: Option<bool>,
    /// Owning workspace (required).
    #[serde(default)]
    pub workspace: Option<Workspace>,
}

impl ResourceSchema for VariableCreateOptions {
    const SCHEMA: Schema = Schema {
        resource_type: VARIABLE_RESOURCE_TYPE,
        fields: &[
            Field::primary("id"),
            Field::attribute("key", "key"),
            Field::attribute("value", "value"),
            Field::attribute("category", "category"),
            Field::attribute("hcl", "hcl").omit_empty(),
            Field::attribute("sensitive", "sensitive").omit_empty(),
            Field::relation("workspace", "workspace", WORKSPACE_RESOURCE_TYPE),
        ],
    };
}

impl VariableCreateOptions {
    /// Options with every required field set.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        category: CategoryType,
        workspace: Workspace,
    ) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
            category: Some(category),
            workspace: Some(workspace),
            ..Self::default()
        }
    }

    /// Set the HCL flag.
    #[must_use]
    pub fn with_hcl(mut self, hcl: bool) -> Self {
        self.hcl = Some(hcl);
        self
    }

    /// Set the sensitive flag.
    #[must_use]
    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = Some(sensitive);
        self
    }

    /// Check required fields in the order Key, Value, Category, Workspace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for the first missing field.
    pub fn validate(&self) -> Result<()> {
        if !valid_string(self.key.as_deref()) {
            return Err(Error::MissingField("Key"));
        }
        if !valid_string(self.value.as_deref()) {
            return Err(Error::MissingField("Value"));
        }
        if self.category.is_none() {
            return Err(Error::MissingField("Category"));
        }
        if self.workspace.is_none() {
            return Err(Error::MissingField("Workspace"));
        }
        Ok(())
    }
}

/// Options for updating a variable. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableUpdateOptions {
    /// For internal use only. Always replaced by the ID being updated.
    #[serde(default)]
    pub id: Option<String>,
    /// New variable name.
    #[serde(default)]
    pub key: Option<String>,
    /// New variable value.
    #[serde(default)]
    pub value: Option<String>,
    /// New category.
    #[serde(default)]
    pub category: Option<CategoryType>,
    /// New HCL flag.
    #[serde(default)]
    pub hcl: Option<bool>,
    /// New sensitive flag.
    #[serde(default)]
    pub sensitive: Option<bool>,
}

impl ResourceSchema for VariableUpdateOptions {
    const SCHEMA: Schema = Schema {
        resource_type: VARIABLE_RESOURCE_TYPE,
        fields: &[
            Field::primary("id"),
            Field::attribute("key", "key").omit_empty(),
            Field::attribute("value", "value").omit_empty(),
            Field::attribute("category", "category").omit_empty(),
            Field::attribute("hcl", "hcl").omit_empty(),
            Field::attribute("sensitive", "sensitive").omit_empty(),
        ],
    };
}

impl VariableUpdateOptions {
    /// Set a new key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set a new value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set a new category.
    #[must_use]
    pub fn with_category(mut self, category: CategoryType) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the HCL flag.
    #[must_use]
    pub fn with_hcl(mut self, hcl: bool) -> Self {
        self.hcl = Some(hcl);
        self
    }

    /// Set the sensitive flag.
    #[must_use]
    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = Some(sensitive);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tfe_core::jsonapi::{decode, encode, ResourceObject};

    fn workspace() -> Workspace {
        Workspace::new(WorkspaceId::parse_str("ws-123").unwrap())
    }

    #[test]
    fn category_wire_format() {
        assert_eq!(serde_json::to_value(CategoryType::Env).unwrap(), json!("env"));
        assert_eq!(
            serde_json::to_value(CategoryType::Terraform).unwrap(),
            json!("terraform")
        );
        assert_eq!("terraform".parse::<CategoryType>().unwrap(), CategoryType::Terraform);
        assert!("shell".parse::<CategoryType>().is_err());
        assert_eq!(CategoryType::Env.to_string(), "env");
    }

    #[test]
    fn list_options_validation_order() {
        let err = VariableListOptions::default().validate().unwrap_err();
        assert_eq!(err, Error::MissingField("Organization"));

        let only_workspace = VariableListOptions {
            workspace: Some("prod".into()),
            ..VariableListOptions::default()
        };
        assert_eq!(
            only_workspace.validate().unwrap_err().to_string(),
            "Organization is required"
        );

        let only_org = VariableListOptions {
            organization: Some("acme".into()),
            ..VariableListOptions::default()
        };
        assert_eq!(only_org.validate().unwrap_err(), Error::MissingField("Workspace"));

        let empty_org = VariableListOptions {
            organization: Some(String::new()),
            workspace: Some("prod".into()),
            ..VariableListOptions::default()
        };
        assert_eq!(empty_org.validate().unwrap_err(), Error::MissingField("Organization"));

        assert!(VariableListOptions::new("acme", "prod").validate().is_ok());
    }

    #[test]
    fn list_options_to_pairs() {
        let pairs = VariableListOptions::new("acme", "prod")
            .with_list_options(ListOptions::page(2, 50))
            .to_pairs();
        assert!(pairs.contains(&("filter[organization][name]", "acme".into())));
        assert!(pairs.contains(&("filter[workspace][name]", "prod".into())));
        assert!(pairs.contains(&("page[number]", "2".into())));
        assert!(pairs.contains(&("page[size]", "50".into())));

        let pairs = VariableListOptions::new("acme", "prod").to_pairs();
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn create_options_validation_order() {
        let full = VariableCreateOptions::new("region", "eu-west-1", CategoryType::Env, workspace());
        assert!(full.validate().is_ok());

        let missing = |f: fn(&mut VariableCreateOptions)| {
            let mut options = full.clone();
            f(&mut options);
            options.validate().unwrap_err()
        };

        assert_eq!(missing(|o| o.key = None), Error::MissingField("Key"));
        assert_eq!(missing(|o| o.key = Some(String::new())), Error::MissingField("Key"));
        assert_eq!(missing(|o| o.value = None), Error::MissingField("Value"));
        assert_eq!(missing(|o| o.category = None), Error::MissingField("Category"));
        assert_eq!(missing(|o| o.workspace = None), Error::MissingField("Workspace"));
        assert_eq!(VariableCreateOptions::default().validate().unwrap_err(), Error::MissingField("Key"));
    }

    #[test]
    fn create_options_encoding() {
        let options = VariableCreateOptions::new("region", "eu-west-1", CategoryType::Env, workspace());
        let resource = encode(&options).unwrap();
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({
                "type": "vars",
                "attributes": {
                    "key": "region",
                    "value": "eu-west-1",
                    "category": "env"
                },
                "relationships": {
                    "workspace": { "data": { "type": "workspaces", "id": "ws-123" } }
                }
            })
        );

        let options = options.with_hcl(true).with_sensitive(false);
        let resource = encode(&options).unwrap();
        assert_eq!(resource.attributes.get("hcl"), Some(&json!(true)));
        assert_eq!(resource.attributes.get("sensitive"), Some(&json!(false)));
    }

    #[test]
    fn update_options_only_encode_set_fields() {
        let resource = encode(&VariableUpdateOptions::default().with_key("renamed")).unwrap();
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({ "type": "vars", "attributes": { "key": "renamed" } })
        );

        let resource = encode(&VariableUpdateOptions::default()).unwrap();
        assert!(resource.attributes.is_empty());
        assert!(resource.relationships.is_empty());
    }

    #[test]
    fn variable_decodes_redacted_value() {
        let resource: ResourceObject = serde_json::from_value(json!({
            "id": "var-1",
            "type": "vars",
            "attributes": {
                "key": "token",
                "value": null,
                "sensitive": true,
                "category": "env",
                "hcl": false
            },
            "relationships": {
                "configurable": { "data": { "id": "ws-123", "type": "workspaces" } }
            }
        }))
        .unwrap();

        let variable: Variable = decode(resource).unwrap();
        assert_eq!(variable.value, "");
        assert!(variable.sensitive);
        assert_eq!(variable.workspace, None);
    }
}
