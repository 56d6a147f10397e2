//! The fixed tool catalog.
//!
//! Each warehouse operation is one [`ToolKind`] variant. Required fields, env
//! handling, the upstream operation and the published schema are all derived
//! from the variant by exhaustive `match`, so adding a tool means adding a
//! variant and filling in the arms.

use serde_json::{json, Value};

use wrhs_core::{UpstreamError, UpstreamParams, WarehouseBindings};

use crate::tool::{ToolDefinition, ToolError};

/// Every tool the server exposes, in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    GetObject,
    GetHead,
    ListVersions,
    ListEnvironments,
    GetEnvironmentDetails,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::GetObject,
        ToolKind::GetHead,
        ToolKind::ListVersions,
        ToolKind::ListEnvironments,
        ToolKind::GetEnvironmentDetails,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::GetObject => "get_object",
            ToolKind::GetHead => "get_head",
            ToolKind::ListVersions => "list_versions",
            ToolKind::ListEnvironments => "list_environments",
            ToolKind::GetEnvironmentDetails => "get_environment_details",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the tool takes an `env` argument (always required when taken).
    pub fn takes_env(self) -> bool {
        match self {
            ToolKind::GetObject | ToolKind::GetHead | ToolKind::GetEnvironmentDetails => true,
            ToolKind::ListVersions | ToolKind::ListEnvironments => false,
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        if self.takes_env() {
            &["name", "env"]
        } else {
            &["name"]
        }
    }

    fn missing_message(self) -> String {
        match self.required_fields() {
            [only] => format!("{only} is required"),
            [first, second] => format!("Both {first} and {second} are required"),
            fields => format!("{} are required", fields.join(", ")),
        }
    }

    /// Validate `args` and turn them into upstream parameters.
    ///
    /// Required fields must be non-empty strings. `env` is normalized.
    /// `get_object` additionally forwards `version` and `acceptedVariants`.
    pub fn build_params(self, args: &Value) -> Result<UpstreamParams, ToolError> {
        let missing = || ToolError::MissingArgument(self.missing_message());

        let name = string_arg(args, "name").ok_or_else(missing)?;
        let mut params = UpstreamParams::new(name);

        if self.takes_env() {
            let env = string_arg(args, "env").ok_or_else(missing)?;
            params.env = Some(normalize_env(env));
        }

        if self == ToolKind::GetObject {
            params.version = string_arg(args, "version");
            params.accepted_variants = args
                .get("acceptedVariants")
                .and_then(Value::as_array)
                .map(|variants| {
                    variants
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                });
        }

        Ok(params)
    }

    /// Call the upstream operation bound to this tool.
    pub async fn invoke(
        self,
        bindings: &WarehouseBindings,
        params: &UpstreamParams,
    ) -> Result<Value, UpstreamError> {
        match self {
            ToolKind::GetObject => bindings.objects.get(params).await,
            ToolKind::GetHead => bindings.objects.get_head(params).await,
            ToolKind::ListVersions => bindings.objects.list_versions(params).await,
            ToolKind::ListEnvironments => bindings.envs.list(params).await,
            ToolKind::GetEnvironmentDetails => bindings.envs.get(params).await,
        }
    }

    pub fn definition(self) -> ToolDefinition {
        let (description, input_schema) = match self {
            ToolKind::GetObject => (
                "Fetches complete object data from the Warehouse API, including the full \
                 package contents. Use this when you need the actual package data/files. For \
                 just checking versions, use get_head instead as it's more efficient.\n\n\
                 Use this tool to retrieve information about a specific object by name, \
                 environment, and optionally version and accepted variants.",
                object_schema(
                    json!({
                        "name": name_property("The name of the package/object to retrieve"),
                        "env": env_property(),
                        "acceptedVariants": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Optional array of accepted variants (e.g., ['en-US', 'en-GB'])"
                        },
                        "version": {
                            "type": "string",
                            "description": "Optional specific version of the object (e.g., '1.0.0'). If not provided, returns the latest version."
                        }
                    }),
                    self.required_fields(),
                ),
            ),
            ToolKind::GetHead => (
                "Fetches version information from the Warehouse API for a specific package \
                 and environment. This is the PRIMARY TOOL to use when users ask about \
                 warehouse versions.\n\n\
                 USE THIS TOOL when users ask questions like:\n\
                 - 'What is the warehouse version for [package]?'\n\
                 - 'What version of [package] is in wrhs?'\n\
                 - 'Tell me which version of [package] is available in dev/prod/staging'\n\
                 - 'What is in warehouse for [package]?'\n\n\
                 Returns headVersion (current deployed version) and latestVersion without \
                 downloading the full package data, making it much faster than get_object \
                 for version checks.",
                object_schema(
                    json!({
                        "name": name_property("The name of the package/object"),
                        "env": env_property()
                    }),
                    self.required_fields(),
                ),
            ),
            ToolKind::ListVersions => (
                "Lists all available versions for a specific package in Warehouse. This is \
                 useful for version discovery and history.\n\n\
                 USE THIS TOOL when users ask questions like:\n\
                 - 'What versions of [package] are available?'\n\
                 - 'Show me all versions of [package]'\n\
                 - 'What is the version history for [package]?'\n\
                 - 'List versions of [package]'\n\n\
                 Returns a list of all versions that have been published for the package.",
                object_schema(
                    json!({ "name": name_property("The name of the package/object") }),
                    self.required_fields(),
                ),
            ),
            ToolKind::ListEnvironments => (
                "Lists all environments where a specific package is deployed in \
                 Warehouse.\n\n\
                 USE THIS TOOL when users ask questions like:\n\
                 - 'Where is [package] deployed?'\n\
                 - 'What environments have [package]?'\n\
                 - 'Show me all environments for [package]'\n\
                 - 'Is [package] in production?'\n\n\
                 Returns a list of all environments (development, staging, production, etc.) \
                 where the package exists.",
                object_schema(
                    json!({ "name": name_property("The name of the package/object") }),
                    self.required_fields(),
                ),
            ),
            ToolKind::GetEnvironmentDetails => (
                "Fetches detailed information about a package in a specific environment, \
                 including metadata and configuration.\n\n\
                 USE THIS TOOL when users ask questions like:\n\
                 - 'Show me details about [package] in [environment]'\n\
                 - 'What is the configuration for [package] in prod?'\n\
                 - 'Give me environment-specific info for [package]'\n\n\
                 Returns detailed environment-specific metadata, configuration, and status \
                 information.",
                object_schema(
                    json!({
                        "name": name_property("The name of the package/object"),
                        "env": env_property()
                    }),
                    self.required_fields(),
                ),
            ),
        };

        ToolDefinition {
            name: self.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// The warehouse calls its staging environment "test".
pub fn normalize_env(env: String) -> String {
    if env == "staging" {
        "test".to_string()
    } else {
        env
    }
}

/// A present, non-empty string argument.
fn string_arg(args: &Value, field: &str) -> Option<String> {
    args.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn name_property(description: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("{description} (e.g., '@ux/application-sidebar')")
    })
}

fn env_property() -> Value {
    json!({
        "type": "string",
        "description": "The environment: use 'development' for dev, 'staging' for test, or 'production' for prod"
    })
}
