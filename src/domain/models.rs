use serde::{Deserialize, Serialize};

/// Subdirectory of the output directory that receives agent policies.
pub const AGENT_POLICIES_DUMP_DIR: &str = "agent_policies";

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// One agent policy as returned by Fleet: the raw document plus the name it
/// is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPolicy {
    name: String,
    raw: String,
}

impl AgentPolicy {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn json(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Deserialize)]
pub struct PolicyId {
    pub id: String,
}

/// Typed view over the parts of a policy document used for filtering.
#[derive(Debug, Deserialize)]
pub struct PolicyEnvelope {
    pub id: String,
    #[serde(default)]
    pub package_policies: Option<Vec<PackagePolicyRef>>,
}

impl PolicyEnvelope {
    pub fn package_refs(&self) -> &[PackagePolicyRef] {
        self.package_policies.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PackagePolicyRef {
    #[allow(dead_code)]
    #[serde(default)]
    pub id: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package: PackageRef,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PackageRef {
    #[serde(default)]
    pub name: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub title: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DumpKind {
    Single,
    All,
    ByPackage,
}

#[derive(Debug, Serialize)]
pub struct DumpReport {
    pub kind: DumpKind,
    pub count: usize,
    pub dir: String,
}

/// On-disk connection settings, `$HOME/.config/fleetdump/config.json`.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct SettingsFile {
    #[serde(default)]
    pub kibana_host: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub insecure: Option<bool>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}
