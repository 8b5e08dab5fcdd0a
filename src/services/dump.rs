//! Agent policy export.
//!
//! Each export builds a [`FetchScope`], resolves it against the policy source
//! into a fresh list of [`AgentPolicy`] values and writes them in order under
//! `<dir>/agent_policies`. Nothing fetched is kept between calls.

use crate::domain::models::{
    AgentPolicy, PackagePolicyRef, PolicyEnvelope, PolicyId, AGENT_POLICIES_DUMP_DIR,
};
use crate::services::fleet::{FetchError, PolicySource, RawDocument};
use crate::services::storage::{JsonFileWriter, ObjectWriter, WriteError};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum DumpError {
    #[error("no agent policy name configured")]
    MissingTarget,
    #[error("failed to get agent policy")]
    Fetch(#[source] FetchError),
    #[error("failed to get agent policy ID")]
    Parse(#[source] serde_json::Error),
    #[error("failed to dump agent policy {name}")]
    Write {
        name: String,
        #[source]
        source: WriteError,
    },
}

/// Which policies a single export asks the source for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScope<'a> {
    One(&'a str),
    All,
    Package(&'a str),
}

impl FetchScope<'_> {
    pub fn fetch<S: PolicySource + ?Sized>(self, source: &S) -> Result<Vec<AgentPolicy>, DumpError> {
        match self {
            FetchScope::One(name) => {
                let raw = source.get_raw_policy(name).map_err(DumpError::Fetch)?;
                Ok(vec![AgentPolicy::new(name, raw)])
            }
            FetchScope::All => {
                let docs = source.list_raw_policies().map_err(DumpError::Fetch)?;
                decode_policies(docs)
            }
            FetchScope::Package(package) => {
                let docs = source.list_raw_policies().map_err(DumpError::Fetch)?;
                decode_policies_using_package(docs, package)
            }
        }
    }
}

fn decode_policies(docs: Vec<RawDocument>) -> Result<Vec<AgentPolicy>, DumpError> {
    let mut policies = Vec::with_capacity(docs.len());
    for raw in docs {
        let PolicyId { id } = serde_json::from_str(&raw).map_err(DumpError::Parse)?;
        policies.push(AgentPolicy::new(id, raw));
    }
    Ok(policies)
}

fn decode_policies_using_package(
    docs: Vec<RawDocument>,
    package: &str,
) -> Result<Vec<AgentPolicy>, DumpError> {
    let mut policies = Vec::new();
    for raw in docs {
        let envelope: PolicyEnvelope = serde_json::from_str(&raw).map_err(DumpError::Parse)?;
        if !uses_package(&envelope, package) {
            continue;
        }
        policies.push(AgentPolicy::new(envelope.id, raw));
    }
    Ok(policies)
}

pub fn package_names(refs: &[PackagePolicyRef]) -> Vec<&str> {
    refs.iter().map(|r| r.package.name.as_str()).collect()
}

/// Exact match of `package` against the package names a policy references.
pub fn uses_package(envelope: &PolicyEnvelope, package: &str) -> bool {
    package_names(envelope.package_refs()).contains(&package)
}

pub struct AgentPoliciesDumper<'a, S: PolicySource + ?Sized, W: ObjectWriter = JsonFileWriter> {
    target: Option<String>,
    source: &'a S,
    writer: W,
}

impl<'a, S: PolicySource + ?Sized> AgentPoliciesDumper<'a, S, JsonFileWriter> {
    pub fn new(source: &'a S, target: Option<String>) -> Self {
        Self::with_writer(source, target, JsonFileWriter)
    }
}

impl<'a, S: PolicySource + ?Sized, W: ObjectWriter> AgentPoliciesDumper<'a, S, W> {
    pub fn with_writer(source: &'a S, target: Option<String>, writer: W) -> Self {
        Self {
            target,
            source,
            writer,
        }
    }

    #[cfg(test)]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn set_target(&mut self, target: Option<String>) {
        self.target = target;
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Dumps the single policy named by the configured target.
    pub fn dump_agent_policy(&self, dir: &Path) -> Result<(), DumpError> {
        let name = self.target.as_deref().ok_or(DumpError::MissingTarget)?;
        let policies = FetchScope::One(name).fetch(self.source)?;
        self.write_all(dir, &policies)?;
        tracing::info!(policy = name, "dumped agent policy");
        Ok(())
    }

    pub fn dump_all(&self, dir: &Path) -> Result<usize, DumpError> {
        let policies = FetchScope::All.fetch(self.source)?;
        let count = self.write_all(dir, &policies)?;
        tracing::info!(count, "dumped agent policies");
        Ok(count)
    }

    pub fn dump_filtered_by_package(&self, package: &str, dir: &Path) -> Result<usize, DumpError> {
        let policies = FetchScope::Package(package).fetch(self.source)?;
        let count = self.write_all(dir, &policies)?;
        tracing::info!(count, package, "dumped agent policies using package");
        Ok(count)
    }

    // Stops at the first failure; files already written stay on disk.
    fn write_all(&self, dir: &Path, policies: &[AgentPolicy]) -> Result<usize, DumpError> {
        let dir = dir.join(AGENT_POLICIES_DUMP_DIR);
        for policy in policies {
            self.writer
                .write_object(&dir, policy)
                .map_err(|source| DumpError::Write {
                    name: policy.name().to_string(),
                    source,
                })?;
        }
        Ok(policies.len())
    }
}
