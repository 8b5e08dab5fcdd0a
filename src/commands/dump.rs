use crate::cli::{Cli, DumpCommands};
use crate::domain::models::{DumpKind, DumpReport, AGENT_POLICIES_DUMP_DIR};
use crate::services::dump::AgentPoliciesDumper;
use crate::services::fleet::PolicySource;
use crate::services::output::print_one;
use anyhow::Context;

pub fn handle_dump_commands<S: PolicySource + ?Sized>(
    cli: &Cli,
    command: &DumpCommands,
    source: &S,
) -> anyhow::Result<()> {
    match command {
        DumpCommands::AgentPolicies {
            output,
            agent_policy,
            package,
        } => {
            let dumper = AgentPoliciesDumper::new(source, agent_policy.clone());
            let (kind, count) = match (agent_policy, package) {
                (Some(name), _) => {
                    dumper
                        .dump_agent_policy(output)
                        .with_context(|| format!("dump of agent policy {} failed", name))?;
                    (DumpKind::Single, 1)
                }
                (None, Some(package)) => {
                    let count = dumper
                        .dump_filtered_by_package(package, output)
                        .with_context(|| {
                            format!("dump of agent policies using {} failed", package)
                        })?;
                    (DumpKind::ByPackage, count)
                }
                (None, None) => {
                    let count = dumper
                        .dump_all(output)
                        .context("dump of agent policies failed")?;
                    (DumpKind::All, count)
                }
            };
            let report = DumpReport {
                kind,
                count,
                dir: output
                    .join(AGENT_POLICIES_DUMP_DIR)
                    .to_string_lossy()
                    .to_string(),
            };
            print_one(cli.json, report, |r| {
                format!("dumped {} agent policies to {}", r.count, r.dir)
            })?;
        }
    }
    Ok(())
}
