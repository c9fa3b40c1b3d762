use super::error::ProvisionError;
use super::runner::CommandRunner;
use std::fmt;
use tracing::{info, instrument, warn};

/// Knobs of the CI provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Environment variable holding the branch under test.
    pub branch_variable: String,
    pub environment_name: String,
    pub environment_file: String,
    /// Python package reinstalled and tested.
    pub package: String,
    /// The branch whose environment is never rebuilt.
    pub protected_branch: String,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            branch_variable: "TRAVIS_BRANCH".to_string(),
            environment_name: "lynx".to_string(),
            environment_file: "environment.yml".to_string(),
            package: "lynx".to_string(),
            protected_branch: "master".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RebuildEnvironment,
    Reinstall,
    Test,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::RebuildEnvironment => "rebuild-environment",
            Phase::Reinstall => "reinstall",
            Phase::Test => "test",
        };
        f.write_str(name)
    }
}

/// A single external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub phase: Phase,
    pub program: String,
    pub args: Vec<String>,
}

impl Step {
    fn new(phase: Phase, program: &str, args: &[&str]) -> Self {
        Self {
            phase,
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// A command run inside the named conda environment.
    fn in_environment(phase: Phase, environment: &str, command: &[&str]) -> Self {
        let mut args = vec!["run", "--name", environment];
        args.extend_from_slice(command);
        Self::new(phase, "conda", &args)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// The ordered provisioning steps for one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub branch: Option<String>,
    pub steps: Vec<Step>,
}

impl ProvisionPlan {
    /// Builds the plan for `branch`.
    ///
    /// The environment is removed and re-created from the environment file
    /// unless the branch is the protected one; an unknown branch counts as
    /// unprotected. The package is always reinstalled and its tests run
    /// under coverage.
    pub fn for_branch(branch: Option<&str>, settings: &ProvisionSettings) -> Self {
        let env = settings.environment_name.as_str();
        let package = settings.package.as_str();
        let mut steps = Vec::new();

        if branch != Some(settings.protected_branch.as_str()) {
            steps.push(Step::new(
                Phase::RebuildEnvironment,
                "conda",
                &["env", "remove", "--yes", "--name", env],
            ));
            steps.push(Step::new(
                Phase::RebuildEnvironment,
                "conda",
                &[
                    "env",
                    "create",
                    "--name",
                    env,
                    "--file",
                    &settings.environment_file,
                ],
            ));
        }

        steps.push(Step::in_environment(
            Phase::Reinstall,
            env,
            &["pip", "uninstall", "-y", package],
        ));
        steps.push(Step::in_environment(
            Phase::Reinstall,
            env,
            &["pip", "install", "-e", "."],
        ));
        let coverage = format!("--cov={}", package);
        steps.push(Step::in_environment(
            Phase::Test,
            env,
            &["pytest", "-v", &coverage],
        ));

        Self {
            branch: branch.map(str::to_string),
            steps,
        }
    }

    /// Builds the plan for the branch named by `settings.branch_variable`.
    pub fn from_env(settings: &ProvisionSettings) -> Self {
        let branch = std::env::var(&settings.branch_variable).ok();
        if branch.is_none() {
            warn!(
                "{} is not set; the environment will be rebuilt.",
                settings.branch_variable
            );
        }
        Self::for_branch(branch.as_deref(), settings)
    }

    pub fn rebuilds_environment(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.phase == Phase::RebuildEnvironment)
    }

    /// Runs the steps in order, stopping at the first failure.
    #[instrument(skip_all, fields(branch = ?self.branch))]
    pub fn execute(&self, runner: &mut impl CommandRunner) -> Result<(), ProvisionError> {
        for (i, step) in self.steps.iter().enumerate() {
            info!("[{}/{}] {}: {}", i + 1, self.steps.len(), step.phase, step);
            let code = runner.run(step).map_err(|source| ProvisionError::Spawn {
                command: step.to_string(),
                source,
            })?;
            if code != 0 {
                return Err(ProvisionError::CommandFailed {
                    command: step.to_string(),
                    code,
                });
            }
        }
        info!("Provisioning finished.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::runner::RecordingRunner;

    #[test]
    fn protected_branch_skips_environment_rebuild() {
        let plan = ProvisionPlan::for_branch(Some("master"), &ProvisionSettings::default());
        assert!(!plan.rebuilds_environment());
        let commands: Vec<String> = plan.steps.iter().map(ToString::to_string).collect();
        assert_eq!(
            commands,
            vec![
                "conda run --name lynx pip uninstall -y lynx",
                "conda run --name lynx pip install -e .",
                "conda run --name lynx pytest -v --cov=lynx",
            ]
        );
    }

    #[test]
    fn other_branches_rebuild_environment_first() {
        let plan = ProvisionPlan::for_branch(Some("feature/x"), &ProvisionSettings::default());
        assert!(plan.rebuilds_environment());
        assert_eq!(plan.steps.len(), 5);
        assert_eq!(plan.steps[0].to_string(), "conda env remove --yes --name lynx");
        assert_eq!(
            plan.steps[1].to_string(),
            "conda env create --name lynx --file environment.yml"
        );
        assert_eq!(plan.steps[2].phase, Phase::Reinstall);
    }

    #[test]
    fn unset_branch_counts_as_unprotected() {
        let plan = ProvisionPlan::for_branch(None, &ProvisionSettings::default());
        assert!(plan.rebuilds_environment());
    }

    #[test]
    fn branch_match_is_exact() {
        let settings = ProvisionSettings::default();
        assert!(ProvisionPlan::for_branch(Some("Master"), &settings).rebuilds_environment());
        assert!(ProvisionPlan::for_branch(Some("master "), &settings).rebuilds_environment());
    }

    #[test]
    fn settings_rename_environment_and_package() {
        let settings = ProvisionSettings {
            environment_name: "ci env".to_string(),
            package: "other".to_string(),
            protected_branch: "main".to_string(),
            ..Default::default()
        };
        let plan = ProvisionPlan::for_branch(Some("main"), &settings);
        assert_eq!(
            plan.steps[0].to_string(),
            "conda run --name 'ci env' pip uninstall -y other"
        );
    }

    #[test]
    fn execution_stops_at_first_failure() {
        let plan = ProvisionPlan::for_branch(Some("dev"), &ProvisionSettings::default());
        let mut runner = RecordingRunner::default();
        runner.failures.insert(
            "conda env create --name lynx --file environment.yml".to_string(),
            3,
        );

        let err = plan.execute(&mut runner).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(runner.invoked.len(), 2);
    }

    #[test]
    fn successful_execution_runs_every_step() {
        let plan = ProvisionPlan::for_branch(Some("master"), &ProvisionSettings::default());
        let mut runner = RecordingRunner::default();
        plan.execute(&mut runner).unwrap();
        assert_eq!(runner.invoked.len(), plan.steps.len());
    }
}
