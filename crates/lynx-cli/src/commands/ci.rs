use crate::cli::{CiArgs, CiCommands};
use crate::config::{FileConfig, build_provision_settings};
use crate::error::Result;
use lynx::provision::{ProvisionPlan, ProvisionSettings, SystemRunner};
use tracing::info;

pub fn run(args: CiArgs, file_config: &FileConfig) -> Result<()> {
    let settings = build_provision_settings(file_config);
    match args.command {
        CiCommands::Plan { branch } => {
            let plan = plan_for(branch.as_deref(), &settings);
            print_plan(&plan, &settings);
            Ok(())
        }
        CiCommands::Run { branch } => {
            let plan = plan_for(branch.as_deref(), &settings);
            print_plan(&plan, &settings);
            plan.execute(&mut SystemRunner)?;
            println!("✓ Provisioning completed.");
            Ok(())
        }
    }
}

fn plan_for(branch: Option<&str>, settings: &ProvisionSettings) -> ProvisionPlan {
    match branch {
        Some(branch) => {
            info!("Using branch '{}' from the command line.", branch);
            ProvisionPlan::for_branch(Some(branch), settings)
        }
        None => ProvisionPlan::from_env(settings),
    }
}

fn print_plan(plan: &ProvisionPlan, settings: &ProvisionSettings) {
    println!(
        "Branch: {} ({})",
        plan.branch.as_deref().unwrap_or("<unset>"),
        if plan.rebuilds_environment() {
            "environment will be rebuilt"
        } else {
            "protected, environment kept"
        }
    );
    println!("Environment: {} from {}", settings.environment_name, settings.environment_file);
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {:>2}. [{}] {}", i + 1, step.phase, step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_branch_takes_precedence_over_environment() {
        let settings = ProvisionSettings {
            branch_variable: "LYNX_TEST_UNSET_BRANCH_VARIABLE".to_string(),
            ..Default::default()
        };
        assert!(!plan_for(Some("master"), &settings).rebuilds_environment());
        assert!(plan_for(None, &settings).rebuilds_environment());
    }
}
