//! Built-in matchers for common command-line tools.
//!
//! | Name | Command | Kind |
//! |------|---------|------|
//! | `docker-ps` | `docker ps` | listing |
//! | `docker-images` | `docker images`, `docker image ls` | listing |
//! | `kubectl-get-pods` | `kubectl get pod(s)` | listing |
//! | `kubectl-get-deployments` | `kubectl get deployment(s)` | listing |
//! | `machinectl-list` | `machinectl list` | listing |
//! | `machinectl-list-images` | `machinectl list-images` | listing |
//! | `git-status` | `git status` | sections |
//! | `make` | `make` (fast) | diagnostics |
//!
//! Every matcher honours its [`MatcherSettings`] from the config: it can be
//! disabled, given aliases, or have its scheduling flags overridden.

pub mod docker;
pub mod git_status;
pub mod kubectl;
mod listing;
pub mod machinectl;
pub mod make;

pub use listing::{Column, ListingFactory, ListingMatcher, ListingPhase, ListingSpec};

use crate::action::ActionDescriptor;
use crate::matcher::{FinishPolicy, MatcherFactory};
use crate::registry::{MatcherRegistry, RegistrationError};
use par_annotate_config::{Config, MatcherSettings};

/// Per-factory options drawn from [`MatcherSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoryOptions {
    /// Full command lines that activate the matcher in addition to its own.
    pub aliases: Vec<String>,
    pub fast: Option<bool>,
    pub finish_after_stop: Option<bool>,
}

impl FactoryOptions {
    pub fn from_settings(settings: &MatcherSettings) -> Self {
        Self {
            aliases: settings.aliases.clone(),
            fast: settings.fast,
            finish_after_stop: settings.finish_after_stop,
        }
    }

    pub fn is_alias(&self, command: &str) -> bool {
        self.aliases.iter().any(|a| a.trim() == command)
    }

    pub fn fast_or(&self, default: bool) -> bool {
        self.fast.unwrap_or(default)
    }

    pub fn finish_policy_or(&self, default: FinishPolicy) -> FinishPolicy {
        self.finish_after_stop
            .map_or(default, FinishPolicy::from_flag)
    }
}

/// Exit-code gate shared by the buffered built-ins: unknown or zero passes.
pub(crate) fn succeeded(exit_code: Option<i32>) -> bool {
    exit_code.is_none_or(|code| code == 0)
}

/// `[program, program, args...]`: program path followed by argv.
fn cmdspec(program: &str, args: &[&str]) -> Vec<String> {
    [program, program]
        .iter()
        .chain(args)
        .map(|s| s.to_string())
        .collect()
}

/// Show the command's output in a popup.
pub(crate) fn popup_command(server: &str, program: &str, args: &[&str]) -> ActionDescriptor {
    ActionDescriptor::new("PopupCommand")
        .arg(server)
        .list_arg(cmdspec(program, args))
}

/// Run the command in the background.
pub(crate) fn run_command(server: &str, program: &str, args: &[&str]) -> ActionDescriptor {
    ActionDescriptor::new("RunCommand")
        .arg(server)
        .list_arg(cmdspec(program, args))
}

/// Run the command in a new terminal.
pub(crate) fn command_terminal(server: &str, program: &str, args: &[&str]) -> ActionDescriptor {
    ActionDescriptor::new("CommandTerminal")
        .arg("")
        .arg(server)
        .list_arg(cmdspec(program, args))
}

type Builder = fn(FactoryOptions, &Config) -> Box<dyn MatcherFactory>;

/// Register every enabled built-in matcher in a fixed order.
pub fn register_builtin_matchers(
    registry: &mut MatcherRegistry,
    config: &Config,
) -> Result<(), RegistrationError> {
    let builtins: [(&str, Builder); 8] = [
        (docker::PS, |o, _| Box::new(docker::ps_factory(o))),
        (docker::IMAGES, |o, _| Box::new(docker::images_factory(o))),
        (kubectl::PODS, |o, _| Box::new(kubectl::pods_factory(o))),
        (kubectl::DEPLOYMENTS, |o, _| {
            Box::new(kubectl::deployments_factory(o))
        }),
        (machinectl::LIST, |o, _| Box::new(machinectl::list_factory(o))),
        (machinectl::LIST_IMAGES, |o, _| {
            Box::new(machinectl::list_images_factory(o))
        }),
        (git_status::NAME, |o, _| {
            Box::new(git_status::GitStatusFactory::new(o))
        }),
        (make::NAME, |o, c| Box::new(make::MakeFactory::new(o, &c.make))),
    ];

    for (name, build) in builtins {
        if !config.matcher_enabled(name) {
            log::info!("Built-in matcher {} disabled by config", name);
            continue;
        }
        let options = FactoryOptions::from_settings(&config.matcher(name));
        registry.register(build(options, config))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_register() {
        let mut registry = MatcherRegistry::new();
        register_builtin_matchers(&mut registry, &Config::default()).unwrap();
        let names: Vec<&str> = registry.factories().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "docker-ps",
                "docker-images",
                "kubectl-get-pods",
                "kubectl-get-deployments",
                "machinectl-list",
                "machinectl-list-images",
                "git-status",
                "make"
            ]
        );
        let fast: Vec<&str> = registry
            .factories()
            .filter(|f| f.fast())
            .map(|f| f.name())
            .collect();
        assert_eq!(fast, vec!["make"]);
    }

    #[test]
    fn test_disabled_and_overridden_builtins() {
        let yaml = "matchers:\n  make:\n    enabled: false\n  git-status:\n    fast: true\n    finish_after_stop: true\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        let mut registry = MatcherRegistry::new();
        register_builtin_matchers(&mut registry, &config).unwrap();

        assert!(registry.factories().all(|f| f.name() != "make"));
        let git = registry
            .factories()
            .find(|f| f.name() == "git-status")
            .unwrap();
        assert!(git.fast());
        assert_eq!(git.finish_policy(), FinishPolicy::Always);
    }

    #[test]
    fn test_cmdspec_repeats_program() {
        let action = run_command("srv", "docker", &["stop", "web1"]);
        assert_eq!(
            action.to_wire().unwrap(),
            "RunCommand|srv|docker\x1fdocker\x1fstop\x1fweb1"
        );
        let action = command_terminal("srv", "machinectl", &["login", "box"]);
        assert_eq!(
            action.to_wire().unwrap(),
            "CommandTerminal||srv|machinectl\x1fmachinectl\x1flogin\x1fbox"
        );
    }

    #[test]
    fn test_succeeded() {
        assert!(succeeded(None));
        assert!(succeeded(Some(0)));
        assert!(!succeeded(Some(2)));
    }
}
