//! `kubectl get pods` and `kubectl get deployments` listings.

use super::listing::{Column, ListingFactory, ListingSpec};
use super::{FactoryOptions, command_terminal, popup_command, run_command};
use crate::action::ActionDescriptor;
use crate::invocation::MatcherContext;
use crate::region::{MenuEntry, RegionMetadata};
use regex::Regex;
use std::sync::OnceLock;

pub const PODS: &str = "kubectl-get-pods";
pub const DEPLOYMENTS: &str = "kubectl-get-deployments";

/// Connection type code for kubernetes pods.
const CONNECTION_TYPE: &str = "11";

static PODS_REGEX: OnceLock<Regex> = OnceLock::new();
static DEPLOYMENTS_REGEX: OnceLock<Regex> = OnceLock::new();

fn pods_regex() -> &'static Regex {
    PODS_REGEX.get_or_init(|| {
        Regex::new(r"^kubectl get pods?").expect("regex pattern is valid and should always compile")
    })
}

fn deployments_regex() -> &'static Regex {
    DEPLOYMENTS_REGEX.get_or_init(|| {
        Regex::new(r"^kubectl get deployments?")
            .expect("regex pattern is valid and should always compile")
    })
}

static PODS_SPEC: ListingSpec = ListingSpec {
    name: PODS,
    header: "NAME",
    column: Column::Index(0),
    stop_on_blank: false,
    command: |cmd| pods_regex().is_match(cmd),
    params: pod_params,
};

static DEPLOYMENTS_SPEC: ListingSpec = ListingSpec {
    name: DEPLOYMENTS,
    header: "NAME",
    column: Column::Index(0),
    stop_on_blank: false,
    command: |cmd| deployments_regex().is_match(cmd),
    params: deployment_params,
};

pub fn pods_factory(options: FactoryOptions) -> ListingFactory {
    ListingFactory::new(&PODS_SPEC, options)
}

pub fn deployments_factory(options: FactoryOptions) -> ListingFactory {
    ListingFactory::new(&DEPLOYMENTS_SPEC, options)
}

/// Delete entry with its confirmation, then the cluster-wide entries.
fn delete_and_cluster_entries(server: &str, kind: &str, name: &str, menu: &mut Vec<MenuEntry>) {
    menu.push(MenuEntry::action(
        run_command(server, "kubectl", &["delete", kind, name]),
        "&Stop",
        "shutdown",
        format!("Delete the {kind}"),
    ));
    menu.push(MenuEntry::confirm(format!("Really delete {kind} {name}?")));
    menu.push(MenuEntry::Separator);
    menu.push(MenuEntry::action(
        popup_command(server, "kubectl", &["config", "view"]),
        "&Kubectl Config View",
        "help-about",
        "Show kubectl configuration",
    ));
    menu.push(MenuEntry::action(
        popup_command(server, "kubectl", &["version"]),
        "Kubectl &Version",
        "",
        "Show kubectl version",
    ));
}

fn pod_params(ctx: &MatcherContext, name: &str) -> RegionMetadata {
    let server = ctx.server_id.as_str();
    let connect = ActionDescriptor::new("NewConnection")
        .arg(CONNECTION_TYPE)
        .arg(name)
        .arg(server);

    let mut meta = RegionMetadata::new()
        .with_icon("container")
        .with_tooltip("Double-click to open connection")
        .with_action(connect.clone())
        .with_drag("text/plain", name);

    let menu = &mut meta.menu;
    menu.push(MenuEntry::action(
        connect,
        "&Connect",
        "connection-launch",
        "Open a connection to the default container",
    ));
    menu.push(MenuEntry::action(
        command_terminal(server, "kubectl", &["exec", name, "-ti", "--", "/bin/bash"]),
        "&Open Shell",
        "new-terminal",
        "Run bash in the default container in a new terminal",
    ));
    menu.push(MenuEntry::Separator);
    menu.push(MenuEntry::action(
        popup_command(server, "kubectl", &["describe", "pod", name]),
        "&Describe",
        "inspect-item",
        "Show pod information",
    ));
    menu.push(MenuEntry::Separator);
    delete_and_cluster_entries(server, "pod", name, menu);
    meta
}

fn deployment_params(ctx: &MatcherContext, name: &str) -> RegionMetadata {
    let server = ctx.server_id.as_str();
    let describe = popup_command(server, "kubectl", &["describe", "deployment", name]);

    let mut meta = RegionMetadata::new()
        .with_icon("container")
        .with_tooltip("Double-click to show deployment information")
        .with_action(describe.clone())
        .with_drag("text/plain", name);

    meta.push_menu(MenuEntry::action(
        describe,
        "&Describe",
        "help-about",
        "Show deployment information",
    ));
    meta.push_menu(MenuEntry::Separator);
    delete_and_cluster_entries(server, "deployment", name, &mut meta.menu);
    meta
}
