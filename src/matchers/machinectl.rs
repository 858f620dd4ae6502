//! `machinectl list` and `machinectl list-images` listings.
//!
//! Both stop at the first blank line, which separates the table from the
//! "N machines listed." footer.

use super::listing::{Column, ListingFactory, ListingSpec};
use super::{FactoryOptions, command_terminal, popup_command, run_command};
use crate::action::ActionDescriptor;
use crate::invocation::MatcherContext;
use crate::region::{MenuEntry, RegionMetadata};

pub const LIST: &str = "machinectl-list";
pub const LIST_IMAGES: &str = "machinectl-list-images";

/// Connection type code for systemd-nspawn machines.
const CONNECTION_TYPE: &str = "9";

static LIST_SPEC: ListingSpec = ListingSpec {
    name: LIST,
    header: "MACHINE",
    column: Column::Leading,
    stop_on_blank: true,
    command: |cmd| cmd == "machinectl list",
    params: machine_params,
};

static LIST_IMAGES_SPEC: ListingSpec = ListingSpec {
    name: LIST_IMAGES,
    header: "NAME",
    column: Column::Leading,
    stop_on_blank: true,
    command: |cmd| cmd == "machinectl list-images",
    params: image_params,
};

pub fn list_factory(options: FactoryOptions) -> ListingFactory {
    ListingFactory::new(&LIST_SPEC, options)
}

pub fn list_images_factory(options: FactoryOptions) -> ListingFactory {
    ListingFactory::new(&LIST_IMAGES_SPEC, options)
}

fn machine_params(ctx: &MatcherContext, name: &str) -> RegionMetadata {
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
        "Open a connection to this container",
    ));
    menu.push(MenuEntry::action(
        command_terminal(server, "machinectl", &["login", name]),
        "&Login",
        "new-terminal",
        "Login to this container in a new terminal",
    ));
    menu.push(MenuEntry::Separator);
    menu.push(MenuEntry::action(
        popup_command(server, "machinectl", &["status", name]),
        "&Status",
        "inspect-item",
        "Get container status",
    ));
    menu.push(MenuEntry::Separator);
    for (verb, label, icon, tip) in [
        ("poweroff", "&Poweroff", "shutdown", "Power off the container"),
        ("reboot", "&Reboot", "reboot", "Reboot the container"),
        ("terminate", "&Terminate", "destroy", "Terminate the container"),
    ] {
        menu.push(MenuEntry::action(
            run_command(server, "machinectl", &[verb, name]),
            label,
            icon,
            tip,
        ));
    }
    menu.push(MenuEntry::confirm(format!(
        "This will halt container {name} without shutting down cleanly. Proceed?"
    )));
    meta
}

fn image_params(ctx: &MatcherContext, name: &str) -> RegionMetadata {
    let start = run_command(&ctx.server_id, "machinectl", &["start", name]);
    let mut meta = RegionMetadata::new()
        .with_icon("container")
        .with_tooltip("Double-click to start container")
        .with_action(start.clone())
        .with_drag("text/plain", name);
    meta.push_menu(MenuEntry::action(
        start,
        "&Start Container",
        "resume",
        "Start a container using this image",
    ));
    meta
}
