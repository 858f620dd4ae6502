//! `docker ps` and `docker images` listings.

use super::listing::{Column, ListingFactory, ListingSpec};
use super::{FactoryOptions, command_terminal, popup_command, run_command};
use crate::action::ActionDescriptor;
use crate::invocation::MatcherContext;
use crate::region::{MenuEntry, RegionMetadata};

pub const PS: &str = "docker-ps";
pub const IMAGES: &str = "docker-images";

/// Connection type code for docker containers.
const CONNECTION_TYPE: &str = "10";

static PS_SPEC: ListingSpec = ListingSpec {
    name: PS,
    header: "CONTAINER",
    // NAMES is the final column
    column: Column::Last,
    stop_on_blank: false,
    command: |cmd| cmd == "docker ps",
    params: container_params,
};

static IMAGES_SPEC: ListingSpec = ListingSpec {
    name: IMAGES,
    header: "REPOSITORY",
    // REPOSITORY TAG IMAGE-ID ...
    column: Column::Index(2),
    stop_on_blank: false,
    command: |cmd| cmd == "docker images" || cmd == "docker image ls",
    params: image_params,
};

pub fn ps_factory(options: FactoryOptions) -> ListingFactory {
    ListingFactory::new(&PS_SPEC, options)
}

pub fn images_factory(options: FactoryOptions) -> ListingFactory {
    ListingFactory::new(&IMAGES_SPEC, options)
}

fn docker_info_entries(server: &str, menu: &mut Vec<MenuEntry>) {
    menu.push(MenuEntry::action(
        popup_command(server, "docker", &["info"]),
        "&Docker Info",
        "help-about",
        "Show information about the docker installation",
    ));
    menu.push(MenuEntry::action(
        popup_command(server, "docker", &["version"]),
        "Docker &Version",
        "",
        "Show information about the docker version",
    ));
}

fn container_params(ctx: &MatcherContext, name: &str) -> RegionMetadata {
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
        command_terminal(server, "docker", &["exec", "-ti", name, "/bin/bash"]),
        "&Open Shell",
        "new-terminal",
        "Run bash in this container in a new terminal",
    ));
    menu.push(MenuEntry::Separator);
    menu.push(MenuEntry::action(
        popup_command(server, "docker", &["inspect", name]),
        "&Inspect",
        "inspect-item",
        "Get container status",
    ));
    menu.push(MenuEntry::Separator);
    menu.push(MenuEntry::action(
        run_command(server, "docker", &["stop", name]),
        "&Stop",
        "shutdown",
        "Stop the container",
    ));
    menu.push(MenuEntry::confirm(format!("Really stop container {name}?")));
    for (verb, label, icon, tip) in [
        ("restart", "&Restart", "reboot", "Restart the container"),
        ("pause", "&Pause", "pause", "Pause the container"),
        ("unpause", "&Unpause", "resume", "Unpause the container"),
    ] {
        menu.push(MenuEntry::action(
            run_command(server, "docker", &[verb, name]),
            label,
            icon,
            tip,
        ));
    }
    menu.push(MenuEntry::Separator);
    docker_info_entries(server, menu);
    meta
}

fn image_params(ctx: &MatcherContext, name: &str) -> RegionMetadata {
    let server = ctx.server_id.as_str();
    let inspect = popup_command(server, "docker", &["image", "inspect", name]);

    let mut meta = RegionMetadata::new()
        .with_icon("container")
        .with_tooltip("Double-click to show image information")
        .with_action(inspect.clone())
        .with_drag("text/plain", name);

    meta.push_menu(MenuEntry::action(
        inspect,
        "&Inspect Image",
        "inspect-item",
        "Show image information",
    ));
    meta.push_menu(MenuEntry::Separator);
    docker_info_entries(server, &mut meta.menu);
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Position;
    use crate::testing::{make_invocation, run_factory};

    const PS_OUTPUT: &[&str] = &[
        "CONTAINER ID   IMAGE     COMMAND                  CREATED       STATUS       PORTS     NAMES",
        "4f3c2a1b9e8d   nginx     \"/docker-entrypoint.…\"   2 hours ago   Up 2 hours   80/tcp    web1",
    ];

    #[test]
    fn test_ps_tags_container_row() {
        let regions = run_factory(
            Box::new(ps_factory(FactoryOptions::default())),
            make_invocation("docker ps"),
            0,
            PS_OUTPUT,
        );
        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert_eq!(region.start, Position::new(1, 0));
        assert_eq!(region.end, Position::new(1, PS_OUTPUT[1].len()));

        let action = region.metadata.primary_action.as_ref().unwrap();
        assert_eq!(action.to_wire().unwrap(), "NewConnection|10|web1|srv-1");
        assert_eq!(region.metadata.drag.get("text/plain").map(String::as_str), Some("web1"));
        assert!(
            region
                .metadata
                .menu
                .contains(&MenuEntry::confirm("Really stop container web1?"))
        );
    }

    #[test]
    fn test_ps_ignores_failed_command() {
        let regions = run_factory(
            Box::new(ps_factory(FactoryOptions::default())),
            make_invocation("docker ps"),
            1,
            PS_OUTPUT,
        );
        assert!(regions.is_empty());
    }

    #[test]
    fn test_images_uses_image_id() {
        let lines = [
            "REPOSITORY   TAG       IMAGE ID       CREATED       SIZE",
            "nginx        latest    a6bd71f48f68   3 weeks ago   187MB",
            "broken",
        ];
        let regions = run_factory(
            Box::new(images_factory(FactoryOptions::default())),
            make_invocation("docker image ls"),
            0,
            &lines,
        );
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].metadata.primary_action.as_ref().unwrap().to_wire().unwrap(),
            "PopupCommand|srv-1|docker\x1fdocker\x1fimage\x1finspect\x1fa6bd71f48f68"
        );
    }

    #[test]
    fn test_predicates_and_aliases() {
        use crate::matcher::MatcherFactory;
        let ps = ps_factory(FactoryOptions {
            aliases: vec!["dps".into()],
            ..Default::default()
        });
        assert!(ps.matches("docker ps", "").unwrap());
        assert!(ps.matches("dps", "").unwrap());
        assert!(!ps.matches("docker ps -a", "").unwrap());
        let images = images_factory(FactoryOptions::default());
        assert!(images.matches("docker images", "").unwrap());
        assert!(!images.matches("docker ps", "").unwrap());
    }
}
