use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};
use editorfont::edits::{edits_from_matches, SettingsEdit};
use editorfont::runner::SystemRunner;
use editorfont::store::FsStore;
use editorfont::{
    EditorFontError, FontInstaller, FontProfile, InstallOutcome, KeyMatch, LocationOverrides,
    Locations, Patcher, SettingsChange, SettingsManager,
};

fn path_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .help(help)
        .global(true)
        .value_parser(clap::value_parser!(PathBuf))
}

// Only the settings commands can preview their changes; installing and
// uninstalling always touch the font directory.
fn dry_run_arg() -> Arg {
    Arg::new("dry_run")
        .long("dry-run")
        .help("Print settings changes as a diff instead of writing them")
        .action(ArgAction::SetTrue)
}

fn cli() -> Command {
    let patch = Command::new("patch")
        .about("Apply --set and --unset edits to a settings file, in order")
        .arg(
            Arg::new("file")
                .help("Path to the settings file")
                .required(true)
                .index(1)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(dry_run_arg());
    // Extend with the settings edit arguments
    let patch = editorfont::edits::edit_group(patch);

    Command::new("editorfont")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Install a font for the current user and configure the editor to use it")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .help("Set the level of verbosity")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(path_arg(
            "profile",
            "profile",
            "JSON file overriding the font names and settings values",
        ))
        .arg(path_arg("settings", "settings", "Path to the editor settings file"))
        .arg(path_arg("fonts_dir", "fonts-dir", "Directory to install fonts into"))
        .arg(path_arg(
            "source_dir",
            "source-dir",
            "Directory holding the bundled font files",
        ))
        .arg(
            Arg::new("strict_keys")
                .long("strict-keys")
                .help("Only match a key when it is followed by a colon")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("install")
                .about("Install the fonts for the current user")
                .arg(
                    Arg::new("with_settings")
                        .long("with-settings")
                        .help("Also add the fonts to the editor settings")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help("Reinstall even if the fonts are already installed")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("uninstall").about("Remove the fonts for the current user"))
        .subcommand(
            Command::new("add-settings")
                .about("Add the fonts to the editor settings")
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("remove-settings")
                .about("Remove the fonts from the editor settings")
                .arg(dry_run_arg()),
        )
        .subcommand(patch)
}

fn main() {
    let args = cli().get_matches();
    let Some((name, sub)) = args.subcommand() else {
        return;
    };
    env_logger::Builder::new()
        .filter_level(match sub.get_count("verbosity") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    if let Err(e) = run(name, sub) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(name: &str, args: &ArgMatches) -> Result<(), EditorFontError> {
    let profile = match args.get_one::<PathBuf>("profile") {
        Some(path) => FontProfile::load(path)?,
        None => FontProfile::default(),
    };
    let patcher = if args.get_flag("strict_keys") {
        Patcher::new().with_key_match(KeyMatch::Property)
    } else {
        Patcher::new()
    };
    let store = FsStore;

    if name == "patch" {
        let Some(file) = args.get_one::<PathBuf>("file") else {
            return Ok(());
        };
        let edits = edits_from_matches(args)?;
        if edits.is_empty() {
            log::warn!("No edits given; use --set KEY=VALUE or --unset KEY");
            return Ok(());
        }
        let manager = SettingsManager::new(&store, file).with_patcher(patcher);
        return write_settings(&manager, &edits, args.get_flag("dry_run"));
    }

    let locations = Locations::resolve(LocationOverrides {
        settings: args.get_one::<PathBuf>("settings").cloned(),
        fonts_dir: args.get_one::<PathBuf>("fonts_dir").cloned(),
        source_dir: args.get_one::<PathBuf>("source_dir").cloned(),
    })?;
    let manager = SettingsManager::new(&store, &locations.settings).with_patcher(patcher);
    let runner = SystemRunner;
    let installer = FontInstaller::new(
        &runner,
        &profile,
        &locations.fonts_dir,
        &locations.source_dir,
    );

    match name {
        "install" => match installer.install(args.get_flag("force"))? {
            InstallOutcome::AlreadyInstalled => {
                println!("Fonts are already installed. Use --force to reinstall them.");
            }
            InstallOutcome::Installed { fonts } => {
                println!("Installed {} font file(s) for the current user.", fonts.len());
                if args.get_flag("with_settings") {
                    // The fonts are in place; a settings failure should not undo that.
                    match manager.modify(&profile, true) {
                        Ok(_) => println!("Added the fonts to {}.", locations.settings.display()),
                        Err(e) => log::warn!("Could not update settings: {}", e),
                    }
                } else {
                    println!("Run `editorfont add-settings` to configure the editor.");
                }
            }
            InstallOutcome::Unverified { .. } => {
                log::warn!("Fonts copied but verification failed. You may need to sign out and in again.");
            }
        },
        "uninstall" => {
            let removed = installer.uninstall()?;
            println!(
                "Uninstalled {} font file(s) for the current user.",
                removed.len()
            );
        }
        "add-settings" => {
            write_settings(&manager, &profile.edits(true), args.get_flag("dry_run"))?
        }
        "remove-settings" => {
            write_settings(&manager, &profile.edits(false), args.get_flag("dry_run"))?
        }
        _ => unreachable!("subcommands are declared in cli()"),
    }
    Ok(())
}

fn write_settings(
    manager: &SettingsManager<'_, FsStore>,
    edits: &[Box<dyn SettingsEdit>],
    dry_run: bool,
) -> Result<(), EditorFontError> {
    if dry_run {
        print!("{}", manager.preview(edits)?);
        return Ok(());
    }
    match manager.apply(edits)? {
        SettingsChange::Updated => println!("Updated {}.", manager.path().display()),
        SettingsChange::Unchanged => {
            println!("{} is already up to date.", manager.path().display())
        }
    }
    Ok(())
}
