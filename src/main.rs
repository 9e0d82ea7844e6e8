// src/main.rs

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::process::ExitCode;
use std::sync::Arc;
use wg_meta::core::config::APP_NAME;
use wg_meta::core::{
    CoreConfigFiles, CoreSettingsManager, CoreWgKeyTool, MetaConfigStore, PeerRequest,
    SettingsManagerOperations, StoreError, StoreSettings,
};

#[derive(Parser, Debug)]
#[command(
    name = "wg-meta",
    about = "Names, aliases and enable/disable state for WireGuard configs",
    version
)]
struct Cli {
    /// Write changes to the live config files instead of '<file><dry run suffix>'.
    #[arg(long, global = true)]
    apply: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List interfaces and their sections.
    List,
    /// Print an interface config as it would be written.
    Show { interface: String },
    /// Enable the peer bound to an alias.
    Enable { interface: String, alias: String },
    /// Disable the peer bound to an alias.
    Disable { interface: String, alias: String },
    /// Set an attribute on the peer bound to an alias.
    Set {
        interface: String,
        alias: String,
        key: String,
        value: String,
    },
    /// Provision a new peer and print its client config.
    AddPeer {
        interface: String,
        name: String,
        address: String,
        #[arg(long)]
        alias: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        client_allowed_ips: Option<String>,
    },
}

fn init_logging(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("wg-meta: could not initialize logging: {e}");
    }
}

fn load_settings() -> StoreSettings {
    match CoreSettingsManager::new().load_settings(APP_NAME) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("wg-meta: {e}; using default settings");
            StoreSettings::default()
        }
    }
}

fn warning_lines(store: &MetaConfigStore, from: usize) -> Vec<String> {
    store
        .warnings()
        .iter()
        .skip(from)
        .map(|warning| format!("warning: {warning}"))
        .collect()
}

fn print_warnings(store: &MetaConfigStore, from: usize) {
    for line in warning_lines(store, from) {
        eprintln!("{line}");
    }
}

fn run(command: Command, apply: bool, store: &mut MetaConfigStore) -> Result<(), StoreError> {
    match command {
        Command::List => {
            for interface in store.get_interface_list() {
                println!("{interface}");
                for identifier in store.get_section_list(&interface) {
                    let Some(section) = store.get_section(&interface, &identifier) else {
                        continue;
                    };
                    println!(
                        "  {:<46} {:<10} {}",
                        identifier,
                        if section.is_disabled() { "disabled" } else { "enabled" },
                        section.metadata("Name").unwrap_or("-")
                    );
                }
            }
            return Ok(());
        }
        Command::Show { interface } => {
            print!("{}", store.render_interface(&interface, false)?);
            return Ok(());
        }
        Command::Enable { interface, alias } => store.enable_by_alias(&interface, &alias)?,
        Command::Disable { interface, alias } => store.disable_by_alias(&interface, &alias)?,
        Command::Set {
            interface,
            alias,
            key,
            value,
        } => store.set_by_alias(&interface, &alias, &key, &value, false)?,
        Command::AddPeer {
            interface,
            name,
            address,
            alias,
            endpoint,
            client_allowed_ips,
        } => {
            let request = PeerRequest {
                name: &name,
                address: &address,
                alias: alias.as_deref(),
                endpoint: endpoint.as_deref(),
                client_allowed_ips: client_allowed_ips.as_deref(),
            };
            let credentials = store.provision_peer(&interface, &request)?;
            println!("# Public key: {}", credentials.public_key);
            print!("{}", credentials.client_config);
        }
    }

    if store.is_dirty() {
        store.commit(apply)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = load_settings();
    init_logging(settings.log_level_filter());
    log::debug!("main: Using config directory {:?}.", settings.config_dir);

    let files = Arc::new(CoreConfigFiles::new());
    let key_tool = Arc::new(CoreWgKeyTool::new());
    let mut store = match MetaConfigStore::load(&settings, files, key_tool) {
        Ok(store) => store,
        Err(e) => {
            log::error!("main: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Load-time warnings (checksum drift) are shown for every command.
    print_warnings(&store, 0);
    let load_warnings = store.warnings().len();

    let result = run(cli.command, cli.apply, &mut store);
    print_warnings(&store, load_warnings);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("main: {e}");
            ExitCode::FAILURE
        }
    }
}
