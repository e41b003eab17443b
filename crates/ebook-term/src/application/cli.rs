use anyhow::Result;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

/// Options for a single non-interactive generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessOptions {
    pub topic: String,
    pub download: bool,
    pub server_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Headless(HeadlessOptions),
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout."),
        )
        .subcommand(Command::new("path").about("Returns the default path for the configuration file."));
}

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("EBOOK_TERM_CONFIG_FILE")
        .num_args(1)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ))
        .global(true);
}

fn arg_server_url() -> Arg {
    return Arg::new(ConfigKey::ServerUrl.to_string())
        .short('s')
        .long(ConfigKey::ServerUrl.to_string())
        .env("EBOOK_TERM_SERVER_URL")
        .num_args(1)
        .help(format!(
            "Base URL of the ebook generation backend. [default: {}]",
            Config::default(ConfigKey::ServerUrl)
        ));
}

fn arg_number(key: ConfigKey, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default(key)));
}

fn arg_output_dir() -> Arg {
    return Arg::new(ConfigKey::OutputDir.to_string())
        .short('o')
        .long(ConfigKey::OutputDir.to_string())
        .num_args(1)
        .help(format!(
            "Directory downloaded ebooks are saved to. [default: {}]",
            Config::default(ConfigKey::OutputDir)
        ));
}

fn arg_log_file() -> Arg {
    return Arg::new(ConfigKey::LogFile.to_string())
        .long(ConfigKey::LogFile.to_string())
        .num_args(1)
        .help(format!(
            "File diagnostic logs are written to. [default: {}]",
            Config::default(ConfigKey::LogFile)
        ));
}

fn arg_log_level() -> Arg {
    return Arg::new(ConfigKey::LogLevel.to_string())
        .long(ConfigKey::LogLevel.to_string())
        .num_args(1)
        .value_parser(["error", "warn", "info", "debug", "trace"])
        .help(format!(
            "Diagnostic log level. [default: {}]",
            Config::default(ConfigKey::LogLevel)
        ));
}

pub fn build() -> Command {
    return Command::new("ebook-term")
        .about("Terminal client for the ebook generation service. Enter a topic, follow the progress, download the PDF.")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(subcommand_config())
        .arg(arg_config_file())
        .arg(arg_server_url())
        .arg(arg_number(
            ConfigKey::RequestTimeoutSecs,
            "Seconds to wait for a generation before giving up.",
        ))
        .arg(arg_number(
            ConfigKey::ProgressIntervalMs,
            "Milliseconds between simulated progress steps.",
        ))
        .arg(arg_number(
            ConfigKey::LogPollIntervalMs,
            "Milliseconds between server log polls while the server log is shown.",
        ))
        .arg(arg_number(
            ConfigKey::ServerLogLines,
            "Number of server log lines to request.",
        ))
        .arg(arg_output_dir())
        .arg(arg_log_file())
        .arg(arg_log_level())
        .arg(
            Arg::new("topic")
                .short('t')
                .long("topic")
                .num_args(1)
                .help("Generate an ebook for this topic without the interactive UI."),
        )
        .arg(
            Arg::new("download")
                .long("download")
                .action(ArgAction::SetTrue)
                .requires("topic")
                .help("Save the generated ebook to the output directory (with --topic)."),
        )
        .arg(
            Arg::new("server-logs")
                .long("server-logs")
                .action(ArgAction::SetTrue)
                .requires("topic")
                .help("Print backend log lines while generating (with --topic)."),
        );
}

fn run_mode(matches: &ArgMatches) -> RunMode {
    if let Some(topic) = matches.get_one::<String>("topic") {
        return RunMode::Headless(HeadlessOptions {
            topic: topic.to_string(),
            download: matches.get_flag("download"),
            server_logs: matches.get_flag("server-logs"),
        });
    }

    return RunMode::Interactive;
}

/// Parse arguments and load configuration. Returns `None` when a subcommand
/// was fully handled and the process should exit.
pub async fn parse() -> Result<Option<RunMode>> {
    let cmd = build();
    let matches = cmd.clone().get_matches();

    match matches.subcommand() {
        Some(("config", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("default", _)) => {
                    println!("{}", Config::serialize_default(&cmd));
                }
                Some(("path", _)) => {
                    println!("{}", Config::default(ConfigKey::ConfigFile));
                }
                _ => {
                    subcommand_config().print_long_help()?;
                }
            }
            return Ok(None);
        }
        _ => {
            Config::load(&cmd, vec![&matches]).await?;
        }
    }

    return Ok(Some(run_mode(&matches)));
}
