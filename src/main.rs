//! Portal settings CLI
//!
//! Entry point for the `portal-settings` command-line tool.

use clap::{Parser, Subcommand};
use portal_bot_protection::{
    FixedColorScheme, TracingEventSink, TurnstileApi, TurnstileController, WidgetCallbacks,
    WidgetOptions,
};
use portal_settings::config::{EffectiveConfig, ToolConfig};
use portal_settings::{
    logging, ConfigDocument, ConfigSink, DocumentFormat, EditSession, FieldError, FieldKey, FieldValue,
    FileSink, LoginIdSettings, SinkError,
};
use portal_validation::{validate_role, RoleInput};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "portal-settings")]
#[command(about = "Edit login ID settings in an app config document", version)]
struct Cli {
    /// Path to tool config file (default: $PORTAL_SETTINGS_CONFIG or ~/.config/portal-settings/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Tracing filter, overriding the config file (RUST_LOG still wins)
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the login ID settings read from a document
    Show {
        /// App config document (.json, .yaml, .yml)
        document: PathBuf,

        /// Document with defaults filled in, used to read the settings
        #[arg(long)]
        effective: Option<PathBuf>,
    },

    /// Change login ID settings and write the patched document
    Apply {
        /// App config document (.json, .yaml, .yml)
        document: PathBuf,

        /// Document with defaults filled in, used to read the settings
        #[arg(long)]
        effective: Option<PathBuf>,

        /// Field to change, e.g. email.allow_plus=false (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// JSON file holding the complete desired settings
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(long, short = 'o', conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input document
        #[arg(long)]
        in_place: bool,

        /// Print a JSON save summary (only when writing to a file)
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical SHA-256 digest of a document
    Digest {
        document: PathBuf,
    },

    /// List the fields accepted by `apply --set`
    Fields,

    /// Validate a role form
    ValidateRole {
        /// Role key
        key: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the bot protection widget render options
    TurnstileOptions {
        /// Site key (default: bot_protection.site_key from config)
        #[arg(long)]
        site_key: Option<String>,

        /// Page color scheme (light, dark; anything else renders auto)
        #[arg(long)]
        color_scheme: Option<String>,

        /// Widget language
        #[arg(long)]
        language: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let tool_config = match load_tool_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    logging::init(&tool_config.log_filter);
    tracing::debug!(?tool_config, "tool config loaded");

    match cli.command {
        Commands::Show {
            document,
            effective,
        } => run_show(&tool_config, &document, effective.as_deref()),
        Commands::Apply {
            document,
            effective,
            set,
            snapshot,
            output,
            in_place,
            json,
        } => {
            let target = if in_place {
                Some(document.clone())
            } else {
                output
            };
            run_apply(
                &tool_config,
                &document,
                effective.as_deref(),
                &set,
                snapshot.as_deref(),
                target,
                json,
            )
        }
        Commands::Digest { document } => run_digest(&document),
        Commands::Fields => run_fields(),
        Commands::ValidateRole {
            key,
            name,
            description,
            json,
        } => run_validate_role(key, name, description, json),
        Commands::TurnstileOptions {
            site_key,
            color_scheme,
            language,
        } => run_turnstile_options(&tool_config, site_key, color_scheme, language),
    }
}

fn load_tool_config(cli: &Cli) -> Result<ToolConfig, String> {
    let path = EffectiveConfig::resolve_user_config_path(cli.config.clone());
    let overrides = cli
        .log_filter
        .as_ref()
        .map(|filter| serde_json::json!({ "log_filter": filter }));

    EffectiveConfig::build(path.as_deref(), overrides)
        .map(|effective| effective.config)
        .map_err(|e| e.to_string())
}

fn load_document(path: &Path) -> ConfigDocument {
    match ConfigDocument::from_file(path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error loading {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn begin_session(document: &Path, effective: Option<&Path>) -> EditSession {
    let raw = load_document(document);
    let result = match effective {
        Some(path) => EditSession::begin_with_effective(&load_document(path), raw),
        None => EditSession::begin(raw),
    };
    match result {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error starting edit session: {}", e);
            process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_show(tool_config: &ToolConfig, document: &Path, effective: Option<&Path>) {
    let session = begin_session(document, effective);
    let output = serde_json::to_value(session.initial())
        .map_err(|e| e.to_string())
        .and_then(|value| {
            ConfigDocument::new(value)
                .to_string(tool_config.output.format, tool_config.output.pretty)
                .map_err(|e| e.to_string())
        });
    match output {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

/// Prints the saved document on stdout
struct StdoutSink {
    format: DocumentFormat,
    pretty: bool,
}

impl ConfigSink for StdoutSink {
    fn save(&mut self, document: &ConfigDocument) -> Result<(), SinkError> {
        let text = document.to_string(self.format, self.pretty)?;
        if text.ends_with('\n') {
            print!("{}", text);
        } else {
            println!("{}", text);
        }
        Ok(())
    }
}

fn parse_assignment(assignment: &str) -> Result<(FieldKey, FieldValue), String> {
    let (name, raw) = assignment
        .split_once('=')
        .ok_or_else(|| format!("Expected FIELD=VALUE, got '{}'", assignment))?;
    let key: FieldKey = name.trim().parse().map_err(|e: FieldError| e.to_string())?;
    let value = FieldValue::parse_for(key, raw).map_err(|e| e.to_string())?;
    Ok((key, value))
}

fn run_apply(
    tool_config: &ToolConfig,
    document: &Path,
    effective: Option<&Path>,
    assignments: &[String],
    snapshot: Option<&Path>,
    target: Option<PathBuf>,
    json_output: bool,
) {
    let mut session = begin_session(document, effective);

    if let Some(path) = snapshot {
        let desired: LoginIdSettings = match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error reading snapshot {}: {}", path.display(), e);
                process::exit(1);
            }
        };
        session.replace_current(desired);
    }

    for assignment in assignments {
        let applied = parse_assignment(assignment)
            .and_then(|(key, value)| session.set(key, value).map_err(|e| e.to_string()));
        if let Err(e) = applied {
            eprintln!("Invalid --set: {}", e);
            process::exit(1);
        }
    }

    if !session.is_dirty() {
        tracing::info!("no login ID settings changed; document is written unchanged");
    }

    let result = match &target {
        Some(path) => session.save(&mut FileSink::new(path)),
        None => session.save(&mut StdoutSink {
            format: tool_config.output.format,
            pretty: tool_config.output.pretty,
        }),
    };

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if target.is_some() {
        if json_output {
            print_json(&serde_json::json!({
                "changed_fields": outcome.changed_fields,
                "base_digest": outcome.base_digest,
                "digest": outcome.digest,
            }));
        } else if outcome.changed_fields.is_empty() {
            println!("No changes.");
        } else {
            println!("Changed fields:");
            for key in &outcome.changed_fields {
                println!("  {}", key);
            }
        }
    }
}

fn run_digest(document: &Path) {
    let doc = load_document(document);
    match doc.digest() {
        Ok(digest) => println!("{}", digest),
        Err(e) => {
            eprintln!("Error hashing document: {}", e);
            process::exit(1);
        }
    }
}

fn run_fields() {
    let defaults = LoginIdSettings::default();
    for key in FieldKey::ALL {
        let kind = if key.is_list() { "list" } else { "bool" };
        let default = match defaults.get(key) {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::List(list) => format!("[{}]", list.join(",")),
        };
        println!("{:<28} {:<5} default={}", key.as_str(), kind, default);
    }
}

fn run_validate_role(
    key: String,
    name: Option<String>,
    description: Option<String>,
    json_output: bool,
) {
    let input = RoleInput {
        key,
        name,
        description,
    };

    match validate_role(&input) {
        Ok(role) => {
            if json_output {
                print_json(&serde_json::json!({
                    "valid": true,
                    "key": role.key,
                    "name": role.name,
                    "description": role.description,
                }));
            } else {
                println!("Role valid: {}", role.key);
            }
        }
        Err(errors) => {
            if json_output {
                print_json(&serde_json::json!({ "valid": false, "errors": errors }));
            } else {
                eprintln!("Role invalid:");
                for error in &errors {
                    eprintln!("  {}", error);
                }
            }
            process::exit(1);
        }
    }
}

/// SDK stand-in that is ready immediately and prints what it would render
struct PrintingTurnstile;

impl TurnstileApi for PrintingTurnstile {
    type Target = ();

    fn ready(&self, callback: Box<dyn FnOnce()>) {
        callback();
    }

    fn render(&self, _target: &(), options: WidgetOptions, _callbacks: WidgetCallbacks) {
        print_json(&options);
    }
}

fn run_turnstile_options(
    tool_config: &ToolConfig,
    site_key: Option<String>,
    color_scheme: Option<String>,
    language: Option<String>,
) {
    let settings = &tool_config.bot_protection;
    let site_key = match site_key.or_else(|| settings.site_key.clone()) {
        Some(key) => key,
        None => {
            eprintln!("No site key: pass --site-key or set bot_protection.site_key in config");
            process::exit(1);
        }
    };
    let color_scheme = color_scheme.unwrap_or_else(|| settings.theme.clone());
    let language = language.unwrap_or_else(|| settings.language.clone());

    let controller = TurnstileController::new(
        Rc::new(PrintingTurnstile),
        (),
        site_key,
        language,
        Rc::new(FixedColorScheme(color_scheme)),
        Rc::new(TracingEventSink),
    );
    controller.connect();
}
