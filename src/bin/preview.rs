//! Preview binary - loads the generated assets and prints lookups
//!
//! Usage:
//!   cargo run --bin preview -- title play@Common
//!   cargo run --bin preview -- --language Spanish title
//!   cargo run --bin preview -- --system-language German title
//!
//! Keys are `KEY` (searched in every sheet) or `KEY@SHEET`. `--language`
//! switches (and persists) the language before the lookups.
//!
//! Settings come from the same environment variables (or
//! LOCALIZATION_SETTINGS_FILE) as the updater.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use sheet_localization::config::Settings;
use sheet_localization::language::Language;
use sheet_localization::localization::{KeyRef, Localization};
use sheet_localization::preferences::FilePreferences;
use sheet_localization::store::AssetStore;
use tracing::info;

struct PreviewArgs {
    language: Option<Language>,
    system_language: Option<Language>,
    keys: Vec<KeyRef>,
}

impl PreviewArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = PreviewArgs {
            language: None,
            system_language: None,
            keys: Vec::new(),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--language" | "--system-language" => {
                    let name = args
                        .next()
                        .with_context(|| format!("{} needs a language name", arg))?;
                    let language = Language::from_name(&name)?;
                    if arg == "--language" {
                        parsed.language = Some(language);
                    } else {
                        parsed.system_language = Some(language);
                    }
                }
                flag if flag.starts_with("--") => bail!("Unknown option {}", flag),
                key => parsed.keys.push(KeyRef::parse(key)),
            }
        }

        if parsed.keys.is_empty() {
            bail!("Usage: preview [--language NAME] [--system-language NAME] KEY[@SHEET]...");
        }
        Ok(parsed)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sheet_localization=info".parse()?),
        )
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    let args = PreviewArgs::parse(std::env::args().skip(1))?;

    info!("Loading configuration...");
    let settings = Settings::from_env_or_file().context("Failed to load localization settings")?;
    settings.validate().context("Invalid localization settings")?;

    let store = AssetStore::from_settings(&settings);
    let preferences = FilePreferences::new(&settings.preferences_file);
    let mut localization = Localization::new(settings, store, preferences);

    localization.init(args.system_language);
    localization.load_all();
    localization.on_language_changed(|language| info!("Language changed to {}", language));

    if let Some(language) = args.language {
        localization.switch_language(language);
    }

    println!("\n========== LOOKUP PREVIEW ==========");
    println!("Language: {}", localization.current_language());
    println!("Generated: {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("====================================\n");

    for key in &args.keys {
        let label = match &key.sheet {
            Some(sheet) => format!("{}@{}", key.key, sheet),
            None => key.key.clone(),
        };
        println!("{:<32} {}", label, key.resolve(&localization));
    }

    let report = localization.metrics().report();
    println!("\n{}", serde_json::to_string_pretty(&report)?);

    localization.teardown();
    Ok(())
}
