mod cli;

use mediahint::{
    config::{self, Config},
    metadata::{CoordinatorSettings, Delivery, FormInput, RequestCoordinator, SuggestionEngine},
};
use mediahint_common::{Category, SearchField, Suggestion};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediahint=trace,mediahint_common=debug,reqwest=debug".to_string()
        } else {
            "mediahint=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Lookup {
            category,
            term,
            field,
            with,
            max_results,
            profile,
            json,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(lookup(
                &config,
                profile.as_deref(),
                category,
                field,
                &term,
                &with,
                max_results,
                json,
            ))
        }
        Commands::Interactive {
            category,
            field,
            profile,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(interactive(&config, profile.as_deref(), category, field))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediahint {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn engine_for(config: &Config, profile: Option<&str>) -> Result<SuggestionEngine> {
    let name = profile.unwrap_or(&config.lookup.profile);
    SuggestionEngine::from_config(config, name)
}

#[allow(clippy::too_many_arguments)]
async fn lookup(
    config: &Config,
    profile: Option<&str>,
    category: Category,
    field: SearchField,
    term: &str,
    with: &str,
    max_results: Option<usize>,
    json: bool,
) -> Result<()> {
    let engine = engine_for(config, profile)?;
    let limit = max_results.unwrap_or_else(|| engine.default_max_results());

    tracing::info!(%category, %field, term, with, limit, "Resolving suggestions");
    let suggestions = engine.resolve(category, field, term, with, limit).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!("No suggestions.");
    } else {
        print_suggestions(field, &suggestions);
    }

    Ok(())
}

/// Drive one coordinator from stdin. Each line replaces the searched field;
/// `with=<value>` sets the other field and `category=<name>` switches category.
async fn interactive(
    config: &Config,
    profile: Option<&str>,
    category: Category,
    field: SearchField,
) -> Result<()> {
    let name = profile.unwrap_or(&config.lookup.profile);
    let engine = SuggestionEngine::from_config(config, name)?;
    let lookup_profile = config
        .profiles
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown lookup profile '{}'", name))?;
    let settings = CoordinatorSettings::from_config(&config.lookup, lookup_profile);

    let (coordinator, mut deliveries) =
        RequestCoordinator::spawn(Arc::new(engine), field, settings);
    let printer = tokio::spawn(async move {
        while let Some(delivery) = deliveries.recv().await {
            print_delivery(&delivery);
        }
    });

    let mut form = FormInput::new(category, "", "");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(value) = line.strip_prefix("with=") {
            set_term(&mut form, field.other(), value);
        } else if let Some(value) = line.strip_prefix("category=") {
            form.category = value.parse()?;
        } else {
            set_term(&mut form, field, &line);
        }
        coordinator.update(form.clone()).await?;
    }

    // Closing the handle lets the coordinator flush its pending query.
    drop(coordinator);
    printer.await?;
    Ok(())
}

fn set_term(form: &mut FormInput, field: SearchField, value: &str) {
    match field {
        SearchField::Title => form.title = value.to_string(),
        SearchField::Creator => form.creator = value.to_string(),
    }
}

fn print_delivery(delivery: &Delivery) {
    println!(
        "{} {} \"{}\": {} suggestion(s)",
        delivery.token,
        delivery.query.category(),
        delivery.query.primary_term(),
        delivery.suggestions.len()
    );
    print_suggestions(delivery.query.field(), &delivery.suggestions);
}

fn print_suggestions(field: SearchField, suggestions: &[Suggestion]) {
    for (i, s) in suggestions.iter().enumerate() {
        match field {
            SearchField::Title => {
                print!("  {}. {}", i + 1, s.title.as_deref().unwrap_or("?"));
                if let Some(year) = s.year {
                    print!(" ({})", year);
                }
                if !s.creator.is_empty() {
                    print!(" - {}", s.creator);
                }
                println!();
            }
            SearchField::Creator => {
                println!("  {}. {}", i + 1, s.creator);
                for work in &s.related_works {
                    println!("       {}", work);
                }
            }
        }
        if let Some(ref poster) = s.poster_url {
            println!("       cover: {}", poster);
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Debounce: {}ms", config.lookup.debounce_ms);
    println!("  Default profile: {}", config.lookup.profile);
    println!("  Profiles: {}", config.profiles.len());
    for (name, profile) in &config.profiles {
        println!("    {} (max {} results)", name, profile.max_results);
    }

    Ok(())
}
