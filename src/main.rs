mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use campaign_risk::persona::PersonaSummary;
use campaign_risk::{
    format_float, AnalysisReport, Analyzer, AnalyzerConfig, CampaignContent, Platform,
};

#[derive(Parser)]
#[command(
    name = "campaign-risk",
    about = "Cultural-risk and resonance analyzer for Indian marketing campaigns"
)]
struct Cli {
    /// Path to a TOML config file (defaults to config/analyzer.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    Serve(ServeArgs),
    Personas(PersonasArgs),
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct AnalyzeArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long, default_value = "instagram")]
    platform: String,
    /// Planned posting date, YYYY-MM-DD.
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    influencer: bool,
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long = "persona")]
    personas: Vec<String>,
    /// Print the full report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// Optional static frontend to mount at `/`.
    #[arg(long)]
    web_root: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct PersonasArgs {
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(default_value = "config/analyzer.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Analyze(AnalyzeArgs {
        platform: "instagram".to_string(),
        ..AnalyzeArgs::default()
    }));

    match command {
        Command::Analyze(args) => run_analyze(args, &load_config(cli.config)?).await,
        Command::Serve(args) => server::serve(args, load_config(cli.config)?).await,
        Command::Personas(args) => run_personas(args, &load_config(cli.config)?).await,
        Command::InitConfig(args) => run_init_config(&args),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AnalyzerConfig, String> {
    let (config, config_path) = AnalyzerConfig::load(path)?;
    match config_path.filter(|path| path.exists()) {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }
    Ok(config)
}

async fn run_analyze(args: AnalyzeArgs, config: &AnalyzerConfig) -> Result<(), String> {
    let platform = Platform::from_str(&args.platform)
        .ok_or_else(|| format!("invalid platform: {}", args.platform))?;
    let image = match args.image.as_ref() {
        Some(path) => Some(
            tokio::fs::read(path)
                .await
                .map_err(|err| format!("failed to read image {}: {}", path.display(), err))?,
        ),
        None => None,
    };
    let caption = if image.is_some() {
        args.text.clone().unwrap_or_default()
    } else {
        read_text(args.text.clone())?
    };

    let content = CampaignContent {
        caption,
        image,
        platform,
        posting_date: args.date.clone(),
        influencer: args.influencer,
        persona_ids: args.personas.clone(),
    };

    let analyzer = Analyzer::from_config(config).await?;
    let outcome = analyzer
        .analyze(content)
        .await
        .map_err(|err| err.to_string())?;

    if args.json {
        let payload = serde_json::to_string_pretty(outcome.report.as_ref())
            .map_err(|err| format!("failed to serialize report: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }
    print_report(&outcome.report);
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let recommendation = &report.recommendation;
    println!(
        "Verdict: {} ({})",
        recommendation.verdict.label(),
        recommendation.action
    );
    println!("{}", recommendation.message);
    println!(
        "Mode: {} | platform: {}",
        report.analysis_mode.label(),
        report.platform.label()
    );
    println!(
        "Outcome: virality {} ({}) | backlash {} ({}) | ad fatigue {} ({})",
        format_float(report.outcome.virality, 1),
        report.outcome.virality_band.label(),
        format_float(report.outcome.backlash_risk, 1),
        report.outcome.backlash_band.label(),
        format_float(report.outcome.ad_fatigue_risk, 1),
        report.outcome.fatigue_band.label()
    );
    println!(
        "Behavior: attitude {} | norms {} | control {} | intention {}",
        format_float(report.tpb.attitude, 1),
        format_float(report.tpb.subjective_norms, 1),
        format_float(report.tpb.perceived_control, 1),
        format_float(report.tpb.behavioral_intention, 1)
    );
    println!(
        "Signals: EMC {} | NAM {} | SCS {} | polarity {} | intent {}",
        format_float(report.fused.emc, 1),
        format_float(report.fused.nam, 1),
        format_float(report.fused.scs, 1),
        format_float(report.fused.polarity, 2),
        format_float(report.intent.score, 1)
    );

    if !report.alerts.is_empty() {
        println!("\nAlerts:");
        for alert in &report.alerts {
            println!(
                "- [{}] {} ({}, weight {}): {}",
                alert.severity.label(),
                alert.keyword,
                alert.category,
                alert.weight,
                alert.message
            );
        }
    }

    if let Some(personas) = report.personas.as_ref().filter(|analysis| !analysis.is_empty()) {
        println!(
            "\nPersonas: average resonance {} | universal appeal {}",
            format_float(personas.average_resonance, 1),
            format_float(personas.universal_appeal, 1)
        );
        for result in &personas.results {
            println!(
                "- {} {}: resonance {} -> {} (feels {})",
                result.avatar_emoji,
                result.persona_name,
                format_float(result.resonance_score, 1),
                result.predicted_action.label(),
                result.dominant_emotion
            );
        }
    }

    if !recommendation.reasoning.is_empty() {
        println!("\nReasoning:");
        for line in &recommendation.reasoning {
            println!("- {}", line);
        }
    }
    if !recommendation.suggestions.is_empty() {
        println!("\nSuggestions:");
        for suggestion in &recommendation.suggestions {
            println!("- {}", suggestion);
        }
    }
    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("- {}", warning);
        }
    }
}

async fn run_personas(args: PersonasArgs, config: &AnalyzerConfig) -> Result<(), String> {
    let catalog = campaign_risk::persona::PersonaCatalog::load(&config.data.personas_path()).await?;
    let personas: Vec<PersonaSummary> = match args.category.as_deref() {
        Some(category) => catalog
            .by_category(category)
            .into_iter()
            .map(PersonaSummary::from)
            .collect(),
        None => catalog.summaries(),
    };
    if personas.is_empty() {
        return Err(format!(
            "no personas found; categories: {}",
            catalog.categories().join(", ")
        ));
    }
    for persona in personas {
        println!(
            "{} {:<28} {:<14} {:>5}%  {}",
            persona.avatar_emoji,
            persona.id,
            persona.category,
            format_float(persona.market_size_percent, 1),
            persona.tagline
        );
    }
    Ok(())
}

fn run_init_config(args: &InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "{} already exists (pass --force to overwrite)",
            args.path.display()
        ));
    }
    AnalyzerConfig::default().write(&args.path)?;
    println!("Wrote default config to {}", args.path.display());
    Ok(())
}

fn read_text(arg: Option<String>) -> Result<String, String> {
    if let Some(text) = arg {
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }
    if io::stdin().is_terminal() {
        return Err("missing caption: pass --text, --image or pipe stdin".to_string());
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("missing caption: pass --text, --image or pipe stdin".to_string());
    }
    Ok(trimmed.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("campaign_risk=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
