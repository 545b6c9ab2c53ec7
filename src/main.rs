use anyhow::Context;
use clap::Parser;
use shift_code_scraper::utils::error::ErrorSeverity;
use shift_code_scraper::utils::{logger, validation::Validate};
use shift_code_scraper::{
    build_client, CliConfig, CsvCodeStore, DiscordNotifier, HttpPageSource,
    ScrapeEngine, ScrapeError, Settings, ShiftPipeline,
};
use std::io::{BufRead, IsTerminal, Write};

#[tokio::main]
async fn main() {
    let launched_bare = std::env::args_os().len() == 1;
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    let exit_code = match run(&config).await {
        Ok(()) => 0,
        Err(e) => report_failure(&e),
    };

    if config.pause || (launched_bare && std::io::stdin().is_terminal()) {
        if let Err(e) = wait_for_enter() {
            tracing::debug!("Pause skipped: {:#}", e);
        }
    }

    std::process::exit(exit_code);
}

async fn run(config: &CliConfig) -> Result<(), ScrapeError> {
    let settings = config.resolve()?;
    settings.validate()?;
    tracing::debug!("Resolved settings: {:?}", settings);

    let client = build_client(settings.request_timeout, &settings.user_agent)?;
    let source = HttpPageSource::new(client.clone(), settings.retry);
    let store = CsvCodeStore::new(settings.csv_path.clone());

    let notifier = notifier_for(&settings, client);
    let dry_run = settings.dry_run;
    let mut pipeline = ShiftPipeline::new(source, store, settings);
    if let Some(notifier) = notifier {
        pipeline = pipeline.with_notifier(Box::new(notifier));
    }

    let report = ScrapeEngine::new(pipeline).run().await?;
    if dry_run {
        tracing::info!("🔍 Dry run complete. No changes written.");
    } else {
        tracing::info!("✅ Wrote {} new code(s).", report.written);
    }
    Ok(())
}

fn notifier_for(settings: &Settings, client: reqwest::Client) -> Option<DiscordNotifier> {
    let webhook = settings.discord_webhook.clone()?;
    Some(DiscordNotifier::new(
        client,
        webhook,
        settings.page_url.clone(),
        settings.webhook_batch_size,
    ))
}

fn report_failure(e: &ScrapeError) -> i32 {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn wait_for_enter() -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Press Enter to exit...").context("writing prompt")?;
    stdout.flush().context("flushing stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading stdin")?;
    Ok(())
}
