use clap::Parser;
use tweet_sentiment::app::report;
use tweet_sentiment::config::credentials::Credentials;
use tweet_sentiment::core::RunOutcome;
use tweet_sentiment::utils::error::{EtlError, ErrorSeverity};
use tweet_sentiment::utils::{logger, validation::Validate};
use tweet_sentiment::{
    AppConfig, CliConfig, EtlEngine, LocalStorage, OpenAiClassifier, QueryExecutor,
    SentimentLabeler, SentimentPipeline, TwitterSearchClient,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting tweet-sentiment");
    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            }
        }
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig) -> Result<(), EtlError> {
    // 先驗證輸入，避免無效請求打到外部服務
    cli.validate()?;

    let credentials = Credentials::load();
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    };
    config.apply_credentials(&credentials);
    cli.apply_overrides(&mut config);
    config.validate()?;

    // 服務 client 只在這裡建立一次，再注入到 executor 與 labeler
    let search = TwitterSearchClient::from_config(&config.search)?;
    let classifier = OpenAiClassifier::from_config(&config.classifier)?;
    let executor = QueryExecutor::new(search);
    let labeler =
        SentimentLabeler::with_template(classifier, config.classifier.prompt_template());
    let storage = LocalStorage::new(config.export.output_path.clone());

    let pipeline = SentimentPipeline::new(
        storage,
        executor,
        labeler,
        cli.search_request(),
        config.export.clone(),
    );
    let engine = EtlEngine::new(pipeline);

    match engine.run().await? {
        RunOutcome::NoResults => {
            println!("⚠️ {}", report::NO_RESULTS_NOTICE);
        }
        RunOutcome::Exported { files, posts } => {
            println!("✅ Found {} tweets", posts.len());
            println!();
            println!("{}", report::render_table(&posts));
            println!();
            println!("📊 {}", report::summarize(&posts));
            for file in files {
                println!("📁 Output saved to: {}", file);
            }
        }
    }

    Ok(())
}
