use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use persona_core::{AppConfig, Result};
use persona_pipeline::Pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::from_default_env();
    let filter = match "persona=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(AppConfig::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Pipeline failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<()> {
    config.validate()?;

    let text = tokio::fs::read_to_string(&config.sample_path).await?;
    tracing::info!(
        path = %config.sample_path.display(),
        bytes = text.len(),
        "Loaded sample text"
    );

    let mut pipeline = Pipeline::from_config(&config)?;
    pipeline.run(&text, &config.source_id).await?;

    print!("{}", pipeline.summary());

    pipeline.export_html(&config.output_path).await?;
    println!("\nVisualization saved to {}", config.output_path.display());
    Ok(())
}
