//! Process command implementation.

use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::provider::build_provider;
use billbuster_domain::traits::LlmProvider;
use billbuster_extractor::{DocumentPipeline, PipelineConfig, PointQueue, ProcessingResult};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Execute the process command.
pub async fn execute_process(args: ProcessArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut llm_settings = config.llm.clone();
    args.llm.apply(&mut llm_settings);
    let provider = build_provider(&llm_settings)?;
    info!(
        provider = ?llm_settings.provider,
        model = provider.model_name(),
        "Using extraction service"
    );

    let pipeline_config = args
        .preset
        .map(PipelineConfig::from)
        .unwrap_or_else(|| config.pipeline.clone());

    let result = run_pipeline(provider, pipeline_config, &args, formatter).await?;

    if args.stream {
        println!("{}", formatter.format_overview(&result)?);
    } else {
        println!("{}", formatter.format_result(&result)?);
    }

    if let Some(output) = &args.output {
        result.save_json(output)?;
        eprintln!("{}", formatter.success(&format!("Results saved to {}", output.display())));
    }

    if result.stats.processing_errors > 0 {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "{} chunk(s) failed; see the log for details",
                result.stats.processing_errors
            ))
        );
    }

    Ok(())
}

/// Run one document, streaming or exporting the queue as requested.
async fn run_pipeline<L>(
    llm: L,
    pipeline_config: PipelineConfig,
    args: &ProcessArgs,
    formatter: &Formatter,
) -> Result<ProcessingResult>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    let pipeline = DocumentPipeline::new(llm, pipeline_config)?;
    let mut session = pipeline.new_session();

    let consumer = args
        .stream
        .then(|| spawn_consumer(session.queue(), formatter.clone()));

    let result = pipeline.process_in(&mut session, &args.path).await;

    if let Some(consumer) = consumer {
        // a failed read never completes the queue, so release the consumer
        if result.is_err() {
            session.queue().mark_complete();
        }
        let streamed = consumer.join().map_err(|_| CliError::Consumer)?;
        info!("Streamed {} point(s)", streamed);
    }

    let result = result?;

    if let Some(path) = &args.export_queue {
        let exported = session.queue().export_json(path)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Exported {} queued point(s) to {}", exported, path.display()))
        );
    }

    Ok(result)
}

/// Print points as they leave the queue until it completes.
fn spawn_consumer(queue: Arc<PointQueue>, formatter: Formatter) -> JoinHandle<usize> {
    thread::spawn(move || {
        let mut streamed = 0;
        while let Some(point) = queue.pop(None) {
            match formatter.format_streamed_point(&point) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Could not format streamed point: {}", e),
            }
            streamed += 1;
        }
        streamed
    })
}
