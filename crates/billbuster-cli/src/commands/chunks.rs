//! Chunks command implementation.

use crate::cli::ChunksArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use billbuster_extractor::source::{FileTextSource, TextSource};
use billbuster_extractor::TextChunker;

/// Execute the chunks command.
pub fn execute_chunks(args: ChunksArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let chunk_size = args.chunk_size.unwrap_or(config.pipeline.chunk_size);
    let overlap = args.overlap.unwrap_or(config.pipeline.chunk_overlap);

    let chunker = TextChunker::new(chunk_size, overlap)?
        .with_separators(config.pipeline.separators.iter().cloned());
    let text = FileTextSource.read(&args.path)?;
    let chunks = chunker.chunk(&text);

    println!("{}", formatter.format_chunks(&chunks)?);
    eprintln!(
        "{}",
        formatter.info(&format!(
            "{} chunk(s) from {} chars (size {}, overlap {})",
            chunks.len(),
            text.chars().count(),
            chunk_size,
            overlap
        ))
    );

    Ok(())
}
