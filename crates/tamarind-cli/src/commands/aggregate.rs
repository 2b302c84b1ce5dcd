use crate::cli::AggregateArgs;
use crate::error::Result;
use tamarind::engine::aggregate::{RESULTS_FILE, aggregate};
use tracing::info;

pub async fn run(args: AggregateArgs) -> Result<()> {
    let spec = args.model.spec().results_spec();
    info!("Aggregating {} under {:?}", spec.metrics_file, &args.folder);

    let merged = tokio::task::block_in_place(|| aggregate(&args.folder, &spec))?;
    match merged {
        Some(table) => println!(
            "Merged {} row(s) into {}",
            table.len(),
            args.folder.join(RESULTS_FILE).display()
        ),
        None => println!(
            "No {} found under {}",
            spec.metrics_file,
            args.folder.display()
        ),
    }
    Ok(())
}
