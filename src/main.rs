use anyhow::{Context, Result};

use generate_paper::utils::logging;
use generate_paper::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // initialize logging
    logging::init();

    // load configuration
    let config = Config::from_env();

    let app = App::initialize(config).await?;

    // the first argument selects the mode; no argument runs the batch
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => app.run().await?,
        Some("history") => app.show_history().await?,
        Some("export") => {
            let paper_id = args.get(1).context("usage: export <paper-id>")?;
            app.export_stored(paper_id).await?;
        }
        Some("delete") => {
            let paper_id = args.get(1).context("usage: delete <paper-id>")?;
            app.delete_stored(paper_id).await?;
        }
        Some("manual") => {
            let path = args.get(1).context("usage: manual <paper-toml>")?;
            app.save_manual(path).await?;
        }
        Some(other) => anyhow::bail!("unknown mode: {}", other),
    }

    Ok(())
}
