//! `scanpull locate`: show which remote file a run would fetch.

use anyhow::Result;
use scanpull_core::config::ScanpullConfig;
use scanpull_core::paths::DatasetPaths;
use scanpull_core::pipeline::resolve;
use scanpull_core::transport::CurlTransport;
use scanpull_core::{RunContext, RunSettings};

pub fn run_locate(cfg: &ScanpullConfig, json: bool) -> Result<()> {
    let settings = RunSettings::from_config(cfg)?;
    let transport = CurlTransport::new(&cfg.http);
    let ctx = RunContext::now();

    let (dataset, url) = resolve(&ctx, &settings, &transport)?;
    let date = dataset.date_or(&ctx.today_label());
    let paths = DatasetPaths::new(&settings.download_dir, &settings.output_dir, &date);
    let downloaded = paths.archive.exists();

    if json {
        let value = serde_json::json!({
            "dataset": dataset,
            "url": url,
            "date": date,
            "archive": paths.archive,
            "output": paths.output,
            "downloaded": downloaded,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("folder   {}", dataset.folder_label);
        println!("file     {}", dataset.file_label);
        println!("url      {}", url);
        println!("date     {}", date);
        println!(
            "archive  {}{}",
            paths.archive.display(),
            if downloaded { " (present)" } else { "" }
        );
        println!("output   {}", paths.output.display());
    }
    Ok(())
}
