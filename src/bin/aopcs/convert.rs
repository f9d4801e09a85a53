use std::{fs, path::Path};

use anyhow::{Context, Result};
use aopcs::report::Projector;
use chrono::Utc;
use tracing::info;

pub fn convert(
    input: &Path,
    output: &Path,
    metadata: &Path,
    projector: &Projector,
    file_name: &str,
) -> Result<()> {
    let dat = fs::read(input).with_context(|| format!("reading input {input:?}"))?;
    let frames = aopcs::decode(&dat).with_context(|| format!("decoding {input:?}"))?;
    info!("decoded {} frames from {input:?}", frames.len());

    let report = projector.project(&frames);
    let doc = report
        .metadata()
        .with_file_name(file_name)
        .with_upload_date(Utc::now());

    fs::write(output, report.render())
        .with_context(|| format!("failed to write report {output:?}"))?;
    info!("wrote {} satellites to {output:?}", report.rows.len());

    let json = serde_json::to_string(&doc).context("serializing metadata")?;
    fs::write(metadata, json).with_context(|| format!("failed to write metadata {metadata:?}"))?;
    info!("wrote metadata to {metadata:?}");

    Ok(())
}
