use std::{
    io::{stdout, Write},
    path::Path,
};

use anyhow::{Context, Result};
use aopcs::frame::{Frame, Payload};
use handlebars::handlebars_helper;
use serde::Serialize;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Row {
    offset: usize,
    format: String,
    broadcaster: u8,
    fcs: String,
    satellites: String,
}

#[derive(Debug, Clone, Serialize)]
struct Summary {
    filename: String,
    total_frames: usize,
    total_bits: usize,
    frames: Vec<Row>,
}

fn satellites(frame: &Frame) -> String {
    let addrs: Vec<String> = match &frame.payload {
        Payload::Monosat { satellite } => vec![satellite.address.to_string()],
        Payload::Multisat {
            reference,
            relatives,
        } => std::iter::once(reference.address)
            .chain(relatives.iter().map(|r| r.address))
            .map(|a| a.to_string())
            .collect(),
        Payload::ConstellationStatus(report) => {
            report.statuses.iter().map(|s| s.address.to_string()).collect()
        }
    };
    addrs.join(",")
}

fn summarize(fpath: &Path, frames: &[Frame]) -> Summary {
    let mut offset = 0;
    let mut rows = Vec::with_capacity(frames.len());
    for frame in frames {
        rows.push(Row {
            offset,
            format: frame.format.to_string(),
            broadcaster: frame.broadcaster,
            fcs: format!("{:04X}", frame.fcs),
            satellites: satellites(frame),
        });
        offset += frame.bit_len();
    }
    Summary {
        filename: fpath.to_string_lossy().to_string(),
        total_frames: frames.len(),
        total_bits: offset,
        frames: rows,
    }
}

pub fn frames(fpath: &Path, format: &Format) -> Result<()> {
    let dat = std::fs::read(fpath).with_context(|| format!("reading input {fpath:?}"))?;
    let frames = aopcs::decode(&dat).with_context(|| format!("decoding {fpath:?}"))?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &frames).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&summarize(fpath, &frames)).context("serializing frames")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(summary: &Summary) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let width = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:>width$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_template_string("frames", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("frames", summary).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================
Frames:   {{ total_frames }}
Bits:     {{ total_bits }}
-------------------------------------------------------------------------------
Offset  Format         Broadcaster   FCS   Satellites
-------------------------------------------------------------------------------
{{ #each frames }}{{ lpad 6 offset }}  {{ lpad 13 format }}  {{ lpad 11 broadcaster }}  {{ fcs }}  {{ satellites }}
{{/each }}
";
