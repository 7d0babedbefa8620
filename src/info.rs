//
// info.rs
// pxtools
//
// Prints what the image property probe reports, as text or JSON.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use anyhow::{Context, Result};

use crate::imageio::ImageIo;
use crate::models::ImageDescriptor;
use crate::morphology::dispatch;

pub fn print_info(path: &Path, json: bool, io: &ImageIo) -> Result<()> {
    let descriptor = io
        .probe(path)
        .with_context(|| format!("Failed to read image properties of {:?}", path))?;

    if json {
        let text = serde_json::to_string_pretty(&descriptor)
            .context("Failed to serialize image descriptor")?;
        println!("{}", text);
    } else {
        print!("{}", render(path, &descriptor));
    }
    Ok(())
}

/// Plain-text report, one field per line.
pub fn render(path: &Path, descriptor: &ImageDescriptor) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let join = |values: Vec<String>| values.join(" x ");

    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str(&format!("Image Information: {}\n", name));
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str(&format!("  Format:         {}\n", descriptor.format));
    out.push_str(&format!("  Component type: {}\n", descriptor.component_type));
    out.push_str(&format!(
        "  Pixel type:     {} ({} component(s))\n",
        descriptor.pixel_type, descriptor.component_count
    ));
    out.push_str(&format!("  Dimension:      {}\n", descriptor.dimension));
    out.push_str(&format!(
        "  Size:           {}\n",
        join(descriptor.size.iter().map(|s| s.to_string()).collect())
    ));
    out.push_str(&format!(
        "  Spacing:        {}\n",
        join(descriptor.spacing.iter().map(|s| format!("{:.4}", s)).collect())
    ));
    out.push_str(&format!(
        "  Origin:         {}
",
        join(descriptor.origin.iter().map(|o| format!("{:.4}", o)).collect())
    ));

    let morphology = descriptor.component_count == 1
        && dispatch::is_supported(descriptor.dimension, &descriptor.component_type);
    out.push_str(&format!(
        "  Morphology:     {}\n",
        if morphology { "supported" } else { "not supported" }
    ));
    out
}
