// src/config/drafts.rs

//! Turning `[[question]]` tables into setup drafts.

use std::fs;
use std::path::Path;

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::config::model::{ExamConfig, QuestionConfig};
use crate::errors::Result;
use crate::session::QuestionDraft;

/// Build one draft per configured question, loading image files relative to
/// `base_dir`.
pub fn build_drafts(cfg: &ExamConfig, base_dir: &Path) -> Result<Vec<QuestionDraft>> {
    cfg.question
        .iter()
        .map(|q| build_draft(q, base_dir))
        .collect()
}

fn build_draft(q: &QuestionConfig, base_dir: &Path) -> Result<QuestionDraft> {
    let images = q
        .images
        .iter()
        .map(|img| {
            if img.starts_with("data:") {
                Ok(img.clone())
            } else {
                image_data_url(&base_dir.join(img))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionDraft {
        text: q.text.clone(),
        images,
        pre_code: q.pre_code.clone(),
        use_pre_code: q.use_pre_code,
    })
}

/// Read an image file into a `data:<mime>;base64,...` URL.
pub fn image_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading image {:?}", path))?;
    let mime = mime_for(path);
    debug!(?path, mime, size = bytes.len(), "encoded question image");
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
