use std::path::Path;

use crate::errors::EditorError;
use crate::schemas::activity::{Material, MaterialMediaType};
use crate::schemas::question::{LocalId, MediaRef, Question, QuestionMediaType};

const DOC_EXTENSIONS: &[&str] = &["doc", "docx", "ppt", "pptx", "xls", "xlsx", "odt", "txt"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "ogg"];
const EMBED_HOSTS: &[&str] =
    &["youtube.com", "youtu.be", "vimeo.com", "docs.google.com", "drive.google.com"];

/// Appends an empty `{url: "", mediaType}` entry for the user to fill in.
pub fn add_media_to_question(
    questions: &[Question],
    index: usize,
    media_type: QuestionMediaType,
) -> Result<Vec<Question>, EditorError> {
    with_media(questions, index, |_, media| {
        media.push(MediaRef::new("", media_type));
        Ok(())
    })
}

pub fn update_question_media(
    questions: &[Question],
    index: usize,
    media_index: usize,
    url: impl Into<String>,
) -> Result<Vec<Question>, EditorError> {
    let url = url.into();
    with_media(questions, index, |question, media| {
        let len = media.len();
        let entry = media
            .get_mut(media_index)
            .ok_or(EditorError::MediaIndexOutOfRange { question, index: media_index, len })?;
        entry.url = url;
        Ok(())
    })
}

pub fn remove_question_media(
    questions: &[Question],
    index: usize,
    media_index: usize,
) -> Result<Vec<Question>, EditorError> {
    with_media(questions, index, |question, media| {
        if media_index >= media.len() {
            return Err(EditorError::MediaIndexOutOfRange {
                question,
                index: media_index,
                len: media.len(),
            });
        }
        media.remove(media_index);
        Ok(())
    })
}

/// Appends an uploaded media entry to the question with id `question`,
/// wherever it sits in the list now.
pub fn attach_media(
    questions: &[Question],
    question: LocalId,
    media: MediaRef,
) -> Result<Vec<Question>, EditorError> {
    let index = questions
        .iter()
        .position(|candidate| candidate.local_id == question)
        .ok_or(EditorError::UnknownQuestion(question))?;
    let mut next = questions.to_vec();
    next[index].media.push(media);
    Ok(next)
}

/// Best guess of a material's kind from its URL. Embeds win over extensions.
pub fn infer_material_media_type(url: &str) -> MaterialMediaType {
    let trimmed = url.trim();
    if trimmed.to_ascii_lowercase().contains("<iframe") {
        return MaterialMediaType::Embed;
    }

    let lowered = trimmed.to_ascii_lowercase();
    let without_suffix = lowered.split(['?', '#']).next().unwrap_or_default();

    if let Some(host) = host_of(without_suffix) {
        let host = host.strip_prefix("www.").unwrap_or(host);
        let is_embed = EMBED_HOSTS
            .iter()
            .any(|embed| host == *embed || host.ends_with(&format!(".{embed}")));
        if is_embed {
            return MaterialMediaType::Embed;
        }
    }

    let extension = without_suffix
        .rsplit('/')
        .next()
        .and_then(|last| last.rsplit_once('.'))
        .map(|(_, ext)| ext);

    match extension {
        Some("pdf") => MaterialMediaType::Pdf,
        Some(ext) if DOC_EXTENSIONS.contains(&ext) => MaterialMediaType::Doc,
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => MaterialMediaType::Image,
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => MaterialMediaType::Video,
        _ => MaterialMediaType::Link,
    }
}

/// Content type sent with an uploaded file.
pub fn guess_mime(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("ogg") => "video/ogg",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("odt") => "application/vnd.oasis.opendocument.text",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Appends an empty link material.
pub fn add_material(materials: &[Material]) -> Vec<Material> {
    let mut next = materials.to_vec();
    next.push(Material::default());
    next
}

/// Replaces a material's url and re-infers its kind.
pub fn update_material_url(
    materials: &[Material],
    index: usize,
    url: impl Into<String>,
) -> Result<Vec<Material>, EditorError> {
    let url = url.into();
    modify_material(materials, index, |material| {
        material.media_type = infer_material_media_type(&url);
        material.url = url;
    })
}

pub fn update_material_title(
    materials: &[Material],
    index: usize,
    title: impl Into<String>,
) -> Result<Vec<Material>, EditorError> {
    let title = title.into();
    modify_material(materials, index, |material| material.title = title)
}

pub fn update_material_description(
    materials: &[Material],
    index: usize,
    description: Option<String>,
) -> Result<Vec<Material>, EditorError> {
    modify_material(materials, index, |material| {
        material.description = description.filter(|text| !text.trim().is_empty())
    })
}

/// Overrides the inferred kind.
pub fn update_material_media_type(
    materials: &[Material],
    index: usize,
    media_type: MaterialMediaType,
) -> Result<Vec<Material>, EditorError> {
    modify_material(materials, index, |material| material.media_type = media_type)
}

pub fn remove_material(materials: &[Material], index: usize) -> Result<Vec<Material>, EditorError> {
    if index >= materials.len() {
        return Err(EditorError::MaterialIndexOutOfRange { index, len: materials.len() });
    }
    let mut next = materials.to_vec();
    next.remove(index);
    Ok(next)
}

/// Material built from a finished upload. `reported` is the server's kind, if any.
pub fn uploaded_material(file_name: &str, url: String, reported: Option<&str>) -> Material {
    let media_type = reported
        .and_then(MaterialMediaType::parse)
        .unwrap_or_else(|| infer_material_media_type(file_name));
    Material { title: file_name.to_string(), description: None, url, media_type }
}

/// Host part of `url`. Without a scheme, a leading segment with a dot is the host.
fn host_of(url: &str) -> Option<&str> {
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url.strip_prefix("//").unwrap_or(url),
    };
    let authority = rest.split('/').next().filter(|segment| segment.contains('.'))?;
    let host = authority.rsplit('@').next()?;
    Some(host.split(':').next().unwrap_or(host))
}

fn with_media<F>(
    questions: &[Question],
    index: usize,
    change: F,
) -> Result<Vec<Question>, EditorError>
where
    F: FnOnce(usize, &mut Vec<MediaRef>) -> Result<(), EditorError>,
{
    if index >= questions.len() {
        return Err(EditorError::QuestionIndexOutOfRange { index, len: questions.len() });
    }
    let mut next = questions.to_vec();
    change(index, &mut next[index].media)?;
    Ok(next)
}

fn modify_material<F>(
    materials: &[Material],
    index: usize,
    change: F,
) -> Result<Vec<Material>, EditorError>
where
    F: FnOnce(&mut Material),
{
    if index >= materials.len() {
        return Err(EditorError::MaterialIndexOutOfRange { index, len: materials.len() });
    }
    let mut next = materials.to_vec();
    change(&mut next[index]);
    Ok(next)
}
