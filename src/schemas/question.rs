use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::de::{nullable, optional_u32_flexible};

/// Client-only identity of a question or media entry. Never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(Uuid);

impl LocalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QType {
    Mcq,
    Msq,
    FactTrick,
    SingleInput,
    MultiInput,
    FillBlanks,
    NoResponse,
}

impl QType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::Msq => "msq",
            Self::FactTrick => "fact_trick",
            Self::SingleInput => "single_input",
            Self::MultiInput => "multi_input",
            Self::FillBlanks => "fill_blanks",
            Self::NoResponse => "no_response",
        }
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionMediaType {
    Image,
    Video,
    Embed,
}

impl QuestionMediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Embed => "embed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    #[serde(skip)]
    pub local_id: LocalId,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(min = 1, message = "media url must not be empty"))]
    pub url: String,
    pub media_type: QuestionMediaType,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, media_type: QuestionMediaType) -> Self {
        Self { local_id: LocalId::new(), url: url.into(), media_type }
    }
}

// Equality ignores the client-only id.
impl PartialEq for MediaRef {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.media_type == other.media_type
    }
}

/// One step of a `multi_input` question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, deserialize_with = "nullable")]
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fieldType", rename_all = "snake_case")]
pub enum FieldKind {
    #[serde(rename_all = "camelCase")]
    Input {
        #[serde(
            default,
            deserialize_with = "optional_u32_flexible",
            skip_serializing_if = "Option::is_none"
        )]
        max_chars: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Mcq {
        #[serde(default, deserialize_with = "nullable")]
        options: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        correct_answers: Vec<String>,
    },
}

impl Field {
    pub fn input(label: impl Into<String>) -> Self {
        Self { label: label.into(), kind: FieldKind::Input { max_chars: None } }
    }
}

/// Answer shape of a question, discriminated by `qType` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "qType", rename_all = "snake_case")]
pub enum Answer {
    #[serde(rename_all = "camelCase")]
    Mcq {
        #[serde(default, deserialize_with = "nullable")]
        options: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    Msq {
        #[serde(default, deserialize_with = "nullable")]
        options: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        correct_answers: Vec<String>,
    },
    /// Options are the Fact, Trick and Opinion statements, in that order.
    #[serde(rename_all = "camelCase")]
    FactTrick {
        #[serde(default, deserialize_with = "nullable")]
        options: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        correct_answer: String,
    },
    #[serde(rename_all = "camelCase")]
    SingleInput {
        #[serde(default, deserialize_with = "nullable")]
        input_label: String,
        #[serde(
            default,
            deserialize_with = "optional_u32_flexible",
            skip_serializing_if = "Option::is_none"
        )]
        max_chars: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    MultiInput {
        #[serde(default, deserialize_with = "nullable")]
        multi_fields: Vec<Field>,
    },
    #[serde(rename_all = "camelCase")]
    FillBlanks {
        #[serde(default, deserialize_with = "nullable")]
        fill_blank_text: String,
    },
    NoResponse {},
}

impl Answer {
    pub fn q_type(&self) -> QType {
        match self {
            Self::Mcq { .. } => QType::Mcq,
            Self::Msq { .. } => QType::Msq,
            Self::FactTrick { .. } => QType::FactTrick,
            Self::SingleInput { .. } => QType::SingleInput,
            Self::MultiInput { .. } => QType::MultiInput,
            Self::FillBlanks { .. } => QType::FillBlanks,
            Self::NoResponse {} => QType::NoResponse,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Mcq { options, .. }
            | Self::Msq { options, .. }
            | Self::FactTrick { options, .. } => Some(options.as_slice()),
            Self::SingleInput { .. }
            | Self::MultiInput { .. }
            | Self::FillBlanks { .. }
            | Self::NoResponse {} => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(skip)]
    pub local_id: LocalId,
    #[serde(default, deserialize_with = "nullable")]
    pub prompt: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ai_prompt: String,
    #[serde(default, deserialize_with = "nullable")]
    pub post_answer_tip: String,
    #[serde(default, deserialize_with = "nullable")]
    pub allow_ai_feedback: bool,
    #[serde(rename = "answer_embed_url", default, deserialize_with = "nullable")]
    pub answer_embed_url: String,
    #[serde(rename = "answer_embed_label", default, deserialize_with = "nullable")]
    pub answer_embed_label: String,
    #[serde(default, deserialize_with = "nullable")]
    pub media: Vec<MediaRef>,
    #[serde(flatten)]
    pub answer: Answer,
}

impl Question {
    /// Template appended by "add question": an empty two-option mcq.
    pub fn template() -> Self {
        Self {
            local_id: LocalId::new(),
            prompt: String::new(),
            ai_prompt: String::new(),
            post_answer_tip: String::new(),
            allow_ai_feedback: false,
            answer_embed_url: String::new(),
            answer_embed_label: String::new(),
            media: Vec::new(),
            answer: Answer::Mcq {
                options: vec![String::new(), String::new()],
                correct_answer: String::new(),
            },
        }
    }

    pub fn q_type(&self) -> QType {
        self.answer.q_type()
    }
}

impl Default for Question {
    fn default() -> Self {
        Self::template()
    }
}

// Equality ignores the client-only id.
impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.prompt == other.prompt
            && self.ai_prompt == other.ai_prompt
            && self.post_answer_tip == other.post_answer_tip
            && self.allow_ai_feedback == other.allow_ai_feedback
            && self.answer_embed_url == other.answer_embed_url
            && self.answer_embed_label == other.answer_embed_label
            && self.media == other.media
            && self.answer == other.answer
    }
}
