//! Immutable-replace edits over a practice activity's question list.
//!
//! Every function takes the current list and returns a new one; the input is
//! never modified and only the addressed question changes.

use crate::errors::EditorError;
use crate::schemas::question::{Answer, Field, FieldKind, QType, Question};

pub const MIN_CHOICE_OPTIONS: usize = 2;
pub const FACT_TRICK_OPTIONS: usize = 3;
pub const FIRST_STEP_LABEL: &str = "Step 1";

/// A single field assignment on one question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionEdit {
    Prompt(String),
    AiPrompt(String),
    PostAnswerTip(String),
    AllowAiFeedback(bool),
    AnswerEmbedUrl(String),
    AnswerEmbedLabel(String),
    /// Switches the answer shape and re-derives the fields the new shape needs.
    QType(QType),
    Options(Vec<String>),
    /// Renames one option. A correct answer pointing at the old text follows it.
    Option { index: usize, text: String },
    CorrectAnswer(String),
    CorrectAnswers(Vec<String>),
    InputLabel(String),
    MaxChars(Option<u32>),
    MultiFields(Vec<Field>),
    FillBlankText(String),
}

impl QuestionEdit {
    /// Wire name of the edited field.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Prompt(_) => "prompt",
            Self::AiPrompt(_) => "aiPrompt",
            Self::PostAnswerTip(_) => "postAnswerTip",
            Self::AllowAiFeedback(_) => "allowAiFeedback",
            Self::AnswerEmbedUrl(_) => "answer_embed_url",
            Self::AnswerEmbedLabel(_) => "answer_embed_label",
            Self::QType(_) => "qType",
            Self::Options(_) | Self::Option { .. } => "options",
            Self::CorrectAnswer(_) => "correctAnswer",
            Self::CorrectAnswers(_) => "correctAnswers",
            Self::InputLabel(_) => "inputLabel",
            Self::MaxChars(_) => "maxChars",
            Self::MultiFields(_) => "multiFields",
            Self::FillBlankText(_) => "fillBlankText",
        }
    }
}

/// A single field assignment on one `multi_input` step.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Label(String),
    /// `true` turns the step into a choice step, `false` into a text input.
    Choice(bool),
    MaxChars(Option<u32>),
    Options(Vec<String>),
    CorrectAnswers(Vec<String>),
}

pub fn add_question(questions: &[Question]) -> Vec<Question> {
    let mut next = questions.to_vec();
    next.push(Question::template());
    next
}

pub fn remove_question(questions: &[Question], index: usize) -> Result<Vec<Question>, EditorError> {
    check_index(questions, index)?;
    let mut next = questions.to_vec();
    next.remove(index);
    Ok(next)
}

pub fn update_question(
    questions: &[Question],
    index: usize,
    edit: QuestionEdit,
) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| apply_edit(question, edit))
}

/// Appends an empty option to an mcq or msq question.
pub fn add_option(questions: &[Question], index: usize) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| match &mut question.answer {
        Answer::Mcq { options, .. } | Answer::Msq { options, .. } => {
            options.push(String::new());
            Ok(())
        }
        other => Err(EditorError::FieldNotApplicable { field: "options", q_type: other.q_type() }),
    })
}

/// Drops one option of an mcq or msq question, along with any answer naming it.
pub fn remove_option(
    questions: &[Question],
    index: usize,
    option: usize,
) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| {
        let q_type = question.q_type();
        match &mut question.answer {
            Answer::Mcq { options, correct_answer } => {
                let removed = take_option(options, q_type, index, option)?;
                if *correct_answer == removed {
                    correct_answer.clear();
                }
                Ok(())
            }
            Answer::Msq { options, correct_answers } => {
                let removed = take_option(options, q_type, index, option)?;
                if !options.contains(&removed) {
                    correct_answers.retain(|answer| *answer != removed);
                }
                Ok(())
            }
            _ => Err(EditorError::FieldNotApplicable { field: "options", q_type }),
        }
    })
}

/// Adds `option` to an msq question's correct answers, or removes it if present.
/// Answers stay in option order.
pub fn toggle_correct_answer(
    questions: &[Question],
    index: usize,
    option: &str,
) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| match &mut question.answer {
        Answer::Msq { options, correct_answers } => {
            if correct_answers.iter().any(|answer| answer == option) {
                correct_answers.retain(|answer| answer != option);
            } else {
                correct_answers.push(option.to_string());
                let ordered: Vec<String> = options
                    .iter()
                    .filter(|candidate| correct_answers.contains(candidate))
                    .cloned()
                    .collect();
                // Answers naming no option keep their place at the end.
                let strays: Vec<String> =
                    correct_answers.iter().filter(|a| !options.contains(a)).cloned().collect();
                *correct_answers = ordered.into_iter().chain(strays).collect();
                correct_answers.dedup();
            }
            Ok(())
        }
        other => {
            Err(EditorError::FieldNotApplicable { field: "correctAnswers", q_type: other.q_type() })
        }
    })
}

/// Appends a text-input step to a `multi_input` question.
pub fn add_field(questions: &[Question], index: usize) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| match &mut question.answer {
        Answer::MultiInput { multi_fields } => {
            let label = format!("Step {}", multi_fields.len() + 1);
            multi_fields.push(Field::input(label));
            Ok(())
        }
        other => {
            Err(EditorError::FieldNotApplicable { field: "multiFields", q_type: other.q_type() })
        }
    })
}

pub fn remove_field(
    questions: &[Question],
    index: usize,
    field: usize,
) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| match &mut question.answer {
        Answer::MultiInput { multi_fields } => {
            if field >= multi_fields.len() {
                return Err(EditorError::FieldIndexOutOfRange {
                    question: index,
                    index: field,
                    len: multi_fields.len(),
                });
            }
            multi_fields.remove(field);
            Ok(())
        }
        other => {
            Err(EditorError::FieldNotApplicable { field: "multiFields", q_type: other.q_type() })
        }
    })
}

pub fn update_field(
    questions: &[Question],
    index: usize,
    field: usize,
    edit: FieldEdit,
) -> Result<Vec<Question>, EditorError> {
    modify(questions, index, |question| {
        let q_type = question.q_type();
        let Answer::MultiInput { multi_fields } = &mut question.answer else {
            return Err(EditorError::FieldNotApplicable { field: "multiFields", q_type });
        };
        let len = multi_fields.len();
        let step = multi_fields.get_mut(field).ok_or(EditorError::FieldIndexOutOfRange {
            question: index,
            index: field,
            len,
        })?;
        apply_field_edit(step, edit, q_type)
    })
}

fn apply_edit(question: &mut Question, edit: QuestionEdit) -> Result<(), EditorError> {
    let q_type = question.q_type();
    let field = edit.field_name();
    let not_applicable = || EditorError::FieldNotApplicable { field, q_type };

    match edit {
        QuestionEdit::Prompt(value) => question.prompt = value,
        QuestionEdit::AiPrompt(value) => question.ai_prompt = value,
        QuestionEdit::PostAnswerTip(value) => question.post_answer_tip = value,
        QuestionEdit::AllowAiFeedback(value) => question.allow_ai_feedback = value,
        QuestionEdit::AnswerEmbedUrl(value) => question.answer_embed_url = value,
        QuestionEdit::AnswerEmbedLabel(value) => question.answer_embed_label = value,
        QuestionEdit::QType(target) => question.answer = switch_answer(&question.answer, target),
        QuestionEdit::Options(values) => match &mut question.answer {
            Answer::Mcq { options, .. } | Answer::Msq { options, .. } => *options = values,
            Answer::FactTrick { options, .. } => *options = resize(values, FACT_TRICK_OPTIONS),
            _ => return Err(not_applicable()),
        },
        QuestionEdit::Option { index, text } => {
            let question_options = match &mut question.answer {
                Answer::Mcq { options, .. }
                | Answer::Msq { options, .. }
                | Answer::FactTrick { options, .. } => options,
                _ => return Err(not_applicable()),
            };
            let len = question_options.len();
            let slot = question_options.get_mut(index).ok_or(
                EditorError::OptionIndexOutOfRange { question: usize::MAX, index, len },
            )?;
            let previous = std::mem::replace(slot, text.clone());
            follow_rename(&mut question.answer, &previous, &text);
        }
        QuestionEdit::CorrectAnswer(value) => match &mut question.answer {
            Answer::Mcq { correct_answer, .. } | Answer::FactTrick { correct_answer, .. } => {
                *correct_answer = value
            }
            _ => return Err(not_applicable()),
        },
        QuestionEdit::CorrectAnswers(values) => match &mut question.answer {
            Answer::Msq { correct_answers, .. } => *correct_answers = values,
            _ => return Err(not_applicable()),
        },
        QuestionEdit::InputLabel(value) => match &mut question.answer {
            Answer::SingleInput { input_label, .. } => *input_label = value,
            _ => return Err(not_applicable()),
        },
        QuestionEdit::MaxChars(value) => match &mut question.answer {
            Answer::SingleInput { max_chars, .. } => *max_chars = value,
            _ => return Err(not_applicable()),
        },
        QuestionEdit::MultiFields(values) => match &mut question.answer {
            Answer::MultiInput { multi_fields } => *multi_fields = values,
            _ => return Err(not_applicable()),
        },
        QuestionEdit::FillBlankText(value) => match &mut question.answer {
            Answer::FillBlanks { fill_blank_text } => *fill_blank_text = value,
            _ => return Err(not_applicable()),
        },
    }

    Ok(())
}

/// Builds the answer for `target`, carrying options over from choice shapes.
/// Correct answers never survive a switch to a different type; switching to
/// the same type only repairs the option list.
pub fn switch_answer(current: &Answer, target: QType) -> Answer {
    if current.q_type() == target {
        return normalize_answer(current);
    }

    let carried: Vec<String> = current.options().map(<[String]>::to_vec).unwrap_or_default();

    match target {
        QType::Mcq => {
            Answer::Mcq { options: pad(carried, MIN_CHOICE_OPTIONS), correct_answer: String::new() }
        }
        QType::Msq => Answer::Msq {
            options: pad(carried, MIN_CHOICE_OPTIONS),
            correct_answers: Vec::new(),
        },
        QType::FactTrick => Answer::FactTrick {
            options: resize(carried, FACT_TRICK_OPTIONS),
            correct_answer: String::new(),
        },
        QType::SingleInput => Answer::SingleInput { input_label: String::new(), max_chars: None },
        QType::MultiInput => Answer::MultiInput {
            multi_fields: vec![Field::input(FIRST_STEP_LABEL)],
        },
        QType::FillBlanks => Answer::FillBlanks { fill_blank_text: String::new() },
        QType::NoResponse => Answer::NoResponse {},
    }
}

fn apply_field_edit(step: &mut Field, edit: FieldEdit, q_type: QType) -> Result<(), EditorError> {
    match edit {
        FieldEdit::Label(label) => step.label = label,
        FieldEdit::Choice(true) => {
            if !matches!(step.kind, FieldKind::Mcq { .. }) {
                step.kind = FieldKind::Mcq {
                    options: vec![String::new(); MIN_CHOICE_OPTIONS],
                    correct_answers: Vec::new(),
                };
            }
        }
        FieldEdit::Choice(false) => {
            if !matches!(step.kind, FieldKind::Input { .. }) {
                step.kind = FieldKind::Input { max_chars: None };
            }
        }
        FieldEdit::MaxChars(value) => match &mut step.kind {
            FieldKind::Input { max_chars } => *max_chars = value,
            FieldKind::Mcq { .. } => {
                return Err(EditorError::FieldNotApplicable { field: "maxChars", q_type })
            }
        },
        FieldEdit::Options(values) => match &mut step.kind {
            FieldKind::Mcq { options, .. } => *options = values,
            FieldKind::Input { .. } => {
                return Err(EditorError::FieldNotApplicable { field: "options", q_type })
            }
        },
        FieldEdit::CorrectAnswers(values) => match &mut step.kind {
            FieldKind::Mcq { correct_answers, .. } => *correct_answers = values,
            FieldKind::Input { .. } => {
                return Err(EditorError::FieldNotApplicable { field: "correctAnswers", q_type })
            }
        },
    }

    Ok(())
}

fn follow_rename(answer: &mut Answer, previous: &str, next: &str) {
    if previous.is_empty() {
        return;
    }

    match answer {
        Answer::Mcq { correct_answer, .. } | Answer::FactTrick { correct_answer, .. } => {
            if correct_answer == previous {
                *correct_answer = next.to_string();
            }
        }
        Answer::Msq { correct_answers, .. } => {
            for answer in correct_answers.iter_mut().filter(|answer| *answer == previous) {
                *answer = next.to_string();
            }
        }
        _ => {}
    }
}

fn take_option(
    options: &mut Vec<String>,
    q_type: QType,
    question: usize,
    option: usize,
) -> Result<String, EditorError> {
    if option >= options.len() {
        return Err(EditorError::OptionIndexOutOfRange {
            question,
            index: option,
            len: options.len(),
        });
    }
    if options.len() <= MIN_CHOICE_OPTIONS {
        return Err(EditorError::OptionFloor { q_type, min: MIN_CHOICE_OPTIONS });
    }
    Ok(options.remove(option))
}

fn normalize_answer(current: &Answer) -> Answer {
    match current {
        Answer::Mcq { options, correct_answer } => {
            let options = pad(options.clone(), MIN_CHOICE_OPTIONS);
            let correct_answer = keep_if_option(&options, correct_answer);
            Answer::Mcq { options, correct_answer }
        }
        Answer::Msq { options, correct_answers } => {
            let options = pad(options.clone(), MIN_CHOICE_OPTIONS);
            let correct_answers = correct_answers
                .iter()
                .filter(|answer| options.contains(answer))
                .cloned()
                .collect();
            Answer::Msq { options, correct_answers }
        }
        Answer::FactTrick { options, correct_answer } => {
            let options = resize(options.clone(), FACT_TRICK_OPTIONS);
            let correct_answer = keep_if_option(&options, correct_answer);
            Answer::FactTrick { options, correct_answer }
        }
        other => other.clone(),
    }
}

fn keep_if_option(options: &[String], answer: &str) -> String {
    if options.iter().any(|option| option == answer) {
        answer.to_string()
    } else {
        String::new()
    }
}

fn pad(mut options: Vec<String>, min: usize) -> Vec<String> {
    if options.len() < min {
        options.resize(min, String::new());
    }
    options
}

fn resize(mut options: Vec<String>, len: usize) -> Vec<String> {
    options.resize(len, String::new());
    options
}

fn check_index(questions: &[Question], index: usize) -> Result<(), EditorError> {
    if index < questions.len() {
        Ok(())
    } else {
        Err(EditorError::QuestionIndexOutOfRange { index, len: questions.len() })
    }
}

fn modify<F>(questions: &[Question], index: usize, change: F) -> Result<Vec<Question>, EditorError>
where
    F: FnOnce(&mut Question) -> Result<(), EditorError>,
{
    check_index(questions, index)?;
    let mut next = questions.to_vec();
    change(&mut next[index]).map_err(|err| match err {
        EditorError::OptionIndexOutOfRange { index: option, len, .. } => {
            EditorError::OptionIndexOutOfRange { question: index, index: option, len }
        }
        other => other,
    })?;
    Ok(next)
}
