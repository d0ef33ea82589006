use validator::{Validate, ValidationErrors};

use crate::errors::{EditorError, ValidationIssue};
use crate::schemas::activity::{Activity, ActivityContent, PracticeData, ReadingData};
use crate::schemas::question::{Answer, FieldKind, Question};
use crate::services::fill_blanks::blank_count;
use crate::services::question_editor::{FACT_TRICK_OPTIONS, MIN_CHOICE_OPTIONS};

/// Shape check run before a save. Collects every problem in the active
/// content; the inactive payload is not looked at.
pub fn validate_activity(activity: &Activity) -> Result<(), EditorError> {
    let mut issues = Vec::new();

    if let Err(errors) = activity.validate() {
        collect(&mut issues, "", &errors);
    }

    match activity.content() {
        ActivityContent::Practice(data) => check_practice(&mut issues, data),
        ActivityContent::Reading(data) => check_reading(&mut issues, data),
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(EditorError::Validation(issues))
    }
}

fn check_reading(issues: &mut Vec<ValidationIssue>, data: &ReadingData) {
    for (index, material) in data.materials.iter().enumerate() {
        if let Err(errors) = material.validate() {
            collect(issues, &format!("readingData.materials[{index}]"), &errors);
        }
    }
}

fn check_practice(issues: &mut Vec<ValidationIssue>, data: &PracticeData) {
    for (index, question) in data.questions.iter().enumerate() {
        check_question(issues, &format!("practiceData.questions[{index}]"), question);
    }
}

fn check_question(issues: &mut Vec<ValidationIssue>, base: &str, question: &Question) {
    for (index, media) in question.media.iter().enumerate() {
        if let Err(errors) = media.validate() {
            collect(issues, &format!("{base}.media[{index}]"), &errors);
        }
    }

    match &question.answer {
        Answer::Mcq { options, correct_answer } => {
            check_option_floor(issues, base, options);
            check_single_answer(issues, base, options, correct_answer);
        }
        Answer::Msq { options, correct_answers } => {
            check_option_floor(issues, base, options);
            let path = format!("{base}.correctAnswers");
            check_answer_subset(issues, &path, options, correct_answers);
        }
        Answer::FactTrick { options, correct_answer } => {
            if options.len() != FACT_TRICK_OPTIONS {
                issues.push(ValidationIssue::new(
                    format!("{base}.options"),
                    format!("needs exactly {FACT_TRICK_OPTIONS} options, has {}", options.len()),
                ));
            }
            check_single_answer(issues, base, options, correct_answer);
        }
        Answer::MultiInput { multi_fields } => {
            if multi_fields.is_empty() {
                issues.push(ValidationIssue::new(
                    format!("{base}.multiFields"),
                    "needs at least one step",
                ));
            }
            for (index, field) in multi_fields.iter().enumerate() {
                if let FieldKind::Mcq { options, correct_answers } = &field.kind {
                    let path = format!("{base}.multiFields[{index}]");
                    check_option_floor(issues, &path, options);
                    check_answer_subset(
                        issues,
                        &format!("{path}.correctAnswers"),
                        options,
                        correct_answers,
                    );
                }
            }
        }
        Answer::FillBlanks { fill_blank_text } => {
            if blank_count(fill_blank_text) == 0 {
                issues.push(ValidationIssue::new(
                    format!("{base}.fillBlankText"),
                    "needs at least one [$N] blank",
                ));
            }
        }
        Answer::SingleInput { .. } | Answer::NoResponse {} => {}
    }
}

fn check_option_floor(issues: &mut Vec<ValidationIssue>, base: &str, options: &[String]) {
    if options.len() < MIN_CHOICE_OPTIONS {
        issues.push(ValidationIssue::new(
            format!("{base}.options"),
            format!("needs at least {MIN_CHOICE_OPTIONS} options, has {}", options.len()),
        ));
    }
}

fn check_single_answer(
    issues: &mut Vec<ValidationIssue>,
    base: &str,
    options: &[String],
    answer: &str,
) {
    if !answer.is_empty() && !options.iter().any(|option| option == answer) {
        issues.push(ValidationIssue::new(
            format!("{base}.correctAnswer"),
            format!("'{answer}' is not one of the options"),
        ));
    }
}

fn check_answer_subset(
    issues: &mut Vec<ValidationIssue>,
    path: &str,
    options: &[String],
    answers: &[String],
) {
    for answer in answers.iter().filter(|answer| !options.contains(answer)) {
        issues.push(ValidationIssue::new(path, format!("'{answer}' is not one of the options")));
    }
}

fn collect(issues: &mut Vec<ValidationIssue>, base: &str, errors: &ValidationErrors) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (field, field_errors) in fields {
        let path = if base.is_empty() { field.to_string() } else { format!("{base}.{field}") };
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| error.code.to_string());
            issues.push(ValidationIssue::new(path.clone(), message));
        }
    }
}
