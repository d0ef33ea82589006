pub mod fill_blanks;
pub mod media;
pub mod preferences;
pub mod question_editor;
pub mod reorder;
pub mod uploads;
pub mod validation;
