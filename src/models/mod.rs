pub mod loaders;
pub mod problem;
pub mod test_document;

pub use loaders::{list_test_ids, load_test_document};
pub use problem::{option_letter, AnswerOption, AnswerSpec, Letter, Problem};
pub use test_document::{QuestionKey, Section, TestDocument};
