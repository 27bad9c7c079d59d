pub mod scoring;
pub mod session;
pub mod state;

pub use scoring::{correct_letter, question_score, FULL_SCORE, HINT_PENALTY};
pub use session::{AssistTicket, ExamSession, QuestionView, SessionSnapshot};
pub use state::{HintSolutionState, QuestionOutcome, QuestionState, TestState};
