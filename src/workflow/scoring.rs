//! 判分规则
//!
//! 答对得 4 分，每用一次提示扣 1 分，最低 0 分；答错 0 分

use crate::models::{Letter, Problem};

/// 答对一题的满分
pub const FULL_SCORE: u32 = 4;

/// 每次提示扣除的分数
pub const HINT_PENALTY: u32 = 1;

/// 题目的正确选项字母，答案缺失时返回空串
pub fn correct_letter(problem: &Problem) -> Letter {
    problem.answer.letter()
}

/// 选中的字母是否正确
pub fn is_correct(selected: &str, problem: &Problem) -> bool {
    let correct = correct_letter(problem);
    !correct.is_empty() && selected.trim().eq_ignore_ascii_case(&correct)
}

/// 单题得分
pub fn question_score(is_correct: bool, hints_used: u32) -> u32 {
    if !is_correct {
        return 0;
    }
    FULL_SCORE.saturating_sub(hints_used.saturating_mul(HINT_PENALTY))
}
