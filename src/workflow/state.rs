//! 答题状态与 AI 辅助状态
//!
//! 所有状态都是普通的值类型，由 `ExamSession` 独占持有；
//! 这里只定义状态迁移规则，不做任何 IO。

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{Letter, Problem, QuestionKey};
use crate::workflow::scoring::{is_correct, question_score};

/// 单题答题状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionState {
    pub selected_option: Option<Letter>,
    pub submitted: bool,
    pub hints_used: u32,
    pub score: u32,
    pub is_correct: Option<bool>,
}

/// 单题的提示 / 解析状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HintSolutionState {
    pub hint_pending: bool,
    pub solution_pending: bool,
    /// 按生成顺序追加，最新的在最后
    pub hints: Vec<String>,
    pub solution: Option<String>,
    pub hint_error: Option<String>,
    pub solution_error: Option<String>,
}

impl HintSolutionState {
    /// 标记提示请求开始，已有请求在途时返回 false
    pub fn begin_hint(&mut self) -> bool {
        if self.hint_pending {
            return false;
        }
        self.hint_pending = true;
        true
    }

    /// 记录提示结果，成功时返回 true
    pub fn finish_hint(&mut self, result: Result<String, String>) -> bool {
        self.hint_pending = false;
        match result {
            Ok(hint) => {
                self.hints.push(hint);
                self.hint_error = None;
                true
            }
            Err(reason) => {
                self.hint_error = Some(reason);
                false
            }
        }
    }

    /// 标记解析请求开始，已有请求在途时返回 false
    pub fn begin_solution(&mut self) -> bool {
        if self.solution_pending {
            return false;
        }
        self.solution_pending = true;
        true
    }

    /// 记录解析结果，新解析覆盖旧解析；失败时保留旧解析
    pub fn finish_solution(&mut self, result: Result<String, String>) {
        self.solution_pending = false;
        match result {
            Ok(solution) => {
                self.solution = Some(solution);
                self.solution_error = None;
            }
            Err(reason) => self.solution_error = Some(reason),
        }
    }
}

/// 题目的展示结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    /// 还不能显示结果
    Pending,
    Correct,
    Incorrect,
    /// 整卷已交但这道题没有提交
    Unanswered,
}

/// 整卷答题状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestState {
    pub per_question: BTreeMap<QuestionKey, QuestionState>,
    pub submitted: bool,
}

impl TestState {
    /// 读取单题状态，不存在时视为默认状态
    pub fn question(&self, key: QuestionKey) -> QuestionState {
        self.per_question.get(&key).cloned().unwrap_or_default()
    }

    /// 选择答案
    ///
    /// 整卷或本题已提交时忽略，返回是否生效
    pub fn select_answer(&mut self, key: QuestionKey, letter: impl Into<Letter>) -> bool {
        if self.submitted {
            debug!("{} 整卷已提交，忽略选择", key);
            return false;
        }
        let state = self.per_question.entry(key).or_default();
        if state.submitted {
            debug!("{} 已提交，忽略选择", key);
            return false;
        }
        state.selected_option = Some(letter.into());
        state.score = 0;
        true
    }

    /// 提交单题并判分
    ///
    /// 未选择或已提交时忽略，返回是否生效
    pub fn submit_question(&mut self, key: QuestionKey, problem: &Problem) -> bool {
        let Some(state) = self.per_question.get_mut(&key) else {
            return false;
        };
        if state.submitted {
            return false;
        }
        let Some(selected) = state.selected_option.as_deref() else {
            return false;
        };

        let correct = is_correct(selected, problem);
        state.is_correct = Some(correct);
        state.score = question_score(correct, state.hints_used);
        state.submitted = true;
        debug!("{} 提交: 正确={} 得分={}", key, correct, state.score);
        true
    }

    /// 记录一次成功的提示
    pub fn record_hint_used(&mut self, key: QuestionKey) {
        self.per_question.entry(key).or_default().hints_used += 1;
    }

    /// 交卷，重复调用无效果；返回是否是第一次交卷
    pub fn submit_test(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        self.submitted = true;
        true
    }

    /// 题目是否已经可以看结果/请求解析
    pub fn is_revealed(&self, key: QuestionKey) -> bool {
        self.submitted || self.per_question.get(&key).is_some_and(|s| s.submitted)
    }

    /// 题目的展示结果
    ///
    /// 交卷不会补判未提交的题目，这些题目显示为 `Unanswered`
    pub fn outcome(&self, key: QuestionKey) -> QuestionOutcome {
        let state = self.per_question.get(&key);
        match state.and_then(|s| if s.submitted { s.is_correct } else { None }) {
            Some(true) => QuestionOutcome::Correct,
            Some(false) => QuestionOutcome::Incorrect,
            None if self.submitted => QuestionOutcome::Unanswered,
            None => QuestionOutcome::Pending,
        }
    }

    /// 已提交题目的总分
    pub fn total_score(&self) -> u32 {
        self.per_question
            .values()
            .filter(|s| s.submitted)
            .map(|s| s.score)
            .sum()
    }

    /// 已提交的题目数
    pub fn answered_count(&self) -> usize {
        self.per_question.values().filter(|s| s.submitted).count()
    }
}
