//! 答题会话 - 流程层
//!
//! 核心职责：独占持有当前试卷和全部答题状态，
//! 所有操作（选择 / 提交 / 提示 / 解析 / 交卷）都经过这里。
//!
//! 提示和解析是异步请求，拆成三步：
//! 1. `begin_*`：标记在途，返回带试卷代次的凭据
//! 2. 调用方在会话之外等待网关返回
//! 3. `complete_*`：代次仍然有效时才写回状态
//!
//! 重新加载或关闭试卷会让代次加一，之前发出的请求结果会被丢弃。

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::clients::TestSource;
use crate::config::SolutionGate;
use crate::error::{AppError, AppResult};
use crate::models::{Letter, Problem, QuestionKey, TestDocument};
use crate::services::gateway::{GenerateRequest, GenerationKind, LlmGateway};
use crate::workflow::state::{HintSolutionState, QuestionOutcome, QuestionState, TestState};

/// 一次在途的提示 / 解析请求
#[derive(Debug, Clone)]
pub struct AssistTicket {
    generation: u64,
    key: QuestionKey,
    request: GenerateRequest,
}

impl AssistTicket {
    pub fn key(&self) -> QuestionKey {
        self.key
    }

    pub fn kind(&self) -> GenerationKind {
        self.request.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 发给网关的请求
    pub fn request(&self) -> &GenerateRequest {
        &self.request
    }
}

/// 单题的展示快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub key: QuestionKey,
    pub state: QuestionState,
    pub assistance: HintSolutionState,
    pub outcome: QuestionOutcome,
    /// 题库自带的解析，结果可见后才给出
    pub authored_solution: Option<String>,
}

/// 整卷的展示快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub test_id: String,
    pub generation: u64,
    pub submitted: bool,
    pub total_score: u32,
    pub answered_count: usize,
    pub question_count: usize,
    pub questions: Vec<QuestionView>,
}

/// 答题会话
pub struct ExamSession {
    document: Option<TestDocument>,
    generation: u64,
    test: TestState,
    assistance: BTreeMap<QuestionKey, HintSolutionState>,
    solution_gate: SolutionGate,
    custom_hint_prompt: Option<String>,
    custom_solution_prompt: Option<String>,
}

impl ExamSession {
    /// 创建空会话
    pub fn new(solution_gate: SolutionGate) -> Self {
        Self {
            document: None,
            generation: 0,
            test: TestState::default(),
            assistance: BTreeMap::new(),
            solution_gate,
            custom_hint_prompt: None,
            custom_solution_prompt: None,
        }
    }

    /// 加载试卷，丢弃之前的全部状态
    pub fn load(&mut self, document: TestDocument) {
        self.reset();
        info!(
            "📄 加载试卷 {}，共 {} 道题",
            document.id,
            document.question_count()
        );
        self.document = Some(document);
    }

    /// 从试卷来源获取并加载；获取失败时保留当前试卷
    pub async fn load_from<S: TestSource>(&mut self, source: &S, test_id: &str) -> AppResult<()> {
        let document = source.fetch_test(test_id).await.map_err(|e| {
            warn!("⚠️ 加载试卷 {} 失败: {}", test_id, e);
            e
        })?;
        self.load(document);
        Ok(())
    }

    /// 关闭当前试卷（返回上一页）
    pub fn close(&mut self) {
        self.reset();
        self.document = None;
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.test = TestState::default();
        self.assistance.clear();
    }

    pub fn document(&self) -> Option<&TestDocument> {
        self.document.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn test_state(&self) -> &TestState {
        &self.test
    }

    /// 单题的提示/解析状态，不存在时为默认状态
    pub fn assistance(&self, key: QuestionKey) -> HintSolutionState {
        self.assistance.get(&key).cloned().unwrap_or_default()
    }

    /// 设置本次会话的自定义提示词，`None` 表示使用默认模板
    pub fn set_custom_prompt(&mut self, kind: GenerationKind, prompt: Option<String>) {
        let prompt = prompt.filter(|p| !p.trim().is_empty());
        match kind {
            GenerationKind::Hint => self.custom_hint_prompt = prompt,
            GenerationKind::Solution => self.custom_solution_prompt = prompt,
        }
    }

    fn problem(&self, key: QuestionKey) -> AppResult<&Problem> {
        self.document
            .as_ref()
            .and_then(|doc| doc.problem(key))
            .ok_or_else(|| AppError::Validation(format!("unknown question {}", key)))
    }

    // ========== 答题 ==========

    /// 选择答案，不合法或已提交时忽略
    pub fn select_answer(&mut self, key: QuestionKey, letter: impl Into<Letter>) -> bool {
        if self.problem(key).is_err() {
            debug!("{} 不存在，忽略选择", key);
            return false;
        }
        self.test.select_answer(key, letter)
    }

    /// 提交单题
    pub fn submit_question(&mut self, key: QuestionKey) -> bool {
        let Some(problem) = self.document.as_ref().and_then(|doc| doc.problem(key)) else {
            debug!("{} 不存在，忽略提交", key);
            return false;
        };
        self.test.submit_question(key, problem)
    }

    /// 交卷
    pub fn submit_test(&mut self) -> bool {
        let first = self.test.submit_test();
        if first {
            info!(
                "✅ 交卷: 得分 {}，已答 {}/{}",
                self.total_score(),
                self.answered_count(),
                self.question_count()
            );
        }
        first
    }

    // ========== 统计 ==========

    pub fn total_score(&self) -> u32 {
        self.test.total_score()
    }

    pub fn answered_count(&self) -> usize {
        self.test.answered_count()
    }

    pub fn question_count(&self) -> usize {
        self.document.as_ref().map_or(0, TestDocument::question_count)
    }

    pub fn unanswered_count(&self) -> usize {
        self.question_count().saturating_sub(self.answered_count())
    }

    pub fn outcome(&self, key: QuestionKey) -> QuestionOutcome {
        self.test.outcome(key)
    }

    // ========== 提示 ==========

    fn build_request(&self, key: QuestionKey, kind: GenerationKind) -> AppResult<GenerateRequest> {
        let problem = self.problem(key)?;
        if problem.text.trim().is_empty() {
            return Err(AppError::Validation(format!("question {} has no text", key)));
        }

        let passage_text = self
            .document
            .as_ref()
            .and_then(|doc| doc.passage_for(key))
            .map(str::to_string);
        let options: Vec<String> = problem.options.iter().map(|o| o.text.clone()).collect();

        let (previous_hints, custom_prompt) = match kind {
            GenerationKind::Hint => (
                Some(self.assistance(key).hints),
                self.custom_hint_prompt.clone(),
            ),
            GenerationKind::Solution => (None, self.custom_solution_prompt.clone()),
        };

        Ok(GenerateRequest {
            question_text: problem.text.clone(),
            passage_text,
            options: (!options.is_empty()).then_some(options),
            kind,
            previous_hints,
            custom_prompt,
        })
    }

    /// 开始一次提示请求
    ///
    /// 同一题已有提示在途时返回 `Ok(None)`
    pub fn begin_hint(&mut self, key: QuestionKey) -> AppResult<Option<AssistTicket>> {
        let request = self.build_request(key, GenerationKind::Hint)?;

        if !self.assistance.entry(key).or_default().begin_hint() {
            debug!("{} 已有提示请求在途，忽略", key);
            return Ok(None);
        }

        Ok(Some(AssistTicket {
            generation: self.generation,
            key,
            request,
        }))
    }

    /// 写回提示结果，凭据过期或不是提示凭据时丢弃并返回 false
    pub fn complete_hint(&mut self, ticket: AssistTicket, result: AppResult<String>) -> bool {
        if ticket.generation != self.generation {
            debug!("{} 的提示结果已过期，丢弃", ticket.key);
            return false;
        }
        if ticket.kind() != GenerationKind::Hint {
            warn!("{} 的 {} 凭据不能写回提示", ticket.key, ticket.kind());
            return false;
        }

        let assist = self.assistance.entry(ticket.key).or_default();
        match result {
            Ok(hint) => {
                assist.finish_hint(Ok(hint));
                self.test.record_hint_used(ticket.key);
                info!("💡 {} 获得第 {} 条提示", ticket.key, assist.hints.len());
            }
            Err(e) => {
                warn!("⚠️ {} 提示生成失败: {}", ticket.key, e);
                assist.finish_hint(Err(e.user_message()));
            }
        }
        true
    }

    /// 请求提示并等待结果
    ///
    /// 返回是否发出了请求；失败原因记录在 `hint_error` 中
    pub async fn request_hint<G: LlmGateway>(
        &mut self,
        gateway: &G,
        key: QuestionKey,
    ) -> AppResult<bool> {
        let Some(ticket) = self.begin_hint(key)? else {
            return Ok(false);
        };
        let result = gateway.generate(ticket.request().clone()).await;
        self.complete_hint(ticket, result);
        Ok(true)
    }

    // ========== 解析 ==========

    /// 当前是否允许请求解析
    pub fn solution_available(&self, key: QuestionKey) -> bool {
        match self.solution_gate {
            SolutionGate::Always => true,
            SolutionGate::AfterSubmit => self.test.is_revealed(key),
        }
    }

    /// 开始一次解析请求
    ///
    /// 未到开放条件或已有解析在途时返回 `Ok(None)`
    pub fn begin_solution(&mut self, key: QuestionKey) -> AppResult<Option<AssistTicket>> {
        let request = self.build_request(key, GenerationKind::Solution)?;

        if !self.solution_available(key) {
            debug!("{} 尚未提交，暂不提供解析", key);
            return Ok(None);
        }
        if !self.assistance.entry(key).or_default().begin_solution() {
            debug!("{} 已有解析请求在途，忽略", key);
            return Ok(None);
        }

        Ok(Some(AssistTicket {
            generation: self.generation,
            key,
            request,
        }))
    }

    /// 写回解析结果，凭据过期或不是解析凭据时丢弃并返回 false
    pub fn complete_solution(&mut self, ticket: AssistTicket, result: AppResult<String>) -> bool {
        if ticket.generation != self.generation {
            debug!("{} 的解析结果已过期，丢弃", ticket.key);
            return false;
        }
        if ticket.kind() != GenerationKind::Solution {
            warn!("{} 的 {} 凭据不能写回解析", ticket.key, ticket.kind());
            return false;
        }

        let assist = self.assistance.entry(ticket.key).or_default();
        match result {
            Ok(solution) => {
                info!("📘 {} 已生成解析", ticket.key);
                assist.finish_solution(Ok(solution));
            }
            Err(e) => {
                warn!("⚠️ {} 解析生成失败: {}", ticket.key, e);
                assist.finish_solution(Err(e.user_message()));
            }
        }
        true
    }

    /// 请求解析并等待结果
    pub async fn request_solution<G: LlmGateway>(
        &mut self,
        gateway: &G,
        key: QuestionKey,
    ) -> AppResult<bool> {
        let Some(ticket) = self.begin_solution(key)? else {
            return Ok(false);
        };
        let result = gateway.generate(ticket.request().clone()).await;
        self.complete_solution(ticket, result);
        Ok(true)
    }

    // ========== 快照 ==========

    /// 展示层使用的只读快照
    pub fn snapshot(&self) -> SessionSnapshot {
        let questions = self
            .document
            .iter()
            .flat_map(|doc| doc.keys().map(move |key| (doc, key)))
            .map(|(doc, key)| {
                let revealed = self.test.is_revealed(key);
                QuestionView {
                    key,
                    state: self.test.question(key),
                    assistance: self.assistance(key),
                    outcome: self.test.outcome(key),
                    authored_solution: doc
                        .problem(key)
                        .and_then(|p| p.solution.clone())
                        .filter(|_| revealed),
                }
            })
            .collect();

        SessionSnapshot {
            test_id: self
                .document
                .as_ref()
                .map(|doc| doc.id.clone())
                .unwrap_or_default(),
            generation: self.generation,
            submitted: self.test.submitted,
            total_score: self.total_score(),
            answered_count: self.answered_count(),
            question_count: self.question_count(),
            questions,
        }
    }
}

impl Default for ExamSession {
    fn default() -> Self {
        Self::new(SolutionGate::default())
    }
}
