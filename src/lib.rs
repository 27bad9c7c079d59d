//! # Exam Hint Viewer
//!
//! 试卷答题核心：选择 / 提交 / 判分，以及通过代理向大模型请求提示和解析
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 试卷、题目、答案写法（`AnswerSpec`）、题目位置（`QuestionKey`）
//!
//! ### ② 外部能力（Clients / Services）
//! - `clients/` - 试卷来源（HTTP / 本地 TOML）、LLM 网关 HTTP 客户端
//! - `services/` - 提示词模板、LLM 服务（async-openai）、网关请求格式
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 判分规则、答题状态迁移、答题会话（`ExamSession`）
//!
//! ### ④ 服务层（Server）
//! - `server/` - axum 代理：`/generate-solution`、`/test/:id`

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GatewayClient, HttpTestSource, TestSource, TomlTestSource};
pub use config::{Config, SolutionGate, TestSourceKind};
pub use error::{AppError, AppResult, ErrorKind};
pub use models::{AnswerSpec, Problem, QuestionKey, TestDocument};
pub use services::{GenerateRequest, GenerationKind, LlmGateway, LlmService, PromptStore};
pub use workflow::{ExamSession, QuestionOutcome, SessionSnapshot, TestState};
