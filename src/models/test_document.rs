use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::problem::Problem;

/// 题目在试卷中的位置：第几部分的第几题（都从0开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionKey {
    pub section: usize,
    pub question: usize,
}

impl QuestionKey {
    pub fn new(section: usize, question: usize) -> Self {
        Self { section, question }
    }
}

impl Display for QuestionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}-q{}", self.section, self.question)
    }
}

/// 试卷中的一个部分，可带一篇共用的阅读材料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_text: Option<String>,
    #[serde(default)]
    pub problems: Vec<Problem>,
}

/// 内容管理后台返回的试卷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl TestDocument {
    /// 按位置查找题目
    pub fn problem(&self, key: QuestionKey) -> Option<&Problem> {
        self.sections.get(key.section)?.problems.get(key.question)
    }

    /// 题目的阅读材料，题目自身没有时使用所在部分的材料
    pub fn passage_for(&self, key: QuestionKey) -> Option<&str> {
        let section = self.sections.get(key.section)?;
        let problem = section.problems.get(key.question)?;
        problem
            .passage_text
            .as_deref()
            .or(section.passage_text.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    /// 按顺序列出所有题目位置
    pub fn keys(&self) -> impl Iterator<Item = QuestionKey> + '_ {
        self.sections.iter().enumerate().flat_map(|(s, section)| {
            (0..section.problems.len()).map(move |q| QuestionKey::new(s, q))
        })
    }

    /// 题目总数
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.problems.len()).sum()
    }
}
