use serde::{Deserialize, Serialize};

/// 选项字母，例如 "A"
pub type Letter = String;

/// 按选项位置生成字母（0 → "A"）
pub fn option_letter(index: usize) -> Letter {
    u32::try_from(index)
        .ok()
        .and_then(|i| char::from_u32('A' as u32 + i))
        .map(|c| c.to_string())
        .unwrap_or_default()
}

/// 单个选项，只通过它在题目中的位置来标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct AnswerOption {
    pub text: String,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// 题库里的选项既有 `{ "text": ... }` 也有纯字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Plain(String),
    Object { text: String },
}

impl From<RawOption> for AnswerOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Plain(text) | RawOption::Object { text } => Self { text },
        }
    }
}

/// 题目答案的原始写法
///
/// 题库里的答案可能是数字位置（从1开始）、数字字符串、字母，
/// 或者只含一个元素的数组。无法识别的写法统一视为 `Absent`。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnswerSpec {
    #[default]
    Absent,
    Position(i64),
    Text(String),
}

impl AnswerSpec {
    /// 答案的原始文本形式
    pub fn raw(&self) -> Option<String> {
        match self {
            AnswerSpec::Absent => None,
            AnswerSpec::Position(n) => Some(n.to_string()),
            AnswerSpec::Text(s) => Some(s.clone()),
        }
    }

    /// 归一化为正确选项的字母
    ///
    /// 整数 N 对应第 N 个字母（1 → "A"），超出 1..=26 时返回空串；
    /// 其他写法去掉首尾空白后转大写。空答案返回空串，永远判错。
    pub fn letter(&self) -> Letter {
        let Some(raw) = self.raw() else {
            return String::new();
        };
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) if (1..=26).contains(&n) => option_letter((n - 1) as usize),
            Ok(_) => String::new(),
            Err(_) => trimmed.to_uppercase(),
        }
    }
}

impl Serialize for AnswerSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            AnswerSpec::Absent => serializer.serialize_none(),
            AnswerSpec::Position(n) => serializer.serialize_i64(*n),
            AnswerSpec::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for AnswerSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
        use std::fmt;

        struct AnswerVisitor;

        impl<'de> Visitor<'de> for AnswerVisitor {
            type Value = AnswerSpec;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an answer position, letter, or a one-element array of either")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AnswerSpec::Position(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(i64::try_from(value)
                    .map(AnswerSpec::Position)
                    .unwrap_or(AnswerSpec::Absent))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    Ok(AnswerSpec::Position(value as i64))
                } else {
                    Ok(AnswerSpec::Text(value.to_string()))
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AnswerSpec::Text(value.to_string()))
            }

            fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AnswerSpec::Absent)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AnswerSpec::Absent)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(AnswerSpec::Absent)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                AnswerSpec::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                // 只取第一个元素
                let first = seq.next_element::<AnswerSpec>()?.unwrap_or_default();
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(first)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(AnswerSpec::Absent)
            }
        }

        deserializer.deserialize_any(AnswerVisitor)
    }
}

/// 一道题目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_text: Option<String>,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default)]
    pub answer: AnswerSpec,
}

impl Problem {
    /// 带字母的选项列表
    pub fn lettered_options(&self) -> impl Iterator<Item = (Letter, &str)> + '_ {
        self.options
            .iter()
            .enumerate()
            .map(|(i, opt)| (option_letter(i), opt.text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_from_json(raw: &str) -> AnswerSpec {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_option_letter() {
        assert_eq!(option_letter(0), "A");
        assert_eq!(option_letter(3), "D");
        assert_eq!(option_letter(25), "Z");
    }

    #[test]
    fn test_answer_spec_shapes() {
        assert_eq!(answer_from_json("1"), AnswerSpec::Position(1));
        assert_eq!(answer_from_json("\"2\""), AnswerSpec::Text("2".into()));
        assert_eq!(answer_from_json("[\"1\", \"3\"]"), AnswerSpec::Text("1".into()));
        assert_eq!(answer_from_json("[]"), AnswerSpec::Absent);
        assert_eq!(answer_from_json("null"), AnswerSpec::Absent);
        assert_eq!(answer_from_json("{\"x\": 1}"), AnswerSpec::Absent);
        assert_eq!(answer_from_json("2.0"), AnswerSpec::Position(2));
    }

    #[test]
    fn test_letter_normalization() {
        assert_eq!(AnswerSpec::Position(1).letter(), "A");
        assert_eq!(AnswerSpec::Text(" 2 ".into()).letter(), "B");
        assert_eq!(AnswerSpec::Text(" c ".into()).letter(), "C");
        assert_eq!(AnswerSpec::Position(0).letter(), "");
        assert_eq!(AnswerSpec::Position(27).letter(), "");
        assert_eq!(AnswerSpec::Absent.letter(), "");
    }

    #[test]
    fn test_problem_parses_plain_and_object_options() {
        let problem: Problem = serde_json::from_str(
            r#"{"text": "2+2?", "options": ["3", {"text": "4"}], "answer": ["2"]}"#,
        )
        .unwrap();
        assert_eq!(problem.options[1].text, "4");
        assert_eq!(problem.answer.letter(), "B");
        let letters: Vec<_> = problem.lettered_options().map(|(l, _)| l).collect();
        assert_eq!(letters, vec!["A", "B"]);
    }

    #[test]
    fn test_missing_answer_defaults_to_absent() {
        let problem: Problem = serde_json::from_str(r#"{"text": "no key"}"#).unwrap();
        assert_eq!(problem.answer, AnswerSpec::Absent);
    }
}
