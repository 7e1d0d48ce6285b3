// ==========================================
// 高考志愿推荐引擎 - AI 选报服务接口
// ==========================================
// 职责: 把单档候选与考生画像交给文本生成服务,
// 取回 "专业组 -> 选定专业" 的选报结果
//
// 契约: 输出 ≤4 组 / 每组 ≤6 专业; 超量与非法输出
// 由编排器截断, 不在此处报错
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

// ==========================================
// CandidateBrief - 候选摘要 (AI 输入)
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct CandidateBrief {
    pub group_id: i64,
    pub name: String,
    pub city: String,
    pub features: Vec<String>,
    pub majors: Vec<MajorBrief>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MajorBrief {
    pub id: i64,
    pub name: String,
    pub tuition: Option<i64>,
}

/// 选报结果: 专业组 id → 选定专业 id 列表
pub type SelectionMap = BTreeMap<i64, Vec<i64>>;

// ==========================================
// VolunteerSelector - 选报服务接口
// ==========================================
#[async_trait]
pub trait VolunteerSelector: Send + Sync {
    /// 从候选中选报
    ///
    /// # 参数
    /// - profile_text: 考生画像文本
    /// - candidates: 单档候选摘要
    async fn select(
        &self,
        profile_text: &str,
        candidates: &[CandidateBrief],
    ) -> EngineResult<SelectionMap>;
}

// ==========================================
// LlmSelectorConfig - LLM 选报服务配置
// ==========================================
// 显式配置对象, 构造时注入编排器, 不做模块级缓存
#[derive(Debug, Clone)]
pub struct LlmSelectorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

// ==========================================
// LlmVolunteerSelector - LLM 选报服务客户端
// ==========================================
pub struct LlmVolunteerSelector {
    config: LlmSelectorConfig,
    client: reqwest::Client,
}

// ===== OpenAI 兼容协议的请求/响应结构 =====

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "你是一名高考志愿填报顾问。根据考生画像和候选院校专业组, \
    选出最多 4 个专业组, 每组选出最多 6 个专业。只输出 JSON 对象, \
    键为专业组 id 字符串, 值为专业 id 数组, 不要输出其他内容。";

impl LlmVolunteerSelector {
    /// 构造函数
    pub fn new(config: LlmSelectorConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::UpstreamServiceFailure(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// 从模型输出文本解析选报结果
    ///
    /// 容忍代码块包裹与键为字符串的 id; 解析失败报
    /// UpstreamServiceFailure, 由编排器兜底
    fn parse_selection(raw: &str) -> EngineResult<SelectionMap> {
        let trimmed = raw
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let parsed: BTreeMap<String, Vec<i64>> = serde_json::from_str(trimmed)
            .map_err(|e| EngineError::UpstreamServiceFailure(format!("选报结果解析失败: {}", e)))?;

        let mut selection = SelectionMap::new();
        for (key, major_ids) in parsed {
            match key.trim().parse::<i64>() {
                Ok(group_id) => {
                    selection.insert(group_id, major_ids);
                }
                Err(_) => {
                    warn!(key = %key, "选报结果包含非法专业组 id, 丢弃");
                }
            }
        }
        Ok(selection)
    }
}

#[async_trait]
impl VolunteerSelector for LlmVolunteerSelector {
    async fn select(
        &self,
        profile_text: &str,
        candidates: &[CandidateBrief],
    ) -> EngineResult<SelectionMap> {
        let candidates_json = serde_json::to_string(candidates)
            .map_err(|e| EngineError::UpstreamServiceFailure(e.to_string()))?;

        let user_content = format!(
            "考生画像:\n{}\n\n候选院校专业组:\n{}",
            profile_text, candidates_json
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        debug!(model = %self.config.model, candidates = candidates.len(), "调用 AI 选报服务");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::UpstreamServiceFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::UpstreamServiceFailure(format!(
                "AI 服务返回状态 {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::UpstreamServiceFailure(e.to_string()))?;

        let content = body
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                EngineError::UpstreamServiceFailure("AI 服务返回空 choices".to_string())
            })?;

        Self::parse_selection(content)
    }
}
