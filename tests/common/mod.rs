//! Deterministic capability fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use autoresearch_agent::{LlmError, SearchError, SearchHit, SearchOptions, SearchProvider, TextGenerator};

/// One scripted text-generation reply
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

/// Answers prompts from a queue; once the queue is drained every call gets
/// `otherwise`. All prompts are recorded.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    otherwise: Reply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            otherwise: Reply::text("OK"),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Plan, sufficiency answer, report
    pub fn answering(plan: &str, judgment: &str, report: &str) -> Self {
        Self::new(vec![
            Reply::text(plan),
            Reply::text(judgment),
            Reply::text(report),
        ])
    }

    pub fn always_failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            otherwise: Reply::Fail("service unavailable".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.otherwise.clone());

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(detail) => Err(LlmError::request(detail)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Returns one scripted batch per call; `None` makes that call fail.
/// Calls past the end of the script return no results.
pub struct ScriptedSearch {
    batches: Mutex<VecDeque<Option<Vec<SearchHit>>>>,
    queries: Mutex<Vec<(String, SearchOptions)>>,
}

impl ScriptedSearch {
    pub fn new(batches: Vec<Option<Vec<SearchHit>>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns `per_call` hits, tagged with the call number
    pub fn uniform(per_call: usize, calls: usize) -> Self {
        Self::new((1..=calls).map(|call| Some(hits(call, per_call))).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![None])
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(String, SearchOptions)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), *options));

        match self.batches.lock().unwrap().pop_front() {
            Some(Some(batch)) => Ok(batch),
            Some(None) => Err(SearchError::RateLimited),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// `count` hits for search call number `call`
pub fn hits(call: usize, count: usize) -> Vec<SearchHit> {
    (1..=count)
        .map(|i| {
            SearchHit::new(
                format!("https://source{}-{}.example", call, i),
                format!("finding {} from round {}", i, call),
            )
        })
        .collect()
}
