//! Shared fakes for agent-crate tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use millwright_core::http::{HttpClient, HttpError, HttpRequest, HttpResponse, HttpResult};

/// Fake transport: replays scripted responses and records requests
pub(crate) struct ScriptedHttp {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResult<HttpResponse>>>,
}

impl ScriptedHttp {
    pub(crate) fn new(responses: Vec<HttpResult<HttpResponse>>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(HttpError::RequestFailed {
                    reason: "no scripted response".to_string(),
                })
            })
    }
}

/// A completion answering with plain assistant text
pub(crate) fn text_completion(text: &str) -> HttpResult<HttpResponse> {
    Ok(HttpResponse::new(
        200,
        json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        })
        .to_string(),
    ))
}

/// A completion answering with one tool call
pub(crate) fn tool_call_completion(
    id: &str,
    name: &str,
    arguments: &str,
) -> HttpResult<HttpResponse> {
    Ok(HttpResponse::new(
        200,
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": id,
                        "type": "function",
                        "function": {"name": name, "arguments": arguments}
                    }]
                }
            }]
        })
        .to_string(),
    ))
}
