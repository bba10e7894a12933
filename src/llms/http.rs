//! Interaction-node service client.
//!
//! `POST {base}/interaction-nodes/start` opens a conversation,
//! `POST {base}/interaction-nodes/{parent}/branch` continues from a settled node.
//! Both take the same body and return `{node_id, llm_response}`.

use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use bf_core::{ChatMessage, GenerationReply, GenerationRequest, RequestTarget};
use log::{debug, info};

use super::{GenerationClient, GenerationError};
use crate::config::Settings;

#[derive(Debug, Serialize)]
struct NodeRequest<'a> {
    user_prompt: &'a str,
    summary_title: Option<&'a str>,
    #[serde(skip_serializing_if = "no_context")]
    context_messages: &'a [ChatMessage],
}

fn no_context(messages: &&[ChatMessage]) -> bool {
    messages.is_empty()
}

#[derive(Debug, Deserialize)]
struct NodeResponse {
    node_id: String,
    llm_response: String,
}

pub struct HttpGenerationClient {
    client: Client,
    base_url: Url,
    user_header: String,
}

impl HttpGenerationClient {
    pub fn new(settings: &Settings) -> Result<Self, GenerationError> {
        let base_url = Url::parse(&settings.api_url)
            .map_err(|e| GenerationError::Config(format!("{}: {}", settings.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GenerationError::Config(format!("{} cannot be a base", settings.api_url)));
        }
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, base_url, user_header: settings.user_header.clone() })
    }

    /// Remote ids are pushed as single path segments, so `/`, `?` and `#` are escaped.
    fn endpoint(&self, target: &RequestTarget) -> Result<Url, GenerationError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GenerationError::Config(format!("{} cannot be a base", self.base_url)))?;
            segments.pop_if_empty().push("interaction-nodes");
            match target {
                RequestTarget::Start => {
                    segments.push("start");
                }
                RequestTarget::Branch { parent_remote_id } => {
                    segments.push(parent_remote_id).push("branch");
                }
            }
        }
        Ok(url)
    }
}

fn request_body(request: &GenerationRequest) -> NodeRequest<'_> {
    NodeRequest {
        user_prompt: &request.user_prompt,
        summary_title: request.summary_title.as_deref(),
        context_messages: &request.context_messages,
    }
}

/// Decode a 2xx body. A reply without a node id cannot be branched from, so it counts
/// as malformed.
fn parse_reply(body: &str) -> Result<GenerationReply, GenerationError> {
    let parsed: NodeResponse = serde_json::from_str(body)?;
    if parsed.node_id.trim().is_empty() {
        return Err(GenerationError::Parse("empty node_id".to_string()));
    }
    Ok(GenerationReply { remote_id: parsed.node_id, response_text: parsed.llm_response })
}

impl GenerationClient for HttpGenerationClient {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, GenerationError> {
        let url = self.endpoint(&request.target)?;
        debug!("POST {} ({} context message(s))", url, request.context_messages.len());

        let response = self
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .header(self.user_header.as_str(), request.user_id.as_str())
            .json(&request_body(request))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(GenerationError::Api { status: status.as_u16(), body });
        }

        let reply = parse_reply(&body)?;
        info!("{} answered with node {}", url, reply.remote_id);
        Ok(reply)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
