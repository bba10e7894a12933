//! Offline generator used with `--offline`.
//!
//! Answers every prompt locally so the graph can be explored without a running service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use bf_core::{GenerationReply, GenerationRequest, RequestTarget};

use super::{GenerationClient, GenerationError};

pub struct EchoGenerationClient {
    counter: AtomicU64,
    delay: Duration,
}

impl EchoGenerationClient {
    pub fn new(delay: Duration) -> Self {
        Self { counter: AtomicU64::new(0), delay }
    }
}

impl GenerationClient for EchoGenerationClient {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, GenerationError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let origin = match &request.target {
            RequestTarget::Start => "new conversation".to_string(),
            RequestTarget::Branch { parent_remote_id } => format!("branch of {}", parent_remote_id),
        };
        Ok(GenerationReply {
            remote_id: format!("local-{}", n),
            response_text: format!(
                "[{}, {} earlier message(s)] You said: {}",
                origin,
                request.context_messages.len(),
                request.user_prompt
            ),
        })
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use bf_core::ChatMessage;

    use super::*;

    fn request(target: RequestTarget, context: usize) -> GenerationRequest {
        GenerationRequest {
            user_id: "u".into(),
            target,
            user_prompt: "ping".into(),
            summary_title: None,
            context_messages: vec![ChatMessage::user("x"); context],
        }
    }

    #[test]
    fn remote_ids_are_unique() {
        let client = EchoGenerationClient::new(Duration::ZERO);
        let a = client.generate(&request(RequestTarget::Start, 0)).unwrap();
        let b = client.generate(&request(RequestTarget::Start, 0)).unwrap();
        assert_eq!(a.remote_id, "local-0");
        assert_eq!(b.remote_id, "local-1");
    }

    #[test]
    fn reply_mentions_branch_origin_and_context() {
        let client = EchoGenerationClient::new(Duration::ZERO);
        let reply = client
            .generate(&request(RequestTarget::Branch { parent_remote_id: "local-7".into() }, 2))
            .unwrap();
        assert_eq!(reply.response_text, "[branch of local-7, 2 earlier message(s)] You said: ping");
    }
}
