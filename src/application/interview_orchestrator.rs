//! InterviewOrchestrator - creates templates, streams questions, records messages.
//!
//! Streaming and persistence are separate operations: a generated question
//! is only stored when the caller explicitly calls [`InterviewOrchestrator::save_message`].

use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::foundation::{TemplateId, UserId};
use crate::domain::interview::{InterviewError, InterviewMessage, InterviewTemplate, SenderType};
use crate::ports::{GenerationClient, GenerationRequest, MessageStore, TemplateStore};

/// Fragments of a generated question, as delivered to the caller.
///
/// Lazy, finite and single-use. A failed item is always the last one.
pub type QuestionStream = Pin<Box<dyn Stream<Item = Result<String, InterviewError>> + Send>>;

/// System instructions handed to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewPrompts {
    /// Instruction for the opening question of a template.
    pub interview_system_message: String,
    /// Instruction for a follow-up to a question/answer pair.
    pub follow_system_message: String,
}

impl InterviewPrompts {
    pub fn new(
        interview_system_message: impl Into<String>,
        follow_system_message: impl Into<String>,
    ) -> Self {
        Self {
            interview_system_message: interview_system_message.into(),
            follow_system_message: follow_system_message.into(),
        }
    }
}

/// Coordinates the template store, the message store and the generation client.
///
/// Holds no per-session state; every call is independent and the orchestrator
/// can be shared freely behind an `Arc`.
pub struct InterviewOrchestrator {
    template_store: Arc<dyn TemplateStore>,
    message_store: Arc<dyn MessageStore>,
    generation: Arc<dyn GenerationClient>,
    prompts: InterviewPrompts,
}

impl InterviewOrchestrator {
    pub fn new(
        template_store: Arc<dyn TemplateStore>,
        message_store: Arc<dyn MessageStore>,
        generation: Arc<dyn GenerationClient>,
        prompts: InterviewPrompts,
    ) -> Self {
        Self {
            template_store,
            message_store,
            generation,
            prompts,
        }
    }

    /// Create and persist a new template.
    ///
    /// # Errors
    ///
    /// - `Validation` if `user_id` or `theme` is blank (no store call is made)
    /// - `Store` if persistence fails
    pub async fn create_template(
        &self,
        user_id: &str,
        theme: &str,
    ) -> Result<InterviewTemplate, InterviewError> {
        let user_id = UserId::new(user_id)?;
        let template = InterviewTemplate::new(user_id, theme)?;
        debug!(template_id = %template.id(), user_id = %template.user_id(), "creating interview template");

        let stored = self.template_store.save(&template).await.map_err(|e| {
            warn!(template_id = %template.id(), error = %e, "failed to save interview template");
            InterviewError::from(e)
        })?;

        Ok(stored)
    }

    /// Stream the opening question for a template.
    ///
    /// The template is resolved before any stream exists, so a missing
    /// template fails here and the backend is never contacted.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the template does not exist
    /// - `Store` if the lookup fails
    pub async fn get_interview_question(
        &self,
        template_id: &TemplateId,
    ) -> Result<QuestionStream, InterviewError> {
        let template = self
            .template_store
            .find_by_id(template_id)
            .await
            .map_err(|e| {
                warn!(template_id = %template_id, error = %e, "failed to load interview template");
                InterviewError::from(e)
            })?
            .ok_or_else(|| InterviewError::not_found(*template_id))?;

        debug!(template_id = %template_id, theme = %template.theme(), "streaming interview question");

        let request = GenerationRequest::new(
            self.prompts.interview_system_message.clone(),
            template.theme(),
        );
        Ok(self.stream(request))
    }

    /// Stream a follow-up to a previous question and answer.
    ///
    /// Touches no store. The context handed to the backend is exactly
    /// `[previous_question, previous_answer]`, with `theme` as the subject.
    pub fn get_follow_question(
        &self,
        theme: &str,
        previous_question: &str,
        previous_answer: &str,
    ) -> QuestionStream {
        debug!(theme = %theme, "streaming follow-up question");

        let request = GenerationRequest::with_sequence(
            self.prompts.follow_system_message.clone(),
            [previous_question, previous_answer],
        )
        .with_subject(theme);
        self.stream(request)
    }

    /// Record one message for a template.
    ///
    /// Does not verify that the template exists. Completes with no payload.
    ///
    /// # Errors
    ///
    /// - `Store` if persistence fails
    pub async fn save_message(
        &self,
        template_id: TemplateId,
        sender: SenderType,
        content: impl Into<String>,
    ) -> Result<(), InterviewError> {
        let message = InterviewMessage::new(template_id, sender, content);
        debug!(template_id = %template_id, sender = %sender, "saving interview message");

        self.message_store.save(&message).await.map_err(|e| {
            warn!(template_id = %template_id, error = %e, "failed to save interview message");
            InterviewError::from(e)
        })
    }

    /// All templates owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// - `Validation` if `user_id` is blank
    /// - `Store` if the lookup fails
    pub async fn list_templates(
        &self,
        user_id: &str,
    ) -> Result<Vec<InterviewTemplate>, InterviewError> {
        let user_id = UserId::new(user_id)?;
        Ok(self.template_store.find_by_user(&user_id).await?)
    }

    /// All messages recorded for a template, in recording order.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the template does not exist
    /// - `Store` if a lookup fails
    pub async fn list_messages(
        &self,
        template_id: &TemplateId,
    ) -> Result<Vec<InterviewMessage>, InterviewError> {
        if self.template_store.find_by_id(template_id).await?.is_none() {
            return Err(InterviewError::not_found(*template_id));
        }
        Ok(self.message_store.find_by_template(template_id).await?)
    }

    fn stream(&self, request: GenerationRequest) -> QuestionStream {
        Box::pin(
            self.generation
                .generate(request)
                .map(|fragment| fragment.map_err(InterviewError::from)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::foundation::ValidationError;
    use crate::ports::{GenerationContext, GenerationError, StoreError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockTemplateStore {
        saved: Mutex<Vec<InterviewTemplate>>,
        lookups: Mutex<usize>,
        fail: bool,
    }

    impl MockTemplateStore {
        fn new() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
                lookups: Mutex::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn saved(&self) -> Vec<InterviewTemplate> {
            self.saved.lock().unwrap().clone()
        }

        fn lookups(&self) -> usize {
            *self.lookups.lock().unwrap()
        }
    }

    #[async_trait]
    impl TemplateStore for MockTemplateStore {
        async fn save(
            &self,
            template: &InterviewTemplate,
        ) -> Result<InterviewTemplate, StoreError> {
            if self.fail {
                return Err(StoreError::database("Simulated save failure"));
            }
            self.saved.lock().unwrap().push(template.clone());
            Ok(template.clone())
        }

        async fn find_by_id(
            &self,
            id: &TemplateId,
        ) -> Result<Option<InterviewTemplate>, StoreError> {
            *self.lookups.lock().unwrap() += 1;
            if self.fail {
                return Err(StoreError::unavailable("Simulated lookup failure"));
            }
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id() == id)
                .cloned())
        }

        async fn find_by_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<InterviewTemplate>, StoreError> {
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.user_id() == user_id)
                .cloned()
                .collect())
        }
    }

    struct MockMessageStore {
        saved: Mutex<Vec<InterviewMessage>>,
        fail: bool,
    }

    impl MockMessageStore {
        fn new() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn saved(&self) -> Vec<InterviewMessage> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageStore for MockMessageStore {
        async fn save(&self, message: &InterviewMessage) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::database("Simulated save failure"));
            }
            self.saved.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn find_by_template(
            &self,
            template_id: &TemplateId,
        ) -> Result<Vec<InterviewMessage>, StoreError> {
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.template_id() == template_id)
                .cloned()
                .collect())
        }
    }

    struct Fixture {
        templates: Arc<MockTemplateStore>,
        messages: Arc<MockMessageStore>,
        generation: MockAIProvider,
        orchestrator: InterviewOrchestrator,
    }

    fn prompts() -> InterviewPrompts {
        InterviewPrompts::new("Ask one interview question.", "Ask one follow-up question.")
    }

    fn fixture_with(
        templates: MockTemplateStore,
        messages: MockMessageStore,
        generation: MockAIProvider,
    ) -> Fixture {
        let templates = Arc::new(templates);
        let messages = Arc::new(messages);
        let orchestrator = InterviewOrchestrator::new(
            templates.clone(),
            messages.clone(),
            Arc::new(generation.clone()),
            prompts(),
        );
        Fixture {
            templates,
            messages,
            generation,
            orchestrator,
        }
    }

    fn fixture(generation: MockAIProvider) -> Fixture {
        fixture_with(MockTemplateStore::new(), MockMessageStore::new(), generation)
    }

    async fn collect(stream: QuestionStream) -> Vec<Result<String, InterviewError>> {
        stream.collect().await
    }

    // ───────────────────────────────────────────────────────────────
    // create_template
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_template_returns_inputs_verbatim() {
        let f = fixture(MockAIProvider::new());

        let template = f
            .orchestrator
            .create_template("u1", "Backend Engineer")
            .await
            .unwrap();

        assert_eq!(template.user_id().as_str(), "u1");
        assert_eq!(template.theme(), "Backend Engineer");
        assert_eq!(f.templates.saved(), vec![template]);
    }

    #[tokio::test]
    async fn create_template_assigns_unique_ids() {
        let f = fixture(MockAIProvider::new());

        let a = f.orchestrator.create_template("u1", "Rust").await.unwrap();
        let b = f.orchestrator.create_template("u1", "Rust").await.unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn create_template_rejects_blank_theme_before_io() {
        let f = fixture(MockAIProvider::new());

        let result = f.orchestrator.create_template("u1", "   ").await;

        assert_eq!(
            result,
            Err(InterviewError::Validation(ValidationError::empty_field("theme")))
        );
        assert!(f.templates.saved().is_empty());
    }

    #[tokio::test]
    async fn create_template_rejects_blank_user() {
        let f = fixture(MockAIProvider::new());

        let result = f.orchestrator.create_template("", "Rust").await;

        assert!(matches!(result, Err(InterviewError::Validation(_))));
        assert!(f.templates.saved().is_empty());
    }

    #[tokio::test]
    async fn create_template_propagates_store_failure() {
        let f = fixture_with(
            MockTemplateStore::failing(),
            MockMessageStore::new(),
            MockAIProvider::new(),
        );

        let result = f.orchestrator.create_template("u1", "Rust").await;

        assert!(matches!(result, Err(InterviewError::Store(_))));
    }

    // ───────────────────────────────────────────────────────────────
    // get_interview_question
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn question_for_missing_template_is_not_found_without_generation() {
        let f = fixture(MockAIProvider::new());
        let missing = TemplateId::new();

        let result = f.orchestrator.get_interview_question(&missing).await;

        assert!(matches!(result, Err(InterviewError::NotFound(id)) if id == missing));
        assert_eq!(f.generation.call_count(), 0);
    }

    #[tokio::test]
    async fn question_lookup_failure_is_a_store_error() {
        let f = fixture_with(
            MockTemplateStore::failing(),
            MockMessageStore::new(),
            MockAIProvider::new(),
        );

        let result = f.orchestrator.get_interview_question(&TemplateId::new()).await;

        assert!(matches!(result, Err(InterviewError::Store(_))));
        assert_eq!(f.generation.call_count(), 0);
    }

    #[tokio::test]
    async fn question_streams_fragments_unmodified() {
        let f = fixture(MockAIProvider::new().with_fragments(["Tell", "me about yourself"]));
        let template = f.orchestrator.create_template("u1", "Backend Engineer").await.unwrap();

        let stream = f.orchestrator.get_interview_question(template.id()).await.unwrap();

        assert_eq!(
            collect(stream).await,
            vec![Ok("Tell".to_string()), Ok("me about yourself".to_string())]
        );
    }

    #[tokio::test]
    async fn question_uses_interview_instruction_and_theme() {
        let f = fixture(MockAIProvider::new().with_fragments(["q"]));
        let template = f.orchestrator.create_template("u1", "Backend Engineer").await.unwrap();

        let _ = collect(f.orchestrator.get_interview_question(template.id()).await.unwrap()).await;

        let calls = f.generation.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_instruction, "Ask one interview question.");
        assert_eq!(
            calls[0].context,
            GenerationContext::Text("Backend Engineer".to_string())
        );
    }

    #[tokio::test]
    async fn question_stream_is_lazy() {
        let f = fixture(MockAIProvider::new().with_fragments(["q"]));
        let template = f.orchestrator.create_template("u1", "Rust").await.unwrap();

        let stream = f.orchestrator.get_interview_question(template.id()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(f.generation.started_count(), 0);

        let _ = collect(stream).await;
        assert_eq!(f.generation.started_count(), 1);
    }

    #[tokio::test]
    async fn each_invocation_issues_a_new_generation() {
        let f = fixture(MockAIProvider::new().with_fragments(["first"]).with_fragments(["second"]));
        let template = f.orchestrator.create_template("u1", "Rust").await.unwrap();

        let a = collect(f.orchestrator.get_interview_question(template.id()).await.unwrap()).await;
        let b = collect(f.orchestrator.get_interview_question(template.id()).await.unwrap()).await;

        assert_eq!(a, vec![Ok("first".to_string())]);
        assert_eq!(b, vec![Ok("second".to_string())]);
        assert_eq!(f.generation.call_count(), 2);
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_delivered_fragments() {
        let f = fixture(
            MockAIProvider::new()
                .with_mid_stream_error(["What", "is"], GenerationError::network("reset")),
        );
        let template = f.orchestrator.create_template("u1", "Rust").await.unwrap();

        let items = collect(f.orchestrator.get_interview_question(template.id()).await.unwrap()).await;

        assert_eq!(
            items,
            vec![
                Ok("What".to_string()),
                Ok("is".to_string()),
                Err(InterviewError::Generation(GenerationError::network("reset"))),
            ]
        );
        assert!(f.messages.saved().is_empty());
    }

    #[tokio::test]
    async fn generation_start_failure_is_a_single_error_item() {
        let f = fixture(MockAIProvider::new().with_start_error(GenerationError::AuthenticationFailed));
        let template = f.orchestrator.create_template("u1", "Rust").await.unwrap();

        let items = collect(f.orchestrator.get_interview_question(template.id()).await.unwrap()).await;

        assert_eq!(
            items,
            vec![Err(InterviewError::Generation(GenerationError::AuthenticationFailed))]
        );
    }

    #[tokio::test]
    async fn cancelling_a_question_stops_production_and_saves_nothing() {
        let fragments: Vec<String> = (0..50).map(|i| format!("f{}", i)).collect();
        let f = fixture(
            MockAIProvider::new()
                .with_fragments(fragments)
                .with_delay(Duration::from_millis(1))
                .with_buffer(1),
        );
        let template = f.orchestrator.create_template("u1", "Rust").await.unwrap();

        let mut stream = f.orchestrator.get_interview_question(template.id()).await.unwrap();
        for _ in 0..3 {
            assert!(stream.next().await.unwrap().is_ok());
        }
        drop(stream);
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(f.messages.saved().is_empty());
        assert_eq!(f.generation.live_streams(), 0);
        assert_eq!(f.generation.completed_count(), 0);
        assert!(f.generation.emitted_count() < 50);
    }

    // ───────────────────────────────────────────────────────────────
    // get_follow_question
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn follow_up_passes_question_then_answer_with_theme() {
        let f = fixture(MockAIProvider::new().with_fragments(["Why", "?"]));

        let items = collect(f.orchestrator.get_follow_question(
            "Backend Engineer",
            "What is a B-tree?",
            "A balanced search tree",
        ))
        .await;

        assert_eq!(items, vec![Ok("Why".to_string()), Ok("?".to_string())]);

        let calls = f.generation.get_calls();
        assert_eq!(calls[0].system_instruction, "Ask one follow-up question.");
        assert_eq!(
            calls[0].context.entries(),
            vec!["What is a B-tree?", "A balanced search tree"]
        );
        assert_eq!(calls[0].subject.as_deref(), Some("Backend Engineer"));
    }

    #[tokio::test]
    async fn follow_up_touches_no_store() {
        let f = fixture(MockAIProvider::new());

        let _ = collect(f.orchestrator.get_follow_question("Rust", "q", "a")).await;

        assert_eq!(f.templates.lookups(), 0);
        assert!(f.templates.saved().is_empty());
        assert!(f.messages.saved().is_empty());
    }

    #[tokio::test]
    async fn follow_up_accepts_empty_answer() {
        let f = fixture(MockAIProvider::new());

        let _ = collect(f.orchestrator.get_follow_question("Rust", "q", "")).await;

        assert_eq!(f.generation.get_calls()[0].context.entries(), vec!["q", ""]);
    }

    // ───────────────────────────────────────────────────────────────
    // save_message / listing
    // ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn save_message_persists_exact_content() {
        let f = fixture(MockAIProvider::new());
        let template_id = TemplateId::new();

        let () = f
            .orchestrator
            .save_message(template_id, SenderType::Assistant, "What is a B-tree?")
            .await
            .unwrap();

        let saved = f.messages.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].template_id(), &template_id);
        assert_eq!(saved[0].sender(), SenderType::Assistant);
        assert_eq!(saved[0].content(), "What is a B-tree?");
    }

    #[tokio::test]
    async fn save_message_propagates_store_failure() {
        let f = fixture_with(
            MockTemplateStore::new(),
            MockMessageStore::failing(),
            MockAIProvider::new(),
        );

        let result = f
            .orchestrator
            .save_message(TemplateId::new(), SenderType::User, "answer")
            .await;

        assert!(matches!(result, Err(InterviewError::Store(_))));
    }

    #[tokio::test]
    async fn list_messages_requires_existing_template() {
        let f = fixture(MockAIProvider::new());

        let result = f.orchestrator.list_messages(&TemplateId::new()).await;

        assert!(matches!(result, Err(InterviewError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_templates_and_messages() {
        let f = fixture(MockAIProvider::new());
        let template = f.orchestrator.create_template("u1", "Rust").await.unwrap();
        f.orchestrator
            .save_message(*template.id(), SenderType::Assistant, "q")
            .await
            .unwrap();
        f.orchestrator
            .save_message(*template.id(), SenderType::User, "a")
            .await
            .unwrap();

        let templates = f.orchestrator.list_templates("u1").await.unwrap();
        let messages = f.orchestrator.list_messages(template.id()).await.unwrap();

        assert_eq!(templates, vec![template]);
        assert_eq!(
            messages.iter().map(|m| m.content()).collect::<Vec<_>>(),
            vec!["q", "a"]
        );
    }
}
