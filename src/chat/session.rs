//! Core chat client.
//!
//! This module provides the `ChatClient` struct which owns the session
//! identifier, the transcript, and the input state, and runs one
//! request/response exchange per submitted message.

use crate::client::ChatEndpoint;
use crate::error::Error;
use crate::observability::{CHAT_FALLBACKS, CHAT_SUBMISSIONS, CHAT_SUBMISSIONS_IGNORED};
use crate::render::View;
use crate::types::{ChatRequest, InputState, Message, SessionId, Transcript};

/// Bot text shown whenever an exchange fails, whatever the cause.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// A key delivered by the hosting front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The confirm key; submits the current input.
    Enter,

    /// Any other printable key.
    Char(char),

    /// Keys with no binding.
    Other,
}

/// A UI trigger delivered by the hosting front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// The explicit submit control was activated.
    Submit,

    /// A key was pressed in the input control.
    Key(Key),
}

impl UiEvent {
    /// Returns true if this event is bound to submission.
    pub fn submits(&self) -> bool {
        matches!(self, UiEvent::Submit | UiEvent::Key(Key::Enter))
    }
}

/// What became of one submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The input was blank; nothing was appended and no request was made.
    Ignored,

    /// The endpoint replied and the reply was appended.
    Replied,

    /// The exchange failed; the fallback reply was appended.
    Failed(Error),
}

impl SubmitOutcome {
    /// Returns true if a request was sent.
    pub fn was_sent(&self) -> bool {
        !matches!(self, SubmitOutcome::Ignored)
    }

    /// Returns the contained error, if the exchange failed.
    pub fn error(&self) -> Option<&Error> {
        match self {
            SubmitOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// A chat client bound to one endpoint and one view.
///
/// Construction generates the session identifier; it stays the same for every
/// request the client makes.  Submissions take `&mut self`, so at most one
/// request is ever in flight per client.
pub struct ChatClient<E: ChatEndpoint, V: View> {
    session_id: SessionId,
    endpoint: E,
    view: V,
    transcript: Transcript,
    input_state: InputState,
}

impl<E: ChatEndpoint, V: View> ChatClient<E, V> {
    /// Creates a new client with a freshly generated session identifier.
    pub fn new(endpoint: E, view: V) -> Self {
        Self::with_session_id(endpoint, view, SessionId::generate())
    }

    /// Creates a new client with the given session identifier.
    pub fn with_session_id(endpoint: E, view: V, session_id: SessionId) -> Self {
        Self {
            session_id,
            endpoint,
            view,
            transcript: Transcript::new(),
            input_state: InputState::Ready,
        }
    }

    /// Dispatches a UI trigger.
    ///
    /// The submit control and the confirm key submit `input`; every other event
    /// is ignored and returns `None`.
    pub async fn handle_event(&mut self, event: UiEvent, input: &str) -> Option<SubmitOutcome> {
        if event.submits() {
            Some(self.submit_message(input).await)
        } else {
            None
        }
    }

    /// Submits a message and waits for the reply.
    ///
    /// This method:
    /// 1. Ignores input that is blank after trimming
    /// 2. Appends and renders the user message
    /// 3. Clears and disables the input
    /// 4. Sends one request to the endpoint
    /// 5. Appends the reply, or the fallback reply on any failure
    /// 6. Re-enables and focuses the input
    ///
    /// Step 6 runs even if the returned future is dropped before completion.
    /// Errors are reported once through [`View::log_error`] and in the outcome;
    /// they are never returned as `Err`.
    pub async fn submit_message(&mut self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            CHAT_SUBMISSIONS_IGNORED.click();
            return SubmitOutcome::Ignored;
        }
        CHAT_SUBMISSIONS.click();

        render_message(&mut self.transcript, &mut self.view, Message::user(text));
        let mut lock = InputLock::acquire(&mut self.view, &mut self.input_state);

        let request = ChatRequest::new(self.session_id.clone(), text);
        tracing::debug!(session_id = %self.session_id, "sending chat request");

        match self.endpoint.chat(&request).await {
            Ok(reply) => {
                tracing::debug!(session_id = %self.session_id, "received chat reply");
                render_message(
                    &mut self.transcript,
                    lock.view(),
                    Message::bot(reply.response),
                );
                SubmitOutcome::Replied
            }
            Err(err) => {
                CHAT_FALLBACKS.click();
                let diagnostic =
                    format!("chat request failed (session {}): {err}", self.session_id);
                lock.view().log_error(&diagnostic);
                render_message(
                    &mut self.transcript,
                    lock.view(),
                    Message::bot(FALLBACK_REPLY),
                );
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// The identifier sent with every request.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Every message shown so far, in arrival order.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a reply is outstanding.
    pub fn input_state(&self) -> InputState {
        self.input_state
    }

    /// The endpoint requests go to.
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// The view messages are rendered into.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The view, for front-end output outside the transcript.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

/// Appends `message` to the transcript and draws it exactly once.
fn render_message<V: View>(transcript: &mut Transcript, view: &mut V, message: Message) {
    let message = transcript.push(message);
    view.append_message(message);
    view.scroll_to_latest();
}

/// Holds the input disabled for the duration of one exchange.
///
/// Dropping the lock restores the ready state, re-enables the input, and gives
/// it focus, on every exit path.
struct InputLock<'a, V: View> {
    view: &'a mut V,
    state: &'a mut InputState,
}

impl<'a, V: View> InputLock<'a, V> {
    fn acquire(view: &'a mut V, state: &'a mut InputState) -> Self {
        view.clear_input();
        *state = InputState::AwaitingReply;
        view.set_input_enabled(false);
        Self { view, state }
    }

    fn view(&mut self) -> &mut V {
        &mut *self.view
    }
}

impl<V: View> Drop for InputLock<'_, V> {
    fn drop(&mut self) {
        *self.state = InputState::Ready;
        self.view.set_input_enabled(true);
        self.view.focus_input();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::error::Result;
    use crate::render::TerminalView;
    use crate::types::{ChatResponse, Origin};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Append(Origin, String),
        Scroll,
        ClearInput,
        InputEnabled(bool),
        Focus,
        Diagnostic(String),
        Request(ChatRequest),
    }

    type Log = Arc<Mutex<Vec<Event>>>;

    struct RecordingView {
        log: Log,
    }

    impl View for RecordingView {
        fn append_message(&mut self, message: &Message) {
            self.log.lock().unwrap().push(Event::Append(
                message.origin(),
                message.text().to_string(),
            ));
        }

        fn scroll_to_latest(&mut self) {
            self.log.lock().unwrap().push(Event::Scroll);
        }

        fn clear_input(&mut self) {
            self.log.lock().unwrap().push(Event::ClearInput);
        }

        fn set_input_enabled(&mut self, enabled: bool) {
            self.log.lock().unwrap().push(Event::InputEnabled(enabled));
        }

        fn focus_input(&mut self) {
            self.log.lock().unwrap().push(Event::Focus);
        }

        fn log_error(&mut self, error: &str) {
            self.log
                .lock()
                .unwrap()
                .push(Event::Diagnostic(error.to_string()));
        }
    }

    struct ScriptedEndpoint {
        log: Log,
        replies: Mutex<VecDeque<Result<ChatResponse>>>,
    }

    #[async_trait::async_trait]
    impl ChatEndpoint for ScriptedEndpoint {
        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.log
                .lock()
                .unwrap()
                .push(Event::Request(request.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request")
        }
    }

    struct StalledEndpoint;

    #[async_trait::async_trait]
    impl ChatEndpoint for StalledEndpoint {
        async fn chat(&self, _: &ChatRequest) -> Result<ChatResponse> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ChatResponse::new("too late"))
        }
    }

    /// Collects formatted tracing output in memory.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn client(
        replies: Vec<Result<ChatResponse>>,
    ) -> (ChatClient<ScriptedEndpoint, RecordingView>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let endpoint = ScriptedEndpoint {
            log: log.clone(),
            replies: Mutex::new(replies.into()),
        };
        let view = RecordingView { log: log.clone() };
        (ChatClient::new(endpoint, view), log)
    }

    fn events(log: &Log) -> Vec<Event> {
        log.lock().unwrap().clone()
    }

    fn requests(log: &Log) -> Vec<ChatRequest> {
        events(log)
            .into_iter()
            .filter_map(|event| match event {
                Event::Request(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn user_message_rendered_before_request() {
        let (mut client, log) = client(vec![Ok(ChatResponse::new("hi!"))]);
        let outcome = client.submit_message("  hello  ").await;
        assert!(matches!(outcome, SubmitOutcome::Replied));

        let session_id = client.session_id().clone();
        assert_eq!(
            events(&log),
            vec![
                Event::Append(Origin::User, "hello".to_string()),
                Event::Scroll,
                Event::ClearInput,
                Event::InputEnabled(false),
                Event::Request(ChatRequest::new(session_id, "hello")),
                Event::Append(Origin::Bot, "hi!".to_string()),
                Event::Scroll,
                Event::InputEnabled(true),
                Event::Focus,
            ]
        );
        assert_eq!(client.input_state(), InputState::Ready);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (mut client, log) = client(vec![]);
        for text in ["", "   ", "\t\n "] {
            let outcome = client.submit_message(text).await;
            assert!(matches!(outcome, SubmitOutcome::Ignored));
            assert!(!outcome.was_sent());
        }
        assert!(client.transcript().is_empty());
        assert!(events(&log).is_empty());
    }

    #[tokio::test]
    async fn reply_keeps_line_breaks() {
        let (mut client, _) = client(vec![Ok(ChatResponse::new("Hello\nWorld"))]);
        client.submit_message("greet me").await;
        let reply = client.transcript().last().unwrap();
        assert_eq!(reply.origin(), Origin::Bot);
        assert_eq!(reply.lines().collect::<Vec<_>>(), vec!["Hello", "World"]);
    }

    #[tokio::test]
    async fn transport_failure_shows_fallback() {
        let (mut client, log) = client(vec![Err(Error::connection("refused", None))]);
        let outcome = client.submit_message("hello").await;
        assert!(outcome.error().is_some_and(Error::is_transport));

        let reply = client.transcript().last().unwrap();
        assert_eq!(reply.origin(), Origin::Bot);
        assert_eq!(reply.text(), FALLBACK_REPLY);
        assert!(
            events(&log)
                .iter()
                .any(|event| matches!(event, Event::Diagnostic(msg) if msg.contains("refused")))
        );
        assert_eq!(client.input_state(), InputState::Ready);
    }

    #[tokio::test]
    async fn missing_response_field_shows_fallback() {
        let err = serde_json::from_str::<ChatResponse>(r#"{"detail": "nope"}"#).unwrap_err();
        let (mut client, log) = client(vec![Err(err.into())]);
        let outcome = client.submit_message("hello").await;
        assert!(outcome.error().is_some_and(Error::is_response));
        assert_eq!(client.transcript().last().unwrap().text(), FALLBACK_REPLY);

        let tail: Vec<Event> = events(&log).into_iter().rev().take(2).collect();
        assert_eq!(tail, vec![Event::Focus, Event::InputEnabled(true)]);
    }

    #[tokio::test]
    async fn two_exchanges_alternate_origins() {
        let (mut client, log) = client(vec![
            Ok(ChatResponse::new("first")),
            Ok(ChatResponse::new("second")),
        ]);
        client.submit_message("one").await;
        client.submit_message("two").await;

        assert_eq!(
            client.transcript().origins(),
            vec![Origin::User, Origin::Bot, Origin::User, Origin::Bot]
        );
        let texts: Vec<&str> = client.transcript().iter().map(Message::text).collect();
        assert_eq!(texts, vec!["one", "first", "two", "second"]);

        let requests = requests(&log);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].session_id, requests[1].session_id);
        assert_eq!(&requests[0].session_id, client.session_id());
    }

    #[tokio::test]
    async fn failure_then_success_recovers() {
        let (mut client, _) = client(vec![
            Err(Error::api(500, "boom")),
            Ok(ChatResponse::new("ok now")),
        ]);
        client.submit_message("one").await;
        let outcome = client.submit_message("two").await;
        assert!(matches!(outcome, SubmitOutcome::Replied));
        assert_eq!(client.transcript().len(), 4);
        assert_eq!(client.transcript()[1].text(), FALLBACK_REPLY);
        assert_eq!(client.transcript()[3].text(), "ok now");
    }

    #[tokio::test]
    async fn events_bind_submit_and_enter_only() {
        let (mut client, log) = client(vec![
            Ok(ChatResponse::new("a")),
            Ok(ChatResponse::new("b")),
        ]);
        assert!(
            client
                .handle_event(UiEvent::Key(Key::Char('x')), "hello")
                .await
                .is_none()
        );
        assert!(
            client
                .handle_event(UiEvent::Key(Key::Other), "hello")
                .await
                .is_none()
        );
        assert!(requests(&log).is_empty());

        let outcome = client.handle_event(UiEvent::Submit, "hello").await;
        assert!(matches!(outcome, Some(SubmitOutcome::Replied)));
        let outcome = client.handle_event(UiEvent::Key(Key::Enter), "again").await;
        assert!(matches!(outcome, Some(SubmitOutcome::Replied)));
        assert_eq!(requests(&log).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submission_reenables_input() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let view = RecordingView { log: log.clone() };
        let mut client = ChatClient::new(StalledEndpoint, view);

        let result =
            tokio::time::timeout(Duration::from_secs(1), client.submit_message("hello")).await;
        assert!(result.is_err());

        assert_eq!(client.input_state(), InputState::Ready);
        assert_eq!(client.transcript().len(), 1);
        let tail: Vec<Event> = events(&log).into_iter().rev().take(2).collect();
        assert_eq!(tail, vec![Event::Focus, Event::InputEnabled(true)]);
    }

    #[tokio::test]
    async fn terminal_failure_logs_one_diagnostic_line() {
        let captured = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let endpoint = ScriptedEndpoint {
            log,
            replies: Mutex::new(vec![Err(Error::connection("refused", None))].into()),
        };
        let view = TerminalView::with_writer(Vec::new(), false);
        let mut client = ChatClient::new(endpoint, view);
        let outcome = client.submit_message("hello").await;
        assert!(outcome.error().is_some_and(Error::is_connection));

        let diagnostics = captured.text();
        assert_eq!(diagnostics.lines().count(), 1, "{diagnostics}");
        assert!(diagnostics.contains("chat request failed"));
        assert!(diagnostics.contains(client.session_id().as_str()));

        let shown = String::from_utf8(client.view().writer().clone()).unwrap();
        assert!(!shown.contains("chat request failed"));
        assert!(shown.ends_with(&format!("Bot:\n    {FALLBACK_REPLY}\n")));
    }
}
