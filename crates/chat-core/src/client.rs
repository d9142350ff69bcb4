//! Chat protocol client. Drives one send through `/api/chat`.
//!
//! A send is:
//! 1. Reject if messaging is paused (no network call)
//! 2. Resolve the target session, creating one if there is none
//! 3. Append the user message as `Pending` (optimistic)
//! 4. Post it; a provisional session is posted without an id
//! 5. Reconcile the reply: demo ceiling, session rotation (one resend at
//!    most), or a normal answer
//! 6. Settle the user message to `Confirmed` or `Failed`
//!
//! Errors never roll back the optimistic message; they leave it `Failed`
//! and set the store's error banner.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chat_types::{
    ChatError, Result,
    api::{ChatApiRequest, ChatApiResponse, ChatReply, DemoQuota},
    config::ClientConfig,
    event::ChatEvent,
    message::{ChatMessage, DeliveryStatus},
};
use crate::event_bus::EventBus;
use crate::ports::ChatApiPort;
use crate::session_store::SessionStore;

/// How a send ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The model answered; `session_id` is the effective (possibly rotated) id
    Answered { session_id: String, reply: ChatMessage },
    /// Demo ceiling hit; the advisory was appended as a model message
    AuthRequired { session_id: String, advisory: String },
    /// Messaging is disabled; nothing was sent
    Paused,
}

pub struct ChatClient {
    api: Rc<dyn ChatApiPort>,
    store: Rc<RefCell<SessionStore>>,
    event_bus: EventBus,
    paused: Cell<bool>,
    demo: Cell<Option<DemoQuota>>,
    in_flight: Cell<u32>,
}

impl ChatClient {
    pub fn new(
        api: Rc<dyn ChatApiPort>,
        store: Rc<RefCell<SessionStore>>,
        event_bus: EventBus,
        config: &ClientConfig,
    ) -> Self {
        Self {
            api,
            store,
            event_bus,
            paused: Cell::new(config.messaging_paused),
            demo: Cell::new(None),
            in_flight: Cell::new(0),
        }
    }

    pub fn store(&self) -> Rc<RefCell<SessionStore>> {
        self.store.clone()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    /// Last demo counters the server reported. Display only.
    pub fn demo_status(&self) -> Option<DemoQuota> {
        self.demo.get()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.get() > 0
    }

    /// Send `content` to `session_id`, or to the current session when `None`.
    ///
    /// Must be spawned via `wasm_bindgen_futures::spawn_local` in the browser.
    /// Overlapping sends are allowed; each settles its own session.
    pub async fn send_message(&self, session_id: Option<&str>, content: &str) -> Result<SendOutcome> {
        if self.paused.get() {
            log::info!("Messaging paused, send rejected");
            self.event_bus.emit(ChatEvent::Paused);
            return Ok(SendOutcome::Paused);
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::Validation("Message is required".to_string()));
        }

        let (mut effective_id, committed) = self.resolve_session(session_id);
        let user_message = ChatMessage::user(content);
        let user_message_id = user_message.id.clone();
        self.store
            .borrow_mut()
            .append_message(&effective_id, user_message);

        self.begin(&effective_id);
        let result = self.exchange(&mut effective_id, committed, content).await;
        // Another send may have rotated the session while this one waited.
        effective_id = self.store.borrow().resolve_id(&effective_id);

        let status = if result.is_ok() {
            DeliveryStatus::Confirmed
        } else {
            DeliveryStatus::Failed
        };
        self.store
            .borrow_mut()
            .mark_message(&effective_id, &user_message_id, status);

        if let Err(ref e) = result {
            log::error!("Send to session {} failed: {}", effective_id, e);
            self.store.borrow_mut().set_error(Some(e.to_string()));
            self.event_bus.emit(ChatEvent::Error {
                message: e.to_string(),
            });
        }

        self.end(&effective_id);
        result
    }

    /// Target session id, and whether the server already knows it.
    fn resolve_session(&self, requested: Option<&str>) -> (String, bool) {
        let mut store = self.store.borrow_mut();
        let current = store.current_session_id().map(str::to_string);
        let id = match requested.map(str::to_string).or(current) {
            Some(id) => id,
            None => {
                log::debug!("No current session, creating one");
                store.create_session().id
            }
        };
        // An id the store does not hold came from elsewhere; send it as-is.
        let committed = store.session(&id).map_or(true, |s| s.is_committed());
        (id, committed)
    }

    async fn exchange(&self, session_id: &mut String, committed: bool, content: &str) -> Result<SendOutcome> {
        let mut request = ChatApiRequest::new(committed.then(|| session_id.clone()), content);
        let mut rotated = false;

        loop {
            log::debug!("POST {} (session {:?})", self.api.endpoint(), request.session_id);
            let response = self.api.send(&request).await?;
            self.observe_quota(&response);

            match response.classify()? {
                ChatReply::AuthRequired { advisory, .. } => {
                    return Ok(self.require_auth(session_id.as_str(), advisory));
                }
                ChatReply::Answer { text, .. } => {
                    return Ok(self.answer(session_id.as_str(), text));
                }
                ChatReply::SessionCreated { session_id: minted, .. } => {
                    if rotated {
                        return Err(ChatError::Protocol(
                            "server rotated the session again on retry".to_string(),
                        ));
                    }
                    if request.session_id.as_deref() == Some(minted.as_str()) {
                        self.store.borrow_mut().commit_session(session_id.as_str());
                        return Err(ChatError::Protocol(
                            "server confirmed the session without answering".to_string(),
                        ));
                    }
                    self.rotate(session_id, &minted);
                    rotated = true;
                    request = ChatApiRequest::new(Some(session_id.clone()), content);
                }
            }
        }
    }

    /// Move the local session onto the server's id; `session_id` becomes the
    /// id to resend with.
    ///
    /// An overlapping send may have rotated this session already; the
    /// resend then follows that id and the newly minted one is dropped.
    fn rotate(&self, session_id: &mut String, minted: &str) {
        let rotated = self.store.borrow_mut().rotate_session_id(session_id.as_str(), minted);
        if rotated {
            log::info!("Session {} rotated to {}", session_id, minted);
            self.event_bus.emit(ChatEvent::SessionRotated {
                from: session_id.clone(),
                to: minted.to_string(),
            });
            *session_id = minted.to_string();
            return;
        }

        let followed = self.store.borrow().resolve_id(session_id.as_str());
        if followed != *session_id {
            log::info!(
                "Session {} was already rotated to {}, dropping {}",
                session_id, followed, minted
            );
            *session_id = followed;
            return;
        }

        log::warn!("Could not rotate session {}, continuing as {}", session_id, minted);
        *session_id = minted.to_string();
    }

    fn answer(&self, session_id: &str, text: String) -> SendOutcome {
        let reply = ChatMessage::model(text);
        {
            let mut store = self.store.borrow_mut();
            store.commit_session(session_id);
            store.append_message(session_id, reply.clone());
        }
        self.event_bus.emit(ChatEvent::ReplyReceived {
            session_id: session_id.to_string(),
            message_id: reply.id.clone(),
        });
        SendOutcome::Answered {
            session_id: session_id.to_string(),
            reply,
        }
    }

    fn require_auth(&self, session_id: &str, advisory: String) -> SendOutcome {
        log::info!("Demo limit reached for session {}", session_id);
        {
            let mut store = self.store.borrow_mut();
            store.mark_requires_auth(session_id);
            store.append_message(session_id, ChatMessage::model(advisory.clone()));
        }
        self.event_bus.emit(ChatEvent::AuthRequired {
            session_id: session_id.to_string(),
        });
        SendOutcome::AuthRequired {
            session_id: session_id.to_string(),
            advisory,
        }
    }

    fn observe_quota(&self, response: &ChatApiResponse) {
        if let Some(quota) = response.quota() {
            self.demo.set(Some(quota));
            self.event_bus.emit(ChatEvent::QuotaUpdated { quota });
        }
    }

    fn begin(&self, session_id: &str) {
        self.in_flight.set(self.in_flight.get() + 1);
        {
            let mut store = self.store.borrow_mut();
            store.set_loading(true);
            store.set_error(None);
        }
        self.event_bus.emit(ChatEvent::RequestStart {
            session_id: session_id.to_string(),
        });
    }

    fn end(&self, session_id: &str) {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
        self.store.borrow_mut().set_loading(self.is_loading());
        self.event_bus.emit(ChatEvent::RequestEnd {
            session_id: session_id.to_string(),
        });
    }
}
