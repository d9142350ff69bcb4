#[cfg(test)]
mod tests {
    use crate::message::*;
    use crate::session::*;
    use crate::api::*;
    use crate::event::*;
    use crate::config::*;
    use crate::error::*;
    use crate::ids::*;

    // ─── Id Tests ────────────────────────────────────────────

    #[test]
    fn test_generated_ids_are_valid_session_ids() {
        assert!(is_valid_session_id(&generate_id()));
        assert!(is_valid_session_id(&server_session_id()));
    }

    #[test]
    fn test_session_id_rejects_path_characters() {
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id(".."));
        assert!(!is_valid_session_id("../../bob/chats/secret"));
        assert!(!is_valid_session_id("a b"));
        assert!(!is_valid_session_id("شلونك"));
        assert!(!is_valid_session_id(&"a".repeat(SESSION_ID_MAX_LEN + 1)));
        assert!(is_valid_session_id(&"a".repeat(SESSION_ID_MAX_LEN)));
    }

    #[test]
    fn test_generate_id_unique() {
        let ids: std::collections::HashSet<String> = (0..500).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_server_session_id_prefix() {
        let id = server_session_id();
        assert!(id.starts_with("chat_"));
        assert_ne!(id, server_session_id());
    }

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_user_message_starts_pending() {
        let msg = ChatMessage::user("مرحبا");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "مرحبا");
        assert_eq!(msg.status, DeliveryStatus::Pending);
        assert!(msg.is_pending());
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn test_model_message_is_confirmed() {
        let msg = ChatMessage::model("هلا");
        assert_eq!(msg.role, Role::Model);
        assert_eq!(msg.status, DeliveryStatus::Confirmed);
    }

    #[test]
    fn test_status_transitions() {
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Confirmed));
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Failed));
        assert!(!DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Pending));
        assert!(!DeliveryStatus::Confirmed.can_transition_to(DeliveryStatus::Failed));
        assert!(!DeliveryStatus::Failed.can_transition_to(DeliveryStatus::Confirmed));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), r#""model""#);
        let role: Role = serde_json::from_str(r#""model""#).unwrap();
        assert_eq!(role, Role::Model);
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_message_without_status_defaults_confirmed() {
        let json = r#"{"id":"a1","role":"user","content":"hi","timestamp":1700000000000}"#;
        let msg: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.status, DeliveryStatus::Confirmed);
    }

    #[test]
    fn test_stored_message_from_chat_message() {
        let msg = ChatMessage::user("hello");
        let stored = StoredMessage::from(&msg);
        assert_eq!(stored.role, Role::User);
        assert_eq!(stored.content, "hello");
        assert_eq!(stored.timestamp, msg.timestamp);
    }

    // ─── Session Tests ───────────────────────────────────────

    #[test]
    fn test_session_new() {
        let session = ChatSession::new();
        assert!(!session.id.is_empty());
        assert!(session.messages.is_empty());
        assert_eq!(session.created_at, session.updated_at);
        assert_eq!(session.phase, SessionPhase::Provisional);
        assert!(!session.requires_auth);
    }

    #[test]
    fn test_session_touch_strictly_increases() {
        let mut session = ChatSession::with_id("s1".to_string());
        let mut last = session.updated_at;
        for _ in 0..50 {
            session.touch();
            assert!(session.updated_at > last);
            last = session.updated_at;
        }
        assert!(session.updated_at >= session.created_at);
    }

    #[test]
    fn test_session_title() {
        let mut session = ChatSession::with_id("s1".to_string());
        assert_eq!(session.title(), "New Chat");

        session.push(ChatMessage::model("welcome"));
        assert_eq!(session.title(), "New Chat");

        session.push(ChatMessage::user("  شلونك؟ شنو أخبارك اليوم يا صديقي العزيز الغالي  "));
        let title = session.title();
        assert!(title.chars().count() <= 30);
        assert!(title.starts_with("شلونك"));

        session.name = Some("Renamed".to_string());
        assert_eq!(session.title(), "Renamed");
    }

    #[test]
    fn test_session_summary() {
        let mut session = ChatSession::with_id("s1".to_string());
        session.push(ChatMessage::user("hi"));
        session.push(ChatMessage::model("hello"));
        let summary = session.summary();
        assert_eq!(summary.id, "s1");
        assert_eq!(summary.title, "hi");
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.updated_at, session.updated_at);
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = ChatSession::with_id("s1".to_string());
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("name").is_none());
        assert_eq!(json["phase"], "provisional");
    }

    #[test]
    fn test_legacy_session_without_phase() {
        let json = r#"{"id":"x","messages":[],"createdAt":1,"updatedAt":2}"#;
        let session: ChatSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.phase, SessionPhase::Provisional);
        assert!(!session.requires_auth);
    }

    #[test]
    fn test_store_state_skips_transient_fields() {
        let mut state = SessionStoreState::default();
        state.sessions.push(ChatSession::with_id("a".to_string()));
        state.current_session_id = Some("a".to_string());
        state.loading = true;
        state.error = Some("boom".to_string());

        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("boom"));

        let restored: SessionStoreState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.sessions, state.sessions);
        assert_eq!(restored.current_session_id.as_deref(), Some("a"));
        assert!(!restored.loading);
        assert!(restored.error.is_none());
        assert_eq!(restored.current_session().map(|s| s.id.as_str()), Some("a"));
    }

    // ─── Wire Protocol Tests ─────────────────────────────────

    #[test]
    fn test_request_omits_missing_session_id() {
        let req = ChatApiRequest::new(None, "hi");
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"message":"hi"}"#);

        let req = ChatApiRequest::new(Some("s1".to_string()), "hi");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""sessionId":"s1""#));
    }

    #[test]
    fn test_request_missing_message_deserializes_empty() {
        let req: ChatApiRequest = serde_json::from_str(r#"{"sessionId":"s1"}"#).unwrap();
        assert!(req.message.is_empty());
    }

    #[test]
    fn test_classify_session_created() {
        let json = r#"{"sessionId":"chat_1","message":"Session created"}"#;
        let resp: ChatApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.classify().unwrap(),
            ChatReply::SessionCreated { session_id: "chat_1".to_string(), quota: None }
        );
    }

    #[test]
    fn test_classify_auth_required_takes_priority() {
        let json = r#"{"requireAuth":true,"demoMode":true,"messageCount":4,"messageLimit":3,"response":"sign in"}"#;
        let resp: ChatApiResponse = serde_json::from_str(json).unwrap();
        match resp.classify().unwrap() {
            ChatReply::AuthRequired { advisory, quota } => {
                assert_eq!(advisory, "sign in");
                let quota = quota.unwrap();
                assert_eq!(quota.message_count, 4);
                assert!(quota.exhausted());
            }
            other => panic!("Wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_classify_answer_with_quota() {
        let json = r#"{"sessionId":"s1","response":"هلا","demoMode":true,"messageCount":2,"messageLimit":3}"#;
        let resp: ChatApiResponse = serde_json::from_str(json).unwrap();
        match resp.classify().unwrap() {
            ChatReply::Answer { session_id, text, quota } => {
                assert_eq!(session_id.as_deref(), Some("s1"));
                assert_eq!(text, "هلا");
                assert_eq!(quota, Some(DemoQuota { demo_mode: true, message_count: 2, message_limit: 3 }));
            }
            other => panic!("Wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_classify_malformed() {
        let resp: ChatApiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(resp.classify(), Err(ChatError::Protocol(_))));

        let resp: ChatApiResponse = serde_json::from_str(r#"{"message":"something else"}"#).unwrap();
        assert!(matches!(resp.classify(), Err(ChatError::Protocol(_))));

        let resp: ChatApiResponse = serde_json::from_str(r#"{"message":"Session created"}"#).unwrap();
        assert!(matches!(resp.classify(), Err(ChatError::Protocol(_))));
    }

    #[test]
    fn test_response_constructors_wire_shape() {
        let quota = DemoQuota { demo_mode: true, message_count: 4, message_limit: 3 };
        let json = serde_json::to_value(ChatApiResponse::auth_required(quota, DEMO_LIMIT_ADVISORY)).unwrap();
        assert_eq!(json["requireAuth"], true);
        assert_eq!(json["demoMode"], true);
        assert_eq!(json["messageCount"], 4);
        assert_eq!(json["messageLimit"], 3);
        assert!(json["response"].as_str().unwrap().contains("demo message limit"));

        let json = serde_json::to_value(ChatApiResponse::answer("s1", "ok")).unwrap();
        assert!(json.get("requireAuth").is_none());
        assert!(json.get("demoMode").is_none());
        assert_eq!(json["sessionId"], "s1");

        let json = serde_json::to_value(ChatApiResponse::session_created("s2")).unwrap();
        assert_eq!(json["message"], SESSION_CREATED);
    }

    #[test]
    fn test_quota_absent_for_authenticated_answer() {
        assert!(ChatApiResponse::answer("s1", "ok").quota().is_none());
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_string(&ErrorBody::new("Message is required")).unwrap();
        assert_eq!(json, r#"{"error":"Message is required"}"#);
    }

    // ─── Event Tests ─────────────────────────────────────────

    #[test]
    fn test_chat_event_serialization() {
        let event = ChatEvent::SessionRotated { from: "local".to_string(), to: "chat_1".to_string() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SessionRotated"));
        assert!(json.contains("chat_1"));
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.chat_url(), "/api/chat");
        assert_eq!(config.cache_key, "chatSessions");
        assert!(!config.messaging_paused);

        let config = ClientConfig { api_base: "https://example.com/".to_string(), ..Default::default() };
        assert_eq!(config.chat_url(), "https://example.com/api/chat");
    }

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gemini-pro");
        assert!(config.api_key.is_empty());
        assert_eq!(config.base_url(), "https://generativelanguage.googleapis.com");
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.generation.max_output_tokens, 2048);
        assert_eq!(config.safety.len(), 4);
        assert!(config
            .safety
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::MediumAndAbove));
        assert_eq!(DEMO_MESSAGE_LIMIT, 3);
    }

    #[test]
    fn test_safety_setting_wire_names() {
        let json = serde_json::to_string(&SafetySetting::defaults()[0]).unwrap();
        assert_eq!(
            json,
            r#"{"category":"HARM_CATEGORY_HARASSMENT","threshold":"BLOCK_MEDIUM_AND_ABOVE"}"#
        );
        let json = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert!(json.get("topP").is_some());
        assert!(json.get("maxOutputTokens").is_some());
    }

    // ─── Error Tests ─────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = ChatError::Validation("Message is required".to_string());
        assert_eq!(err.to_string(), "Validation error: Message is required");

        let err = ChatError::Api { status: 500, message: "boom".to_string() };
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ChatError::Validation(String::new()).status_code(), 400);
        assert_eq!(ChatError::Config(String::new()).status_code(), 500);
        assert_eq!(ChatError::Upstream(String::new()).status_code(), 500);
        assert_eq!(ChatError::Api { status: 502, message: String::new() }.status_code(), 502);
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{{invalid}}").unwrap_err();
        let err: ChatError = serde_err.into();
        assert!(matches!(err, ChatError::Serialization(_)));
    }
}
