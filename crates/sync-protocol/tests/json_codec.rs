// crates/sync-protocol/tests/json_codec.rs
use serde_json::{json, Value};
use sync_core::{
    InboundEvent, OutboundEvent, RegisterScreen, ScreenCount, ScreenId, SyncAction, SyncCommand,
};
use sync_protocol::{decode_envelope, decode_inbound, encode_inbound, encode_outbound, ProtocolError};

fn screen(id: &str) -> ScreenId {
    ScreenId::parse(id).unwrap()
}

fn encoded(msg: &OutboundEvent) -> Value {
    serde_json::from_str(&encode_outbound(msg).unwrap()).unwrap()
}

#[test]
fn decodes_register_screen() {
    let msg = decode_inbound(r#"{"event":"register_screen","data":{"screenId":"tv-1"}}"#).unwrap();
    assert_eq!(
        msg,
        InboundEvent::RegisterScreen(RegisterScreen {
            screen_id: Some("tv-1".to_string())
        })
    );
}

#[test]
fn missing_screen_id_is_left_to_the_relay() {
    for frame in [
        r#"{"event":"register_screen","data":{}}"#,
        r#"{"event":"register_screen"}"#,
        r#"{"event":"register_screen","data":null}"#,
    ] {
        let msg = decode_inbound(frame).unwrap();
        assert_eq!(msg, InboundEvent::RegisterScreen(RegisterScreen { screen_id: None }));
    }
}

#[test]
fn screen_id_of_wrong_type_is_rejected() {
    let err = decode_inbound(r#"{"event":"register_screen","data":{"screenId":42}}"#).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::InvalidPayload { event: "register_screen", .. }
    ));
}

#[test]
fn decodes_every_sync_action() {
    for (name, action) in [
        ("sync_play", SyncAction::Play),
        ("sync_pause", SyncAction::Pause),
        ("sync_stop", SyncAction::Stop),
    ] {
        let frame = json!({
            "event": name,
            "data": { "targetScreens": ["a", "b"], "timestamp": 1700000000123u64 }
        })
        .to_string();

        match decode_inbound(&frame).unwrap() {
            InboundEvent::Sync(cmd) => {
                assert_eq!(cmd.action, action);
                assert_eq!(cmd.target_screens, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(cmd.timestamp.as_u64(), Some(1700000000123));
            }
            other => panic!("expected sync command, got {:?}", other),
        }
    }
}

#[test]
fn sync_requires_targets_and_timestamp() {
    let err = decode_inbound(r#"{"event":"sync_play","data":{"timestamp":1}}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidPayload { event: "sync_play", .. }));

    let err = decode_inbound(r#"{"event":"sync_stop","data":{"targetScreens":["a"]}}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidPayload { event: "sync_stop", .. }));

    let err =
        decode_inbound(r#"{"event":"sync_pause","data":{"targetScreens":"a","timestamp":1}}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidPayload { .. }));
}

#[test]
fn screen_status_keeps_arbitrary_status() {
    let frame = json!({
        "event": "screen_status",
        "data": { "screenId": "tv-1", "status": { "playing": true, "position": 12.5 } }
    })
    .to_string();

    match decode_inbound(&frame).unwrap() {
        InboundEvent::ScreenStatus(s) => {
            assert_eq!(s.screen_id.as_deref(), Some("tv-1"));
            assert_eq!(s.status, json!({ "playing": true, "position": 12.5 }));
        }
        other => panic!("expected screen status, got {:?}", other),
    }
}

#[test]
fn rejects_unknown_events_and_garbage() {
    assert!(matches!(
        decode_inbound(r#"{"event":"self_destruct","data":{}}"#),
        Err(ProtocolError::UnknownEvent(name)) if name == "self_destruct"
    ));
    assert!(matches!(decode_inbound("not json"), Err(ProtocolError::InvalidJson(_))));
    assert!(matches!(
        decode_inbound(r#"{"data":{}}"#),
        Err(ProtocolError::InvalidJson(_))
    ));
}

#[test]
fn encodes_registration_success() {
    let msg = OutboundEvent::registration_success(screen("tv-1"), 2, vec![screen("tv-1"), screen("tv-2")]);
    assert_eq!(
        encoded(&msg),
        json!({
            "event": "registration_success",
            "data": { "screenId": "tv-1", "instances": 2, "connectedScreens": ["tv-1", "tv-2"] }
        })
    );
}

#[test]
fn encodes_screens_update_in_order() {
    let msg = OutboundEvent::connected_screens_update(vec![
        ScreenCount { screen_id: screen("b"), count: 1 },
        ScreenCount { screen_id: screen("a"), count: 3 },
    ]);
    assert_eq!(
        encoded(&msg),
        json!({
            "event": "connected_screens_update",
            "data": { "screens": [ { "screenId": "b", "count": 1 }, { "screenId": "a", "count": 3 } ] }
        })
    );
}

#[test]
fn encodes_command_and_ack() {
    let cmd = SyncCommand {
        action: SyncAction::Pause,
        target_screens: vec!["tv-1".to_string()],
        timestamp: 99u64.into(),
    };

    assert_eq!(
        encoded(&OutboundEvent::command(cmd.action, cmd.timestamp.clone())),
        json!({ "event": "pause_command", "data": { "timestamp": 99 } })
    );
    assert_eq!(
        encoded(&OutboundEvent::sync_command_ack(&cmd)),
        json!({
            "event": "sync_command_ack",
            "data": { "action": "pause", "targetScreens": ["tv-1"], "timestamp": 99 }
        })
    );
}

#[test]
fn encodes_status_update() {
    let msg = OutboundEvent::screen_status_update(screen("tv-9"), json!("buffering"));
    assert_eq!(
        encoded(&msg),
        json!({ "event": "screen_status_update", "data": { "screenId": "tv-9", "status": "buffering" } })
    );
}

#[test]
fn client_frames_decode_back_on_the_relay() {
    let sent = InboundEvent::Sync(SyncCommand {
        action: SyncAction::Stop,
        target_screens: vec!["x".to_string()],
        timestamp: 5u64.into(),
    });
    let frame = encode_inbound(&sent).unwrap();
    assert_eq!(decode_inbound(&frame).unwrap(), sent);

    let frame = encode_inbound(&InboundEvent::RegisterControlPanel).unwrap();
    let env = decode_envelope(&frame).unwrap();
    assert_eq!(env.event, "register_control_panel");
    assert_eq!(env.data, json!({}));
}
