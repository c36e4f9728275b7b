//! Tap, hold and double-tap actions.
//!
//! Stored actions are tagged objects: `{ action: <kind>, ...fields }`. Editing
//! an action in a form leaves fields of earlier kinds behind, so every action
//! is cleaned against the field set of its kind before it is used or
//! persisted. Consumers get the typed [`Action`], where fields of other kinds
//! cannot be represented.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys;

/// The tag of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    None,
    Navigate,
    Back,
    Menu,
    Url,
    MoreInfo,
    Toggle,
    PerformAction,
    HkiMoreInfo,
    FireDomEvent,
    CallService,
}

impl ActionKind {
    pub fn parse(s: &str) -> Option<ActionKind> {
        match s {
            "none" => Some(ActionKind::None),
            "navigate" => Some(ActionKind::Navigate),
            "back" => Some(ActionKind::Back),
            "menu" => Some(ActionKind::Menu),
            "url" => Some(ActionKind::Url),
            "more-info" => Some(ActionKind::MoreInfo),
            "toggle" => Some(ActionKind::Toggle),
            "perform-action" => Some(ActionKind::PerformAction),
            "hki-more-info" => Some(ActionKind::HkiMoreInfo),
            "fire-dom-event" => Some(ActionKind::FireDomEvent),
            "call-service" => Some(ActionKind::CallService),
            _ => None,
        }
    }

    /// Fields meaningful for this kind besides `action` itself.
    /// `None` means unconstrained.
    fn fields(self) -> Option<&'static [&'static str]> {
        let fields: &'static [&'static str] = match self {
            ActionKind::None => &[],
            ActionKind::Navigate => &["navigation_path", "navigation_replace", "confirmation"],
            ActionKind::Back | ActionKind::Menu => &["confirmation"],
            ActionKind::Url => &["url_path", "confirmation"],
            ActionKind::MoreInfo | ActionKind::Toggle => &["entity", "confirmation"],
            ActionKind::PerformAction => &["perform_action", "target", "data", "confirmation"],
            ActionKind::CallService => &["service", "service_data", "target", "data", "confirmation"],
            ActionKind::HkiMoreInfo => &["entity", "confirmation"],
            ActionKind::FireDomEvent => return None,
        };
        Some(fields)
    }

    fn allows(self, field: &str) -> bool {
        match self.fields() {
            None => true,
            Some(fields) => {
                fields.contains(&field) || (self == ActionKind::HkiMoreInfo && keys::is_popup_key(field))
            }
        }
    }
}

fn none_action() -> Value {
    let mut map = Map::new();
    map.insert("action".into(), Value::String("none".into()));
    Value::Object(map)
}

/// Drop every field not meaningful for the action's kind.
///
/// A bare string naming a kind is promoted to `{action: kind}`. Values that
/// are neither objects nor strings, and objects without an `action` tag,
/// become `{action: "none"}`. Unknown kinds are kept as given so newer host
/// actions survive a round trip.
pub fn cleanup_action(value: &Value) -> Value {
    let obj = match value {
        Value::Object(obj) => obj,
        Value::String(s) if ActionKind::parse(s).is_some() => {
            let mut map = Map::new();
            map.insert("action".into(), Value::String(s.clone()));
            return Value::Object(map);
        }
        _ => return none_action(),
    };
    let Some(tag) = obj.get("action").and_then(Value::as_str) else {
        return none_action();
    };
    let Some(kind) = ActionKind::parse(tag) else {
        tracing::debug!(action = tag, "keeping action of unknown kind unchanged");
        return value.clone();
    };
    let cleaned = obj
        .iter()
        .filter(|(k, _)| k.as_str() == "action" || kind.allows(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(cleaned)
}

/// A typed action for consumers of a normalized configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    None,
    Navigate {
        #[serde(default)]
        navigation_path: String,
        #[serde(default)]
        navigation_replace: bool,
    },
    Back,
    Menu,
    Url {
        #[serde(default)]
        url_path: String,
    },
    MoreInfo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
    },
    Toggle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
    },
    #[serde(alias = "call-service")]
    PerformAction {
        #[serde(default, alias = "service")]
        perform_action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Value>,
        #[serde(default, alias = "service_data", skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    HkiMoreInfo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
        /// Popup overrides carried by the action; the lowest popup layer
        /// below slot or person settings.
        #[serde(flatten)]
        popup: Map<String, Value>,
    },
    /// Passed through untouched for third-party event handlers.
    FireDomEvent(Map<String, Value>),
}

impl Action {
    /// Parse a stored action after cleaning it. Anything unusable (an unknown
    /// kind, mistyped fields) becomes [`Action::None`].
    pub fn from_value(value: &Value) -> Action {
        let cleaned = cleanup_action(value);
        match serde_json::from_value::<Action>(cleaned) {
            Ok(Action::HkiMoreInfo { entity, popup }) => Action::HkiMoreInfo {
                entity,
                popup: popup
                    .into_iter()
                    .filter(|(k, _)| keys::is_popup_key(k))
                    .collect(),
            },
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(error = %e, "unusable action, treating as none");
                Action::None
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }

    /// Popup fields carried by an `hki-more-info` action.
    pub fn popup_overrides(&self) -> Option<&Map<String, Value>> {
        match self {
            Action::HkiMoreInfo { popup, .. } => Some(popup),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_drops_navigation_path() {
        let cleaned = cleanup_action(&json!({
            "action": "url",
            "navigation_path": "/x",
            "url_path": "/y"
        }));
        assert_eq!(cleaned, json!({"action": "url", "url_path": "/y"}));
    }

    #[test]
    fn none_keeps_only_tag() {
        let cleaned = cleanup_action(&json!({"action": "none", "entity": "light.x", "url_path": "/"}));
        assert_eq!(cleaned, json!({"action": "none"}));
    }

    #[test]
    fn confirmation_survives_on_real_actions() {
        let cleaned = cleanup_action(&json!({
            "action": "toggle",
            "entity": "light.kitchen",
            "confirmation": {"text": "Sure?"},
            "navigation_path": "/old"
        }));
        assert_eq!(
            cleaned,
            json!({"action": "toggle", "entity": "light.kitchen", "confirmation": {"text": "Sure?"}})
        );
    }

    #[test]
    fn fire_dom_event_is_unconstrained() {
        let raw = json!({"action": "fire-dom-event", "browser_mod": {"service": "x"}, "anything": 1});
        assert_eq!(cleanup_action(&raw), raw);
    }

    #[test]
    fn hki_more_info_keeps_popup_keys() {
        let cleaned = cleanup_action(&json!({
            "action": "hki-more-info",
            "entity": "climate.living",
            "popup_blur_amount": 8,
            "climate_show_gradient": true,
            "url_path": "/nope"
        }));
        assert_eq!(
            cleaned,
            json!({
                "action": "hki-more-info",
                "entity": "climate.living",
                "popup_blur_amount": 8,
                "climate_show_gradient": true
            })
        );
    }

    #[test]
    fn malformed_actions_become_none() {
        assert_eq!(cleanup_action(&json!(null)), json!({"action": "none"}));
        assert_eq!(cleanup_action(&json!(42)), json!({"action": "none"}));
        assert_eq!(cleanup_action(&json!({"entity": "light.x"})), json!({"action": "none"}));
        assert_eq!(cleanup_action(&json!("dance")), json!({"action": "none"}));
    }

    #[test]
    fn bare_kind_string_is_promoted() {
        assert_eq!(cleanup_action(&json!("toggle")), json!({"action": "toggle"}));
    }

    #[test]
    fn unknown_kind_passes_through() {
        let raw = json!({"action": "assist", "pipeline_id": "x"});
        assert_eq!(cleanup_action(&raw), raw);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let raw = json!({"action": "navigate", "navigation_path": "/a", "url_path": "/b"});
        let once = cleanup_action(&raw);
        assert_eq!(cleanup_action(&once), once);
    }

    #[test]
    fn typed_navigate() {
        let action = Action::from_value(&json!({"action": "navigate", "navigation_path": "/lovelace/1"}));
        assert_eq!(
            action,
            Action::Navigate {
                navigation_path: "/lovelace/1".into(),
                navigation_replace: false
            }
        );
    }

    #[test]
    fn typed_call_service_reads_as_perform_action() {
        let action = Action::from_value(&json!({
            "action": "call-service",
            "service": "light.turn_on",
            "service_data": {"brightness": 120}
        }));
        assert_eq!(
            action,
            Action::PerformAction {
                perform_action: "light.turn_on".into(),
                target: None,
                data: Some(json!({"brightness": 120}))
            }
        );
    }

    #[test]
    fn typed_hki_more_info_collects_popup() {
        let action = Action::from_value(&json!({
            "action": "hki-more-info",
            "entity": "person.alice",
            "popup_width": "wide"
        }));
        let popup = action.popup_overrides().unwrap();
        assert_eq!(popup.get("popup_width"), Some(&json!("wide")));
    }

    #[test]
    fn typed_unknown_kind_is_none() {
        assert!(Action::from_value(&json!({"action": "assist"})).is_none());
        assert!(Action::from_value(&json!({"action": "url", "url_path": 5})).is_none());
    }

    #[test]
    fn typed_fire_dom_event_keeps_payload() {
        let action = Action::from_value(&json!({"action": "fire-dom-event", "browser_mod": {"a": 1}}));
        match action {
            Action::FireDomEvent(map) => assert_eq!(map.get("browser_mod"), Some(&json!({"a": 1}))),
            other => panic!("Expected FireDomEvent, got {other:?}"),
        }
    }
}
