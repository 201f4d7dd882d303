use hotelbot_core::{DialogAction, DialogDecision, FulfillmentState, IntentState};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DIALOG_CODE_HOOK: &str = "DialogCodeHook";

/// Inbound dialog code hook event. Every member is optional so that a partly
/// formed event still deserializes and the handler can decide what is missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexEvent {
    #[serde(default)]
    pub invocation_source: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub input_transcript: Option<String>,
    #[serde(default)]
    pub session_state: Option<InboundSessionState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSessionState {
    #[serde(default)]
    pub intent: Option<InboundIntent>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundIntent {
    #[serde(default)]
    pub name: Option<String>,
    /// `None` only when the key is absent; an explicit `null` is kept as
    /// `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present_value")]
    pub slots: Option<Value>,
    #[serde(default)]
    pub state: Option<String>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl LexEvent {
    pub fn intent(&self) -> Option<&InboundIntent> {
        self.session_state.as_ref().and_then(|state| state.intent.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexResponse {
    pub session_state: ResponseSessionState,
    pub messages: Vec<Message>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSessionState {
    pub dialog_action: WireDialogAction,
    pub intent: ResponseIntent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireDialogAction {
    ElicitSlot {
        #[serde(rename = "slotToElicit")]
        slot_to_elicit: String,
    },
    Close {
        #[serde(rename = "fulfillmentState")]
        fulfillment_state: FulfillmentState,
    },
}

impl From<DialogAction> for WireDialogAction {
    fn from(value: DialogAction) -> Self {
        match value {
            DialogAction::ElicitSlot(slot) => {
                Self::ElicitSlot { slot_to_elicit: slot.as_str().to_owned() }
            }
            DialogAction::Close(fulfillment_state) => Self::Close { fulfillment_state },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseIntent {
    pub name: String,
    pub slots: Value,
    pub state: IntentState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    PlainText,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: ContentType,
    pub content: String,
}

impl Message {
    pub fn plain(content: impl Into<String>) -> Self {
        Self { content_type: ContentType::PlainText, content: content.into() }
    }
}

impl LexResponse {
    pub fn from_decision(intent_name: &str, slots: Value, decision: DialogDecision) -> Self {
        Self {
            session_state: ResponseSessionState {
                dialog_action: decision.action.into(),
                intent: ResponseIntent {
                    name: intent_name.to_owned(),
                    slots,
                    state: decision.intent_state,
                },
            },
            messages: decision.messages.into_iter().map(Message::plain).collect(),
        }
    }

    pub fn failure(intent_name: &str, slots: Value, message: &str) -> Self {
        Self {
            session_state: ResponseSessionState {
                dialog_action: WireDialogAction::Close {
                    fulfillment_state: FulfillmentState::Failed,
                },
                intent: ResponseIntent {
                    name: intent_name.to_owned(),
                    slots,
                    state: IntentState::Failed,
                },
            },
            messages: vec![Message::plain(message)],
        }
    }

    pub fn message_texts(&self) -> Vec<&str> {
        self.messages.iter().map(|message| message.content.as_str()).collect()
    }
}
