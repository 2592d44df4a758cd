use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use url::Url;

use rst_common::standard::serde_json::{self, json, Map, Value};
use rst_common::with_logging::log::{debug, warn};

use crate::types::InvitationID;

use super::types::*;

/// `Codec` encodes invitations into transport strings and classifies incoming transport
/// strings into a [`DecodedInvitation`]
///
/// Encoding always produces the out-of-band 2.0 shape. Decoding accepts the out-of-band
/// 1.x and 2.0 shapes, the legacy connections shape, and degrades anything it does not
/// recognize into a raw identifier
#[derive(Debug, Clone)]
pub struct Codec {
    base_url: String,
}

impl Codec {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn encode(
        &self,
        goal: Goal,
        sender_did: String,
        attachments: Vec<Attachment>,
    ) -> Result<EncodedInvitation, InvitationError> {
        let invitation = Invitation::new(goal, sender_did, attachments);
        self.encode_invitation(invitation)
    }

    pub fn encode_invitation(
        &self,
        invitation: Invitation,
    ) -> Result<EncodedInvitation, InvitationError> {
        if invitation.from.is_empty() {
            return Err(InvitationError::EncodeError(
                "missing sender did".to_string(),
            ));
        }

        let value = invitation_to_value(&invitation);
        let payload = serde_json::to_vec(&value)
            .map_err(|err| InvitationError::JSONError(err.to_string()))?;

        let mut url =
            Url::parse(&self.base_url).map_err(|err| InvitationError::UrlError(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair(OOB_PARAM, &URL_SAFE_NO_PAD.encode(payload));

        debug!("[invitation:encode] encoded invitation: {}", invitation.id);
        Ok(EncodedInvitation {
            invitation,
            url: url.to_string(),
        })
    }

    /// Classifies the given transport string. The only hard error is an empty input,
    /// everything that is not a recognized invitation falls back to a raw identifier
    pub fn decode(&self, text: &str) -> Result<DecodedInvitation, InvitationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InvitationError::EmptyInput);
        }

        match structured_candidate(text) {
            Ok(Some(value)) => Ok(classify(text, &value)),
            Ok(None) => Ok(DecodedInvitation::RawIdentifier(text.to_string())),
            Err(err) => {
                warn!(
                    "[invitation:decode] unable to decode, fallback to raw identifier: {}",
                    err
                );
                Ok(DecodedInvitation::RawIdentifier(text.to_string()))
            }
        }
    }

    pub fn encode_message(
        &self,
        message: &ConnectionRequestMessage,
    ) -> Result<String, InvitationError> {
        let mut obj = Map::new();
        obj.insert("id".to_string(), json!(message.id));
        obj.insert("type".to_string(), json!(message.message_type));
        obj.insert("thid".to_string(), json!(message.invitation_id.as_str()));
        obj.insert("from".to_string(), json!(message.from));
        obj.insert("to".to_string(), json!(message.to));
        obj.insert("body".to_string(), json!({"label": message.label}));
        insert_attachments(&mut obj, &message.attachments);

        serde_json::to_string(&Value::Object(obj))
            .map_err(|err| InvitationError::JSONError(err.to_string()))
    }

    pub fn decode_message(&self, text: &str) -> Result<ConnectionRequestMessage, InvitationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InvitationError::EmptyInput);
        }

        let value: Value = serde_json::from_str(text)
            .map_err(|err| InvitationError::JSONError(err.to_string()))?;

        let id = string_field(&value, &["id", "@id"])
            .ok_or_else(|| InvitationError::DecodeError("missing message id".to_string()))?;
        let invitation_id = string_field(&value, &["thid", "pthid"])
            .ok_or_else(|| InvitationError::DecodeError("missing thread id".to_string()))?;
        let from = string_field(&value, &["from"])
            .ok_or_else(|| InvitationError::DecodeError("missing sender".to_string()))?;

        Ok(ConnectionRequestMessage {
            id,
            message_type: string_field(&value, &["type", "@type"])
                .unwrap_or_else(|| TYPE_CONNECTION_REQUEST.to_string()),
            invitation_id: InvitationID::from(invitation_id),
            from,
            to: string_field(&value, &["to"]).unwrap_or_default(),
            label: body_field(&value, "label").unwrap_or_default(),
            attachments: parse_attachments(&value),
        })
    }
}

/// A bare peer identifier is a DID without whitespace and without any query part
pub fn looks_like_peer_identifier(text: &str) -> bool {
    let text = text.trim();
    text.starts_with("did:")
        && text.len() > "did:".len()
        && !text.contains(char::is_whitespace)
        && !text.contains('?')
}

fn structured_candidate(text: &str) -> Result<Option<Value>, InvitationError> {
    if text.starts_with('{') {
        let value = serde_json::from_str::<Value>(text)
            .map_err(|err| InvitationError::JSONError(err.to_string()))?;
        return Ok(Some(value));
    }

    let Ok(url) = Url::parse(text) else {
        return Ok(None);
    };

    let mut legacy = None;
    let mut current = None;
    for (key, val) in url.query_pairs() {
        match key.as_ref() {
            OOB_PARAM => current = Some(val.into_owned()),
            LEGACY_OOB_PARAM => legacy = Some(val.into_owned()),
            _ => {}
        }
    }

    let Some(encoded) = current.or(legacy) else {
        return Ok(None);
    };

    let bytes = decode_lenient(&encoded)?;
    let value = serde_json::from_slice::<Value>(&bytes)
        .map_err(|err| InvitationError::JSONError(err.to_string()))?;
    Ok(Some(value))
}

fn decode_lenient(encoded: &str) -> Result<Vec<u8>, InvitationError> {
    let encoded = encoded.trim();
    URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .or_else(|_| STANDARD.decode(encoded))
        .or_else(|_| STANDARD_NO_PAD.decode(encoded))
        .map_err(|err| InvitationError::DecodeError(err.to_string()))
}

/// Splits a DIDComm message type URI into its protocol name and version
fn protocol_of(type_uri: &str) -> Option<(&str, &str)> {
    let mut segments = type_uri.rsplit('/');
    let message = segments.next()?;
    let version = segments.next()?;
    let protocol = segments.next()?;

    match message {
        "invitation" => Some((protocol, version)),
        _ => None,
    }
}

/// The one classification function of every structured candidate
fn classify(text: &str, value: &Value) -> DecodedInvitation {
    let type_uri = string_field(value, &["type", "@type"]).unwrap_or_default();

    match protocol_of(&type_uri) {
        Some(("connections", version)) if version.starts_with("1.") => {
            DecodedInvitation::Legacy(build_invitation(value))
        }
        Some(("out-of-band", version)) if version.starts_with("1.") || version == "2.0" => {
            let invitation = build_invitation(value);
            let is_counterparty = invitation
                .goal_text
                .as_ref()
                .is_some_and(|goal| goal.to_lowercase().contains(COUNTERPARTY_MARKER));

            match is_counterparty {
                true => DecodedInvitation::Counterparty(invitation),
                false => DecodedInvitation::Edge(invitation),
            }
        }
        _ => {
            warn!(
                "[invitation:decode] unknown invitation type: '{}', fallback to raw identifier",
                type_uri
            );
            DecodedInvitation::RawIdentifier(text.to_string())
        }
    }
}

fn build_invitation(value: &Value) -> Invitation {
    let id = string_field(value, &["id", "@id"])
        .map(InvitationID::from)
        .unwrap_or_else(InvitationID::generate);

    let goal = body_field(value, "goal_code")
        .map(|code| Goal::from_code(&code))
        .unwrap_or(Goal::Connect);

    let from = string_field(value, &["from", "did"])
        .or_else(|| first_string(value, "services"))
        .or_else(|| first_string(value, "recipientKeys"))
        .unwrap_or_default();

    Invitation {
        id,
        goal,
        goal_text: body_field(value, "goal"),
        label: body_field(value, "label"),
        from,
        attachments: parse_attachments(value),
    }
}

fn invitation_to_value(invitation: &Invitation) -> Value {
    let mut body = Map::new();
    body.insert("goal_code".to_string(), json!(invitation.goal.code()));
    if let Some(goal_text) = &invitation.goal_text {
        body.insert("goal".to_string(), json!(goal_text));
    }
    if let Some(label) = &invitation.label {
        body.insert("label".to_string(), json!(label));
    }
    body.insert("accept".to_string(), json!(["didcomm/v2"]));

    let mut obj = Map::new();
    obj.insert("type".to_string(), json!(TYPE_OOB_INVITATION));
    obj.insert("id".to_string(), json!(invitation.id.as_str()));
    obj.insert("from".to_string(), json!(invitation.from));
    obj.insert("body".to_string(), Value::Object(body));
    insert_attachments(&mut obj, &invitation.attachments);

    Value::Object(obj)
}

/// An empty attachment list is encoded as an absent field
fn insert_attachments(obj: &mut Map<String, Value>, attachments: &[Attachment]) {
    if attachments.is_empty() {
        return;
    }

    let values: Vec<Value> = attachments
        .iter()
        .filter_map(|att| serde_json::to_value(att).ok())
        .collect();
    obj.insert(ATTACHMENTS_FIELD.to_string(), Value::Array(values));
}

/// Both container field names are accepted, the current one wins when both exist.
/// Malformed entries are skipped
pub(crate) fn parse_attachments(value: &Value) -> Vec<Attachment> {
    let container = value
        .get(ATTACHMENTS_FIELD)
        .or_else(|| value.get(LEGACY_ATTACHMENTS_FIELD));

    let Some(Value::Array(items)) = container else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(
            |item| match serde_json::from_value::<Attachment>(item.to_owned()) {
                Ok(att) => Some(att),
                Err(err) => {
                    debug!("[invitation:attachments] skip malformed attachment: {}", err);
                    None
                }
            },
        )
        .collect()
}

fn string_field(value: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| value.get(*field))
        .filter_map(|val| val.as_str())
        .find(|val| !val.is_empty())
        .map(|val| val.to_string())
}

/// Out-of-band 2.0 keeps descriptive fields under `body`, older shapes keep them at the
/// top level
fn body_field(value: &Value, field: &str) -> Option<String> {
    value
        .get("body")
        .and_then(|body| string_field(body, &[field]))
        .or_else(|| string_field(value, &[field]))
}

fn first_string(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(|val| val.as_array())
        .and_then(|items| items.iter().find_map(|item| item.as_str()))
        .map(|val| val.to_string())
}
