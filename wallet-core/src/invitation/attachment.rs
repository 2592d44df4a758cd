use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use rst_common::standard::serde_json::{self, Value};
use rst_common::with_logging::log::{debug, warn};

use crate::credential::types::{CredentialError, ToCredential};
use crate::credential::{Credential, CredentialSource};

use super::types::{
    Attachment, AttachmentData, PresentationRequest, ATTACHMENT_PRESENTATION_REQUEST,
    ATTACHMENT_VC_PROOF,
};

/// `Extracted` is everything recognized from an attachment list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub proof: Option<Credential>,
    pub request: Option<PresentationRequest>,
}

/// Walks the attachment list once. Unknown tags are ignored, and a credential proof
/// that cannot be resolved leaves `proof` empty instead of failing the caller
pub fn extract(attachments: &[Attachment]) -> Extracted {
    let mut extracted = Extracted::default();

    for attachment in attachments {
        match attachment.id.as_str() {
            ATTACHMENT_VC_PROOF if extracted.proof.is_none() => {
                match payload_of(&attachment.data).and_then(ingest_credential) {
                    Ok(credential) => extracted.proof = Some(credential),
                    Err(err) => warn!("[invitation:extract] credential proof ignored: {}", err),
                }
            }
            ATTACHMENT_PRESENTATION_REQUEST if extracted.request.is_none() => {
                match payload_of(&attachment.data) {
                    Ok(value) => extracted.request = Some(PresentationRequest(value)),
                    Err(err) => warn!("[invitation:extract] presentation request ignored: {}", err),
                }
            }
            other => debug!("[invitation:extract] skip attachment: {}", other),
        }
    }

    extracted
}

/// Builds the credential proof attachment, used on both the invitation and the
/// connection request side
pub fn proof_attachment(credential: &Credential) -> Attachment {
    match credential.jwt() {
        Some(token) => Attachment {
            id: ATTACHMENT_VC_PROOF.to_string(),
            media_type: Some("application/json".to_string()),
            format: Some("jwt".to_string()),
            data: AttachmentData {
                json: Some(Value::String(token)),
                base64: None,
            },
        },
        None => Attachment::json(ATTACHMENT_VC_PROOF, credential.payload().to_owned()),
    }
}

pub fn request_attachment(request: &PresentationRequest) -> Attachment {
    Attachment::json(ATTACHMENT_PRESENTATION_REQUEST, request.value().to_owned())
}

fn ingest_credential(value: Value) -> Result<Credential, CredentialError> {
    CredentialSource::resolve(value)?.to_credential()
}

/// Inline JSON wins over base64 content. Base64 content may be a JSON document or a
/// compact JWS
fn payload_of(data: &AttachmentData) -> Result<Value, CredentialError> {
    if let Some(value) = &data.json {
        return Ok(value.to_owned());
    }

    let Some(encoded) = &data.base64 else {
        return Err(CredentialError::UnsupportedShape(
            "attachment without any data".to_string(),
        ));
    };

    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .map_err(|err| CredentialError::UnsupportedShape(err.to_string()))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok(value),
        Err(_) => String::from_utf8(bytes)
            .map(|text| Value::String(text.trim().to_string()))
            .map_err(|err| CredentialError::UnsupportedShape(err.to_string())),
    }
}
