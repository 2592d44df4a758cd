use std::fs;
use std::path::Path;

use rst_common::standard::serde_json::{self, Value};

use prople_wallet_core::credential::types::ToCredential;
use prople_wallet_core::credential::{Credential, CredentialSource};
use prople_wallet_core::invitation::types::PresentationRequest;

use crate::types::CliError;

/// Reads an argument that is either an inline value or a path to a file holding it
pub fn read_text(input: &str) -> Result<String, CliError> {
    let path = Path::new(input);
    if path.is_file() {
        return fs::read_to_string(path).map_err(|err| CliError::InputError(err.to_string()));
    }

    Ok(input.to_string())
}

fn read_value(input: &str) -> Result<Value, CliError> {
    let text = read_text(input)?;
    let trimmed = text.trim();

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(trimmed.to_string())),
    }
}

/// Loads a credential from a JSON document, a credential envelope or a compact JWT
pub fn read_credential(input: &str) -> Result<Credential, CliError> {
    let value = read_value(input)?;

    CredentialSource::resolve(value)
        .and_then(|source| source.to_credential())
        .map_err(|err| CliError::InputError(err.to_string()))
}

pub fn read_presentation_request(input: &str) -> Result<PresentationRequest, CliError> {
    match read_value(input)? {
        value @ Value::Object(_) => Ok(PresentationRequest(value)),
        _ => Err(CliError::InputError(
            "presentation request must be a json object".to_string(),
        )),
    }
}
