//! Pluggable extension logic run after the built-in handlers.

use serde_json::{json, Value};

use crate::action::Action;
use crate::error::{LogicError, Result};
use crate::request::Request;

/// Hook invoked with the request produced by a built-in handler.
///
/// An error vetoes the action exactly like a handler error would.
pub trait AdvancedLogic: Send + Sync {
    fn apply_action_to_request(
        &self,
        request: Request,
        action: &Action,
        timestamp: u64,
    ) -> Result<Request>;
}

/// Extension id of [`ContentDataExtension`].
pub const CONTENT_DATA_ID: &str = "content-data";
const CONTENT_DATA_VERSION: &str = "0.1.0";

/// Attaches arbitrary content to a request, once, at any point of its life.
///
/// Recognizes extension data of the form
/// `{ "id": "content-data", "action": "create", "version": "0.1.0",
/// "parameters": { "content": ... } }`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentDataExtension;

impl ContentDataExtension {
    /// Extension data entry creating a content-data extension.
    pub fn create_extension_data(content: Value) -> Value {
        json!({
            "id": CONTENT_DATA_ID,
            "action": "create",
            "version": CONTENT_DATA_VERSION,
            "parameters": { "content": content },
        })
    }

    fn apply_one(&self, request: &mut Request, data: &Value) -> Result<()> {
        let action = data.get("action").and_then(Value::as_str).unwrap_or_default();
        if action != "create" {
            return Err(LogicError::action(format!("Unknown action: {}", action)));
        }
        if request.extensions.contains_key(CONTENT_DATA_ID) {
            return Err(LogicError::action("This extension has already been created"));
        }
        let content = data
            .get("parameters")
            .and_then(|p| p.get("content"))
            .ok_or_else(|| {
                LogicError::action("No content has been given for the extension content-data")
            })?;

        let version = data
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(CONTENT_DATA_VERSION);
        request.extensions.insert(
            CONTENT_DATA_ID.to_string(),
            json!({
                "type": "contentData",
                "id": CONTENT_DATA_ID,
                "version": version,
                "events": [],
                "values": { "content": content },
            }),
        );
        Ok(())
    }
}

impl AdvancedLogic for ContentDataExtension {
    fn apply_action_to_request(
        &self,
        mut request: Request,
        action: &Action,
        _timestamp: u64,
    ) -> Result<Request> {
        let Some(Value::Array(entries)) = action.data.parameters.get("extensionsData") else {
            return Ok(request);
        };
        for entry in entries
            .iter()
            .filter(|e| e.get("id").and_then(Value::as_str) == Some(CONTENT_DATA_ID))
        {
            self.apply_one(&mut request, entry)?;
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::action::ActionName;
    use crate::actions::{add_extensions_data, create};

    #[test]
    fn test_content_recorded_at_creation() {
        let mut params = create_params();
        params.extensions_data = Some(vec![ContentDataExtension::create_extension_data(
            json!({"invoiceNumber": "2018-0001"}),
        )]);
        let action = signed_create(&params, PAYEE_KEY);
        let request = create::create_request(&action, TIMESTAMP).unwrap();

        let request = ContentDataExtension
            .apply_action_to_request(request, &action, TIMESTAMP)
            .unwrap();
        let ext = &request.extensions[CONTENT_DATA_ID];
        assert_eq!(ext["type"], "contentData");
        assert_eq!(ext["values"]["content"]["invoiceNumber"], "2018-0001");
    }

    #[test]
    fn test_second_creation_rejected() {
        let mut request = created_request();
        let data = vec![ContentDataExtension::create_extension_data(json!("a"))];
        let action = action(
            ActionName::AddExtensionsData,
            json!({"requestId": request.request_id, "extensionsData": data}),
            OTHER_KEY,
        );
        request =
            add_extensions_data::apply_action_to_request(&action, &request, TIMESTAMP).unwrap();
        request = ContentDataExtension
            .apply_action_to_request(request, &action, TIMESTAMP)
            .unwrap();

        let again =
            add_extensions_data::apply_action_to_request(&action, &request, TIMESTAMP).unwrap();
        let err = ContentDataExtension
            .apply_action_to_request(again, &action, TIMESTAMP)
            .unwrap_err();
        assert_eq!(err.reason(), "This extension has already been created");
    }

    #[test]
    fn test_missing_content() {
        let request = created_request();
        let data = vec![json!({"id": CONTENT_DATA_ID, "action": "create", "parameters": {}})];
        let action = action(
            ActionName::AddExtensionsData,
            json!({"requestId": request.request_id, "extensionsData": data}),
            PAYEE_KEY,
        );
        let err = ContentDataExtension
            .apply_action_to_request(request, &action, TIMESTAMP)
            .unwrap_err();
        assert_eq!(err.reason(), "No content has been given for the extension content-data");
    }

    #[test]
    fn test_foreign_extension_data_ignored() {
        let request = created_request();
        let action = action(
            ActionName::AddExtensionsData,
            json!({"requestId": request.request_id, "extensionsData": one_extension()}),
            PAYEE_KEY,
        );
        let next = ContentDataExtension
            .apply_action_to_request(request.clone(), &action, TIMESTAMP)
            .unwrap();
        assert_eq!(next, request);
    }
}
