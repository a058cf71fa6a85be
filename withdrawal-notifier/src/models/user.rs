use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// A record in the `users` collection. Only the fields used for push
/// delivery are mapped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub susu_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcm_token: Option<String>,
}

impl UserAccount {
    pub fn new(id: impl Into<String>, susu_account_id: impl Into<String>) -> Self {
        Self {
            id: Some(Bson::String(id.into())),
            susu_account_id: Some(susu_account_id.into()),
            fcm_token: None,
        }
    }

    pub fn with_fcm_token(mut self, token: impl Into<String>) -> Self {
        self.fcm_token = Some(token.into());
        self
    }

    /// Device registration token, treating an empty string as absent.
    pub fn device_token(&self) -> Option<&str> {
        self.fcm_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn display_id(&self) -> String {
        match &self.id {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn empty_token_counts_as_missing() {
        let user = UserAccount::new("u1", "ACC1").with_fcm_token("");
        assert_eq!(user.device_token(), None);
    }

    #[test]
    fn decodes_bson_document() {
        let oid = ObjectId::new();
        let user: UserAccount = mongodb::bson::from_document(doc! {
            "_id": oid,
            "susuAccountId": "ACC1",
            "fcmToken": "TOK123",
            "displayName": "Ama"
        })
        .unwrap();

        assert_eq!(user.display_id(), oid.to_hex());
        assert_eq!(user.susu_account_id.as_deref(), Some("ACC1"));
        assert_eq!(user.device_token(), Some("TOK123"));
    }
}
