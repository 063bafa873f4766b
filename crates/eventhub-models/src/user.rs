use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_shape() {
        let user: User = serde_json::from_str(
            r#"{
                "_id": "u1",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "username": "ada",
                "avatar": "https://cdn.example.com/ada.png",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-02-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.full_name(), "Ada Lovelace");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["_id"], "u1");
        assert_eq!(value["firstName"], "Ada");
    }
}
