use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::not_blank;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(default)]
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "cannot be more than 50 characters")
    )]
    pub name: String,
}

impl From<CategoryPayload> for Category {
    fn from(payload: CategoryPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
        }
    }
}
