use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Category;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CreateCategoryRequest {
    #[serde(default)]
    pub(crate) institute_id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "name must contain 1..255 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) public_access: bool,
    #[serde(default)]
    pub(crate) created_by: Option<String>,
    #[serde(default)]
    pub(crate) department_ids: Vec<i64>,
    #[serde(default)]
    pub(crate) team_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListCategoriesQuery {
    #[serde(default)]
    pub(crate) institute_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    pub(crate) category_id: i64,
    pub(crate) institute_id: Option<i64>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) public_access: bool,
    pub(crate) created_by: String,
    pub(crate) created_date: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            category_id: category.category_id,
            institute_id: category.institute_id,
            name: category.name,
            description: category.description,
            public_access: category.public_access,
            created_by: category.created_by,
            created_date: format_primitive(category.created_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryEnvelope {
    pub(crate) status: bool,
    pub(crate) data: CategoryResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryListResponse {
    pub(crate) status: bool,
    pub(crate) data: Vec<CategoryResponse>,
    pub(crate) total: usize,
}
