use serde::{Deserialize, Serialize};

use super::aggregate::{Category, CategoryDto, CategoryId};
use crate::shared::form::{FieldErrors, FormDraft, FormFields};

/// Поля формы категории в том виде, как их ввёл пользователь
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryForm {
    pub category_name: String,
}

pub type CategoryDraft = FormDraft<CategoryForm, CategoryId>;

impl CategoryForm {
    pub const CATEGORY_NAME: &'static str = "category_name";

    pub fn new(category_name: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
        }
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            category_name: category.category_name.clone(),
        }
    }
}

impl FormFields for CategoryForm {
    type Payload = CategoryDto;

    fn validate(&self) -> Result<CategoryDto, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = self.category_name.trim();
        if name.is_empty() {
            errors.insert(Self::CATEGORY_NAME, "Название категории обязательно");
        }
        errors.into_result(|| {
            Some(CategoryDto {
                category_name: name.to_string(),
            })
        })
    }
}

/// Черновик для редактирования существующей категории
pub fn draft_for(category: &Category) -> CategoryDraft {
    FormDraft::editing(category.id, CategoryForm::from(category))
}
