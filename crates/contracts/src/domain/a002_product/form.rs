use super::aggregate::{Product, ProductDto, ProductId};
use crate::domain::a001_category::aggregate::CategoryId;
use crate::domain::common::AggregateId;
use crate::shared::form::{FieldErrors, FormDraft, FormFields};
use crate::shared::upload::UploadFile;

/// Изображение товара в форме
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductImage {
    /// Уже сохранённый объект (или его отсутствие)
    Stored(Option<String>),
    /// Новый локальный файл: перед записью товара его нужно загрузить
    Selected(UploadFile),
}

impl Default for ProductImage {
    fn default() -> Self {
        ProductImage::Stored(None)
    }
}

/// Поля формы товара в том виде, как их ввёл пользователь
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    /// Сырой ввод цены, разбирается при проверке
    pub price: String,
    /// Выбранная категория; пустая строка, если ничего не выбрано
    pub category_id: String,
    pub image: ProductImage,
}

pub type ProductDraft = FormDraft<ProductForm, ProductId>;

impl ProductForm {
    pub const TITLE: &'static str = "title";
    pub const DESCRIPTION: &'static str = "description";
    pub const PRICE: &'static str = "price";
    pub const CATEGORY_ID: &'static str = "category_id";

    /// Файл, который нужно загрузить перед сохранением
    pub fn pending_upload(&self) -> Option<&UploadFile> {
        match &self.image {
            ProductImage::Selected(file) => Some(file),
            ProductImage::Stored(_) => None,
        }
    }

    /// Выбрать новый файл вместо сохранённого изображения
    pub fn select_image(&mut self, file: UploadFile) {
        self.image = ProductImage::Selected(file);
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category_id: product
                .category_id
                .map(|id| id.as_string())
                .unwrap_or_default(),
            image: ProductImage::Stored(product.image_url.clone()),
        }
    }
}

fn parse_price(raw: &str) -> Result<f64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Цена обязательна");
    }
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err("Цена должна быть положительным числом"),
    }
}

impl FormFields for ProductForm {
    type Payload = ProductDto;

    fn validate(&self) -> Result<ProductDto, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.insert(Self::TITLE, "Название обязательно");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert(Self::DESCRIPTION, "Описание обязательно");
        }

        let price = match parse_price(&self.price) {
            Ok(price) => Some(price),
            Err(message) => {
                errors.insert(Self::PRICE, message);
                None
            }
        };

        // Существование категории проверяет сервис данных
        let category_id = match CategoryId::from_string(&self.category_id) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.insert(Self::CATEGORY_ID, "Выберите категорию");
                None
            }
        };

        let image_url = match &self.image {
            ProductImage::Stored(url) => url.clone().filter(|u| !u.is_empty()),
            ProductImage::Selected(_) => None,
        };

        errors.into_result(|| {
            Some(ProductDto {
                title: title.to_string(),
                description: description.to_string(),
                price: price?,
                image_url,
                category_id: category_id?,
            })
        })
    }
}

/// Черновик для редактирования существующего товара
pub fn draft_for(product: &Product) -> ProductDraft {
    FormDraft::editing(product.id, ProductForm::from(product))
}
