use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ошибки полей формы: имя поля -> сообщение для пользователя.
///
/// Пустой набор означает, что форма валидна.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Имена полей с ошибками (в алфавитном порядке)
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Тот же набор без ошибки указанного поля
    pub fn without(mut self, field: &str) -> Self {
        self.0.remove(field);
        self
    }

    /// `Ok(payload)` если ошибок нет, иначе `Err(self)`
    pub fn into_result<T>(self, payload: impl FnOnce() -> Option<T>) -> Result<T, FieldErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        payload().ok_or(self)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Поля формы, которые умеют проверять себя.
///
/// Все правила выполняются при каждой проверке, без остановки на первой ошибке.
/// При успехе возвращается разобранный payload для записи во внешний сервис.
pub trait FormFields {
    type Payload;

    fn validate(&self) -> Result<Self::Payload, FieldErrors>;
}

/// Режим формы: создание новой записи или редактирование существующей
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum EditMode<Id> {
    Creating,
    Editing(Id),
}

impl<Id: Copy> EditMode<Id> {
    pub fn target_id(&self) -> Option<Id> {
        match self {
            EditMode::Creating => None,
            EditMode::Editing(id) => Some(*id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditMode::Editing(_))
    }
}

impl<Id> From<Option<Id>> for EditMode<Id> {
    fn from(id: Option<Id>) -> Self {
        match id {
            Some(id) => EditMode::Editing(id),
            None => EditMode::Creating,
        }
    }
}

/// Черновик формы: значения полей, ошибки и режим.
///
/// Неизменяемое значение: каждое редактирование возвращает новый черновик
/// целиком, поэтому значения и ошибки не могут разойтись.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft<F, Id> {
    fields: F,
    errors: FieldErrors,
    mode: EditMode<Id>,
}

impl<F, Id: Copy> FormDraft<F, Id> {
    /// Пустой черновик для создания записи
    pub fn creating(fields: F) -> Self {
        Self {
            fields,
            errors: FieldErrors::new(),
            mode: EditMode::Creating,
        }
    }

    /// Черновик, заполненный из существующей записи
    pub fn editing(id: Id, fields: F) -> Self {
        Self {
            fields,
            errors: FieldErrors::new(),
            mode: EditMode::Editing(id),
        }
    }

    pub fn with_mode(mode: EditMode<Id>, fields: F) -> Self {
        Self {
            fields,
            errors: FieldErrors::new(),
            mode,
        }
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn mode(&self) -> EditMode<Id> {
        self.mode
    }

    /// Изменить одно поле. Ошибка этого поля снимается, остальные остаются.
    pub fn edit(self, field: &str, change: impl FnOnce(&mut F)) -> Self {
        let mut fields = self.fields;
        change(&mut fields);
        Self {
            fields,
            errors: self.errors.without(field),
            mode: self.mode,
        }
    }

    /// Тот же черновик с новым набором ошибок
    pub fn with_errors(self, errors: FieldErrors) -> Self {
        Self { errors, ..self }
    }

    /// Очищенный черновик после успешного сохранения
    pub fn cleared(self) -> Self
    where
        F: Default,
    {
        Self::creating(F::default())
    }
}

impl<F: FormFields, Id: Copy> FormDraft<F, Id> {
    pub fn validate(&self) -> Result<F::Payload, FieldErrors> {
        self.fields.validate()
    }
}
