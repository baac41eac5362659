//! Оркестратор отправки формы: проверка, загрузка файла, запись, инвалидация.

use async_trait::async_trait;
use contracts::shared::form::{EditMode, FieldErrors, FormDraft, FormFields};
use contracts::shared::notice::Notice;
use contracts::shared::upload::UploadFile;
use serde::Serialize;

use super::cache::QueryCache;
use super::error::CatalogError;

/// Фаза отправки формы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    Idle,
    Validating,
    Invalid,
    Submitting,
    Uploading,
    Persisting,
    Success,
    Failed,
}

/// Сущность, которую можно создать или изменить через форму
#[async_trait]
pub trait MutationTarget: Send + Sync {
    type Fields: FormFields<Payload = Self::Payload> + Default + Send + Sync;
    type Payload: Send;
    type Id: Copy + Send + Sync + std::fmt::Display;
    type Entity: Send;

    /// Тег кэша страниц, который сбрасывается после записи
    fn tag(&self) -> &'static str;

    /// Куда перейти после успешного сохранения
    fn list_route(&self) -> &'static str;

    fn success_message(&self, mode: EditMode<Self::Id>) -> String;

    /// Новый локальный файл, который нужно загрузить до записи
    fn pending_upload(_fields: &Self::Fields) -> Option<UploadFile> {
        None
    }

    async fn upload(&self, _file: UploadFile) -> Result<String, CatalogError> {
        Err(CatalogError::Storage(format!(
            "{} does not accept files",
            self.tag()
        )))
    }

    async fn create(
        &self,
        payload: Self::Payload,
        uploaded: Option<String>,
    ) -> Result<Self::Entity, CatalogError>;

    async fn update(
        &self,
        id: Self::Id,
        payload: Self::Payload,
        uploaded: Option<String>,
    ) -> Result<Self::Entity, CatalogError>;
}

/// Чем закончилась отправка
#[derive(Debug)]
pub enum Outcome<E> {
    /// Форма не прошла проверку, сервис данных не вызывался
    Invalid(FieldErrors),
    Saved {
        entity: E,
        notice: Notice,
        redirect_to: &'static str,
    },
    /// Ошибка сервиса данных или хранилища; сообщение передаётся как есть
    Failed { notice: Notice, error: CatalogError },
}

/// Результат отправки и черновик, который форма показывает дальше
pub struct Submission<T: MutationTarget> {
    pub draft: FormDraft<T::Fields, T::Id>,
    pub outcome: Outcome<T::Entity>,
}

pub struct MutationOrchestrator<'a, T: MutationTarget> {
    target: &'a T,
    cache: QueryCache,
    phase: MutationPhase,
    trace: Vec<MutationPhase>,
}

impl<'a, T: MutationTarget> MutationOrchestrator<'a, T> {
    pub fn new(target: &'a T, cache: QueryCache) -> Self {
        Self {
            target,
            cache,
            phase: MutationPhase::Idle,
            trace: Vec::new(),
        }
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Фазы последней отправки по порядку
    pub fn trace(&self) -> &[MutationPhase] {
        &self.trace
    }

    fn enter(&mut self, phase: MutationPhase) {
        self.phase = phase;
        self.trace.push(phase);
    }

    pub async fn submit(&mut self, draft: FormDraft<T::Fields, T::Id>) -> Submission<T> {
        self.trace.clear();
        self.enter(MutationPhase::Validating);

        let payload = match draft.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                tracing::debug!("{} form rejected: {}", self.target.tag(), errors);
                self.enter(MutationPhase::Invalid);
                self.enter(MutationPhase::Idle);
                return Submission {
                    draft: draft.with_errors(errors.clone()),
                    outcome: Outcome::Invalid(errors),
                };
            }
        };

        self.enter(MutationPhase::Submitting);
        let draft = draft.with_errors(FieldErrors::new());

        // Файл загружается строго до записи, которая на него ссылается
        let uploaded = match T::pending_upload(draft.fields()) {
            Some(file) => {
                self.enter(MutationPhase::Uploading);
                match self.target.upload(file).await {
                    Ok(name) => Some(name),
                    Err(e) => return self.fail(draft, e),
                }
            }
            None => None,
        };

        self.enter(MutationPhase::Persisting);
        let mode = draft.mode();
        let result = match mode {
            EditMode::Creating => self.target.create(payload, uploaded).await,
            EditMode::Editing(id) => self.target.update(id, payload, uploaded).await,
        };

        match result {
            Ok(entity) => {
                self.enter(MutationPhase::Success);
                self.cache.invalidate_tag(self.target.tag());
                let notice = Notice::success(self.target.success_message(mode));
                tracing::info!("{}: {}", self.target.tag(), notice.message);
                self.enter(MutationPhase::Idle);
                Submission {
                    draft: draft.cleared(),
                    outcome: Outcome::Saved {
                        entity,
                        notice,
                        redirect_to: self.target.list_route(),
                    },
                }
            }
            Err(e) => self.fail(draft, e),
        }
    }

    fn fail(&mut self, draft: FormDraft<T::Fields, T::Id>, error: CatalogError) -> Submission<T> {
        self.enter(MutationPhase::Failed);
        tracing::error!("{} submit failed: {}", self.target.tag(), error);
        let notice = Notice::error(error.to_string());
        self.enter(MutationPhase::Idle);
        Submission {
            draft,
            outcome: Outcome::Failed { notice, error },
        }
    }
}
