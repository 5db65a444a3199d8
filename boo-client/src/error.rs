use thiserror::Error;

use crate::sink::DecodeFailure;

#[derive(Debug, Error)]
/// Ошибки декодирования ответа API.
pub enum DecodeError {
    /// Ответ синтаксически некорректен или не соответствует схеме.
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Обязательное поле отсутствует в теле ответа.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Версия протокола в ответе не совпала с ожидаемой.
    #[error("unexpected protocol version: {0}")]
    VersionMismatch(i64),

    /// Сервер сообщил об ошибке уровня API.
    #[error("api error [{code}]: {description}")]
    Api {
        /// Числовой код ошибки.
        code: i64,
        /// Описание ошибки.
        description: String,
    },
}

/// Результат операций декодирования `boo-client`.
pub type DecodeResult<T> = Result<T, DecodeError>;

impl DecodeError {
    /// Сводит ошибку к одной из трёх категорий уведомлений приёмника.
    ///
    /// Отсутствующее обязательное поле для инициатора запроса неотличимо
    /// от синтаксически некорректного ответа.
    pub fn failure(&self) -> DecodeFailure {
        match self {
            Self::Parse(_) | Self::MissingField(_) => DecodeFailure::ParseError,
            Self::VersionMismatch(_) => DecodeFailure::VersionMismatch,
            Self::Api { code, description } => DecodeFailure::ApiError {
                code: *code,
                description: description.clone(),
            },
        }
    }
}
