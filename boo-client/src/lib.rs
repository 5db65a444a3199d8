//! Клиентская библиотека декодирования ответов audioboo-совместимого API.
//!
//! Сервер заворачивает каждый ответ в конверт с версией протокола,
//! метаданными времени и телом. Библиотека разбирает конверт, проверяет
//! версию, извлекает канал ошибок и декодирует тело в типизированные
//! доменные модели:
//! - страница ленты аудиоклипов ([`BooPage`])
//! - учётные данные регистрации ([`Credentials`])
//! - статус привязки устройства ([`LinkStatus`])
//! - подтверждения отвязки и загрузки
//!
//! О любом сбое декодер не сообщает вызывающей стороне напрямую: он
//! возвращает `None`, а причину доставляет через приёмник [`FailureSink`] —
//! ровно одно уведомление на вызов. Транспорт (HTTP) и политика повторов
//! находятся за пределами библиотеки.
#![warn(missing_docs)]

mod decode;
mod envelope;
mod error;
mod models;
mod sink;

pub use decode::{
    decode_boo_page, decode_link_status, decode_registration, decode_unlink, decode_upload,
};
pub use envelope::API_VERSION;
pub use error::{DecodeError, DecodeResult};
pub use models::{
    Boo, BooLocation, BooPage, Credentials, LinkStatus, ResponseEnvelope, Tag, User,
};
pub use sink::{ChannelSink, DecodeFailure, FailureSink};
