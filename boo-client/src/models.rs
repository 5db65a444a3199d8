use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
/// Декодированный конверт ответа API с метаданными и содержимым.
pub struct ResponseEnvelope<T> {
    /// Серверное время ответа (секунды Unix-эпохи).
    pub timestamp: i64,
    /// Окно актуальности ответа в секундах.
    pub window: i64,
    /// Типизированное содержимое тела ответа.
    pub content: T,
}

#[derive(Debug, Clone, Serialize)]
/// Публичная модель аудиоклипа («бу»).
pub struct Boo {
    /// Идентификатор клипа.
    pub id: i64,
    /// Заголовок клипа.
    pub title: String,
    /// Длительность записи в секундах.
    pub duration: f64,
    /// Момент записи; `None`, если сервер прислал неразборчивую метку времени.
    pub recorded_at: Option<DateTime<Utc>>,
    /// Момент загрузки; `None`, если сервер прислал неразборчивую метку времени.
    pub uploaded_at: Option<DateTime<Utc>>,
    /// URL аудио в высоком качестве.
    pub high_mp3_url: String,
    /// URL страницы клипа.
    pub detail_url: String,
    /// URL обложки, если она есть.
    pub image_url: Option<String>,
    /// Число прослушиваний.
    pub plays: u32,
    /// Число комментариев.
    pub comments: u32,
    /// Теги клипа в порядке сервера; `None` означает «без тегов».
    pub tags: Option<Vec<Tag>>,
    /// Автор клипа; `None`, если автор анонимен.
    pub user: Option<User>,
    /// Геометка клипа, если она была указана.
    pub location: Option<BooLocation>,
}

#[derive(Debug, Clone, Serialize)]
/// Публичная модель автора клипа.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// URL профиля.
    pub profile_url: String,
    /// URL аватара.
    pub image_url: String,
    /// Число подписчиков.
    pub followers: u32,
    /// Число подписок.
    pub followings: u32,
    /// Число опубликованных клипов.
    pub audio_clips: u32,
}

#[derive(Debug, Clone, Serialize)]
/// Геометка клипа.
pub struct BooLocation {
    /// Долгота в градусах.
    pub longitude: f64,
    /// Широта в градусах.
    pub latitude: f64,
    /// Точность определения координат в метрах.
    pub accuracy: f64,
    /// Текстовое описание места.
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
/// Тег клипа.
pub struct Tag {
    /// Отображаемая форма тега.
    pub display: String,
    /// Нормализованная форма тега.
    pub normalised: String,
    /// URL подборки по тегу.
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
/// Страница ленты аудиоклипов с параметрами пагинации.
pub struct BooPage {
    /// Смещение страницы от начала выборки.
    pub offset: u32,
    /// Общее количество клипов в выборке.
    pub total: u64,
    /// Клипы текущей страницы в порядке сервера.
    pub boos: Vec<Boo>,
}

#[derive(Debug, Clone, Serialize)]
/// Статус привязки устройства к аккаунту.
pub enum LinkStatus {
    /// Устройство привязано к аккаунту.
    Linked {
        /// Логин аккаунта.
        username: String,
        /// Email аккаунта.
        email: String,
    },
    /// Устройство не привязано; сервер выдал ссылку для привязки.
    Unlinked {
        /// URL страницы привязки.
        link_url: String,
    },
}

#[derive(Debug, Clone, Serialize)]
/// Учётные данные, выданные при регистрации источника.
///
/// Значения декодируются как есть, без проверки формата.
pub struct Credentials {
    /// Секрет API.
    pub api_secret: String,
    /// Ключ API.
    pub api_key: String,
}
