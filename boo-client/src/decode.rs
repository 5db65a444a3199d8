use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};

use crate::envelope;
use crate::error::{DecodeError, DecodeResult};
use crate::models::{
    Boo, BooLocation, BooPage, Credentials, LinkStatus, ResponseEnvelope, Tag, User,
};
use crate::sink::FailureSink;

// Формат меток времени recorded_at/uploaded_at: фиксированный профиль
// ISO 8601 с числовым смещением зоны.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Deserialize)]
struct BooListDto {
    totals: TotalsDto,
    audio_clips: Vec<BooDto>,
}

#[derive(Debug, Deserialize)]
struct TotalsDto {
    offset: u32,
    count: i64,
}

#[derive(Debug, Deserialize)]
struct BooDto {
    id: i64,
    title: String,
    duration: f64,
    #[serde(default)]
    tags: Vec<TagDto>,
    recorded_at: String,
    uploaded_at: String,
    urls: BooUrlsDto,
    counts: BooCountsDto,
    user: UserDto,
    location: Option<LocationDto>,
}

#[derive(Debug, Deserialize)]
struct BooUrlsDto {
    high_mp3: String,
    detail: String,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BooCountsDto {
    plays: u32,
    comments: u32,
}

// Все поля, кроме anonymous, опциональны на уровне схемы: для анонимного
// автора сервер их не присылает. Для неанонимного их отсутствие — ошибка,
// и это проверяет конверсия.
#[derive(Debug, Deserialize)]
struct UserDto {
    #[serde(default)]
    anonymous: bool,
    id: Option<i64>,
    username: Option<String>,
    urls: Option<UserUrlsDto>,
    counts: Option<UserCountsDto>,
}

#[derive(Debug, Deserialize)]
struct UserUrlsDto {
    profile: String,
    image: String,
}

#[derive(Debug, Deserialize)]
struct UserCountsDto {
    followers: u32,
    followings: u32,
    audio_clips: u32,
}

#[derive(Debug, Deserialize)]
struct LocationDto {
    longitude: f64,
    latitude: f64,
    accuracy: f64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct TagDto {
    display_tag: String,
    normalised_tag: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RegistrationDto {
    source: SourceDto,
}

#[derive(Debug, Deserialize)]
struct SourceDto {
    api_secret: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct StatusDto {
    linked: bool,
    account: Option<AccountDto>,
    link_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    username: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct UnlinkDto {
    unlinked: bool,
}

#[derive(Debug, Deserialize)]
struct UploadDto {
    audio_clip: ClipDto,
}

#[derive(Debug, Deserialize)]
struct ClipDto {
    id: i64,
}

impl TryFrom<BooListDto> for BooPage {
    type Error = DecodeError;

    fn try_from(dto: BooListDto) -> Result<Self, Self::Error> {
        // Один некорректный клип отбрасывает всю страницу: частичных
        // страниц не бывает.
        let boos = dto
            .audio_clips
            .into_iter()
            .map(Boo::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            offset: dto.totals.offset,
            total: dto.totals.count.max(0) as u64,
            boos,
        })
    }
}

impl TryFrom<BooDto> for Boo {
    type Error = DecodeError;

    fn try_from(dto: BooDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: dto.id,
            title: dto.title,
            duration: dto.duration,
            recorded_at: parse_timestamp(&dto.recorded_at),
            uploaded_at: parse_timestamp(&dto.uploaded_at),
            high_mp3_url: dto.urls.high_mp3,
            detail_url: dto.urls.detail,
            image_url: dto.urls.image,
            plays: dto.counts.plays,
            comments: dto.counts.comments,
            tags: convert_tags(dto.tags),
            user: convert_user(dto.user)?,
            location: dto.location.map(BooLocation::from),
        })
    }
}

impl From<LocationDto> for BooLocation {
    fn from(dto: LocationDto) -> Self {
        Self {
            longitude: dto.longitude,
            latitude: dto.latitude,
            accuracy: dto.accuracy,
            description: dto.description,
        }
    }
}

impl From<TagDto> for Tag {
    fn from(dto: TagDto) -> Self {
        Self {
            display: dto.display_tag,
            normalised: dto.normalised_tag,
            url: dto.url,
        }
    }
}

impl From<SourceDto> for Credentials {
    fn from(dto: SourceDto) -> Self {
        Self {
            api_secret: dto.api_secret,
            api_key: dto.api_key,
        }
    }
}

impl TryFrom<StatusDto> for LinkStatus {
    type Error = DecodeError;

    fn try_from(dto: StatusDto) -> Result<Self, Self::Error> {
        // Дискриминант определяет, какие поля вообще читаются: у привязанного
        // устройства — аккаунт, у непривязанного — только ссылка.
        if dto.linked {
            let account = dto.account.ok_or(DecodeError::MissingField("account"))?;
            Ok(Self::Linked {
                username: account.username,
                email: account.email,
            })
        } else {
            let link_url = dto.link_url.ok_or(DecodeError::MissingField("link_url"))?;
            Ok(Self::Unlinked { link_url })
        }
    }
}

fn convert_user(dto: UserDto) -> DecodeResult<Option<User>> {
    if dto.anonymous {
        return Ok(None);
    }

    let urls = dto.urls.ok_or(DecodeError::MissingField("user.urls"))?;
    let counts = dto.counts.ok_or(DecodeError::MissingField("user.counts"))?;

    Ok(Some(User {
        id: dto.id.ok_or(DecodeError::MissingField("user.id"))?,
        username: dto
            .username
            .ok_or(DecodeError::MissingField("user.username"))?,
        profile_url: urls.profile,
        image_url: urls.image,
        followers: counts.followers,
        followings: counts.followings,
        audio_clips: counts.audio_clips,
    }))
}

// Пустой список и отсутствующий ключ схлопываются в «без тегов».
fn convert_tags(tags: Vec<TagDto>) -> Option<Vec<Tag>> {
    if tags.is_empty() {
        return None;
    }

    Some(tags.into_iter().map(Tag::from).collect())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(err) => {
            // Единственный терпимый к сбою участок декодирования: клип
            // остаётся валидным, метка времени становится пустой.
            tracing::warn!(timestamp = raw, error = %err, "could not parse timestamp");
            None
        }
    }
}

// Общий путь всех декодеров: конверт -> канал ошибок -> типизированное тело.
fn decode_body<D: DeserializeOwned>(raw: &str) -> DecodeResult<ResponseEnvelope<D>> {
    let envelope = envelope::retrieve_body(raw)?;
    let content: D = serde_json::from_value(envelope.content)?;

    Ok(ResponseEnvelope {
        timestamp: envelope.timestamp,
        window: envelope.window,
        content,
    })
}

fn deliver<T>(result: DecodeResult<T>, sink: &dyn FailureSink) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(error = %err, "could not decode api response");
            sink.report(err.failure());
            None
        }
    }
}

/// Декодирует страницу ленты аудиоклипов.
///
/// Возвращает `None`, если ответ не удалось декодировать; приёмник `sink`
/// к этому моменту уже получил ровно одно уведомление о причине.
pub fn decode_boo_page(raw: &str, sink: &dyn FailureSink) -> Option<ResponseEnvelope<BooPage>> {
    deliver(boo_page(raw), sink)
}

/// Декодирует ответ на регистрацию источника: секрет и ключ API.
///
/// Возвращает `None`, если ответ не удалось декодировать; приёмник `sink`
/// к этому моменту уже получил ровно одно уведомление о причине.
pub fn decode_registration(
    raw: &str,
    sink: &dyn FailureSink,
) -> Option<ResponseEnvelope<Credentials>> {
    deliver(registration(raw), sink)
}

/// Декодирует статус привязки устройства к аккаунту.
///
/// Возвращает `None`, если ответ не удалось декодировать; приёмник `sink`
/// к этому моменту уже получил ровно одно уведомление о причине.
pub fn decode_link_status(
    raw: &str,
    sink: &dyn FailureSink,
) -> Option<ResponseEnvelope<LinkStatus>> {
    deliver(link_status(raw), sink)
}

/// Декодирует подтверждение отвязки устройства.
///
/// Возвращает `None`, если ответ не удалось декодировать; приёмник `sink`
/// к этому моменту уже получил ровно одно уведомление о причине.
pub fn decode_unlink(raw: &str, sink: &dyn FailureSink) -> Option<ResponseEnvelope<bool>> {
    deliver(unlink(raw), sink)
}

/// Декодирует подтверждение загрузки: идентификатор нового клипа.
///
/// Возвращает `None`, если ответ не удалось декодировать; приёмник `sink`
/// к этому моменту уже получил ровно одно уведомление о причине.
pub fn decode_upload(raw: &str, sink: &dyn FailureSink) -> Option<ResponseEnvelope<i64>> {
    deliver(upload(raw), sink)
}

fn boo_page(raw: &str) -> DecodeResult<ResponseEnvelope<BooPage>> {
    let ResponseEnvelope {
        timestamp,
        window,
        content,
    } = decode_body::<BooListDto>(raw)?;

    Ok(ResponseEnvelope {
        timestamp,
        window,
        content: BooPage::try_from(content)?,
    })
}

fn registration(raw: &str) -> DecodeResult<ResponseEnvelope<Credentials>> {
    let ResponseEnvelope {
        timestamp,
        window,
        content,
    } = decode_body::<RegistrationDto>(raw)?;

    Ok(ResponseEnvelope {
        timestamp,
        window,
        content: Credentials::from(content.source),
    })
}

fn link_status(raw: &str) -> DecodeResult<ResponseEnvelope<LinkStatus>> {
    let ResponseEnvelope {
        timestamp,
        window,
        content,
    } = decode_body::<StatusDto>(raw)?;

    Ok(ResponseEnvelope {
        timestamp,
        window,
        content: LinkStatus::try_from(content)?,
    })
}

fn unlink(raw: &str) -> DecodeResult<ResponseEnvelope<bool>> {
    let ResponseEnvelope {
        timestamp,
        window,
        content,
    } = decode_body::<UnlinkDto>(raw)?;

    Ok(ResponseEnvelope {
        timestamp,
        window,
        content: content.unlinked,
    })
}

fn upload(raw: &str) -> DecodeResult<ResponseEnvelope<i64>> {
    let ResponseEnvelope {
        timestamp,
        window,
        content,
    } = decode_body::<UploadDto>(raw)?;

    Ok(ResponseEnvelope {
        timestamp,
        window,
        content: content.audio_clip.id,
    })
}
