use serde::Deserialize;
use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};
use crate::models::ResponseEnvelope;

/// Ожидаемая версия протокола API.
///
/// Сейчас поддерживается ровно одна версия: ответ с любой другой
/// отклоняется целиком, без попытки деградировать к соседней схеме.
pub const API_VERSION: i64 = 200;

#[derive(Debug, Deserialize)]
struct EnvelopeDto {
    version: i64,
    timestamp: i64,
    window: i64,
    body: Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDto {
    code: i64,
    description: String,
}

/// Разбирает внешний конверт ответа: метаданные, версию протокола и канал
/// ошибок. Тело возвращается неразобранным — его схему знает доменный
/// декодер.
pub(crate) fn retrieve_body(raw: &str) -> DecodeResult<ResponseEnvelope<Value>> {
    let envelope: EnvelopeDto = serde_json::from_str(raw)?;

    if envelope.version != API_VERSION {
        return Err(DecodeError::VersionMismatch(envelope.version));
    }

    check_for_error(&envelope.body)?;

    Ok(ResponseEnvelope {
        timestamp: envelope.timestamp,
        window: envelope.window,
        content: envelope.body,
    })
}

// Наличие ключа `error` — единственный признак сбоя; другие поля тела для
// вывода об успехе не рассматриваются.
fn check_for_error(body: &Value) -> DecodeResult<()> {
    let error = match body.get("error") {
        Some(error) => error,
        None => return Ok(()),
    };

    let error: ApiErrorDto = serde_json::from_value(error.clone())?;
    Err(DecodeError::Api {
        code: error.code,
        description: error.description,
    })
}

#[cfg(test)]
mod tests {
    use super::{API_VERSION, retrieve_body};
    use crate::error::DecodeError;
    use serde_json::json;

    #[test]
    fn retrieve_body_returns_metadata_and_opaque_body() {
        let raw = json!({
            "version": API_VERSION,
            "timestamp": 100,
            "window": 60,
            "body": {"totals": {"offset": 0, "count": 0}},
        })
        .to_string();

        let envelope = retrieve_body(&raw).expect("envelope must decode");
        assert_eq!(envelope.timestamp, 100);
        assert_eq!(envelope.window, 60);
        assert!(envelope.content.get("totals").is_some());
    }

    #[test]
    fn retrieve_body_rejects_malformed_json() {
        let err = retrieve_body("{not json").expect_err("must fail");
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn retrieve_body_rejects_missing_envelope_field() {
        // Нет поля window.
        let raw = json!({
            "version": API_VERSION,
            "timestamp": 100,
            "body": {},
        })
        .to_string();

        let err = retrieve_body(&raw).expect_err("must fail");
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn retrieve_body_rejects_version_mismatch() {
        let raw = json!({
            "version": API_VERSION + 1,
            "timestamp": 100,
            "window": 60,
            "body": {},
        })
        .to_string();

        let err = retrieve_body(&raw).expect_err("must fail");
        match err {
            DecodeError::VersionMismatch(version) => assert_eq!(version, API_VERSION + 1),
            other => panic!("expected VersionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn retrieve_body_surfaces_api_error() {
        let raw = json!({
            "version": API_VERSION,
            "timestamp": 100,
            "window": 60,
            "body": {"error": {"code": 42, "description": "bad"}},
        })
        .to_string();

        let err = retrieve_body(&raw).expect_err("must fail");
        match err {
            DecodeError::Api { code, description } => {
                assert_eq!(code, 42);
                assert_eq!(description, "bad");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn retrieve_body_rejects_malformed_error_object() {
        // В объекте error нет description: канал ошибок считает ответ
        // некорректным, а не успешным.
        let raw = json!({
            "version": API_VERSION,
            "timestamp": 100,
            "window": 60,
            "body": {"error": {"code": 42}},
        })
        .to_string();

        let err = retrieve_body(&raw).expect_err("must fail");
        assert!(matches!(err, DecodeError::Parse(_)));
    }
}
