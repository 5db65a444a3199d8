use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Уведомление о сбое декодирования, доставляемое инициатору запроса.
///
/// Это единственные три категории сбоев, видимые за границей декодера.
pub enum DecodeFailure {
    /// Ответ не удалось разобрать: некорректный JSON или нарушенная схема.
    ParseError,
    /// Версия протокола в ответе не совпала с ожидаемой.
    VersionMismatch,
    /// Сервер сообщил об ошибке уровня API.
    ApiError {
        /// Числовой код ошибки.
        code: i64,
        /// Описание ошибки.
        description: String,
    },
}

/// Приёмник уведомлений о сбоях декодирования.
///
/// Декодеры не возвращают ошибку вызывающей стороне напрямую: при сбое они
/// отдают «пустой» результат, а причину доставляют через приёмник — ровно
/// одно уведомление на вызов. Доставка не должна блокировать декодер;
/// привязка к конкретному потоку (например, доставка в UI-поток) — забота
/// реализации приёмника.
pub trait FailureSink: Send + Sync {
    /// Доставляет уведомление инициатору запроса.
    fn report(&self, failure: DecodeFailure);
}

#[derive(Debug, Clone)]
/// Приёмник, доставляющий уведомления через канал `tokio::sync::mpsc`.
pub struct ChannelSink {
    sender: UnboundedSender<DecodeFailure>,
}

impl ChannelSink {
    /// Создаёт приёмник поверх отправляющей половины канала.
    pub fn new(sender: UnboundedSender<DecodeFailure>) -> Self {
        Self { sender }
    }
}

impl FailureSink for ChannelSink {
    fn report(&self, failure: DecodeFailure) {
        // Получатель мог уже завершиться; уведомление в этом случае теряется.
        let _ = self.sender.send(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelSink, DecodeFailure, FailureSink};
    use tokio::sync::mpsc;

    #[test]
    fn channel_sink_delivers_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);

        sink.report(DecodeFailure::VersionMismatch);

        let delivered = rx.try_recv().expect("failure must be delivered");
        assert_eq!(delivered, DecodeFailure::VersionMismatch);
    }

    #[test]
    fn channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        drop(rx);

        // Не должно паниковать: уведомление просто теряется.
        sink.report(DecodeFailure::ParseError);
    }
}
