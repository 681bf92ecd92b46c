/// Reassembly of fragmented WebSocket messages.
///
/// The WebSocket actor hands over continuation frames as they arrive: a text message
/// split by the client shows up as `FirstText`, any number of `Continue` and a final
/// `Last`. Binary messages are refused on their first fragment and the rest is dropped.
use actix_http::ws::Item;
use actix_web::web::BytesMut;
use thiserror::Error;

use crate::config::server::MAX_MESSAGE_BYTES;

/// Reasons a fragmented message is thrown away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    #[error("binary messages are not supported")]
    Binary,

    #[error("continuation frame without a message in progress")]
    Stray,

    #[error("a new message started before the previous one was finished")]
    Interrupted,

    #[error("message is larger than {} bytes", MAX_MESSAGE_BYTES)]
    TooLarge,

    #[error("message is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Default)]
enum Pending {
    #[default]
    Idle,
    Text(BytesMut),
    /// Rest of a refused message; dropped silently up to its last fragment.
    Discard,
}

#[derive(Debug, Default)]
pub struct Fragments {
    pending: Pending,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops whatever is buffered. Returns true if a text message was cut short.
    pub fn abort(&mut self) -> bool {
        matches!(std::mem::take(&mut self.pending), Pending::Text(_))
    }

    /// Feeds one continuation frame.
    ///
    /// Returns the complete text once its last fragment arrived, `None` while more
    /// fragments are expected. An error is reported once per discarded message.
    pub fn push(&mut self, item: Item) -> Result<Option<String>, FragmentError> {
        match item {
            Item::FirstText(data) => {
                let interrupted = self.abort();
                self.pending = Pending::Text(BytesMut::with_capacity(data.len()));
                self.append(&data)?;
                if interrupted {
                    Err(FragmentError::Interrupted)
                } else {
                    Ok(None)
                }
            }
            Item::FirstBinary(_) => {
                self.pending = Pending::Discard;
                Err(FragmentError::Binary)
            }
            Item::Continue(data) => match self.pending {
                Pending::Idle => Err(FragmentError::Stray),
                Pending::Discard => Ok(None),
                Pending::Text(_) => self.append(&data).map(|_| None),
            },
            Item::Last(data) => {
                let appended = self.append(&data);
                let pending = std::mem::take(&mut self.pending);
                appended?;
                match pending {
                    Pending::Idle => Err(FragmentError::Stray),
                    Pending::Discard => Ok(None),
                    Pending::Text(buf) => String::from_utf8(buf.to_vec())
                        .map(Some)
                        .map_err(|_| FragmentError::InvalidUtf8),
                }
            }
        }
    }

    fn append(&mut self, data: &[u8]) -> Result<(), FragmentError> {
        if let Pending::Text(buf) = &mut self.pending {
            if buf.len() + data.len() > MAX_MESSAGE_BYTES {
                self.pending = Pending::Discard;
                return Err(FragmentError::TooLarge);
            }
            buf.extend_from_slice(data);
        }
        Ok(())
    }
}
