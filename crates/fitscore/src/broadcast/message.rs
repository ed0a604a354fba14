use serde::{Deserialize, Serialize};

/// Frame sent to subscribers: the channel name plus the published payload.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: ?Sized> {
    pub channel: &'a str,
    pub data: &'a T,
}

/// Inbound frame asking to join a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscribeRequest {
    pub channel: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscribeRequestError {
    #[error("subscribe frame is not valid json: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("subscribe frame names an empty channel")]
    EmptyChannel,
}

pub fn parse_subscribe(frame: &str) -> Result<SubscribeRequest, SubscribeRequestError> {
    let mut request: SubscribeRequest = serde_json::from_str(frame)?;
    request.channel = request.channel.trim().to_string();
    if request.channel.is_empty() {
        return Err(SubscribeRequestError::EmptyChannel);
    }
    Ok(request)
}
