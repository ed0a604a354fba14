use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tracing::debug;

use super::message::parse_subscribe;
use super::registry::{BroadcastRegistry, Subscriber};

/// WebSocket endpoint: inbound `{"channel": "..."}` frames subscribe the connection, outbound
/// frames are the registry's `{channel, data}` envelopes.
pub fn socket_router(registry: Arc<BroadcastRegistry>) -> Router {
    Router::new()
        .route("/ws", get(upgrade_handler))
        .with_state(registry)
}

async fn upgrade_handler(
    State(registry): State<Arc<BroadcastRegistry>>,
    upgrade: WebSocketUpgrade,
) -> Response {
    upgrade.on_upgrade(move |socket: WebSocket| {
        let (sink, stream) = socket.split();
        serve_connection(sink, stream, registry)
    })
}

/// Drive one observer until it closes: subscribe on valid inbound frames, forward every
/// frame the registry hands this connection, then drop all of its subscriptions.
async fn serve_connection<Tx, Rx>(mut sink: Tx, mut inbound: Rx, registry: Arc<BroadcastRegistry>)
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let (subscriber, mut outbound) = Subscriber::channel();
    let connection = subscriber.id();
    debug!(connection = %connection, "observer connected");

    loop {
        tokio::select! {
            frame = inbound.next() => match frame {
                Some(Ok(Message::Text(frame))) => match parse_subscribe(&frame) {
                    Ok(request) => registry.subscribe(&request.channel, &subscriber),
                    Err(err) => debug!(connection = %connection, error = %err, "ignoring inbound frame"),
                },
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            Some(frame) = outbound.recv() => {
                if sink.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        }
    }

    registry.unsubscribe(connection);
    debug!(connection = %connection, "observer disconnected");
}
