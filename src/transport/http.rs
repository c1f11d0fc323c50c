use super::{PeerTransport, TransportError};
use crate::membership::NodeId;
use crate::monitor::protocol::{ENDPOINT_HEARTBEAT, HeartbeatRequest, HeartbeatResponse};
use crate::node::protocol::*;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// JSON-over-HTTP transport. Addresses are `host:port`.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    pub(crate) async fn post<Req, Resp>(
        &self,
        addr: &str,
        endpoint: &str,
        payload: &Req,
    ) -> Result<Resp, TransportError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = self
            .http_client
            .post(format!("http://{}{}", addr, endpoint))
            .json(payload);

        self.send(addr, request).await
    }

    pub(crate) async fn get<Resp>(&self, addr: &str, endpoint: &str) -> Result<Resp, TransportError>
    where
        Resp: DeserializeOwned,
    {
        let request = self.http_client.get(format!("http://{}{}", addr, endpoint));

        self.send(addr, request).await
    }

    async fn send<Resp>(
        &self,
        addr: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Resp, TransportError>
    where
        Resp: DeserializeOwned,
    {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| TransportError::Http {
                addr: addr.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                addr: addr.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|source| TransportError::Http {
                addr: addr.to_string(),
                source,
            })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn deliver_message(
        &self,
        addr: &str,
        message: ReceiveMessageRequest,
    ) -> Result<u64, TransportError> {
        let response: ClockResponse = self
            .post(addr, ENDPOINT_RECEIVE_MESSAGE, &message)
            .await?;
        Ok(response.clock)
    }

    async fn deliver_marker(&self, addr: &str, sender: NodeId) -> Result<i64, TransportError> {
        let response: MarkerResponse = self
            .post(addr, ENDPOINT_MARKER, &MarkerRequest { sender })
            .await?;
        Ok(response.recorded_state)
    }

    async fn deliver_app_message(
        &self,
        addr: &str,
        delta: i64,
        sender: NodeId,
    ) -> Result<i64, TransportError> {
        let response: ValueResponse = self
            .post(addr, ENDPOINT_RECEIVE_APP, &ReceiveAppRequest { delta, sender })
            .await?;
        Ok(response.value)
    }

    async fn request_election(
        &self,
        addr: &str,
        sender: NodeId,
    ) -> Result<String, TransportError> {
        let response: ElectionReply = self
            .post(addr, ENDPOINT_ELECTION_REQUEST, &ElectionRequest { sender })
            .await?;
        Ok(response.reply)
    }

    async fn announce_coordinator(
        &self,
        addr: &str,
        coordinator: NodeId,
    ) -> Result<(), TransportError> {
        let _: AcknowledgeResponse = self
            .post(addr, ENDPOINT_COORDINATOR, &CoordinatorAnnouncement { coordinator })
            .await?;
        Ok(())
    }

    async fn send_heartbeat(&self, addr: &str, node_id: NodeId) -> Result<(), TransportError> {
        let _: HeartbeatResponse = self
            .post(addr, ENDPOINT_HEARTBEAT, &HeartbeatRequest { node_id })
            .await?;
        Ok(())
    }
}
