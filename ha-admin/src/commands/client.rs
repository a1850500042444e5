//! Management client for communicating with a broker

use crate::error::{AdminError, Result};
use async_trait::async_trait;
use ha_common::{
    Arguments, HaBrokerState, ManagementRequest, ManagementResponse, ObjectRef, CLIENT_NAME,
};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

/// Parameters for opening a management session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Broker address (host:port)
    pub broker: String,
    /// Bound on connecting and on each request, `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// SASL mechanism requested from the broker
    pub sasl_mechanism: Option<String>,
}

/// Opens management sessions to brokers
#[async_trait]
pub trait ManagementClient: Send + Sync {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Session>>;
}

/// An open management session with one broker
#[async_trait]
pub trait Session: Send {
    /// Read the attributes of `object`, `None` if the broker has no such object
    async fn get_object(&mut self, object: &ObjectRef) -> Result<Option<serde_json::Value>>;

    /// Invoke `method` on `object` with named arguments
    async fn invoke(
        &mut self,
        object: &ObjectRef,
        method: &str,
        args: Arguments,
    ) -> Result<serde_json::Value>;

    /// Release the session
    async fn close(&mut self) -> Result<()>;
}

/// Handle to a broker's HA management object
pub struct HaBroker<'a> {
    session: &'a mut dyn Session,
    object: ObjectRef,
    address: String,
}

impl<'a> HaBroker<'a> {
    pub fn new(session: &'a mut dyn Session, address: &str) -> Self {
        Self {
            session,
            object: ObjectRef::ha_broker(),
            address: address.to_string(),
        }
    }

    /// Address of the broker this handle talks to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Fetch a fresh snapshot of the HA object
    pub async fn fetch(&mut self) -> Result<HaBrokerState> {
        match self.session.get_object(&self.object).await? {
            Some(attributes) => Ok(HaBrokerState::from_attributes(attributes)?),
            None => Err(AdminError::CapabilityMissing {
                broker: self.address.clone(),
            }),
        }
    }

    /// Invoke a method on the HA object, discarding its result
    pub async fn invoke(&mut self, method: &str, args: Arguments) -> Result<()> {
        debug!(broker = %self.address, method, ?args, "invoking HA method");
        self.session.invoke(&self.object, method, args).await?;
        Ok(())
    }
}

async fn with_timeout<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| AdminError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Management client speaking newline-delimited JSON over TCP
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpManagementClient;

#[async_trait]
impl ManagementClient for TcpManagementClient {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Session>> {
        let stream = with_timeout(options.timeout, async {
            TcpStream::connect(&options.broker)
                .await
                .map_err(|source| AdminError::Connect {
                    broker: options.broker.clone(),
                    source,
                })
        })
        .await?;

        let (reader, writer) = stream.into_split();
        let mut session = TcpSession {
            reader: BufReader::new(reader),
            writer,
            timeout: options.timeout,
        };

        let response = session
            .request(&ManagementRequest::Open {
                client: CLIENT_NAME.to_string(),
                sasl_mechanism: options.sasl_mechanism.clone(),
            })
            .await?;
        if !response.success {
            return Err(AdminError::Remote {
                method: "open".to_string(),
                message: response.message,
            });
        }

        debug!(broker = %options.broker, "management session open");
        Ok(Box::new(session))
    }
}

/// Session over a TCP connection
pub struct TcpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    timeout: Option<Duration>,
}

impl TcpSession {
    /// Send a request and receive a response
    async fn request(&mut self, request: &ManagementRequest) -> Result<ManagementResponse> {
        let line = serde_json::to_string(request)? + "\n";
        debug!(request = %line.trim_end(), "sending management request");

        let reader = &mut self.reader;
        let writer = &mut self.writer;
        with_timeout(self.timeout, async move {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;

            let mut response = String::new();
            reader.read_line(&mut response).await?;
            if response.is_empty() {
                return Err(AdminError::Closed);
            }
            Ok(serde_json::from_str(&response)?)
        })
        .await
    }
}

#[async_trait]
impl Session for TcpSession {
    async fn get_object(&mut self, object: &ObjectRef) -> Result<Option<serde_json::Value>> {
        let response = self
            .request(&ManagementRequest::GetObject {
                object: object.clone(),
            })
            .await?;
        if !response.success {
            return Err(AdminError::Remote {
                method: format!("get {}", object),
                message: response.message,
            });
        }
        Ok(response.data.filter(|data| !data.is_null()))
    }

    async fn invoke(
        &mut self,
        object: &ObjectRef,
        method: &str,
        args: Arguments,
    ) -> Result<serde_json::Value> {
        let response = self
            .request(&ManagementRequest::Invoke {
                object: object.clone(),
                method: method.to_string(),
                args,
            })
            .await?;
        if !response.success {
            return Err(AdminError::Remote {
                method: method.to_string(),
                message: response.message,
            });
        }
        Ok(response.data.unwrap_or(serde_json::Value::Null))
    }

    async fn close(&mut self) -> Result<()> {
        let line = serde_json::to_string(&ManagementRequest::Close)? + "\n";
        let writer = &mut self.writer;
        with_timeout(self.timeout, async move {
            writer.write_all(line.as_bytes()).await?;
            writer.shutdown().await?;
            Ok(())
        })
        .await
    }
}
