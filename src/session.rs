//! IMAP session over implicit TLS

use async_imap::Session;
use async_trait::async_trait;
use futures::TryStreamExt;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::{client::TlsStream, TlsConnector};
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ReorgError, Result};
use crate::mailbox_name;

type ImapStream = Compat<TlsStream<TcpStream>>;

/// Every IMAP command the reorganizer issues
///
/// Folder names are passed and returned decoded; implementations handle the
/// wire encoding. Commands run one at a time against a single connection.
#[async_trait]
pub trait MailboxSession: Send {
    /// LIST "" "*"
    async fn list_mailboxes(&mut self) -> Result<Vec<String>>;

    /// EXAMINE (read-only), returning the EXISTS count
    async fn examine(&mut self, name: &str) -> Result<u32>;

    /// SELECT (read-write), returning the EXISTS count
    async fn select(&mut self, name: &str) -> Result<u32>;

    /// UID COPY 1:* into `dest` from the selected folder
    async fn uid_copy_all(&mut self, dest: &str) -> Result<()>;

    /// UID STORE 1:* +FLAGS (\Deleted) in the selected folder
    async fn uid_mark_all_deleted(&mut self) -> Result<()>;

    async fn expunge(&mut self) -> Result<()>;

    /// CLOSE the selected folder
    async fn close(&mut self) -> Result<()>;

    async fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    async fn delete(&mut self, name: &str) -> Result<()>;

    async fn logout(&mut self) -> Result<()>;
}

/// Production session backed by `async-imap`
pub struct ImapSession {
    inner: Session<ImapStream>,
}

impl ImapSession {
    /// Connect, negotiate TLS, and log in
    ///
    /// Each stage is bounded by `server.timeout_secs`.
    pub async fn connect(server: &ServerConfig, email: &str, password: &str) -> Result<Self> {
        let limit = Duration::from_secs(server.timeout_secs);

        let server_name = ServerName::try_from(server.host.clone())
            .map_err(|_| ReorgError::TlsError(format!("Invalid server name: {}", server.host)))?;
        let connector = tls_connector()?;

        debug!("Connecting to {}:{}", server.host, server.port);
        let tcp = timeout(limit, TcpStream::connect((server.host.as_str(), server.port)))
            .await
            .map_err(|_| ReorgError::Timeout {
                secs: server.timeout_secs,
                during: format!("connecting to {}:{}", server.host, server.port),
            })?
            .map_err(|e| {
                ReorgError::ConnectionError(format!(
                    "{}:{}: {}",
                    server.host, server.port, e
                ))
            })?;

        debug!("TCP connected, performing TLS handshake");
        let tls = timeout(limit, connector.connect(server_name, tcp))
            .await
            .map_err(|_| ReorgError::Timeout {
                secs: server.timeout_secs,
                during: "negotiating TLS".to_string(),
            })?
            .map_err(|e| ReorgError::TlsError(e.to_string()))?;

        let client = async_imap::Client::new(tls.compat());

        debug!("Logging in as {}", email);
        let inner = match timeout(limit, client.login(email, password)).await {
            Ok(Ok(session)) => session,
            Ok(Err((e, _client))) => return Err(ReorgError::AuthError(e.to_string())),
            Err(_) => {
                return Err(ReorgError::Timeout {
                    secs: server.timeout_secs,
                    during: "logging in".to_string(),
                })
            }
        };

        info!("Logged in to {} as {}", server.host, email);
        Ok(Self { inner })
    }
}

fn tls_connector() -> Result<TlsConnector> {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs()
        .map_err(|e| ReorgError::TlsError(format!("Failed to load native certificates: {}", e)))?;
    let (added, ignored) = roots.add_parsable_certificates(certs);
    debug!("Loaded {} native certificates, ignored {}", added, ignored);
    if roots.is_empty() {
        warn!("Root certificate store is empty; the TLS handshake will likely fail");
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Mailbox argument for UID COPY
///
/// `async-imap` quotes the names it passes to SELECT, RENAME and DELETE but
/// sends the UID COPY target verbatim.
fn copy_target(dest: &str) -> Result<String> {
    Ok(mailbox_name::quote(&mailbox_name::encode(dest)?))
}

#[async_trait]
impl MailboxSession for ImapSession {
    async fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        let names: Vec<_> = self
            .inner
            .list(Some(""), Some("*"))
            .await?
            .try_collect()
            .await?;

        Ok(names
            .iter()
            .map(|name| mailbox_name::decode(name.name()))
            .collect())
    }

    async fn examine(&mut self, name: &str) -> Result<u32> {
        let mailbox = self.inner.examine(mailbox_name::encode(name)?).await?;
        Ok(mailbox.exists)
    }

    async fn select(&mut self, name: &str) -> Result<u32> {
        let mailbox = self.inner.select(mailbox_name::encode(name)?).await?;
        Ok(mailbox.exists)
    }

    async fn uid_copy_all(&mut self, dest: &str) -> Result<()> {
        self.inner.uid_copy("1:*", copy_target(dest)?).await?;
        Ok(())
    }

    async fn uid_mark_all_deleted(&mut self) -> Result<()> {
        let _: Vec<_> = self
            .inner
            .uid_store("1:*", "+FLAGS (\\Deleted)")
            .await?
            .try_collect()
            .await?;
        Ok(())
    }

    async fn expunge(&mut self) -> Result<()> {
        let _: Vec<_> = self.inner.expunge().await?.try_collect().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let from = mailbox_name::encode(from)?;
        let to = mailbox_name::encode(to)?;
        self.inner.rename(&from, &to).await?;
        Ok(())
    }

    async fn delete(&mut self, name: &str) -> Result<()> {
        self.inner.delete(mailbox_name::encode(name)?).await?;
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        self.inner.logout().await?;
        Ok(())
    }
}
