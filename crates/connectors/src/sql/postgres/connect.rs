use crate::sql::base::error::ConnectorError;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{
    Client, Config, Connection, NoTls, Socket, config::SslMode, tls::TlsStream,
};
use tracing::{error, warn};

/// Opens a client honouring the `sslmode` of `url`. `prefer` falls back to
/// a plain connection when the TLS handshake fails.
pub(crate) async fn open(url: &str) -> Result<Client, ConnectorError> {
    let config: Config = url
        .parse()
        .map_err(|e: tokio_postgres::Error| ConnectorError::InvalidUrl(e.to_string()))?;

    match config.get_ssl_mode() {
        SslMode::Disable => plain(&config).await,
        SslMode::Prefer => match tls(&config).await {
            Ok(client) => Ok(client),
            Err(err) => {
                warn!(%err, "TLS handshake with Postgres failed, connecting without TLS");
                plain(&config).await
            }
        },
        _ => tls(&config).await,
    }
}

async fn tls(config: &Config) -> Result<Client, ConnectorError> {
    let connector = MakeTlsConnector::new(TlsConnector::builder().build()?);
    let (client, connection) = config.connect(connector).await?;
    drive(connection);
    Ok(client)
}

async fn plain(config: &Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    drive(connection);
    Ok(client)
}

/// The connection future does the socket IO for its client and must be
/// polled for as long as the client is in use.
fn drive<T>(connection: Connection<Socket, T>)
where
    T: TlsStream + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection closed with an error");
        }
    });
}
